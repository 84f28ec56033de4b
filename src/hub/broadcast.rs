//! Broadcast hub implementation

use super::{PriceUpdateEvent, SubscriberId};
use crate::config::HubConfig;
use crate::telemetry::{self, CounterMetric, GaugeMetric};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tokio::sync::mpsc::{self, error::TrySendError};
use uuid::Uuid;

type SubscriberMap = HashMap<SubscriberId, mpsc::Sender<PriceUpdateEvent>>;

struct HubInner {
    capacity: usize,
    subscribers: Mutex<SubscriberMap>,
}

impl HubInner {
    fn lock(&self) -> MutexGuard<'_, SubscriberMap> {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn remove(&self, id: &SubscriberId) -> bool {
        let (removed, remaining) = {
            let mut subscribers = self.lock();
            let removed = subscribers.remove(id).is_some();
            (removed, subscribers.len())
        };
        telemetry::set_gauge(GaugeMetric::Subscribers, remaining as f64);
        removed
    }
}

/// Fans price updates out to every connected subscriber
///
/// Each subscriber owns a bounded queue. Publishing never waits: a subscriber
/// whose queue is full or whose receiver is gone is disconnected instead.
#[derive(Clone)]
pub struct BroadcastHub {
    inner: Arc<HubInner>,
}

impl BroadcastHub {
    /// Create a hub whose subscribers buffer up to `capacity` events
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(HubInner {
                capacity: capacity.max(1),
                subscribers: Mutex::new(HashMap::new()),
            }),
        }
    }

    pub fn from_config(config: &HubConfig) -> Self {
        Self::new(config.subscriber_capacity)
    }

    /// Register a new subscriber
    ///
    /// Only events published after this call are delivered.
    pub fn subscribe(&self) -> Subscription {
        let (tx, rx) = mpsc::channel(self.inner.capacity);
        let id = Uuid::new_v4();

        let count = {
            let mut subscribers = self.inner.lock();
            subscribers.insert(id, tx);
            subscribers.len()
        };
        telemetry::set_gauge(GaugeMetric::Subscribers, count as f64);
        tracing::debug!(subscriber = %id, count, "Subscriber connected");

        Subscription {
            id,
            rx,
            hub: Arc::downgrade(&self.inner),
        }
    }

    /// Remove a subscriber; `false` if it was already gone
    pub fn unsubscribe(&self, id: &SubscriberId) -> bool {
        self.inner.remove(id)
    }

    /// Deliver `event` to every currently connected subscriber
    ///
    /// Returns the number of subscribers that accepted the event.
    pub fn publish(&self, event: &PriceUpdateEvent) -> usize {
        // Deliver outside the lock so subscribe/unsubscribe never wait on sends
        let targets: Vec<(SubscriberId, mpsc::Sender<PriceUpdateEvent>)> = {
            let subscribers = self.inner.lock();
            subscribers
                .iter()
                .map(|(id, tx)| (*id, tx.clone()))
                .collect()
        };

        let mut delivered = 0;
        let mut dropped = Vec::new();
        for (id, tx) in targets {
            match tx.try_send(event.clone()) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(_)) => {
                    tracing::warn!(subscriber = %id, "Subscriber queue full, disconnecting");
                    dropped.push(id);
                }
                Err(TrySendError::Closed(_)) => {
                    tracing::debug!(subscriber = %id, "Subscriber gone");
                    dropped.push(id);
                }
            }
        }

        if !dropped.is_empty() {
            telemetry::incr_counter_by(CounterMetric::SubscribersDropped, dropped.len() as u64);
            for id in &dropped {
                self.inner.remove(id);
            }
        }

        telemetry::incr_counter(CounterMetric::EventsPublished);
        delivered
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.lock().len()
    }
}

impl Default for BroadcastHub {
    fn default() -> Self {
        Self::from_config(&HubConfig::default())
    }
}

/// Receiving side of a hub subscription; dropping it unsubscribes
pub struct Subscription {
    id: SubscriberId,
    rx: mpsc::Receiver<PriceUpdateEvent>,
    hub: Weak<HubInner>,
}

impl Subscription {
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Next event; `None` once the hub has disconnected this subscriber and
    /// the queue is drained
    pub async fn recv(&mut self) -> Option<PriceUpdateEvent> {
        self.rx.recv().await
    }

    /// Next already-queued event, if any
    pub fn try_recv(&mut self) -> Option<PriceUpdateEvent> {
        self.rx.try_recv().ok()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.hub.upgrade() {
            inner.remove(&self.id);
        }
    }
}
