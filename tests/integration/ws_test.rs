//! Real-time channel tests

use crate::common::TestApp;
use futures_util::StreamExt;
use serde_json::Value;
use std::time::Duration;
use stock_pulse::hub::PriceUpdateEvent;
use stock_pulse::registry::SymbolRegistry;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn connect(app: &TestApp) -> WsClient {
    let (ws, _) = connect_async(app.ws_url.as_str()).await.unwrap();
    ws
}

/// Next text frame as JSON, skipping control frames
async fn next_event(ws: &mut WsClient) -> Value {
    tokio::time::timeout(Duration::from_secs(3), async {
        loop {
            match ws.next().await {
                Some(Ok(Message::Text(text))) => return serde_json::from_str(&text).unwrap(),
                Some(Ok(_)) => continue,
                other => panic!("websocket ended: {:?}", other),
            }
        }
    })
    .await
    .expect("no event received")
}

#[tokio::test]
async fn test_track_then_tick_pushes_update_to_every_subscriber() {
    let app = TestApp::spawn().await;
    app.provider
        .set_quote("AAPL", Some(150.0), Some(2_500_000_000_000), Some("USD"));

    let response = app.track("AAPL").await;
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["price"], 150.0);

    let mut first = connect(&app).await;
    let mut second = connect(&app).await;
    app.wait_for_subscribers(2).await;

    app.provider
        .set_quote("AAPL", Some(151.0), Some(2_500_000_000_000), Some("USD"));
    let report = app.refresh().await;
    assert_eq!(report["updated"], 1);

    for ws in [&mut first, &mut second] {
        let event = next_event(ws).await;
        assert_eq!(event["symbol"], "AAPL");
        assert_eq!(event["price"], 151.0);
        assert_eq!(event["absolute_change"], 1.0);
        assert_eq!(event["percent_change"], 0.67);
        assert!(event["timestamp"].as_str().is_some());
    }

    let stored = app.registry.get("AAPL").await.unwrap().unwrap();
    assert_eq!(stored.price, Some(151.0));
}

#[tokio::test]
async fn test_late_subscriber_gets_no_replay() {
    let app = TestApp::spawn().await;
    app.provider.set_price("AAPL", 150.0);
    app.track("AAPL").await;

    let mut early = connect(&app).await;
    app.wait_for_subscribers(1).await;

    app.provider.set_price("AAPL", 151.0);
    app.refresh().await;
    assert_eq!(next_event(&mut early).await["price"], 151.0);

    let mut late = connect(&app).await;
    app.wait_for_subscribers(2).await;

    app.provider.set_price("AAPL", 152.0);
    app.refresh().await;

    // The first frame the late client sees is the second update
    assert_eq!(next_event(&mut late).await["price"], 152.0);
    assert_eq!(next_event(&mut early).await["price"], 152.0);
}

#[tokio::test]
async fn test_failed_fetch_publishes_nothing() {
    let app = TestApp::spawn().await;
    app.provider.set_price("AAA", 10.0);
    app.provider.set_price("BBB", 20.0);
    app.track("AAA").await;
    app.track("BBB").await;

    let mut ws = connect(&app).await;
    app.wait_for_subscribers(1).await;

    app.provider.fail_with("AAA", 500);
    app.provider.set_price("BBB", 21.0);
    app.refresh().await;

    let event = next_event(&mut ws).await;
    assert_eq!(event["symbol"], "BBB");
    assert_eq!(event["absolute_change"], 1.0);

    let nothing_more = tokio::time::timeout(Duration::from_millis(100), ws.next()).await;
    assert!(nothing_more.is_err());
}

#[tokio::test]
async fn test_lagging_client_is_dropped_and_closed() {
    const CAPACITY: usize = 4;
    const BURST: usize = 12;

    let app = TestApp::spawn_with_hub_capacity(CAPACITY).await;

    // Keeps up by draining after every publish
    let mut steady = app.hub.subscribe();
    // Never gets a chance to read while the burst is published
    let mut lagging = connect(&app).await;
    app.wait_for_subscribers(2).await;

    // No await in this loop, so the lagging session task cannot drain its queue
    let mut received = Vec::new();
    for i in 0..BURST {
        app.hub
            .publish(&PriceUpdateEvent::new("AAPL", 100.0 + i as f64, None));
        while let Some(event) = steady.try_recv() {
            received.push(event.price);
        }
    }

    assert_eq!(app.hub.subscriber_count(), 1);
    let expected: Vec<f64> = (0..BURST).map(|i| 100.0 + i as f64).collect();
    assert_eq!(received, expected);

    // The lagging client gets what was queued before the drop, then a Close
    let frames = tokio::time::timeout(Duration::from_secs(3), async {
        let mut prices = Vec::new();
        loop {
            match lagging.next().await {
                Some(Ok(Message::Text(text))) => {
                    let event: Value = serde_json::from_str(&text).unwrap();
                    prices.push(event["price"].as_f64().unwrap());
                }
                Some(Ok(Message::Close(_))) => return prices,
                Some(Ok(_)) => continue,
                other => panic!("expected a close frame, got {:?}", other),
            }
        }
    })
    .await
    .expect("lagging client was not closed");

    assert_eq!(frames, expected[..CAPACITY].to_vec());

    // Later events still reach the remaining subscriber
    app.hub
        .publish(&PriceUpdateEvent::new("AAPL", 200.0, None));
    assert_eq!(steady.try_recv().map(|e| e.price), Some(200.0));
}

#[tokio::test]
async fn test_disconnect_unsubscribes() {
    let app = TestApp::spawn().await;

    let mut ws = connect(&app).await;
    app.wait_for_subscribers(1).await;

    ws.close(None).await.unwrap();
    drop(ws);

    tokio::time::timeout(Duration::from_secs(2), async {
        while app.hub.subscriber_count() > 0 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("subscriber was not removed");
}

#[tokio::test]
async fn test_background_loop_pushes_updates() {
    let mut app = TestApp::spawn_with_refresh(Duration::from_millis(50)).await;
    app.provider.set_price("AAPL", 150.0);
    app.track("AAPL").await;

    let mut ws = connect(&app).await;
    app.wait_for_subscribers(1).await;

    app.provider.set_price("AAPL", 155.0);
    loop {
        let event = next_event(&mut ws).await;
        if event["price"] == 155.0 {
            break;
        }
    }

    let handle = app.scheduler_handle.take().unwrap();
    tokio::time::timeout(Duration::from_secs(2), handle.shutdown())
        .await
        .expect("scheduler did not stop");
}
