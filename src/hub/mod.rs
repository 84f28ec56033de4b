//! Broadcast hub module
//!
//! Keeps the set of connected subscribers and pushes each price update to
//! all of them without ever blocking the publisher.

mod broadcast;
mod types;

pub use broadcast::{BroadcastHub, Subscription};
pub use types::{PriceUpdateEvent, SubscriberId};
