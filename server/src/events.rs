//! Observer surface of a subscription. Owners register an observer at
//! construction and are told, edge triggered, when the subscription has
//! something to publish, sent a keep alive, ran out of lifetime or closed.
//!
//! Handlers must not call back into the subscription - every event is
//! delivered while the operation that raised it is still on the stack, and
//! the owner is expected to react on its own next turn (e.g. by draining
//! with `pop_notification_to_send`).

use uasub_types::ReadValueId;

use crate::subscriptions::monitored_item::MonitoredItem;

/// Receives the events a subscription raises. Every method has a no-op
/// default so observers implement only what they care about.
pub trait SubscriptionEvents {
    /// At least one assembled notification message is pending and
    /// publishing is enabled.
    fn notification(&self) {}

    /// Raised at the start of every tick, before notifications are
    /// gathered, so owners can poke their data sources.
    fn perform_update(&self) {}

    /// A keep alive announcing `future_sequence_number` was handed to the
    /// publish engine.
    fn keep_alive(&self, _future_sequence_number: u32) {}

    /// The lifetime counter ran out. Raised before termination clean up.
    fn expired(&self) {}

    /// The subscription reached the closed state.
    fn terminated(&self) {}

    /// A monitored item was registered, before its requested monitoring
    /// mode is applied.
    fn monitored_item_created(&self, _monitored_item: &MonitoredItem, _item_to_monitor: &ReadValueId) {
    }
}

/// An observer that ignores everything.
pub struct NullEvents;

impl SubscriptionEvents for NullEvents {}
