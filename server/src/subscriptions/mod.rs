//! The subscription machinery - sequence numbers, the retransmission
//! queue, monitored items, the subscription state machine itself and the
//! timer task that drives it.

use std::time::Duration as StdDuration;

use uasub_types::Duration;

pub mod sequence_number;
pub mod retransmission;
pub mod monitored_item;
pub mod subscription;
pub mod ticker;

/// Tracks which subscriptions currently have a running publishing timer.
/// Injected into the timer task so surrounding code can enumerate live
/// subscriptions without a process-wide registry.
pub trait SubscriptionRegistry {
    fn register(&self, subscription_id: u32);
    fn unregister(&self, subscription_id: u32);
}

/// Converts a millisecond interval to a std duration for the timer.
pub(crate) fn duration_from_ms(interval: Duration) -> StdDuration {
    StdDuration::from_micros((interval * 1000.0) as u64)
}
