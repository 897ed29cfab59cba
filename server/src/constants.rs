//! Limits and defaults enforced by the subscription engine.

/// Shortest publishing interval a subscription can be revised to, in
/// milliseconds.
pub const MIN_PUBLISHING_INTERVAL_MS: f64 = 100.0;

/// Longest publishing interval a subscription can be revised to - 30 days
/// in milliseconds.
pub const MAX_PUBLISHING_INTERVAL_MS: f64 = 2_592_000_000.0;

/// Smallest permitted keep alive count.
pub const MIN_KEEP_ALIVE_COUNT: u32 = 2;

/// Largest permitted keep alive count.
pub const MAX_KEEP_ALIVE_COUNT: u32 = 12_000;

/// The lifetime count must be at least this multiple of the keep alive
/// count, so a subscription survives several missed keep alives before it
/// is killed off.
pub const LIFETIME_COUNT_FACTOR: u32 = 3;

/// Capacity of the retransmission queue. Once this many sent notifications
/// are awaiting acknowledgement the oldest are dropped.
pub const MAX_SENT_NOTIFICATIONS: usize = 100;

/// Fastest sampling interval a monitored item can be revised to, in
/// milliseconds.
pub const MIN_SAMPLING_INTERVAL_MS: f64 = 50.0;

/// Slowest sampling interval a monitored item can be revised to - one hour
/// in milliseconds.
pub const MAX_SAMPLING_INTERVAL_MS: f64 = 3_600_000.0;

/// Deepest notification queue a monitored item can ask for.
pub const MAX_NOTIFICATION_QUEUE_SIZE: usize = 1_000;

/// Most monitored items one subscription may hold.
pub const MAX_MONITORED_ITEMS_PER_SUB: usize = 10_000;
