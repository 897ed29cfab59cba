//! Diagnostics exposed by a subscription as a point-in-time snapshot. The
//! counters themselves live on the subscription and are bumped by the
//! operations that produce the corresponding events; a snapshot makes no
//! cross field atomicity claim.

use uasub_types::{Duration, NodeId};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubscriptionDiagnostics {
    pub session_id: NodeId,
    pub subscription_id: u32,
    pub priority: u8,
    pub publishing_interval: Duration,
    pub max_lifetime_count: u32,
    pub max_keep_alive_count: u32,
    pub max_notifications_per_publish: u32,
    pub publishing_enabled: bool,
    pub monitored_item_count: u32,
    pub disabled_monitored_item_count: u32,
    /// The sequence number the next notification message will carry
    pub next_sequence_number: u32,
    pub modify_count: u32,
    pub enable_count: u32,
    pub disable_count: u32,
    pub republish_request_count: u32,
    /// Notification messages handed to the publish engine
    pub notifications_count: u32,
    /// Publish requests consumed by this subscription
    pub publish_request_count: u32,
    /// Inner data change entries across all published messages
    pub data_change_notifications_count: u32,
    /// Inner event list entries across all published messages
    pub event_notifications_count: u32,
}
