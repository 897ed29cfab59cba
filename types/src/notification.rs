//! Notification payloads - the messages a subscription produces and the
//! per-item notifications they are assembled from.

use crate::{data_value::DataValue, status_code::StatusCode, variant::Variant, DateTimeUtc};

/// A value change reported for one monitored item, tagged with the handle
/// the client assigned to the item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonitoredItemNotification {
    /// Client supplied handle identifying the monitored item
    pub client_handle: u32,
    /// The changed value
    pub value: DataValue,
}

/// The selected fields of one event reported for a monitored item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventFieldList {
    /// Client supplied handle identifying the monitored item
    pub client_handle: u32,
    /// One entry per select clause of the item's event filter
    pub event_fields: Vec<Variant>,
}

/// All the data changes carried by one notification message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataChangeNotification {
    pub monitored_items: Vec<MonitoredItemNotification>,
}

/// All the events carried by one notification message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventNotificationList {
    pub events: Vec<EventFieldList>,
}

/// A change in the status of the subscription itself, e.g. the final
/// `BadTimeout` sent when the subscription's lifetime runs out.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusChangeNotification {
    pub status: StatusCode,
}

/// One entry of a notification message. A message carries one or two of
/// these - at most one data change, at most one event list, or a single
/// status change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum NotificationData {
    DataChange(DataChangeNotification),
    Events(EventNotificationList),
    StatusChange(StatusChangeNotification),
}

/// A sequenced message produced by a subscription, held for publishing and
/// afterwards for retransmission until the client acknowledges it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotificationMessage {
    /// Sequence number, unique and strictly increasing per subscription
    pub sequence_number: u32,
    /// Time the message was assembled
    pub publish_time: DateTimeUtc,
    /// One or two notification entries
    pub notification_data: Vec<NotificationData>,
}

impl NotificationMessage {
    /// Assembles a message from the data changes and events of one publish
    /// cycle. Produces at most one entry per kind.
    pub fn new(
        sequence_number: u32,
        publish_time: DateTimeUtc,
        data_changes: Vec<MonitoredItemNotification>,
        events: Vec<EventFieldList>,
    ) -> NotificationMessage {
        let mut notification_data = Vec::with_capacity(2);
        if !data_changes.is_empty() {
            notification_data.push(NotificationData::DataChange(DataChangeNotification {
                monitored_items: data_changes,
            }));
        }
        if !events.is_empty() {
            notification_data.push(NotificationData::Events(EventNotificationList {
                events,
            }));
        }
        NotificationMessage {
            sequence_number,
            publish_time,
            notification_data,
        }
    }

    /// A message carrying a single status change for the subscription.
    pub fn status_change(
        sequence_number: u32,
        publish_time: DateTimeUtc,
        status: StatusCode,
    ) -> NotificationMessage {
        NotificationMessage {
            sequence_number,
            publish_time,
            notification_data: vec![NotificationData::StatusChange(StatusChangeNotification {
                status,
            })],
        }
    }
}
