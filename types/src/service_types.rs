//! Request and result structures for the monitored item and subscription
//! services, and the monitoring filters carried by them. Filters are a
//! typed enum here rather than the extension objects used on the wire.

use crate::{
    attribute::{MonitoringMode, QualifiedName},
    node_id::NodeId,
    status_code::StatusCode,
    DateTimeUtc, Duration,
};

/// Identifies the node and attribute a monitored item watches.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadValueId {
    pub node_id: NodeId,
    /// Attribute id as requested by the client. Kept numeric so that an
    /// out of range id can be rejected during validation.
    pub attribute_id: u32,
    /// String form of the index range, empty for none
    pub index_range: String,
    /// Requested data encoding, null for the default
    pub data_encoding: QualifiedName,
}

impl ReadValueId {
    /// Watches the Value attribute of a node, no range, default encoding.
    pub fn value_of(node_id: NodeId) -> ReadValueId {
        ReadValueId {
            node_id,
            attribute_id: crate::attribute::AttributeId::Value as u32,
            index_range: String::new(),
            data_encoding: QualifiedName::null(),
        }
    }
}

/// Deadband types understood by the data change filter.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum DeadbandType {
    None,
    Absolute,
    Percent,
}

/// What change of a value triggers a data change notification.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum DataChangeTrigger {
    Status,
    StatusValue,
    StatusValueTimestamp,
}

/// Filter on reported data changes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataChangeFilter {
    pub trigger: DataChangeTrigger,
    pub deadband_type: DeadbandType,
    pub deadband_value: f64,
}

/// One select clause of an event filter, naming an event field to return.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectClause {
    /// The event type the field belongs to
    pub type_definition_id: NodeId,
    /// Browse path from the event type to the field
    pub browse_path: Vec<QualifiedName>,
}

/// Filter selecting which fields of matching events are reported.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventFilter {
    pub select_clauses: Vec<SelectClause>,
}

/// Filter requesting server side aggregation of sampled values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateFilter {
    pub start_time: DateTimeUtc,
    pub aggregate_type: NodeId,
    pub processing_interval: Duration,
}

/// The monitoring filter attached to a monitored item, if any.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum MonitoringFilter {
    None,
    DataChange(DataChangeFilter),
    Event(EventFilter),
    Aggregate(AggregateFilter),
}

impl Default for MonitoringFilter {
    fn default() -> MonitoringFilter {
        MonitoringFilter::None
    }
}

/// Per select clause diagnostics for an accepted event filter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventFilterResult {
    pub select_clause_results: Vec<StatusCode>,
}

/// Result structure for an accepted aggregate filter. The revised values
/// are not negotiated at this layer, so the structure is empty.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct AggregateFilterResult {}

/// The filter result returned with a create or modify result. Data change
/// filters produce no result structure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum FilterResult {
    None,
    Event(EventFilterResult),
    Aggregate(AggregateFilterResult),
}

impl Default for FilterResult {
    fn default() -> FilterResult {
        FilterResult::None
    }
}

/// Client requested monitoring parameters for one item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonitoringParameters {
    /// Client supplied handle returned in every notification for the item
    pub client_handle: u32,
    /// Requested sampling interval in milliseconds. Negative adopts the
    /// subscription's publishing interval, zero asks for the node's own
    /// minimum sampling interval.
    pub sampling_interval: Duration,
    /// Requested monitoring filter
    pub filter: MonitoringFilter,
    /// Requested queue depth for pending notifications
    pub queue_size: u32,
    /// Whether the oldest or newest notification is dropped on overflow
    pub discard_oldest: bool,
}

impl Default for MonitoringParameters {
    fn default() -> MonitoringParameters {
        MonitoringParameters {
            client_handle: 0,
            sampling_interval: -1.0,
            filter: MonitoringFilter::None,
            queue_size: 1,
            discard_oldest: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonitoredItemCreateRequest {
    pub item_to_monitor: ReadValueId,
    pub monitoring_mode: MonitoringMode,
    pub requested_parameters: MonitoringParameters,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonitoredItemCreateResult {
    pub status_code: StatusCode,
    pub monitored_item_id: u32,
    pub revised_sampling_interval: Duration,
    pub revised_queue_size: u32,
    pub filter_result: FilterResult,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonitoredItemModifyRequest {
    pub monitored_item_id: u32,
    pub requested_parameters: MonitoringParameters,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonitoredItemModifyResult {
    pub status_code: StatusCode,
    pub revised_sampling_interval: Duration,
    pub revised_queue_size: u32,
    pub filter_result: FilterResult,
}

/// A client acknowledgement of a previously published notification message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubscriptionAcknowledgement {
    pub subscription_id: u32,
    pub sequence_number: u32,
}

/// The revisable parameters of a ModifySubscription call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModifySubscriptionParameters {
    pub publishing_interval: Duration,
    pub lifetime_count: u32,
    pub max_keep_alive_count: u32,
    pub max_notifications_per_publish: u32,
    pub priority: u8,
}
