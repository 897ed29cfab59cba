//! Monitored items - the per node, per attribute elements of a
//! subscription. Creation runs the full validation gauntlet over the
//! requested item; afterwards the item is a bounded queue of pending
//! notifications that surrounding code fills and the subscription drains
//! once per publish cycle.

use std::collections::VecDeque;

use uasub_types::status_code::StatusCode;
use uasub_types::{
    AttributeId, DataChangeFilter, DeadbandType, Duration, EventFieldList, EventFilterResult,
    FilterResult, MonitoredItemCreateRequest, MonitoredItemModifyRequest,
    MonitoredItemNotification, MonitoringFilter, MonitoringMode, NumericRange, ReadValueId,
    TimestampsToReturn,
};

use crate::{
    address_space::{AddressSpace, EventNotifier, Node},
    constants,
};

/// Data encodings this server understands. Anything else in a create
/// request is rejected as unsupported.
const RECOGNISED_DATA_ENCODINGS: [&str; 2] = ["DefaultBinary", "DefaultXml"];

/// A notification extracted from a monitored item, before assembly into a
/// notification message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ItemNotification {
    DataChange(MonitoredItemNotification),
    Event(EventFieldList),
}

#[derive(Debug, Clone, Serialize)]
pub struct MonitoredItem {
    monitored_item_id: u32,
    item_to_monitor: ReadValueId,
    /// Parsed form of the request's index range
    index_range: NumericRange,
    monitoring_mode: MonitoringMode,
    client_handle: u32,
    sampling_interval: Duration,
    filter: MonitoringFilter,
    discard_oldest: bool,
    queue_size: usize,
    timestamps_to_return: TimestampsToReturn,
    notification_queue: VecDeque<ItemNotification>,
    /// Set when a notification was dropped because the queue was full,
    /// cleared when the queue is drained
    queue_overflow: bool,
}

impl MonitoredItem {
    /// Validates a create request and constructs the item. Checks run in a
    /// fixed order and the first failure wins; on success the returned item
    /// carries the revised sampling interval and queue size, and starts out
    /// disabled until the subscription applies the requested monitoring
    /// mode.
    pub fn validate_and_new(
        address_space: &AddressSpace,
        timestamps_to_return: TimestampsToReturn,
        publishing_interval: Duration,
        monitored_item_id: u32,
        request: &MonitoredItemCreateRequest,
    ) -> Result<(MonitoredItem, FilterResult), StatusCode> {
        let item_to_monitor = &request.item_to_monitor;
        let node = address_space
            .find_node(&item_to_monitor.node_id)
            .ok_or(StatusCode::BadNodeIdUnknown)?;
        // A Value request against a non variable is an attribute error,
        // reported before the raw attribute id is even decoded
        if item_to_monitor.attribute_id == AttributeId::Value as u32 && !node.is_variable() {
            return Err(StatusCode::BadAttributeIdInvalid);
        }
        let attribute_id = AttributeId::from_u32(item_to_monitor.attribute_id)?;
        let index_range = NumericRange::parse(&item_to_monitor.index_range)?;
        if !item_to_monitor.data_encoding.is_null() {
            if attribute_id != AttributeId::Value {
                return Err(StatusCode::BadDataEncodingInvalid);
            }
            if !RECOGNISED_DATA_ENCODINGS.contains(&item_to_monitor.data_encoding.name.as_str()) {
                return Err(StatusCode::BadDataEncodingUnsupported);
            }
        }
        let parameters = &request.requested_parameters;
        let filter_result = validate_filter(address_space, node, attribute_id, &parameters.filter)?;
        let sampling_interval = revise_sampling_interval(
            parameters.sampling_interval,
            publishing_interval,
            node,
            address_space,
        );
        let queue_size = revise_queue_size(parameters.queue_size);
        debug!(
            "Creating monitored item {} on {}, sampling interval {} ms, queue size {}",
            monitored_item_id, item_to_monitor.node_id, sampling_interval, queue_size
        );
        let monitored_item = MonitoredItem {
            monitored_item_id,
            item_to_monitor: item_to_monitor.clone(),
            index_range,
            monitoring_mode: MonitoringMode::Disabled,
            client_handle: parameters.client_handle,
            sampling_interval,
            filter: parameters.filter.clone(),
            discard_oldest: parameters.discard_oldest,
            queue_size,
            timestamps_to_return,
            notification_queue: VecDeque::with_capacity(queue_size.min(16)),
            queue_overflow: false,
        };
        Ok((monitored_item, filter_result))
    }

    /// Revalidates and applies a modify request. The node and attribute are
    /// unchanged, so only the filter, sampling interval and queue shape are
    /// renegotiated.
    pub fn modify(
        &mut self,
        address_space: &AddressSpace,
        publishing_interval: Duration,
        request: &MonitoredItemModifyRequest,
    ) -> Result<FilterResult, StatusCode> {
        let node = address_space
            .find_node(&self.item_to_monitor.node_id)
            .ok_or(StatusCode::BadNodeIdUnknown)?;
        let attribute_id = AttributeId::from_u32(self.item_to_monitor.attribute_id)?;
        let parameters = &request.requested_parameters;
        let filter_result = validate_filter(address_space, node, attribute_id, &parameters.filter)?;
        self.client_handle = parameters.client_handle;
        self.filter = parameters.filter.clone();
        self.discard_oldest = parameters.discard_oldest;
        self.sampling_interval = revise_sampling_interval(
            parameters.sampling_interval,
            publishing_interval,
            node,
            address_space,
        );
        self.queue_size = revise_queue_size(parameters.queue_size);
        // If the queue shrank, shed notifications per the discard policy
        while self.notification_queue.len() > self.queue_size {
            self.queue_overflow = true;
            if self.discard_oldest {
                let _ = self.notification_queue.pop_front();
            } else {
                let _ = self.notification_queue.pop_back();
            }
        }
        Ok(filter_result)
    }

    /// Queues a data change produced for this item.
    pub fn enqueue_data_change(&mut self, notification: MonitoredItemNotification) {
        self.enqueue(ItemNotification::DataChange(notification));
    }

    /// Queues an event produced for this item.
    pub fn enqueue_event(&mut self, event: EventFieldList) {
        self.enqueue(ItemNotification::Event(event));
    }

    fn enqueue(&mut self, notification: ItemNotification) {
        if self.monitoring_mode == MonitoringMode::Disabled {
            return;
        }
        if self.notification_queue.len() == self.queue_size {
            self.queue_overflow = true;
            let dropped = if self.discard_oldest {
                self.notification_queue.pop_front()
            } else {
                self.notification_queue.pop_back()
            };
            if dropped.is_some() {
                debug!(
                    "Monitored item {} queue overflowed, dropped the {} notification",
                    self.monitored_item_id,
                    if self.discard_oldest { "oldest" } else { "newest" }
                );
            }
        }
        self.notification_queue.push_back(notification);
    }

    /// Drains the pending notifications of this item in arrival order.
    /// Items that are not reporting yield nothing - sampling items keep
    /// queueing for a later mode change.
    pub fn extract_notifications(&mut self) -> Vec<ItemNotification> {
        if self.monitoring_mode != MonitoringMode::Reporting {
            return Vec::new();
        }
        self.queue_overflow = false;
        self.notification_queue.drain(..).collect()
    }

    /// Applies a monitoring mode. Disabling discards anything queued.
    pub fn set_monitoring_mode(&mut self, monitoring_mode: MonitoringMode) {
        if monitoring_mode == MonitoringMode::Disabled {
            self.notification_queue.clear();
            self.queue_overflow = false;
        }
        self.monitoring_mode = monitoring_mode;
    }

    /// Shuts the item down when it is removed or its subscription closes.
    pub fn terminate(&mut self) {
        debug!("Terminating monitored item {}", self.monitored_item_id);
        self.set_monitoring_mode(MonitoringMode::Disabled);
    }

    pub fn monitored_item_id(&self) -> u32 {
        self.monitored_item_id
    }

    pub fn item_to_monitor(&self) -> &ReadValueId {
        &self.item_to_monitor
    }

    pub fn index_range(&self) -> &NumericRange {
        &self.index_range
    }

    pub fn monitoring_mode(&self) -> MonitoringMode {
        self.monitoring_mode
    }

    pub fn client_handle(&self) -> u32 {
        self.client_handle
    }

    pub fn sampling_interval(&self) -> Duration {
        self.sampling_interval
    }

    pub fn filter(&self) -> &MonitoringFilter {
        &self.filter
    }

    pub fn queue_size(&self) -> usize {
        self.queue_size
    }

    pub fn queued_notification_count(&self) -> usize {
        self.notification_queue.len()
    }

    pub fn queue_overflow(&self) -> bool {
        self.queue_overflow
    }

    pub fn timestamps_to_return(&self) -> TimestampsToReturn {
        self.timestamps_to_return
    }
}

/// Validates the requested monitoring filter against the node the item
/// watches, producing the filter result to return to the client.
fn validate_filter(
    address_space: &AddressSpace,
    node: &Node,
    attribute_id: AttributeId,
    filter: &MonitoringFilter,
) -> Result<FilterResult, StatusCode> {
    match filter {
        MonitoringFilter::None => Ok(FilterResult::None),
        // Filters only make sense on the value or the event stream
        _ if attribute_id != AttributeId::Value && attribute_id != AttributeId::EventNotifier => {
            Err(StatusCode::BadFilterNotAllowed)
        }
        MonitoringFilter::Event(event_filter) => {
            if attribute_id != AttributeId::EventNotifier {
                Err(StatusCode::BadFilterNotAllowed)
            } else if !node
                .event_notifier()
                .contains(EventNotifier::SUBSCRIBE_TO_EVENTS)
            {
                // The node does not produce events
                Err(StatusCode::BadFilterNotAllowed)
            } else {
                Ok(FilterResult::Event(EventFilterResult {
                    select_clause_results: vec![
                        StatusCode::Good;
                        event_filter.select_clauses.len()
                    ],
                }))
            }
        }
        MonitoringFilter::DataChange(data_change_filter) => {
            validate_data_change_filter(address_space, node, attribute_id, data_change_filter)
        }
        MonitoringFilter::Aggregate(_) => Ok(FilterResult::Aggregate(Default::default())),
    }
}

fn validate_data_change_filter(
    address_space: &AddressSpace,
    node: &Node,
    attribute_id: AttributeId,
    filter: &DataChangeFilter,
) -> Result<FilterResult, StatusCode> {
    if attribute_id != AttributeId::Value {
        return Err(StatusCode::BadFilterNotAllowed);
    }
    if !node.is_variable() {
        return Err(StatusCode::BadNodeIdInvalid);
    }
    let numeric = node
        .data_type()
        .map(|data_type| address_space.is_numeric_data_type(data_type))
        .unwrap_or(false);
    if !numeric {
        return Err(StatusCode::BadFilterNotAllowed);
    }
    if filter.deadband_type == DeadbandType::Percent
        && !(filter.deadband_value > 0.0 && filter.deadband_value < 100.0)
    {
        return Err(StatusCode::BadDeadbandFilterInvalid);
    }
    // A data change filter has no result structure
    Ok(FilterResult::None)
}

/// Negotiates the sampling interval for an item on the given node. The
/// revised value honours, in order: a negative request adopting the
/// subscription's publishing interval, a zero request adopting the node's
/// own MinimumSamplingInterval attribute (zero meaning exception based is
/// preserved), the server-wide bounds, and finally the node's stated
/// minimum.
fn revise_sampling_interval(
    requested: Duration,
    publishing_interval: Duration,
    node: &Node,
    address_space: &AddressSpace,
) -> Duration {
    let mut sampling_interval = if requested < 0.0 {
        publishing_interval
    } else if requested == 0.0 {
        match address_space.read_attribute(node.node_id(), AttributeId::MinimumSamplingInterval) {
            Some(value) if value.is_good() => value
                .value
                .and_then(|v| v.as_f64())
                .unwrap_or(0.0),
            _ => 0.0,
        }
    } else if requested < constants::MIN_SAMPLING_INTERVAL_MS {
        constants::MIN_SAMPLING_INTERVAL_MS
    } else {
        requested
    };
    if sampling_interval > constants::MAX_SAMPLING_INTERVAL_MS {
        sampling_interval = constants::MAX_SAMPLING_INTERVAL_MS;
    }
    if let Some(node_minimum) = node.minimum_sampling_interval() {
        if sampling_interval < node_minimum {
            sampling_interval = node_minimum;
        }
    }
    sampling_interval
}

/// Queue sizes are raised to at least 1 and capped server-wide.
fn revise_queue_size(requested: u32) -> usize {
    (requested as usize)
        .max(1)
        .min(constants::MAX_NOTIFICATION_QUEUE_SIZE)
}
