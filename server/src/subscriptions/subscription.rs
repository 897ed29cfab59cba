//! The subscription state machine. A subscription owns its monitored
//! items, assembles their pending notifications into sequenced messages
//! once per publish cycle, and answers parked publish requests with either
//! a notification message or a keep alive. Keep alive and lifetime
//! counters decide when an empty message goes out and when the
//! subscription gives up on an absent client.

use std::collections::{BTreeMap, VecDeque};
use std::mem;
use std::sync::Arc;

use uasub_types::status_code::StatusCode;
use uasub_types::{
    Duration, FilterResult, ModifySubscriptionParameters, MonitoredItemCreateRequest,
    MonitoredItemCreateResult, MonitoredItemModifyRequest, MonitoredItemModifyResult,
    MonitoringMode, NodeId, NotificationData, NotificationMessage, SubscriptionAcknowledgement,
    TimestampsToReturn,
};

use crate::{
    address_space::AddressSpace,
    constants,
    diagnostics::SubscriptionDiagnostics,
    events::SubscriptionEvents,
    publish_engine::{PublishEngine, PublishedNotification},
    subscriptions::monitored_item::{ItemNotification, MonitoredItem},
    subscriptions::retransmission::{NotificationRecord, RetransmissionQueue},
    subscriptions::sequence_number::SequenceNumberGenerator,
    DateTimeUtc,
};

/// The state of the subscription
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub enum SubscriptionState {
    /// Terminal state - the timer is stopped and the monitored items gone
    Closed,
    /// Initial state until the publishing timer is started
    Creating,
    Normal,
    /// The subscription had something to say but no publish request was
    /// parked to carry it
    Late,
    /// Transient label for a cycle in which only a keep alive was sent;
    /// behaves like Normal otherwise
    KeepAlive,
}

/// Why the subscription is being ticked.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum TickReason {
    /// The publishing timer fired - a new publish cycle
    TickTimerFired,
    /// A publish request was parked, or one is known to be parked while
    /// notifications are still pending from the previous tick
    ReceivedPublishRequest,
}

/// What a tick did, so the driver can decide whether to tick again
/// promptly instead of waiting out the next publishing interval.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct TickResult {
    /// A notification message or keep alive was handed to the engine
    pub message_sent: bool,
    /// Further notification messages are still pending
    pub more_notifications: bool,
}

#[derive(Clone, Serialize)]
pub struct Subscription {
    /// Subscription id, assigned by the owning session
    pub subscription_id: u32,
    /// Id of the session that owns this subscription
    session_id: NodeId,
    /// Publishing interval in milliseconds
    publishing_interval: Duration,
    /// The lifetime counter bound - cycles without any outbound response
    /// before the subscription terminates itself
    max_lifetime_count: u32,
    /// The keep alive counter bound - empty cycles before an empty message
    /// is sent to show the subscription is alive
    max_keep_alive_count: u32,
    /// Cap on notifications per message, 0 for no cap
    max_notifications_per_publish: u32,
    /// Relative priority of the subscription. When more than one
    /// subscription wants to send notifications the highest priority wins.
    priority: u8,
    /// The parameter that requests publishing to be enabled or disabled
    publishing_enabled: bool,
    /// State of the subscription
    state: SubscriptionState,
    /// Cycles since anything was sent; counts up and is reset by any
    /// outbound response or acknowledgement
    keep_alive_counter: u32,
    /// Cycles since the client showed signs of life; counts up every cycle
    lifetime_counter: u32,
    /// Publish cycles since creation - the logical clock notifications age
    /// against
    publish_interval_count: u64,
    /// Map of monitored items, iterated in id (= insertion) order
    monitored_items: BTreeMap<u32, MonitoredItem>,
    /// The id the next created monitored item receives; never rolled back
    next_monitored_item_id: u32,
    /// Messages assembled but not yet handed to a publish response
    pending_notifications: VecDeque<NotificationRecord>,
    /// Sent messages awaiting acknowledgement
    sent_notifications: RetransmissionQueue,
    sequence_number: SequenceNumberGenerator,
    // Diagnostics counters, bumped by the operations they describe
    modify_count: u32,
    enable_count: u32,
    disable_count: u32,
    republish_request_count: u32,
    notifications_count: u32,
    publish_request_count: u32,
    data_change_notifications_count: u32,
    event_notifications_count: u32,
    /// Observer told about notifications, keep alives and termination
    #[serde(skip)]
    events: Arc<dyn SubscriptionEvents + Send + Sync>,
}

impl Subscription {
    /// Creates the subscription in the `Creating` state with its requested
    /// parameters revised into their permitted ranges. The publishing timer
    /// is started separately.
    pub fn new(
        session_id: NodeId,
        subscription_id: u32,
        publishing_enabled: bool,
        publishing_interval: Duration,
        lifetime_count: u32,
        max_keep_alive_count: u32,
        max_notifications_per_publish: u32,
        priority: u8,
        events: Arc<dyn SubscriptionEvents + Send + Sync>,
    ) -> Subscription {
        let publishing_interval = Self::revise_publishing_interval(publishing_interval);
        let max_keep_alive_count = Self::revise_keep_alive_count(max_keep_alive_count);
        let max_lifetime_count = Self::revise_lifetime_count(lifetime_count, max_keep_alive_count);
        info!(
            "Creating subscription {}, publishing interval {} ms, keep alive {}, lifetime {}",
            subscription_id, publishing_interval, max_keep_alive_count, max_lifetime_count
        );
        Subscription {
            subscription_id,
            session_id,
            publishing_interval,
            max_lifetime_count,
            max_keep_alive_count,
            max_notifications_per_publish,
            priority,
            publishing_enabled,
            state: SubscriptionState::Creating,
            keep_alive_counter: 0,
            lifetime_counter: 0,
            publish_interval_count: 0,
            monitored_items: BTreeMap::new(),
            next_monitored_item_id: 1,
            pending_notifications: VecDeque::new(),
            sent_notifications: RetransmissionQueue::new(constants::MAX_SENT_NOTIFICATIONS),
            sequence_number: SequenceNumberGenerator::new(),
            modify_count: 0,
            enable_count: 0,
            disable_count: 0,
            republish_request_count: 0,
            notifications_count: 0,
            publish_request_count: 0,
            data_change_notifications_count: 0,
            event_notifications_count: 0,
            events,
        }
    }

    /// Marks the publishing timer as running. The keep alive counter is
    /// primed so the client hears something by the end of the first cycle
    /// even if no monitored item produces anything.
    pub fn start_timer(&mut self) {
        if self.state != SubscriptionState::Creating {
            // A second timer on one subscription would corrupt every counter
            panic!(
                "Subscription {} publishing timer started twice",
                self.subscription_id
            );
        }
        self.state = SubscriptionState::Normal;
        self.keep_alive_counter = self.max_keep_alive_count;
        info!(
            "Subscription {} publishing timer started, interval {} ms",
            self.subscription_id, self.publishing_interval
        );
    }

    /// Runs one cycle of the subscription. `TickTimerFired` advances the
    /// logical clock and the lifetime counter; `ReceivedPublishRequest`
    /// gives the subscription a chance to answer a freshly parked request
    /// without waiting for the next cycle. Ticks on a closed subscription
    /// are ignored, so a stale timer callback is harmless.
    pub fn tick(
        &mut self,
        now: &DateTimeUtc,
        tick_reason: TickReason,
        engine: &mut dyn PublishEngine,
    ) -> TickResult {
        match self.state {
            SubscriptionState::Closed => {
                trace!("Tick on closed subscription {} ignored", self.subscription_id);
                return TickResult::default();
            }
            SubscriptionState::Creating => {
                debug!(
                    "Subscription {} ticked before its timer was started",
                    self.subscription_id
                );
                return TickResult::default();
            }
            _ => {}
        }
        engine.on_tick();
        self.events.perform_update();

        if tick_reason == TickReason::TickTimerFired {
            self.publish_interval_count += 1;
            self.lifetime_counter += 1;
        }

        // Assemble messages from whatever the monitored items produced.
        // Assembly burns sequence numbers, so it only runs while a publish
        // request is parked to eventually carry the result.
        self.collect_notification_data(now, &*engine);

        let result = match tick_reason {
            TickReason::TickTimerFired => self.tick_timer_fired(engine),
            TickReason::ReceivedPublishRequest => self.tick_publish_request_received(engine),
        };

        if self.state != SubscriptionState::Closed
            && self.lifetime_counter >= self.max_lifetime_count
        {
            info!(
                "Subscription {} lifetime expired after {} silent cycles",
                self.subscription_id, self.lifetime_counter
            );
            self.events.expired();
            self.close(now);
        }
        result
    }

    /// The publishing interval elapsed - publish, go late, or count towards
    /// the next keep alive.
    fn tick_timer_fired(&mut self, engine: &mut dyn PublishEngine) -> TickResult {
        let notifications_available = !self.pending_notifications.is_empty();
        if notifications_available && self.publishing_enabled {
            if engine.pending_publish_request_count() > 0 {
                self.attempt_to_publish_notification(engine)
            } else {
                debug!(
                    "Subscription {} has notifications but no publish request, going late",
                    self.subscription_id
                );
                self.state = SubscriptionState::Late;
                TickResult::default()
            }
        } else {
            // An empty cycle - publishing disabled or nothing to say
            self.keep_alive_counter = (self.keep_alive_counter + 1).min(self.max_keep_alive_count);
            if self.keep_alive_counter >= self.max_keep_alive_count {
                self.attempt_to_send_keep_alive(engine)
            } else {
                TickResult::default()
            }
        }
    }

    /// A publish request is known to be parked - if there is anything to
    /// say, say it now rather than waiting out the cycle.
    fn tick_publish_request_received(&mut self, engine: &mut dyn PublishEngine) -> TickResult {
        if engine.pending_publish_request_count() == 0 {
            return TickResult::default();
        }
        if self.publishing_enabled && !self.pending_notifications.is_empty() {
            self.attempt_to_publish_notification(engine)
        } else if self.state == SubscriptionState::Late {
            // Answer the request that frees the subscription from lateness
            self.attempt_to_send_keep_alive(engine)
        } else {
            // Nothing to say; the request stays parked for a later cycle
            TickResult::default()
        }
    }

    fn attempt_to_publish_notification(&mut self, engine: &mut dyn PublishEngine) -> TickResult {
        match self.pop_notification_to_send() {
            Some(notification) => {
                let more_notifications = notification.more_notifications;
                debug!(
                    "Subscription {} sending notification message {}",
                    self.subscription_id, notification.message.sequence_number
                );
                engine.send_notification_message(notification);
                self.state = SubscriptionState::Normal;
                TickResult {
                    message_sent: true,
                    more_notifications,
                }
            }
            None => TickResult::default(),
        }
    }

    fn attempt_to_send_keep_alive(&mut self, engine: &mut dyn PublishEngine) -> TickResult {
        let future_sequence_number = self.sequence_number.future();
        if engine.send_keep_alive_response(self.subscription_id, future_sequence_number) {
            debug!(
                "Subscription {} sent a keep alive announcing sequence number {}",
                self.subscription_id, future_sequence_number
            );
            self.publish_request_count += 1;
            self.reset_keep_alive_counter();
            self.reset_lifetime_counter();
            self.state = SubscriptionState::KeepAlive;
            self.events.keep_alive(future_sequence_number);
            TickResult {
                message_sent: true,
                more_notifications: false,
            }
        } else {
            // No publish request was parked for the keep alive either
            debug!(
                "Subscription {} due a keep alive but no publish request, going late",
                self.subscription_id
            );
            self.state = SubscriptionState::Late;
            TickResult::default()
        }
    }

    /// Drains every monitored item and assembles the results into sequenced
    /// messages on the pending queue, chunked to the per publish cap.
    fn collect_notification_data(&mut self, now: &DateTimeUtc, engine: &dyn PublishEngine) {
        if engine.pending_publish_request_count() == 0 {
            return;
        }
        let mut notifications: Vec<ItemNotification> = Vec::new();
        for monitored_item in self.monitored_items.values_mut() {
            notifications.extend(monitored_item.extract_notifications());
        }
        if notifications.is_empty() {
            return;
        }
        trace!(
            "Subscription {} collected {} notifications",
            self.subscription_id,
            notifications.len()
        );
        let chunk_size = if self.max_notifications_per_publish == 0 {
            notifications.len()
        } else {
            self.max_notifications_per_publish as usize
        };
        while !notifications.is_empty() {
            let rest = notifications.split_off(chunk_size.min(notifications.len()));
            let chunk = mem::replace(&mut notifications, rest);
            let mut data_changes = Vec::new();
            let mut events = Vec::new();
            for notification in chunk {
                match notification {
                    ItemNotification::DataChange(data_change) => data_changes.push(data_change),
                    ItemNotification::Event(event) => events.push(event),
                }
            }
            let message =
                NotificationMessage::new(self.sequence_number.next(), *now, data_changes, events);
            debug!(
                "Subscription {} assembled notification message {}",
                self.subscription_id, message.sequence_number
            );
            self.pending_notifications
                .push_back(NotificationRecord::new(message, self.publish_interval_count));
        }
        if self.publishing_enabled {
            self.events.notification();
        }
    }

    /// Takes the oldest pending message for publication. The message moves
    /// to the retransmission queue until acknowledged, and sending counts
    /// as client activity so both counters reset.
    pub fn pop_notification_to_send(&mut self) -> Option<PublishedNotification> {
        let record = self.pending_notifications.pop_front()?;
        let message = record.message().clone();
        // Each inner entry counts independently; a message can carry one
        // data change and one event list
        for notification_data in &message.notification_data {
            match notification_data {
                NotificationData::DataChange(_) => self.data_change_notifications_count += 1,
                NotificationData::Events(_) => self.event_notifications_count += 1,
                NotificationData::StatusChange(_) => {}
            }
        }
        self.notifications_count += 1;
        self.publish_request_count += 1;
        if let Some(evicted) = self.sent_notifications.append(record) {
            debug!(
                "Subscription {} retransmission queue overflowed, dropped {} message {}",
                self.subscription_id,
                if evicted.is_aged(self.publish_interval_count, self.max_keep_alive_count) {
                    "aged"
                } else {
                    "unacknowledged"
                },
                evicted.sequence_number()
            );
        }
        self.reset_lifetime_counter();
        self.reset_keep_alive_counter();
        let more_notifications = !self.pending_notifications.is_empty();
        Some(PublishedNotification {
            subscription_id: self.subscription_id,
            available_sequence_numbers: self.available_sequence_numbers(),
            more_notifications,
            message,
        })
    }

    /// Acknowledges a previously published message, dropping it from the
    /// retransmission queue.
    pub fn acknowledge_notification(&mut self, sequence_number: u32) -> StatusCode {
        let status_code = self.sent_notifications.ack(sequence_number);
        if status_code.is_good() {
            trace!(
                "Subscription {} acknowledged sequence number {}",
                self.subscription_id,
                sequence_number
            );
            self.reset_lifetime_counter();
            self.reset_keep_alive_counter();
        }
        status_code
    }

    /// Applies the acknowledgements of a publish request that name this
    /// subscription.
    pub fn acknowledge_notifications(
        &mut self,
        acknowledgements: &[SubscriptionAcknowledgement],
    ) -> Vec<StatusCode> {
        acknowledgements
            .iter()
            .map(|acknowledgement| {
                if acknowledgement.subscription_id != self.subscription_id {
                    StatusCode::BadSubscriptionIdInvalid
                } else {
                    self.acknowledge_notification(acknowledgement.sequence_number)
                }
            })
            .collect()
    }

    /// Fetches a sent message for replay. A hit counts as client activity.
    pub fn republish(&mut self, sequence_number: u32) -> Option<NotificationMessage> {
        self.republish_request_count += 1;
        let message = self
            .sent_notifications
            .find(sequence_number)
            .map(|record| record.message().clone());
        if message.is_some() {
            debug!(
                "Subscription {} republishing sequence number {}",
                self.subscription_id, sequence_number
            );
            self.reset_lifetime_counter();
            self.reset_keep_alive_counter();
        }
        message
    }

    /// The sequence numbers a client may still acknowledge or republish -
    /// the unacknowledged sent messages followed by the pending ones.
    pub fn available_sequence_numbers(&self) -> Vec<u32> {
        let mut sequence_numbers = self.sent_notifications.sequence_numbers();
        sequence_numbers.extend(
            self.pending_notifications
                .iter()
                .map(|record| record.sequence_number()),
        );
        sequence_numbers
    }

    /// Applies a ModifySubscription request. Both counters reset, and the
    /// publishing timer re-arms from the revised interval on its next turn.
    pub fn modify(&mut self, params: &ModifySubscriptionParameters) {
        self.publishing_interval = Self::revise_publishing_interval(params.publishing_interval);
        self.max_keep_alive_count = Self::revise_keep_alive_count(params.max_keep_alive_count);
        self.max_lifetime_count =
            Self::revise_lifetime_count(params.lifetime_count, self.max_keep_alive_count);
        self.max_notifications_per_publish = params.max_notifications_per_publish;
        self.priority = params.priority;
        self.reset_lifetime_counter();
        self.reset_keep_alive_counter();
        self.modify_count += 1;
        info!(
            "Modified subscription {}, publishing interval {} ms, keep alive {}, lifetime {}",
            self.subscription_id,
            self.publishing_interval,
            self.max_keep_alive_count,
            self.max_lifetime_count
        );
    }

    pub fn set_publishing_mode(&mut self, publishing_enabled: bool) -> StatusCode {
        self.publishing_enabled = publishing_enabled;
        if publishing_enabled {
            self.enable_count += 1;
        } else {
            self.disable_count += 1;
        }
        debug!(
            "Subscription {} publishing mode set to {}",
            self.subscription_id, publishing_enabled
        );
        StatusCode::Good
    }

    /// Closes the subscription. Safe to call repeatedly or on an already
    /// expired subscription.
    pub fn terminate(&mut self, now: &DateTimeUtc) {
        if self.state == SubscriptionState::Closed {
            return;
        }
        info!("Terminating subscription {}", self.subscription_id);
        self.close(now);
    }

    /// Common to expiry and explicit termination: queue the terminal status
    /// change, terminate the monitored items and go closed. The status
    /// change is best effort - if no publish request ever collects it, it
    /// dies with the subscription.
    fn close(&mut self, now: &DateTimeUtc) {
        let message = NotificationMessage::status_change(
            self.sequence_number.next(),
            *now,
            StatusCode::BadTimeout,
        );
        self.pending_notifications
            .push_back(NotificationRecord::new(message, self.publish_interval_count));
        for monitored_item in self.monitored_items.values_mut() {
            monitored_item.terminate();
        }
        self.monitored_items.clear();
        self.state = SubscriptionState::Closed;
        info!("Subscription {} closed", self.subscription_id);
        self.events.terminated();
    }

    /// Creates monitored items on the subscription, returning one result
    /// per request.
    pub fn create_monitored_items(
        &mut self,
        address_space: &AddressSpace,
        timestamps_to_return: TimestampsToReturn,
        items_to_create: &[MonitoredItemCreateRequest],
    ) -> Vec<MonitoredItemCreateResult> {
        items_to_create
            .iter()
            .map(|request| self.create_monitored_item(address_space, timestamps_to_return, request))
            .collect()
    }

    /// Creates a single monitored item. On success the item is registered,
    /// announced to the observer, and only then switched to its requested
    /// monitoring mode.
    pub fn create_monitored_item(
        &mut self,
        address_space: &AddressSpace,
        timestamps_to_return: TimestampsToReturn,
        request: &MonitoredItemCreateRequest,
    ) -> MonitoredItemCreateResult {
        self.reset_lifetime_counter();
        if self.monitored_items.len() >= constants::MAX_MONITORED_ITEMS_PER_SUB {
            warn!(
                "Subscription {} is at its monitored item limit",
                self.subscription_id
            );
            return MonitoredItemCreateResult {
                status_code: StatusCode::BadTooManyMonitoredItems,
                monitored_item_id: 0,
                revised_sampling_interval: 0.0,
                revised_queue_size: 0,
                filter_result: FilterResult::None,
            };
        }
        let monitored_item_id = self.next_monitored_item_id;
        match MonitoredItem::validate_and_new(
            address_space,
            timestamps_to_return,
            self.publishing_interval,
            monitored_item_id,
            request,
        ) {
            Ok((monitored_item, filter_result)) => {
                self.next_monitored_item_id += 1;
                let revised_sampling_interval = monitored_item.sampling_interval();
                let revised_queue_size = monitored_item.queue_size() as u32;
                self.monitored_items.insert(monitored_item_id, monitored_item);
                if let Some(monitored_item) = self.monitored_items.get(&monitored_item_id) {
                    self.events
                        .monitored_item_created(monitored_item, &request.item_to_monitor);
                }
                if let Some(monitored_item) = self.monitored_items.get_mut(&monitored_item_id) {
                    monitored_item.set_monitoring_mode(request.monitoring_mode);
                }
                MonitoredItemCreateResult {
                    status_code: StatusCode::Good,
                    monitored_item_id,
                    revised_sampling_interval,
                    revised_queue_size,
                    filter_result,
                }
            }
            Err(status_code) => MonitoredItemCreateResult {
                status_code,
                monitored_item_id: 0,
                revised_sampling_interval: 0.0,
                revised_queue_size: 0,
                filter_result: FilterResult::None,
            },
        }
    }

    /// Modifies monitored items by id, returning one result per request.
    pub fn modify_monitored_items(
        &mut self,
        address_space: &AddressSpace,
        items_to_modify: &[MonitoredItemModifyRequest],
    ) -> Vec<MonitoredItemModifyResult> {
        self.reset_lifetime_counter();
        let publishing_interval = self.publishing_interval;
        items_to_modify
            .iter()
            .map(
                |request| match self.monitored_items.get_mut(&request.monitored_item_id) {
                    Some(monitored_item) => {
                        match monitored_item.modify(address_space, publishing_interval, request) {
                            Ok(filter_result) => MonitoredItemModifyResult {
                                status_code: StatusCode::Good,
                                revised_sampling_interval: monitored_item.sampling_interval(),
                                revised_queue_size: monitored_item.queue_size() as u32,
                                filter_result,
                            },
                            Err(status_code) => MonitoredItemModifyResult {
                                status_code,
                                revised_sampling_interval: 0.0,
                                revised_queue_size: 0,
                                filter_result: FilterResult::None,
                            },
                        }
                    }
                    None => MonitoredItemModifyResult {
                        status_code: StatusCode::BadMonitoredItemIdInvalid,
                        revised_sampling_interval: 0.0,
                        revised_queue_size: 0,
                        filter_result: FilterResult::None,
                    },
                },
            )
            .collect()
    }

    /// Terminates and removes a monitored item. The id is not reused.
    pub fn remove_monitored_item(&mut self, monitored_item_id: u32) -> StatusCode {
        self.reset_lifetime_counter();
        match self.monitored_items.remove(&monitored_item_id) {
            Some(mut monitored_item) => {
                monitored_item.terminate();
                StatusCode::Good
            }
            None => StatusCode::BadMonitoredItemIdInvalid,
        }
    }

    /// Removes monitored items by id, returning a status code for each.
    pub fn delete_monitored_items(&mut self, items_to_delete: &[u32]) -> Vec<StatusCode> {
        items_to_delete
            .iter()
            .map(|monitored_item_id| self.remove_monitored_item(*monitored_item_id))
            .collect()
    }

    /// Applies a monitoring mode to items by id, returning a status code
    /// for each.
    pub fn set_monitoring_mode(
        &mut self,
        monitoring_mode: MonitoringMode,
        items: &[u32],
    ) -> Vec<StatusCode> {
        self.reset_lifetime_counter();
        items
            .iter()
            .map(
                |monitored_item_id| match self.monitored_items.get_mut(monitored_item_id) {
                    Some(monitored_item) => {
                        monitored_item.set_monitoring_mode(monitoring_mode);
                        StatusCode::Good
                    }
                    None => StatusCode::BadMonitoredItemIdInvalid,
                },
            )
            .collect()
    }

    /// Parallel arrays of the client handles and server handles (the
    /// monitored item ids) of every item, as the GetMonitoredItems method
    /// returns them.
    pub fn get_monitored_items(&self) -> (Vec<u32>, Vec<u32>) {
        let client_handles = self
            .monitored_items
            .values()
            .map(|monitored_item| monitored_item.client_handle())
            .collect();
        let server_handles = self.monitored_items.keys().cloned().collect();
        (client_handles, server_handles)
    }

    pub fn monitored_item(&self, monitored_item_id: u32) -> Option<&MonitoredItem> {
        self.monitored_items.get(&monitored_item_id)
    }

    /// Mutable access for the code that feeds values and events into items.
    pub fn monitored_item_mut(&mut self, monitored_item_id: u32) -> Option<&mut MonitoredItem> {
        self.monitored_items.get_mut(&monitored_item_id)
    }

    /// A point-in-time snapshot of the subscription's diagnostics.
    pub fn diagnostics(&self) -> SubscriptionDiagnostics {
        SubscriptionDiagnostics {
            session_id: self.session_id.clone(),
            subscription_id: self.subscription_id,
            priority: self.priority,
            publishing_interval: self.publishing_interval,
            max_lifetime_count: self.max_lifetime_count,
            max_keep_alive_count: self.max_keep_alive_count,
            max_notifications_per_publish: self.max_notifications_per_publish,
            publishing_enabled: self.publishing_enabled,
            monitored_item_count: self.monitored_items.len() as u32,
            disabled_monitored_item_count: self
                .monitored_items
                .values()
                .filter(|monitored_item| {
                    monitored_item.monitoring_mode() == MonitoringMode::Disabled
                })
                .count() as u32,
            next_sequence_number: self.sequence_number.future(),
            modify_count: self.modify_count,
            enable_count: self.enable_count,
            disable_count: self.disable_count,
            republish_request_count: self.republish_request_count,
            notifications_count: self.notifications_count,
            publish_request_count: self.publish_request_count,
            data_change_notifications_count: self.data_change_notifications_count,
            event_notifications_count: self.event_notifications_count,
        }
    }

    /// Reset the keep alive counter because a response went out.
    pub fn reset_keep_alive_counter(&mut self) {
        self.keep_alive_counter = 0;
    }

    /// Reset the lifetime counter because the client showed signs of life.
    pub fn reset_lifetime_counter(&mut self) {
        self.lifetime_counter = 0;
    }

    /// Milliseconds until the subscription expires if the client stays
    /// silent.
    pub fn time_to_expiration(&self) -> Duration {
        f64::from(self.max_lifetime_count.saturating_sub(self.lifetime_counter))
            * self.publishing_interval
    }

    pub fn state(&self) -> SubscriptionState {
        self.state
    }

    pub fn session_id(&self) -> &NodeId {
        &self.session_id
    }

    pub fn publishing_interval(&self) -> Duration {
        self.publishing_interval
    }

    pub fn max_keep_alive_count(&self) -> u32 {
        self.max_keep_alive_count
    }

    pub fn max_lifetime_count(&self) -> u32 {
        self.max_lifetime_count
    }

    pub fn max_notifications_per_publish(&self) -> u32 {
        self.max_notifications_per_publish
    }

    pub fn priority(&self) -> u8 {
        self.priority
    }

    pub fn publishing_enabled(&self) -> bool {
        self.publishing_enabled
    }

    pub fn keep_alive_counter(&self) -> u32 {
        self.keep_alive_counter
    }

    pub fn lifetime_counter(&self) -> u32 {
        self.lifetime_counter
    }

    pub fn publish_interval_count(&self) -> u64 {
        self.publish_interval_count
    }

    pub fn monitored_item_count(&self) -> usize {
        self.monitored_items.len()
    }

    pub fn pending_notification_count(&self) -> usize {
        self.pending_notifications.len()
    }

    pub fn sent_notification_count(&self) -> usize {
        self.sent_notifications.len()
    }

    fn revise_publishing_interval(requested: Duration) -> Duration {
        if requested.is_nan() || requested < constants::MIN_PUBLISHING_INTERVAL_MS {
            constants::MIN_PUBLISHING_INTERVAL_MS
        } else if requested > constants::MAX_PUBLISHING_INTERVAL_MS {
            constants::MAX_PUBLISHING_INTERVAL_MS
        } else {
            requested
        }
    }

    fn revise_keep_alive_count(requested: u32) -> u32 {
        requested
            .max(constants::MIN_KEEP_ALIVE_COUNT)
            .min(constants::MAX_KEEP_ALIVE_COUNT)
    }

    /// The lifetime count must give the client at least a few keep alives
    /// worth of cycles to show up.
    fn revise_lifetime_count(requested: u32, max_keep_alive_count: u32) -> u32 {
        requested.max(constants::LIFETIME_COUNT_FACTOR * max_keep_alive_count)
    }
}
