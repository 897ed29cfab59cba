//! Test harness shared by the subscription engine tests - a recording
//! publish engine double, a recording observer, and builders for the
//! address space and subscriptions the tests run against.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::prelude::*;

mod monitored_item;

/// Publish engine double. Parks a configurable number of publish requests
/// and records everything the subscription sends through it.
pub struct TestEngine {
    pub pending_publish_requests: usize,
    pub sent_notifications: Vec<PublishedNotification>,
    /// (subscription id, announced future sequence number) per keep alive
    pub keep_alives: Vec<(u32, u32)>,
    pub ticks: usize,
}

impl TestEngine {
    pub fn new(pending_publish_requests: usize) -> TestEngine {
        TestEngine {
            pending_publish_requests,
            sent_notifications: Vec::new(),
            keep_alives: Vec::new(),
            ticks: 0,
        }
    }

    pub fn park_publish_request(&mut self) {
        self.pending_publish_requests += 1;
    }
}

impl PublishEngine for TestEngine {
    fn pending_publish_request_count(&self) -> usize {
        self.pending_publish_requests
    }

    fn send_notification_message(&mut self, notification: PublishedNotification) {
        assert!(
            self.pending_publish_requests > 0,
            "a notification was sent with no publish request parked"
        );
        self.pending_publish_requests -= 1;
        self.sent_notifications.push(notification);
    }

    fn send_keep_alive_response(
        &mut self,
        subscription_id: u32,
        future_sequence_number: u32,
    ) -> bool {
        if self.pending_publish_requests == 0 {
            return false;
        }
        self.pending_publish_requests -= 1;
        self.keep_alives.push((subscription_id, future_sequence_number));
        true
    }

    fn on_tick(&mut self) {
        self.ticks += 1;
    }
}

/// Observer double counting every event a subscription raises.
#[derive(Default)]
pub struct RecordingEvents {
    pub notifications: AtomicUsize,
    pub updates: AtomicUsize,
    pub keep_alives: Mutex<Vec<u32>>,
    pub expirations: AtomicUsize,
    pub terminations: AtomicUsize,
    pub created_items: Mutex<Vec<u32>>,
}

impl SubscriptionEvents for RecordingEvents {
    fn notification(&self) {
        self.notifications.fetch_add(1, Ordering::SeqCst);
    }

    fn perform_update(&self) {
        self.updates.fetch_add(1, Ordering::SeqCst);
    }

    fn keep_alive(&self, future_sequence_number: u32) {
        self.keep_alives.lock().unwrap().push(future_sequence_number);
    }

    fn expired(&self) {
        self.expirations.fetch_add(1, Ordering::SeqCst);
    }

    fn terminated(&self) {
        self.terminations.fetch_add(1, Ordering::SeqCst);
    }

    fn monitored_item_created(&self, monitored_item: &MonitoredItem, _item_to_monitor: &ReadValueId) {
        self.created_items
            .lock()
            .unwrap()
            .push(monitored_item.monitored_item_id());
    }
}

#[derive(Default)]
pub struct TestRegistry {
    pub registered: Mutex<Vec<u32>>,
    pub unregistered: Mutex<Vec<u32>>,
}

impl SubscriptionRegistry for TestRegistry {
    fn register(&self, subscription_id: u32) {
        self.registered.lock().unwrap().push(subscription_id);
    }

    fn unregister(&self, subscription_id: u32) {
        self.unregistered.lock().unwrap().push(subscription_id);
    }
}

pub fn now() -> DateTimeUtc {
    chrono::Utc::now()
}

/// An address space holding the nodes the tests monitor - numeric and non
/// numeric variables, a variable with its own minimum sampling interval,
/// and objects with and without an event stream.
pub fn test_address_space() -> AddressSpace {
    let mut address_space = AddressSpace::new();
    address_space.add_variable(&NodeId::new(1, "v1"), "v1", DataTypeId::Double.into(), None);
    address_space.add_variable(&NodeId::new(1, "v2"), "v2", DataTypeId::Int32.into(), None);
    address_space.add_variable(&NodeId::new(1, "flag"), "flag", DataTypeId::Boolean.into(), None);
    address_space.add_variable(
        &NodeId::new(1, "slow"),
        "slow",
        DataTypeId::Double.into(),
        Some(500.0),
    );
    address_space.add_object(
        &NodeId::new(1, "machine"),
        "machine",
        EventNotifier::SUBSCRIBE_TO_EVENTS,
    );
    address_space.add_object(&NodeId::new(1, "silent"), "silent", EventNotifier::empty());
    address_space
}

/// A subscription with a 1 second publishing interval, keep alive count 3
/// and lifetime count 30, in the `Creating` state.
pub fn make_subscription(
    publishing_enabled: bool,
    events: Arc<dyn SubscriptionEvents + Send + Sync>,
) -> Subscription {
    Subscription::new(
        NodeId::new(1, 1000u32),
        1,
        publishing_enabled,
        1000.0,
        30,
        3,
        0,
        0,
        events,
    )
}

/// Same as [`make_subscription`] but with the publishing timer started.
pub fn started_subscription(
    publishing_enabled: bool,
    events: Arc<dyn SubscriptionEvents + Send + Sync>,
) -> Subscription {
    let mut subscription = make_subscription(publishing_enabled, events);
    subscription.start_timer();
    subscription
}

pub fn make_create_request(node_id: NodeId, client_handle: u32) -> MonitoredItemCreateRequest {
    MonitoredItemCreateRequest {
        item_to_monitor: ReadValueId::value_of(node_id),
        monitoring_mode: MonitoringMode::Reporting,
        requested_parameters: MonitoringParameters {
            client_handle,
            ..Default::default()
        },
    }
}

/// Creates a reporting monitored item on `v1` and returns its id.
pub fn add_monitored_item(subscription: &mut Subscription, address_space: &AddressSpace) -> u32 {
    let result = subscription.create_monitored_item(
        address_space,
        TimestampsToReturn::Both,
        &make_create_request(NodeId::new(1, "v1"), 10),
    );
    assert!(result.status_code.is_good());
    result.monitored_item_id
}

pub fn data_change(client_handle: u32, value: i32) -> MonitoredItemNotification {
    MonitoredItemNotification {
        client_handle,
        value: DataValue::new(value, now()),
    }
}

pub fn event_fields(client_handle: u32) -> EventFieldList {
    EventFieldList {
        client_handle,
        event_fields: vec![Variant::from("alarm")],
    }
}
