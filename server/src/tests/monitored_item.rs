use std::sync::atomic::Ordering;
use std::sync::Arc;

use super::*;

// Monitored item creation, validation and queueing tests

fn create(
    subscription: &mut Subscription,
    address_space: &AddressSpace,
    request: MonitoredItemCreateRequest,
) -> MonitoredItemCreateResult {
    subscription.create_monitored_item(address_space, TimestampsToReturn::Both, &request)
}

fn value_request(node_id: NodeId) -> MonitoredItemCreateRequest {
    make_create_request(node_id, 10)
}

fn harness() -> (Subscription, AddressSpace) {
    let events = Arc::new(RecordingEvents::default());
    (started_subscription(true, events), test_address_space())
}

#[test]
fn unknown_node_id() {
    let (mut subscription, address_space) = harness();
    let result = create(
        &mut subscription,
        &address_space,
        value_request(NodeId::new(1, "no such node")),
    );
    assert_eq!(result.status_code, StatusCode::BadNodeIdUnknown);
    assert_eq!(result.monitored_item_id, 0);
    assert_eq!(subscription.monitored_item_count(), 0);
}

#[test]
fn value_attribute_on_non_variable() {
    let (mut subscription, address_space) = harness();
    let result = create(
        &mut subscription,
        &address_space,
        value_request(NodeId::new(1, "machine")),
    );
    assert_eq!(result.status_code, StatusCode::BadAttributeIdInvalid);
}

#[test]
fn unknown_attribute_id() {
    let (mut subscription, address_space) = harness();
    let mut request = value_request(NodeId::new(1, "v1"));
    request.item_to_monitor.attribute_id = 99;
    let result = create(&mut subscription, &address_space, request);
    assert_eq!(result.status_code, StatusCode::BadAttributeIdInvalid);
}

#[test]
fn malformed_index_range() {
    let (mut subscription, address_space) = harness();
    let mut request = value_request(NodeId::new(1, "v1"));
    request.item_to_monitor.index_range = "3:1".to_string();
    let result = create(&mut subscription, &address_space, request);
    assert_eq!(result.status_code, StatusCode::BadIndexRangeInvalid);
}

#[test]
fn data_encoding_on_non_value_attribute() {
    let (mut subscription, address_space) = harness();
    let mut request = value_request(NodeId::new(1, "v1"));
    request.item_to_monitor.attribute_id = AttributeId::BrowseName as u32;
    request.item_to_monitor.data_encoding = QualifiedName::new(0, "DefaultBinary");
    let result = create(&mut subscription, &address_space, request);
    assert_eq!(result.status_code, StatusCode::BadDataEncodingInvalid);
}

#[test]
fn unsupported_data_encoding() {
    let (mut subscription, address_space) = harness();
    let mut request = value_request(NodeId::new(1, "v1"));
    request.item_to_monitor.data_encoding = QualifiedName::new(0, "Compressed");
    let result = create(&mut subscription, &address_space, request);
    assert_eq!(result.status_code, StatusCode::BadDataEncodingUnsupported);
}

#[test]
fn recognised_data_encoding_is_accepted() {
    let (mut subscription, address_space) = harness();
    let mut request = value_request(NodeId::new(1, "v1"));
    request.item_to_monitor.data_encoding = QualifiedName::new(0, "DefaultBinary");
    let result = create(&mut subscription, &address_space, request);
    assert!(result.status_code.is_good());
}

#[test]
fn event_filter_needs_event_notifier_attribute() {
    let (mut subscription, address_space) = harness();
    let mut request = value_request(NodeId::new(1, "v1"));
    request.requested_parameters.filter = MonitoringFilter::Event(EventFilter {
        select_clauses: vec![],
    });
    let result = create(&mut subscription, &address_space, request);
    assert_eq!(result.status_code, StatusCode::BadFilterNotAllowed);
}

#[test]
fn event_filter_needs_an_event_producing_node() {
    let (mut subscription, address_space) = harness();
    let mut request = value_request(NodeId::new(1, "silent"));
    request.item_to_monitor.attribute_id = AttributeId::EventNotifier as u32;
    request.requested_parameters.filter = MonitoringFilter::Event(EventFilter {
        select_clauses: vec![],
    });
    let result = create(&mut subscription, &address_space, request);
    assert_eq!(result.status_code, StatusCode::BadFilterNotAllowed);
}

#[test]
fn event_filter_result_has_per_clause_diagnostics() {
    let (mut subscription, address_space) = harness();
    let mut request = value_request(NodeId::new(1, "machine"));
    request.item_to_monitor.attribute_id = AttributeId::EventNotifier as u32;
    request.requested_parameters.filter = MonitoringFilter::Event(EventFilter {
        select_clauses: vec![
            SelectClause {
                type_definition_id: NodeId::new(0, 2041u32),
                browse_path: vec![QualifiedName::new(0, "Message")],
            },
            SelectClause {
                type_definition_id: NodeId::new(0, 2041u32),
                browse_path: vec![QualifiedName::new(0, "Severity")],
            },
        ],
    });
    let result = create(&mut subscription, &address_space, request);
    assert!(result.status_code.is_good());
    match result.filter_result {
        FilterResult::Event(event_filter_result) => {
            assert_eq!(
                event_filter_result.select_clause_results,
                vec![StatusCode::Good, StatusCode::Good]
            );
        }
        other => panic!("expected an event filter result, got {:?}", other),
    }
}

#[test]
fn filter_on_plain_attribute_not_allowed() {
    let (mut subscription, address_space) = harness();
    let mut request = value_request(NodeId::new(1, "v1"));
    request.item_to_monitor.attribute_id = AttributeId::BrowseName as u32;
    request.requested_parameters.filter = MonitoringFilter::DataChange(DataChangeFilter {
        trigger: DataChangeTrigger::StatusValue,
        deadband_type: DeadbandType::None,
        deadband_value: 0.0,
    });
    let result = create(&mut subscription, &address_space, request);
    assert_eq!(result.status_code, StatusCode::BadFilterNotAllowed);
}

#[test]
fn data_change_filter_needs_a_numeric_variable() {
    let (mut subscription, address_space) = harness();
    let mut request = value_request(NodeId::new(1, "flag"));
    request.requested_parameters.filter = MonitoringFilter::DataChange(DataChangeFilter {
        trigger: DataChangeTrigger::StatusValue,
        deadband_type: DeadbandType::None,
        deadband_value: 0.0,
    });
    let result = create(&mut subscription, &address_space, request);
    assert_eq!(result.status_code, StatusCode::BadFilterNotAllowed);
}

#[test]
fn percent_deadband_bounds() {
    let (mut subscription, address_space) = harness();
    for (deadband_value, expected) in &[
        (0.0, StatusCode::BadDeadbandFilterInvalid),
        (100.0, StatusCode::BadDeadbandFilterInvalid),
        (-5.0, StatusCode::BadDeadbandFilterInvalid),
        (50.0, StatusCode::Good),
    ] {
        let mut request = value_request(NodeId::new(1, "v1"));
        request.requested_parameters.filter = MonitoringFilter::DataChange(DataChangeFilter {
            trigger: DataChangeTrigger::StatusValue,
            deadband_type: DeadbandType::Percent,
            deadband_value: *deadband_value,
        });
        let result = create(&mut subscription, &address_space, request);
        assert_eq!(
            result.status_code, *expected,
            "deadband value {}",
            deadband_value
        );
        if expected.is_good() {
            // A data change filter produces no result structure
            assert_eq!(result.filter_result, FilterResult::None);
        }
    }
}

#[test]
fn aggregate_filter_returns_empty_result() {
    let (mut subscription, address_space) = harness();
    let mut request = value_request(NodeId::new(1, "v1"));
    request.requested_parameters.filter = MonitoringFilter::Aggregate(AggregateFilter {
        start_time: now(),
        aggregate_type: NodeId::new(0, 2341u32),
        processing_interval: 1000.0,
    });
    let result = create(&mut subscription, &address_space, request);
    assert!(result.status_code.is_good());
    assert_eq!(
        result.filter_result,
        FilterResult::Aggregate(AggregateFilterResult::default())
    );
}

#[test]
fn sampling_interval_negotiation() {
    let (mut subscription, address_space) = harness();

    // Negative adopts the publishing interval
    let mut request = value_request(NodeId::new(1, "v1"));
    request.requested_parameters.sampling_interval = -1.0;
    let result = create(&mut subscription, &address_space, request);
    assert_eq!(result.revised_sampling_interval, 1000.0);

    // Zero adopts the node's own minimum sampling interval
    let mut request = value_request(NodeId::new(1, "slow"));
    request.requested_parameters.sampling_interval = 0.0;
    let result = create(&mut subscription, &address_space, request);
    assert_eq!(result.revised_sampling_interval, 500.0);

    // Zero on a node with no stated minimum stays exception based
    let mut request = value_request(NodeId::new(1, "v1"));
    request.requested_parameters.sampling_interval = 0.0;
    let result = create(&mut subscription, &address_space, request);
    assert_eq!(result.revised_sampling_interval, 0.0);

    // Small positive values are raised to the server minimum
    let mut request = value_request(NodeId::new(1, "v1"));
    request.requested_parameters.sampling_interval = 10.0;
    let result = create(&mut subscription, &address_space, request);
    assert_eq!(result.revised_sampling_interval, 50.0);

    // Huge values are capped
    let mut request = value_request(NodeId::new(1, "v1"));
    request.requested_parameters.sampling_interval = 10_000_000.0;
    let result = create(&mut subscription, &address_space, request);
    assert_eq!(result.revised_sampling_interval, 3_600_000.0);

    // The node's stated minimum wins over a faster request
    let mut request = value_request(NodeId::new(1, "slow"));
    request.requested_parameters.sampling_interval = 100.0;
    let result = create(&mut subscription, &address_space, request);
    assert_eq!(result.revised_sampling_interval, 500.0);
}

#[test]
fn queue_size_revision() {
    let (mut subscription, address_space) = harness();

    let mut request = value_request(NodeId::new(1, "v1"));
    request.requested_parameters.queue_size = 0;
    let result = create(&mut subscription, &address_space, request);
    assert_eq!(result.revised_queue_size, 1);

    let mut request = value_request(NodeId::new(1, "v1"));
    request.requested_parameters.queue_size = 100_000;
    let result = create(&mut subscription, &address_space, request);
    assert_eq!(result.revised_queue_size, 1_000);
}

#[test]
fn queue_overflow_discards_by_policy() {
    let (mut subscription, address_space) = harness();
    let mut request = value_request(NodeId::new(1, "v1"));
    request.requested_parameters.queue_size = 2;
    let result = create(&mut subscription, &address_space, request);
    let monitored_item_id = result.monitored_item_id;

    {
        let monitored_item = subscription.monitored_item_mut(monitored_item_id).unwrap();
        for value in 1..=3 {
            monitored_item.enqueue_data_change(data_change(10, value));
        }
        assert_eq!(monitored_item.queued_notification_count(), 2);
        assert!(monitored_item.queue_overflow());
        // Oldest discarded - values 2 and 3 remain
        let notifications = monitored_item.extract_notifications();
        match &notifications[0] {
            ItemNotification::DataChange(data_change) => {
                assert_eq!(data_change.value.value, Some(Variant::Int32(2)))
            }
            other => panic!("expected a data change, got {:?}", other),
        }
        assert!(!monitored_item.queue_overflow());
    }

    // discard_oldest = false keeps the head and drops the newest
    let mut request = value_request(NodeId::new(1, "v1"));
    request.requested_parameters.queue_size = 2;
    request.requested_parameters.discard_oldest = false;
    let result = create(&mut subscription, &address_space, request);
    let monitored_item = subscription
        .monitored_item_mut(result.monitored_item_id)
        .unwrap();
    for value in 1..=3 {
        monitored_item.enqueue_data_change(data_change(10, value));
    }
    let notifications = monitored_item.extract_notifications();
    assert_eq!(notifications.len(), 2);
    match &notifications[1] {
        ItemNotification::DataChange(data_change) => {
            assert_eq!(data_change.value.value, Some(Variant::Int32(3)))
        }
        other => panic!("expected a data change, got {:?}", other),
    }
}

#[test]
fn monitoring_mode_controls_queueing_and_extraction() {
    let (mut subscription, address_space) = harness();
    let monitored_item_id = add_monitored_item(&mut subscription, &address_space);
    let monitored_item = subscription.monitored_item_mut(monitored_item_id).unwrap();

    // Sampling queues but does not report
    monitored_item.set_monitoring_mode(MonitoringMode::Sampling);
    monitored_item.enqueue_data_change(data_change(10, 1));
    assert!(monitored_item.extract_notifications().is_empty());
    assert_eq!(monitored_item.queued_notification_count(), 1);

    // Back to reporting, the queued notification surfaces
    monitored_item.set_monitoring_mode(MonitoringMode::Reporting);
    assert_eq!(monitored_item.extract_notifications().len(), 1);

    // Disabled drops everything, queued and new
    monitored_item.enqueue_data_change(data_change(10, 2));
    monitored_item.set_monitoring_mode(MonitoringMode::Disabled);
    assert_eq!(monitored_item.queued_notification_count(), 0);
    monitored_item.enqueue_data_change(data_change(10, 3));
    assert_eq!(monitored_item.queued_notification_count(), 0);
}

#[test]
fn modify_revises_and_sheds_excess() {
    let (mut subscription, address_space) = harness();
    let mut request = value_request(NodeId::new(1, "v1"));
    request.requested_parameters.queue_size = 5;
    let result = create(&mut subscription, &address_space, request);
    let monitored_item_id = result.monitored_item_id;
    {
        let monitored_item = subscription.monitored_item_mut(monitored_item_id).unwrap();
        for value in 1..=4 {
            monitored_item.enqueue_data_change(data_change(10, value));
        }
    }

    let results = subscription.modify_monitored_items(
        &address_space,
        &[
            MonitoredItemModifyRequest {
                monitored_item_id,
                requested_parameters: MonitoringParameters {
                    client_handle: 11,
                    sampling_interval: 10.0,
                    queue_size: 2,
                    ..Default::default()
                },
            },
            MonitoredItemModifyRequest {
                monitored_item_id: 999,
                requested_parameters: MonitoringParameters::default(),
            },
        ],
    );
    assert_eq!(results[0].status_code, StatusCode::Good);
    assert_eq!(results[0].revised_sampling_interval, 50.0);
    assert_eq!(results[0].revised_queue_size, 2);
    assert_eq!(
        results[1].status_code,
        StatusCode::BadMonitoredItemIdInvalid
    );

    let monitored_item = subscription.monitored_item(monitored_item_id).unwrap();
    assert_eq!(monitored_item.client_handle(), 11);
    assert_eq!(monitored_item.queued_notification_count(), 2);
}

#[test]
fn monitored_item_limit_is_enforced() {
    let (mut subscription, address_space) = harness();
    for _ in 0..crate::constants::MAX_MONITORED_ITEMS_PER_SUB {
        let result = create(
            &mut subscription,
            &address_space,
            value_request(NodeId::new(1, "v1")),
        );
        assert!(result.status_code.is_good());
    }

    let result = create(
        &mut subscription,
        &address_space,
        value_request(NodeId::new(1, "v1")),
    );
    assert_eq!(result.status_code, StatusCode::BadTooManyMonitoredItems);
    assert_eq!(
        subscription.monitored_item_count(),
        crate::constants::MAX_MONITORED_ITEMS_PER_SUB
    );

    // Removing an item frees its slot
    assert_eq!(subscription.remove_monitored_item(1), StatusCode::Good);
    let result = create(
        &mut subscription,
        &address_space,
        value_request(NodeId::new(1, "v1")),
    );
    assert!(result.status_code.is_good());
}

#[test]
fn get_monitored_items_returns_parallel_handles() {
    let (mut subscription, address_space) = harness();
    let first = subscription.create_monitored_item(
        &address_space,
        TimestampsToReturn::Both,
        &make_create_request(NodeId::new(1, "v1"), 100),
    );
    let second = subscription.create_monitored_item(
        &address_space,
        TimestampsToReturn::Both,
        &make_create_request(NodeId::new(1, "v2"), 200),
    );
    let (client_handles, server_handles) = subscription.get_monitored_items();
    assert_eq!(client_handles, vec![100, 200]);
    assert_eq!(
        server_handles,
        vec![first.monitored_item_id, second.monitored_item_id]
    );
}

#[test]
fn set_monitoring_mode_by_id() {
    let (mut subscription, address_space) = harness();
    let monitored_item_id = add_monitored_item(&mut subscription, &address_space);
    let results =
        subscription.set_monitoring_mode(MonitoringMode::Disabled, &[monitored_item_id, 999]);
    assert_eq!(
        results,
        vec![StatusCode::Good, StatusCode::BadMonitoredItemIdInvalid]
    );
    assert_eq!(
        subscription
            .monitored_item(monitored_item_id)
            .unwrap()
            .monitoring_mode(),
        MonitoringMode::Disabled
    );
    assert_eq!(subscription.diagnostics().disabled_monitored_item_count, 1);
}

#[test]
fn created_event_fires_before_monitoring_mode_applies() {
    let events = Arc::new(RecordingEvents::default());
    let mut subscription = started_subscription(true, events.clone());
    let address_space = test_address_space();
    let monitored_item_id = add_monitored_item(&mut subscription, &address_space);
    assert_eq!(*events.created_items.lock().unwrap(), vec![monitored_item_id]);
    // The requested mode was applied after the event
    assert_eq!(
        subscription
            .monitored_item(monitored_item_id)
            .unwrap()
            .monitoring_mode(),
        MonitoringMode::Reporting
    );
    assert_eq!(events.updates.load(Ordering::SeqCst), 0);
}
