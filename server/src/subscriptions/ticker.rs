//! The timer task that drives a subscription. One task runs per
//! subscription for as long as it is open, ticking it every publishing
//! interval, re-arming when a modify revises the interval, and stopping
//! once the subscription observes the closed state.

use std::sync::{Arc, RwLock};

use tokio::time::{interval, Interval, MissedTickBehavior};

use crate::{
    publish_engine::PublishEngine,
    subscriptions::{
        duration_from_ms,
        subscription::{Subscription, SubscriptionState, TickReason},
        SubscriptionRegistry,
    },
    DateTimeUtc,
};

fn make_ticker(interval_ms: f64) -> Interval {
    let mut ticker = interval(duration_from_ms(interval_ms));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}

/// Starts the subscription's publishing timer and runs its publish cycles
/// until it closes. The registry is told while the timer is live so
/// surrounding code can enumerate running subscriptions.
pub async fn run_publishing_timer(
    subscription: Arc<RwLock<Subscription>>,
    engine: Arc<RwLock<dyn PublishEngine + Send + Sync>>,
    registry: Arc<dyn SubscriptionRegistry + Send + Sync>,
) {
    let (subscription_id, mut interval_ms) = {
        let mut subscription = trace_write_lock_unwrap!(subscription);
        subscription.start_timer();
        (
            subscription.subscription_id,
            subscription.publishing_interval(),
        )
    };
    registry.register(subscription_id);
    let mut ticker = make_ticker(interval_ms);
    // An interval's first tick completes immediately; consume it so the
    // first publish cycle lands one interval after the timer starts.
    ticker.tick().await;
    loop {
        ticker.tick().await;
        {
            let mut subscription = trace_write_lock_unwrap!(subscription);
            let mut engine = trace_write_lock_unwrap!(engine);
            let now: DateTimeUtc = chrono::Utc::now();
            let mut result = subscription.tick(&now, TickReason::TickTimerFired, &mut *engine);
            // Drain what is already pending while requests are parked,
            // rather than waiting an interval per pending message
            while result.message_sent
                && result.more_notifications
                && engine.pending_publish_request_count() > 0
            {
                result =
                    subscription.tick(&now, TickReason::ReceivedPublishRequest, &mut *engine);
            }
        }
        let (closed, current_interval) = {
            let subscription = trace_read_lock_unwrap!(subscription);
            (
                subscription.state() == SubscriptionState::Closed,
                subscription.publishing_interval(),
            )
        };
        if closed {
            break;
        }
        if current_interval != interval_ms {
            // The subscription was modified; re-arm with the revised interval
            interval_ms = current_interval;
            ticker = make_ticker(interval_ms);
            ticker.tick().await;
        }
    }
    registry.unregister(subscription_id);
    debug!(
        "Subscription {} publishing timer stopped",
        subscription_id
    );
}
