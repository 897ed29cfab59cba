//! The server side subscription engine of an OPC UA server - the per
//! subscription state machine that drives periodic publishing of
//! notifications from monitored items, enforces keep alive and lifetime
//! timing, issues sequence numbers, and keeps a retransmission queue of
//! sent notification messages for acknowledgement and republish.
//!
//! The engine consumes a few narrow capabilities supplied by surrounding
//! code - a [`PublishEngine`](publish_engine::PublishEngine) that parks
//! client publish requests, a read-only [`AddressSpace`](address_space::AddressSpace)
//! used to validate monitored item creation, a
//! [`SubscriptionEvents`](events::SubscriptionEvents) observer that is told
//! about notifications, keep alives and termination, and a
//! [`SubscriptionRegistry`](subscriptions::SubscriptionRegistry) tracking
//! which subscriptions have a live publishing timer. Everything else -
//! sessions, transport, sampling - lives outside this crate.

#[macro_use]
extern crate bitflags;
#[macro_use]
extern crate log;
#[macro_use]
extern crate serde_derive;

/// Obtains a read lock, tracing the wait so lock contention shows up in logs.
macro_rules! trace_read_lock_unwrap {
    ( $x:expr ) => {{
        trace!("Waiting on read lock");
        let v = $x.read().unwrap();
        trace!("Obtained read lock");
        v
    }};
}

/// Obtains a write lock, tracing the wait so lock contention shows up in logs.
macro_rules! trace_write_lock_unwrap {
    ( $x:expr ) => {{
        trace!("Waiting on write lock");
        let v = $x.write().unwrap();
        trace!("Obtained write lock");
        v
    }};
}

pub mod constants;
pub mod address_space;
pub mod diagnostics;
pub mod events;
pub mod publish_engine;
pub mod subscriptions;

#[cfg(test)]
mod tests;

pub use uasub_types::DateTimeUtc;

pub mod prelude {
    pub use uasub_types::status_code::StatusCode;
    pub use uasub_types::*;

    pub use crate::address_space::*;
    pub use crate::diagnostics::*;
    pub use crate::events::*;
    pub use crate::publish_engine::*;
    pub use crate::subscriptions::monitored_item::*;
    pub use crate::subscriptions::retransmission::*;
    pub use crate::subscriptions::sequence_number::*;
    pub use crate::subscriptions::subscription::*;
    pub use crate::subscriptions::ticker::*;
    pub use crate::subscriptions::*;
}
