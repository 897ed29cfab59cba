//! Types shared by the subscription engine. These are plain data renditions
//! of the OPC UA types that the publishing machinery touches - node ids,
//! status codes, attribute addressing, monitoring parameters and filters,
//! and the notification payloads themselves. Wire encoding is handled by
//! other layers and does not appear here.

#[macro_use]
extern crate serde_derive;

pub mod node_id;
pub mod status_code;
pub mod variant;
pub mod data_value;
pub mod attribute;
pub mod notification;
pub mod service_types;

pub use crate::node_id::*;
pub use crate::variant::*;
pub use crate::data_value::*;
pub use crate::attribute::*;
pub use crate::notification::*;
pub use crate::service_types::*;

/// UTC timestamp used throughout the subscription engine.
pub type DateTimeUtc = chrono::DateTime<chrono::Utc>;

/// Interval expressed in milliseconds.
pub type Duration = f64;
