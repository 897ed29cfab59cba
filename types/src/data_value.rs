use crate::{status_code::StatusCode, variant::Variant, DateTimeUtc};

/// A value with the quality and timestamps that accompany it on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct DataValue {
    /// The value itself
    pub value: Option<Variant>,
    /// Quality of the value. `None` means Good.
    pub status: Option<StatusCode>,
    /// Time the source produced the value
    pub source_timestamp: Option<DateTimeUtc>,
    /// Time the server observed the value
    pub server_timestamp: Option<DateTimeUtc>,
}

impl DataValue {
    /// A good value stamped with the supplied time for both source and server.
    pub fn new<V>(value: V, now: DateTimeUtc) -> DataValue
    where
        V: Into<Variant>,
    {
        DataValue {
            value: Some(value.into()),
            status: Some(StatusCode::Good),
            source_timestamp: Some(now),
            server_timestamp: Some(now),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status.unwrap_or(StatusCode::Good)
    }

    pub fn is_good(&self) -> bool {
        self.status().is_good()
    }
}
