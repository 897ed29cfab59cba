//! Attribute addressing - attribute ids, index ranges on array values, and
//! the qualified names used to select a data encoding.

use std::fmt;

use crate::node_id::NodeId;
use crate::status_code::StatusCode;

/// The attributes a monitored item can target. Only the attributes that the
/// monitoring services distinguish are listed; the numeric values are the
/// ids defined by OPC UA.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum AttributeId {
    NodeId = 1,
    NodeClass = 2,
    BrowseName = 3,
    DisplayName = 4,
    Description = 5,
    EventNotifier = 12,
    Value = 13,
    DataType = 14,
    AccessLevel = 17,
    MinimumSamplingInterval = 19,
    Historizing = 20,
}

impl AttributeId {
    pub fn from_u32(value: u32) -> Result<AttributeId, StatusCode> {
        match value {
            1 => Ok(AttributeId::NodeId),
            2 => Ok(AttributeId::NodeClass),
            3 => Ok(AttributeId::BrowseName),
            4 => Ok(AttributeId::DisplayName),
            5 => Ok(AttributeId::Description),
            12 => Ok(AttributeId::EventNotifier),
            13 => Ok(AttributeId::Value),
            14 => Ok(AttributeId::DataType),
            17 => Ok(AttributeId::AccessLevel),
            19 => Ok(AttributeId::MinimumSamplingInterval),
            20 => Ok(AttributeId::Historizing),
            _ => Err(StatusCode::BadAttributeIdInvalid),
        }
    }
}

/// The class of a node in the address space.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum NodeClass {
    Object,
    Variable,
    Method,
    ObjectType,
    VariableType,
    ReferenceType,
    DataType,
    View,
}

/// Well known data type nodes in namespace 0. The numeric values are the
/// node ids assigned by OPC UA; the subscription engine needs them for the
/// numeric type hierarchy that deadband filters are validated against.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DataTypeId {
    Boolean = 1,
    SByte = 2,
    Byte = 3,
    Int16 = 4,
    UInt16 = 5,
    Int32 = 6,
    UInt32 = 7,
    Int64 = 8,
    UInt64 = 9,
    Float = 10,
    Double = 11,
    String = 12,
    DateTime = 13,
    Number = 26,
    Integer = 27,
    UInteger = 28,
}

impl From<DataTypeId> for NodeId {
    fn from(data_type: DataTypeId) -> NodeId {
        NodeId::new(0, data_type as u32)
    }
}

/// How a monitored item was asked to sample and report.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum MonitoringMode {
    Disabled,
    Sampling,
    Reporting,
}

/// Which timestamps the client asked to be returned with values.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum TimestampsToReturn {
    Source,
    Server,
    Both,
    Neither,
}

/// A name qualified by a namespace index. At this layer it only appears as
/// the data encoding selector on a read value id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QualifiedName {
    pub namespace_index: u16,
    pub name: String,
}

impl QualifiedName {
    pub fn new<S>(namespace_index: u16, name: S) -> QualifiedName
    where
        S: Into<String>,
    {
        QualifiedName {
            namespace_index,
            name: name.into(),
        }
    }

    /// The null qualified name, meaning no encoding was requested.
    pub fn null() -> QualifiedName {
        QualifiedName {
            namespace_index: 0,
            name: String::new(),
        }
    }

    pub fn is_null(&self) -> bool {
        self.namespace_index == 0 && self.name.is_empty()
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace_index, self.name)
    }
}

/// A parsed index range restricting an operation to a slice of an array
/// value, e.g. `"2"`, `"1:3"` or `"1:3,0:2"` for multi-dimensional values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum NumericRange {
    /// No range was supplied
    None,
    /// A single array index
    Index(u32),
    /// An inclusive min:max range
    Range(u32, u32),
    /// One entry per dimension of a multi-dimensional value
    MultipleRanges(Vec<NumericRange>),
}

impl NumericRange {
    /// Parses the string form of an index range. An empty string means no
    /// range. Returns `BadIndexRangeInvalid` for anything malformed - empty
    /// dimensions, non-digits, or a range whose lower bound is not strictly
    /// below its upper bound.
    pub fn parse(range: &str) -> Result<NumericRange, StatusCode> {
        if range.is_empty() {
            return Ok(NumericRange::None);
        }
        let dimensions = range
            .split(',')
            .map(NumericRange::parse_dimension)
            .collect::<Result<Vec<_>, _>>()?;
        if dimensions.len() == 1 {
            // Cannot panic, length was tested
            Ok(dimensions.into_iter().next().unwrap())
        } else {
            Ok(NumericRange::MultipleRanges(dimensions))
        }
    }

    fn parse_dimension(dimension: &str) -> Result<NumericRange, StatusCode> {
        let mut bounds = dimension.split(':');
        let min = bounds.next();
        let max = bounds.next();
        if bounds.next().is_some() {
            return Err(StatusCode::BadIndexRangeInvalid);
        }
        match (min, max) {
            (Some(min), None) => Ok(NumericRange::Index(Self::parse_bound(min)?)),
            (Some(min), Some(max)) => {
                let min = Self::parse_bound(min)?;
                let max = Self::parse_bound(max)?;
                if min >= max {
                    Err(StatusCode::BadIndexRangeInvalid)
                } else {
                    Ok(NumericRange::Range(min, max))
                }
            }
            _ => Err(StatusCode::BadIndexRangeInvalid),
        }
    }

    fn parse_bound(bound: &str) -> Result<u32, StatusCode> {
        if bound.is_empty() || !bound.bytes().all(|b| b.is_ascii_digit()) {
            Err(StatusCode::BadIndexRangeInvalid)
        } else {
            bound.parse().map_err(|_| StatusCode::BadIndexRangeInvalid)
        }
    }
}
