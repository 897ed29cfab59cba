use std::fmt;

/// The identifier part of a node id, either numeric or string. GUID and
/// opaque identifiers are not used by this layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Identifier {
    Numeric(u32),
    String(String),
}

impl From<u32> for Identifier {
    fn from(value: u32) -> Identifier {
        Identifier::Numeric(value)
    }
}

impl From<&str> for Identifier {
    fn from(value: &str) -> Identifier {
        Identifier::String(value.to_string())
    }
}

impl From<String> for Identifier {
    fn from(value: String) -> Identifier {
        Identifier::String(value)
    }
}

/// An OPC UA node id - a namespace index and an identifier unique within
/// that namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId {
    /// The index of the namespace the identifier belongs to
    pub namespace: u16,
    /// The identifier within the namespace
    pub identifier: Identifier,
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.identifier {
            Identifier::Numeric(ref value) => write!(f, "ns={};i={}", self.namespace, value),
            Identifier::String(ref value) => write!(f, "ns={};s={}", self.namespace, value),
        }
    }
}

impl NodeId {
    pub fn new<T>(namespace: u16, identifier: T) -> NodeId
    where
        T: Into<Identifier>,
    {
        NodeId {
            namespace,
            identifier: identifier.into(),
        }
    }

    /// The null node id, `ns=0;i=0`. Used as the "no node" placeholder in
    /// results for failed operations.
    pub fn null() -> NodeId {
        NodeId::new(0, 0u32)
    }

    pub fn is_null(&self) -> bool {
        self.namespace == 0 && self.identifier == Identifier::Numeric(0)
    }
}
