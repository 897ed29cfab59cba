//! The read-only view of the address space that monitored item validation
//! runs against. Only the node surface the monitoring services touch is
//! modelled - node class, variable data type, minimum sampling interval,
//! event notifier bits and the numeric data type hierarchy.

use std::collections::HashMap;

use uasub_types::{AttributeId, DataTypeId, DataValue, Duration, NodeClass, NodeId, Variant};

bitflags! {
    /// The EventNotifier attribute bits of an object or view node.
    pub struct EventNotifier: u8 {
        const SUBSCRIBE_TO_EVENTS = 0x01;
        const HISTORY_READ = 0x04;
        const HISTORY_WRITE = 0x08;
    }
}

/// A node as the subscription engine sees it.
#[derive(Debug, Clone)]
pub struct Node {
    node_id: NodeId,
    node_class: NodeClass,
    browse_name: String,
    /// Data type of the value, for variable nodes
    data_type: Option<NodeId>,
    /// The fastest rate the underlying source can be sampled at, for
    /// variable nodes. 0 means the source is exception based.
    minimum_sampling_interval: Option<Duration>,
    event_notifier: EventNotifier,
}

impl Node {
    pub fn node_id(&self) -> &NodeId {
        &self.node_id
    }

    pub fn node_class(&self) -> NodeClass {
        self.node_class
    }

    pub fn browse_name(&self) -> &str {
        &self.browse_name
    }

    pub fn is_variable(&self) -> bool {
        self.node_class == NodeClass::Variable
    }

    pub fn data_type(&self) -> Option<&NodeId> {
        self.data_type.as_ref()
    }

    pub fn minimum_sampling_interval(&self) -> Option<Duration> {
        self.minimum_sampling_interval
    }

    pub fn event_notifier(&self) -> EventNotifier {
        self.event_notifier
    }
}

/// An in-memory node table with the data type hierarchy needed to decide
/// whether a variable is numeric. The subscription engine only ever reads
/// from it; population happens at server start up.
pub struct AddressSpace {
    nodes: HashMap<NodeId, Node>,
    /// Maps a data type node to its supertype
    data_type_supertypes: HashMap<NodeId, NodeId>,
}

impl Default for AddressSpace {
    fn default() -> AddressSpace {
        AddressSpace::new()
    }
}

impl AddressSpace {
    /// An address space preloaded with the namespace 0 numeric data type
    /// hierarchy, so deadband validation can walk Int32 -> Integer -> Number
    /// without further setup.
    pub fn new() -> AddressSpace {
        let mut address_space = AddressSpace {
            nodes: HashMap::new(),
            data_type_supertypes: HashMap::new(),
        };
        address_space.register_data_type(DataTypeId::Integer.into(), DataTypeId::Number.into());
        address_space.register_data_type(DataTypeId::UInteger.into(), DataTypeId::Number.into());
        address_space.register_data_type(DataTypeId::Float.into(), DataTypeId::Number.into());
        address_space.register_data_type(DataTypeId::Double.into(), DataTypeId::Number.into());
        for data_type in &[DataTypeId::SByte, DataTypeId::Int16, DataTypeId::Int32, DataTypeId::Int64] {
            address_space.register_data_type((*data_type).into(), DataTypeId::Integer.into());
        }
        for data_type in &[DataTypeId::Byte, DataTypeId::UInt16, DataTypeId::UInt32, DataTypeId::UInt64] {
            address_space.register_data_type((*data_type).into(), DataTypeId::UInteger.into());
        }
        address_space
    }

    /// Registers a data type node and the supertype it derives from.
    pub fn register_data_type(&mut self, data_type: NodeId, supertype: NodeId) {
        self.data_type_supertypes.insert(data_type, supertype);
    }

    pub fn add_variable<S>(
        &mut self,
        node_id: &NodeId,
        browse_name: S,
        data_type: NodeId,
        minimum_sampling_interval: Option<Duration>,
    ) where
        S: Into<String>,
    {
        self.insert(Node {
            node_id: node_id.clone(),
            node_class: NodeClass::Variable,
            browse_name: browse_name.into(),
            data_type: Some(data_type),
            minimum_sampling_interval,
            event_notifier: EventNotifier::empty(),
        });
    }

    pub fn add_object<S>(&mut self, node_id: &NodeId, browse_name: S, event_notifier: EventNotifier)
    where
        S: Into<String>,
    {
        self.insert(Node {
            node_id: node_id.clone(),
            node_class: NodeClass::Object,
            browse_name: browse_name.into(),
            data_type: None,
            minimum_sampling_interval: None,
            event_notifier,
        });
    }

    fn insert(&mut self, node: Node) {
        self.nodes.insert(node.node_id.clone(), node);
    }

    pub fn find_node(&self, node_id: &NodeId) -> Option<&Node> {
        self.nodes.get(node_id)
    }

    /// Reads one of the attributes the monitoring services consult. Returns
    /// `None` when the node does not exist or does not carry the attribute.
    pub fn read_attribute(&self, node_id: &NodeId, attribute_id: AttributeId) -> Option<DataValue> {
        let node = self.find_node(node_id)?;
        let value = match attribute_id {
            AttributeId::NodeId => Variant::NodeId(node.node_id.clone()),
            AttributeId::BrowseName => Variant::String(node.browse_name.clone()),
            AttributeId::DataType => Variant::NodeId(node.data_type.clone()?),
            AttributeId::MinimumSamplingInterval => {
                Variant::Double(node.minimum_sampling_interval?)
            }
            AttributeId::EventNotifier => Variant::Byte(node.event_notifier.bits()),
            _ => return None,
        };
        Some(DataValue::new(value, chrono::Utc::now()))
    }

    /// True if the data type is Number or derives from it. The walk is
    /// bounded so a malformed cyclic hierarchy cannot hang validation.
    pub fn is_numeric_data_type(&self, data_type: &NodeId) -> bool {
        let number: NodeId = DataTypeId::Number.into();
        let mut current = data_type.clone();
        for _ in 0..16 {
            if current == number {
                return true;
            }
            match self.data_type_supertypes.get(&current) {
                Some(supertype) => current = supertype.clone(),
                None => return false,
            }
        }
        false
    }
}
