use arbor_shared::{
    Identity, Message, MessageKind, PeerAddress, Serde, SerdeErr, WireReader, WireWrite,
};

/// Port sent for peers that are only reachable inbound
pub const PORT_NOT_APPLICABLE: i32 = -1;
const ADDRESS_NOT_APPLICABLE: &str = "NA";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestClusterJoin {
    pub address: String,
    pub port: i32,
}

impl RequestClusterJoin {
    pub fn new(advertise: &PeerAddress) -> Self {
        Self {
            address: advertise.host.clone(),
            port: i32::from(advertise.port),
        }
    }

    pub fn advertise(&self) -> Option<PeerAddress> {
        advertise_of(&self.address, self.port)
    }
}

impl Serde for RequestClusterJoin {
    fn ser(&self, writer: &mut dyn WireWrite) {
        self.address.ser(writer);
        self.port.ser(writer);
    }

    fn de(reader: &mut WireReader) -> Result<Self, SerdeErr> {
        Ok(Self {
            address: String::de(reader)?,
            port: i32::de(reader)?,
        })
    }
}

impl Message for RequestClusterJoin {
    const KIND: MessageKind = MessageKind::new(4);
    const NAME: &'static str = "RequestClusterJoin";
}

/// One roster entry
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeInfo {
    pub address: String,
    pub port: i32,
    pub id: Identity,
}

impl NodeInfo {
    pub fn new(id: Identity, advertise: Option<&PeerAddress>) -> Self {
        match advertise {
            Some(address) => Self {
                address: address.host.clone(),
                port: i32::from(address.port),
                id,
            },
            None => Self {
                address: ADDRESS_NOT_APPLICABLE.to_string(),
                port: PORT_NOT_APPLICABLE,
                id,
            },
        }
    }

    pub fn advertise(&self) -> Option<PeerAddress> {
        advertise_of(&self.address, self.port)
    }
}

impl Serde for NodeInfo {
    fn ser(&self, writer: &mut dyn WireWrite) {
        self.address.ser(writer);
        self.port.ser(writer);
        self.id.ser(writer);
    }

    fn de(reader: &mut WireReader) -> Result<Self, SerdeErr> {
        Ok(Self {
            address: String::de(reader)?,
            port: i32::de(reader)?,
            id: Identity::de(reader)?,
        })
    }
}

/// Roster handed to a joining node, root first
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClusterJoinResponse {
    pub object_manager_id: Identity,
    pub root_object_id: Identity,
    pub nodes: Vec<NodeInfo>,
}

impl Serde for ClusterJoinResponse {
    fn ser(&self, writer: &mut dyn WireWrite) {
        self.object_manager_id.ser(writer);
        self.root_object_id.ser(writer);
        self.nodes.ser(writer);
    }

    fn de(reader: &mut WireReader) -> Result<Self, SerdeErr> {
        Ok(Self {
            object_manager_id: Identity::de(reader)?,
            root_object_id: Identity::de(reader)?,
            nodes: Vec::<NodeInfo>::de(reader)?,
        })
    }
}

impl Message for ClusterJoinResponse {
    const KIND: MessageKind = MessageKind::new(5);
    const NAME: &'static str = "ClusterJoinResponse";
}

fn advertise_of(address: &str, port: i32) -> Option<PeerAddress> {
    let port = u16::try_from(port).ok()?;
    Some(PeerAddress::new(address, port))
}
