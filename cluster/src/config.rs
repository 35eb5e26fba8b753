use arbor_shared::PeerAddress;

/// Contains Config properties which will be used by a cluster Process
#[derive(Clone, Debug)]
pub struct ClusterConfig {
    /// Address this process listens on and advertises to other nodes
    pub advertise: PeerAddress,
}

impl ClusterConfig {
    pub fn new(advertise: PeerAddress) -> Self {
        Self { advertise }
    }
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            advertise: PeerAddress::new("127.0.0.1", 1200),
        }
    }
}
