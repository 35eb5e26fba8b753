use arbor_cluster::{
    messages::Ack,
    tasks::{ClusterObjectMessageTask, ClusterProxyMessageTask, EntityMessageTask},
    ClusterError, Identity, Message, MessageKind, NodeRef, PeerAddress, ProcessEvent, Protocol,
    RequestError, RpcParam, Serde, SerdeErr, WireReader, WireWrite,
};
use arbor_test::{init_logging, protocol, Greeting, GreetingReply, TestCluster};

fn address(port: u16) -> PeerAddress {
    PeerAddress::new("127.0.0.1", port)
}

fn greeting(text: &str) -> Greeting {
    Greeting {
        text: text.to_string(),
    }
}

fn three_nodes_with(protocol: fn() -> Protocol) -> TestCluster {
    init_logging();
    let mut cluster = TestCluster::with_protocol(protocol);
    cluster.host(address(1200));
    cluster.join(address(1300));
    cluster.join(address(1301));
    cluster.update_times(4);
    cluster
}

fn three_nodes() -> TestCluster {
    three_nodes_with(protocol)
}

/// Identity nothing in the cluster is named by
fn nowhere() -> Identity {
    Identity::from_path(&[9, 9, 9]).unwrap()
}

#[test]
fn object_message_reaches_the_owner() {
    let mut cluster = three_nodes();
    let b_root = cluster.root_object(2);

    let task = ClusterObjectMessageTask::<Greeting, GreetingReply>::new(b_root, greeting("hello"));
    let result = task.result();
    cluster.spawn(2, b_root, task);

    let reply = cluster.wait_for(&result).unwrap();
    assert_eq!(reply.text, format!("hello from Root at {}", Identity::ROOT));
}

#[test]
fn proxy_message_reaches_the_named_peer() {
    let mut cluster = three_nodes();
    let a_id = cluster.peer_id(1);
    let b_root = cluster.root_object(2);
    let root_object_id = cluster.object_info(2, b_root).unwrap().identity;

    // A answers for its own copy of the root object
    let task = ClusterProxyMessageTask::<Greeting, GreetingReply>::new(
        a_id,
        root_object_id,
        greeting("hi"),
    );
    let result = task.result();
    cluster.spawn(2, b_root, task);

    let reply = cluster.wait_for(&result).unwrap();
    assert_eq!(reply.text, format!("hi from Root at {}", a_id));
}

#[test]
fn proxy_message_to_an_unknown_peer_fails() {
    let mut cluster = three_nodes();
    let b_root = cluster.root_object(2);
    let stranger = Identity::from_path(&[0, 40]).unwrap();

    let task = ClusterProxyMessageTask::<Greeting, GreetingReply>::new(
        stranger,
        Identity::ROOT,
        greeting("anyone?"),
    );
    let result = task.result();
    cluster.spawn(2, b_root, task);

    assert_eq!(
        cluster.wait_for(&result),
        Err(ClusterError::UnknownPeer { peer_id: stranger })
    );
}

#[test]
fn response_of_the_wrong_kind_is_reported() {
    let mut cluster = three_nodes();
    let b_root = cluster.root_object(2);
    let root_object_id = cluster.object_info(2, b_root).unwrap().identity;
    let parent = cluster.process(2).network().parent_client().unwrap();

    let task = EntityMessageTask::<Greeting, Ack>::new(
        NodeRef::Client(parent),
        root_object_id,
        greeting("hello"),
    );
    let result = task.result();
    cluster.spawn(2, b_root, task);

    assert_eq!(
        cluster.wait_for(&result),
        Err(ClusterError::Request(RequestError::UnexpectedResponse {
            expected: Ack::KIND.net_id(),
            actual: GreetingReply::KIND.net_id(),
        }))
    );
}

struct NeverRegistered;

impl Serde for NeverRegistered {
    fn ser(&self, _: &mut dyn WireWrite) {}

    fn de(_: &mut WireReader) -> Result<Self, SerdeErr> {
        Ok(NeverRegistered)
    }
}

impl Message for NeverRegistered {
    const KIND: MessageKind = MessageKind::new(150);
    const NAME: &'static str = "NeverRegistered";
}

#[test]
fn unregistered_messages_are_refused_before_sending() {
    let mut cluster = three_nodes();
    let result = cluster.process_mut(1).context_mut().network.send_request(
        NodeRef::Local,
        Identity::ROOT,
        &NeverRegistered,
    );
    assert!(matches!(
        result,
        Err(ClusterError::UnregisteredMessage { net_id: 150 })
    ));
}

#[test]
fn rpc_broadcast_reaches_every_connected_peer() {
    let mut cluster = three_nodes();
    for index in 0..3 {
        cluster.process_mut(index).take_events();
    }
    let target = cluster.object_info(0, cluster.root_object(0)).unwrap().identity;
    let params = vec![RpcParam::String("fire".to_string()), RpcParam::Int(3)];

    cluster
        .process_mut(0)
        .context_mut()
        .network
        .send_rpc(None, target, "shoot", params.clone())
        .unwrap();
    cluster.update_times(3);

    for index in 1..3 {
        let rpcs: Vec<ProcessEvent> = cluster
            .process_mut(index)
            .take_events()
            .into_iter()
            .filter(|event| matches!(event, ProcessEvent::Rpc { .. }))
            .collect();
        assert_eq!(rpcs.len(), 1, "process {}", index);
        let ProcessEvent::Rpc { rpc, .. } = &rpcs[0] else {
            unreachable!();
        };
        assert_eq!(rpc.target, target);
        assert_eq!(rpc.method, "shoot");
        assert_eq!(rpc.params, params);
    }
}

#[test]
fn rpc_to_a_single_node_stays_there() {
    let mut cluster = three_nodes();
    for index in 0..3 {
        cluster.process_mut(index).take_events();
    }
    let parent = cluster.process(1).network().parent_client().unwrap();

    cluster
        .process_mut(1)
        .context_mut()
        .network
        .send_rpc(Some(NodeRef::Client(parent)), Identity::ROOT, "ping", Vec::new())
        .unwrap();
    cluster.update_times(3);

    let at_root = cluster.process_mut(0).take_events();
    assert!(at_root
        .iter()
        .any(|event| matches!(event, ProcessEvent::Rpc { rpc, .. } if rpc.method == "ping")));
    let at_b = cluster.process_mut(2).take_events();
    assert!(!at_b
        .iter()
        .any(|event| matches!(event, ProcessEvent::Rpc { .. })));
}

#[test]
fn synchronize_broadcasts_state() {
    let mut cluster = three_nodes();
    for index in 0..3 {
        cluster.process_mut(index).take_events();
    }

    cluster
        .process_mut(0)
        .context_mut()
        .network
        .synchronize(Identity::ROOT, vec![1, 2, 3])
        .unwrap();
    cluster.update_times(3);

    let synced: Vec<ProcessEvent> = cluster
        .process_mut(1)
        .take_events()
        .into_iter()
        .filter(|event| matches!(event, ProcessEvent::Synchronize { .. }))
        .collect();
    assert_eq!(synced.len(), 1);
    let ProcessEvent::Synchronize { sync, .. } = &synced[0] else {
        unreachable!();
    };
    assert_eq!(sync.data, vec![1, 2, 3]);
}

#[test]
fn closing_a_session_fails_its_pending_requests() {
    let mut cluster = three_nodes();
    let a_root = cluster.root_object(1);
    let parent = cluster.process(1).network().parent_client().unwrap();

    // nothing answers for an unnamed identity
    let task = EntityMessageTask::<Greeting, GreetingReply>::new(
        NodeRef::Client(parent),
        nowhere(),
        greeting("lost"),
    );
    let result = task.result();
    cluster.spawn(1, a_root, task);
    cluster.update_times(4);
    assert!(!result.is_ready());
    assert!(cluster.process(1).network().pending_requests() > 0);

    cluster
        .process_mut(1)
        .context_mut()
        .network
        .disconnect(NodeRef::Client(parent));

    assert_eq!(
        cluster.wait_for(&result),
        Err(ClusterError::Request(RequestError::SessionClosed))
    );
    assert_eq!(cluster.process(1).network().pending_requests(), 0);
}

fn impatient_protocol() -> Protocol {
    let mut protocol = protocol();
    protocol.request_timeout(5);
    protocol
}

#[test]
fn unanswered_requests_time_out() {
    let mut cluster = three_nodes_with(impatient_protocol);
    let a_root = cluster.root_object(1);
    let parent = cluster.process(1).network().parent_client().unwrap();

    let task = EntityMessageTask::<Greeting, GreetingReply>::new(
        NodeRef::Client(parent),
        nowhere(),
        greeting("lost"),
    );
    let result = task.result();
    cluster.spawn(1, a_root, task);

    assert!(matches!(
        cluster.wait_for(&result),
        Err(ClusterError::Request(RequestError::TimedOut { .. }))
    ));
}

#[test]
fn local_requests_time_out_too() {
    let mut cluster = three_nodes_with(impatient_protocol);
    let root_object = cluster.root_object(0);

    let task = EntityMessageTask::<Greeting, GreetingReply>::new(
        NodeRef::Local,
        nowhere(),
        greeting("echo"),
    );
    let result = task.result();
    cluster.spawn(0, root_object, task);

    assert!(matches!(
        cluster.wait_for(&result),
        Err(ClusterError::Request(RequestError::TimedOut { .. }))
    ));
    assert_eq!(cluster.process(0).network().pending_requests(), 0);
}
