use arbor_cluster::{Identity, NodeRef, NodeState, PeerAddress, ProcessEvent};
use arbor_test::{init_logging, TestCluster};

fn address(port: u16) -> PeerAddress {
    PeerAddress::new("127.0.0.1", port)
}

fn peer(path: &[u16]) -> Identity {
    Identity::from_path(path).unwrap()
}

fn roster(cluster: &TestCluster, index: usize) -> Vec<Identity> {
    cluster
        .process(index)
        .cluster()
        .peers()
        .iter()
        .map(|peer| peer.id)
        .collect()
}

#[test]
fn root_is_ready_right_after_hosting() {
    init_logging();
    let mut cluster = TestCluster::new();
    let root = cluster.host(address(1200));

    let process = cluster.process_mut(root);
    assert!(process.is_ready());
    assert_eq!(process.peer_id(), Some(Identity::ROOT));
    assert!(process.network().is_root());
    assert!(process.root_object().is_some());
    assert_eq!(
        process.take_events(),
        vec![ProcessEvent::ClusterInitialized {
            peer_id: Identity::ROOT
        }]
    );
}

#[test]
fn joiners_get_sequential_peer_ids() {
    init_logging();
    let mut cluster = TestCluster::new();
    cluster.host(address(1200));
    let a = cluster.join(address(1300));
    let b = cluster.join(address(1301));

    assert_eq!(cluster.peer_id(a), peer(&[0, 1]));
    assert_eq!(cluster.peer_id(b), peer(&[0, 2]));
}

#[test]
fn rosters_list_every_node_after_joins() {
    init_logging();
    let mut cluster = TestCluster::new();
    let root = cluster.host(address(1200));
    let a = cluster.join(address(1300));
    let a_id = cluster.peer_id(a);

    assert_eq!(roster(&cluster, a), vec![Identity::ROOT, a_id]);

    let b = cluster.join(address(1301));
    let b_id = cluster.peer_id(b);
    assert_eq!(roster(&cluster, b), vec![Identity::ROOT, a_id, b_id]);

    let mut root_roster = roster(&cluster, root);
    root_roster.sort_by_key(|id| id.path().to_vec());
    let mut expected = vec![Identity::ROOT, a_id, b_id];
    expected.sort_by_key(|id| id.path().to_vec());
    assert_eq!(root_roster, expected);

    // the root knows where joiners listen
    let a_entry = cluster.process(root).cluster().peer(&a_id).unwrap();
    assert_eq!(a_entry.advertise, Some(address(1300)));
}

#[test]
fn joiner_routes_to_itself_locally_and_to_the_root_through_its_parent() {
    init_logging();
    let mut cluster = TestCluster::new();
    cluster.host(address(1200));
    let a = cluster.join(address(1300));
    let a_id = cluster.peer_id(a);

    let process = cluster.process(a);
    let parent = process.network().parent_client().unwrap();
    assert_eq!(process.cluster().route(&a_id), Ok(NodeRef::Local));
    assert_eq!(
        process.cluster().route(&Identity::ROOT),
        Ok(NodeRef::Client(parent))
    );
}

#[test]
fn roster_is_complete_on_every_node() {
    init_logging();
    let mut cluster = TestCluster::new();
    cluster.host(address(1200));
    for port in 1300..1305 {
        cluster.join(address(port));
    }
    // let sibling handshakes settle
    cluster.update_times(6);

    let mut everyone: Vec<Identity> = (0..cluster.processes.len())
        .map(|index| cluster.peer_id(index))
        .collect();
    everyone.sort_by_key(|id| id.path().to_vec());

    for index in 0..cluster.processes.len() {
        let mut known = roster(&cluster, index);
        known.sort_by_key(|id| id.path().to_vec());
        assert_eq!(known, everyone, "roster of process {}", index);

        // every other node is reachable
        for id in &everyone {
            let node = cluster.process(index).cluster().route(id).unwrap();
            assert!(cluster.process(index).network().is_connected(node));
        }
    }
}

#[test]
fn every_node_shares_the_root_object_identity() {
    init_logging();
    let mut cluster = TestCluster::new();
    let root = cluster.host(address(1200));
    let a = cluster.join(address(1300));

    let root_info = cluster
        .object_info(root, cluster.root_object(root))
        .unwrap();
    let a_info = cluster.object_info(a, cluster.root_object(a)).unwrap();
    assert_eq!(root_info.identity, a_info.identity);
    assert_eq!(root_info.identity, peer(&[1, 2]));
    assert_eq!(a_info.owner, Identity::ROOT);
}

#[test]
fn join_emits_cluster_initialized_once() {
    init_logging();
    let mut cluster = TestCluster::new();
    cluster.host(address(1200));
    let a = cluster.join(address(1300));
    let a_id = cluster.peer_id(a);

    let initialized: Vec<ProcessEvent> = cluster
        .process_mut(a)
        .take_events()
        .into_iter()
        .filter(|event| matches!(event, ProcessEvent::ClusterInitialized { .. }))
        .collect();
    assert_eq!(
        initialized,
        vec![ProcessEvent::ClusterInitialized { peer_id: a_id }]
    );
}

#[test]
fn hosting_or_joining_twice_fails() {
    init_logging();
    let mut cluster = TestCluster::new();
    let root = cluster.host(address(1200));
    assert!(cluster.process_mut(root).host().is_err());
    assert!(cluster.process_mut(root).join(&address(1200)).is_err());

    let a = cluster.join(address(1300));
    assert!(cluster.process_mut(a).join(&address(1200)).is_err());
}

#[test]
fn joining_an_absent_root_fails_and_stays_unready() {
    init_logging();
    let mut cluster = TestCluster::new();
    let root = cluster.host(address(1200));
    let lost = cluster.add(&address(1300));

    assert!(cluster.process_mut(lost).join(&address(1999)).is_err());
    cluster.update_times(10);
    assert!(!cluster.process(lost).is_ready());
    assert_eq!(cluster.process(lost).peer_id(), None);
    assert_eq!(cluster.process(root).cluster().peers().len(), 1);
}

#[test]
fn losing_the_root_mid_join_resets_to_idle() {
    init_logging();
    let mut cluster = TestCluster::new();
    cluster.host(address(1200));
    let a = cluster.join_at(&address(1200), address(1300));
    assert_eq!(
        cluster.process(a).cluster().state(),
        NodeState::ConnectingToCluster
    );

    let parent = cluster.process(a).network().parent_client().unwrap();
    cluster
        .process_mut(a)
        .context_mut()
        .network
        .disconnect(NodeRef::Client(parent));
    cluster.update_times(4);

    assert_eq!(cluster.process(a).cluster().state(), NodeState::Idle);
}
