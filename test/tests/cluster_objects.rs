use arbor_cluster::{
    tasks::{CreateChildObjectTask, GetChildTask},
    ClusterError, ClusterObjectInfo, Identity, PeerAddress,
};
use arbor_test::{init_logging, TestCluster};

fn address(port: u16) -> PeerAddress {
    PeerAddress::new("127.0.0.1", port)
}

/// Root plus two joined processes, with sibling sessions settled
fn three_nodes() -> TestCluster {
    init_logging();
    let mut cluster = TestCluster::new();
    cluster.host(address(1200));
    cluster.join(address(1300));
    cluster.join(address(1301));
    cluster.update_times(4);
    cluster
}

fn create(
    cluster: &mut TestCluster,
    index: usize,
    name: &str,
) -> Result<ClusterObjectInfo, ClusterError> {
    let root_object = cluster.root_object(index);
    let task = CreateChildObjectTask::new(root_object, name);
    let result = task.result();
    cluster.spawn(index, root_object, task);
    cluster.wait_for(&result)
}

fn get(
    cluster: &mut TestCluster,
    index: usize,
    name: &str,
) -> Result<Option<ClusterObjectInfo>, ClusterError> {
    let root_object = cluster.root_object(index);
    let task = GetChildTask::new(root_object, name);
    let result = task.result();
    cluster.spawn(index, root_object, task);
    cluster.wait_for(&result)
}

#[test]
fn root_creates_and_finds_its_own_child() {
    let mut cluster = three_nodes();

    let created = create(&mut cluster, 0, "Inventory").unwrap();
    assert_eq!(created.owner, Identity::ROOT);
    let root_object_id = cluster
        .object_info(0, cluster.root_object(0))
        .unwrap()
        .identity;
    assert_eq!(created.identity.parent(), Some(root_object_id));

    let found = get(&mut cluster, 0, "Inventory").unwrap();
    assert_eq!(found, Some(created));
}

#[test]
fn remote_create_is_owned_by_the_requester() {
    let mut cluster = three_nodes();
    let a_id = cluster.peer_id(1);

    let created = create(&mut cluster, 1, "X").unwrap();
    assert_eq!(created.owner, a_id);
    assert!(cluster.process(1).context().owns(created.entity));

    // the parent's owner keeps a record of the child under the same identity
    let at_root = get(&mut cluster, 0, "X").unwrap().unwrap();
    assert_eq!(at_root.identity, created.identity);
    assert_eq!(at_root.owner, a_id);
}

#[test]
fn other_nodes_see_the_child_owned_by_its_creator() {
    let mut cluster = three_nodes();
    let a_id = cluster.peer_id(1);

    let created = create(&mut cluster, 1, "X").unwrap();
    let seen = get(&mut cluster, 2, "X").unwrap().unwrap();

    assert_eq!(seen.identity, created.identity);
    assert_eq!(seen.owner, a_id);
    assert!(!cluster.process(2).context().owns(seen.entity));

    // the proxy is cached, a second lookup answers from it
    let again = get(&mut cluster, 2, "X").unwrap();
    assert_eq!(again, Some(seen));
}

#[test]
fn creating_a_taken_name_fails() {
    let mut cluster = three_nodes();

    create(&mut cluster, 1, "X").unwrap();
    assert_eq!(
        create(&mut cluster, 2, "X"),
        Err(ClusterError::ChildAlreadyExists {
            name: "X".to_string()
        })
    );
    assert_eq!(
        create(&mut cluster, 0, "X"),
        Err(ClusterError::ChildAlreadyExists {
            name: "X".to_string()
        })
    );
}

#[test]
fn missing_child_is_none_everywhere() {
    let mut cluster = three_nodes();

    for index in 0..3 {
        assert_eq!(get(&mut cluster, index, "Nothing"), Ok(None));
    }
}

#[test]
fn grandchildren_are_created_at_their_parents_owner() {
    let mut cluster = three_nodes();
    let a_id = cluster.peer_id(1);
    let b_id = cluster.peer_id(2);

    let x = create(&mut cluster, 1, "X").unwrap();
    let x_at_b = get(&mut cluster, 2, "X").unwrap().unwrap();

    let task = CreateChildObjectTask::new(x_at_b.entity, "Y");
    let result = task.result();
    cluster.spawn(2, x_at_b.entity, task);
    let y = cluster.wait_for(&result).unwrap();

    assert_eq!(y.owner, b_id);
    assert_eq!(y.identity.parent(), Some(x.identity));

    // A, owning X, answers lookups for Y
    let task = GetChildTask::new(x.entity, "Y");
    let result = task.result();
    cluster.spawn(1, x.entity, task);
    let y_at_a = cluster.wait_for(&result).unwrap().unwrap();
    assert_eq!(y_at_a.identity, y.identity);
    assert_eq!(y_at_a.owner, b_id);
    assert_ne!(y_at_a.owner, a_id);
}

#[test]
fn despawned_parent_fails_the_task() {
    let mut cluster = three_nodes();
    let x = create(&mut cluster, 1, "X").unwrap();
    cluster.process_mut(1).context_mut().despawn(x.entity);

    let holder = cluster.root_object(1);
    let task = GetChildTask::new(x.entity, "Y");
    let result = task.result();
    cluster.spawn(1, holder, task);
    assert_eq!(
        cluster.wait_for(&result),
        Err(ClusterError::ObjectNotFound { entity: x.entity })
    );
}
