use std::collections::VecDeque;

use proptest::prelude::*;

use arbor_cluster::{
    tasks::{CreateChildObjectTask, LockObjectTask, UnlockObjectTask},
    ClusterError, EntityKey, NodeRef, PeerAddress, Protocol, RequestError, TaskResult,
};
use arbor_test::{init_logging, protocol, TestCluster};

fn address(port: u16) -> PeerAddress {
    PeerAddress::new("127.0.0.1", port)
}

fn three_nodes() -> TestCluster {
    three_nodes_with(protocol)
}

fn impatient_protocol() -> Protocol {
    let mut protocol = protocol();
    protocol.request_timeout(5);
    protocol
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

fn lock(cluster: &mut TestCluster, index: usize, entity: EntityKey) -> TaskResult<()> {
    let task = LockObjectTask::new(entity);
    let result = task.result();
    cluster.spawn(index, entity, task);
    result
}

fn unlock(cluster: &mut TestCluster, index: usize, entity: EntityKey) -> TaskResult<()> {
    let task = UnlockObjectTask::new(entity);
    let result = task.result();
    cluster.spawn(index, entity, task);
    result
}

/// Lock state of the root object as its owner, the root process, sees it
fn root_lock(cluster: &TestCluster) -> (Option<NodeRef>, usize) {
    let object = cluster
        .process(0)
        .context()
        .object(cluster.root_object(0))
        .unwrap();
    (object.locker(), object.waiting())
}

/// How the root process reaches process `index`
fn node_at_root(cluster: &TestCluster, index: usize) -> Option<NodeRef> {
    let peer_id = cluster.peer_id(index);
    cluster.process(0).cluster().peer(&peer_id).unwrap().node
}

#[test]
fn waiter_is_answered_only_when_the_holder_unlocks() {
    let mut cluster = three_nodes();
    let (p1, p2) = (1, 2);
    let p1_object = cluster.root_object(p1);
    let p2_object = cluster.root_object(p2);

    let p1_lock = lock(&mut cluster, p1, p1_object);
    assert_eq!(cluster.wait_for(&p1_lock), Ok(()));

    let p2_lock = lock(&mut cluster, p2, p2_object);
    cluster.update_times(10);
    assert!(!p2_lock.is_ready());
    assert_eq!(root_lock(&cluster), (node_at_root(&cluster, p1), 1));

    let p1_unlock = unlock(&mut cluster, p1, p1_object);
    assert_eq!(cluster.wait_for(&p1_unlock), Ok(()));
    assert_eq!(cluster.wait_for(&p2_lock), Ok(()));
    assert_eq!(root_lock(&cluster), (node_at_root(&cluster, p2), 0));
}

#[test]
fn waiters_are_granted_in_arrival_order() {
    let mut cluster = three_nodes();
    let objects: Vec<EntityKey> = (0..3).map(|index| cluster.root_object(index)).collect();

    let root_lock_result = lock(&mut cluster, 0, objects[0]);
    assert_eq!(cluster.wait_for(&root_lock_result), Ok(()));

    let a_lock = lock(&mut cluster, 1, objects[1]);
    cluster.update_times(4);
    assert_eq!(root_lock(&cluster).1, 1);
    let b_lock = lock(&mut cluster, 2, objects[2]);
    cluster.update_times(4);
    assert_eq!(root_lock(&cluster).1, 2);

    let root_unlock = unlock(&mut cluster, 0, objects[0]);
    assert_eq!(cluster.wait_for(&root_unlock), Ok(()));
    assert_eq!(cluster.wait_for(&a_lock), Ok(()));
    cluster.update_times(4);
    assert!(!b_lock.is_ready());

    let a_unlock = unlock(&mut cluster, 1, objects[1]);
    assert_eq!(cluster.wait_for(&a_unlock), Ok(()));
    assert_eq!(cluster.wait_for(&b_lock), Ok(()));
    assert_eq!(root_lock(&cluster), (node_at_root(&cluster, 2), 0));
}

#[test]
fn unlock_by_a_non_locker_changes_nothing() {
    let mut cluster = three_nodes();
    let a_object = cluster.root_object(1);
    let b_object = cluster.root_object(2);
    let identity = cluster.object_info(2, b_object).unwrap().identity;

    let a_lock = lock(&mut cluster, 1, a_object);
    assert_eq!(cluster.wait_for(&a_lock), Ok(()));

    let b_unlock = unlock(&mut cluster, 2, b_object);
    assert_eq!(
        cluster.wait_for(&b_unlock),
        Err(ClusterError::NotLocker { identity })
    );
    assert_eq!(root_lock(&cluster), (node_at_root(&cluster, 1), 0));

    // unlocking something nobody holds is rejected the same way
    let a_unlock = unlock(&mut cluster, 1, a_object);
    assert_eq!(cluster.wait_for(&a_unlock), Ok(()));
    let again = unlock(&mut cluster, 1, a_object);
    assert_eq!(
        cluster.wait_for(&again),
        Err(ClusterError::NotLocker { identity })
    );
}

#[test]
fn owner_locks_its_own_object_through_the_loopback() {
    let mut cluster = three_nodes();
    let root_object = cluster.root_object(0);

    let result = lock(&mut cluster, 0, root_object);
    assert_eq!(cluster.wait_for(&result), Ok(()));
    assert_eq!(root_lock(&cluster), (Some(NodeRef::Local), 0));

    let result = unlock(&mut cluster, 0, root_object);
    assert_eq!(cluster.wait_for(&result), Ok(()));
    assert_eq!(root_lock(&cluster), (None, 0));
}

#[test]
fn locks_route_to_an_owner_other_than_the_root() {
    let mut cluster = three_nodes();
    let a_root = cluster.root_object(1);

    let task = CreateChildObjectTask::new(a_root, "Table");
    let created = task.result();
    cluster.spawn(1, a_root, task);
    let table = cluster.wait_for(&created).unwrap();

    let table_at_b = {
        let b_root = cluster.root_object(2);
        let task = arbor_cluster::tasks::GetChildTask::new(b_root, "Table");
        let found = task.result();
        cluster.spawn(2, b_root, task);
        cluster.wait_for(&found).unwrap().unwrap()
    };

    let b_lock = lock(&mut cluster, 2, table_at_b.entity);
    assert_eq!(cluster.wait_for(&b_lock), Ok(()));

    let object = cluster.process(1).context().object(table.entity).unwrap();
    assert!(object.is_locked());
    assert_ne!(object.locker(), Some(NodeRef::Local));

    let a_lock = lock(&mut cluster, 1, table.entity);
    cluster.update_times(6);
    assert!(!a_lock.is_ready());

    let b_unlock = unlock(&mut cluster, 2, table_at_b.entity);
    assert_eq!(cluster.wait_for(&b_unlock), Ok(()));
    assert_eq!(cluster.wait_for(&a_lock), Ok(()));
    let object = cluster.process(1).context().object(table.entity).unwrap();
    assert_eq!(object.locker(), Some(NodeRef::Local));
}

#[test]
fn disconnecting_holder_passes_the_lock_on() {
    let mut cluster = three_nodes();
    let a_object = cluster.root_object(1);
    let b_object = cluster.root_object(2);

    let a_lock = lock(&mut cluster, 1, a_object);
    assert_eq!(cluster.wait_for(&a_lock), Ok(()));
    let b_lock = lock(&mut cluster, 2, b_object);
    cluster.update_times(4);
    assert!(!b_lock.is_ready());

    let parent = cluster.process(1).network().parent_client().unwrap();
    cluster
        .process_mut(1)
        .context_mut()
        .network
        .disconnect(NodeRef::Client(parent));

    assert_eq!(cluster.wait_for(&b_lock), Ok(()));
    assert_eq!(root_lock(&cluster), (node_at_root(&cluster, 2), 0));
}

#[test]
fn disconnected_waiter_leaves_the_queue() {
    let mut cluster = three_nodes();
    let a_object = cluster.root_object(1);
    let b_object = cluster.root_object(2);

    let a_lock = lock(&mut cluster, 1, a_object);
    assert_eq!(cluster.wait_for(&a_lock), Ok(()));
    let b_lock = lock(&mut cluster, 2, b_object);
    cluster.update_times(4);
    assert_eq!(root_lock(&cluster).1, 1);

    let parent = cluster.process(2).network().parent_client().unwrap();
    cluster
        .process_mut(2)
        .context_mut()
        .network
        .disconnect(NodeRef::Client(parent));

    // the waiter's own request fails as its session closes
    assert!(matches!(
        cluster.wait_for(&b_lock),
        Err(ClusterError::Request(_))
    ));
    cluster.update_times(2);
    assert_eq!(root_lock(&cluster), (node_at_root(&cluster, 1), 0));
}

#[test]
fn timed_out_waiter_does_not_inherit_the_lock() {
    let mut cluster = three_nodes_with(impatient_protocol);
    let objects: Vec<EntityKey> = (0..3).map(|index| cluster.root_object(index)).collect();

    let root_lock_result = lock(&mut cluster, 0, objects[0]);
    assert_eq!(cluster.wait_for(&root_lock_result), Ok(()));

    let a_lock = lock(&mut cluster, 1, objects[1]);
    assert!(matches!(
        cluster.wait_for(&a_lock),
        Err(ClusterError::Request(RequestError::TimedOut { .. }))
    ));
    cluster.update_times(3);
    assert_eq!(root_lock(&cluster), (Some(NodeRef::Local), 0));

    let root_unlock = unlock(&mut cluster, 0, objects[0]);
    assert_eq!(cluster.wait_for(&root_unlock), Ok(()));
    assert_eq!(root_lock(&cluster), (None, 0));

    let b_lock = lock(&mut cluster, 2, objects[2]);
    assert_eq!(cluster.wait_for(&b_lock), Ok(()));
    assert_eq!(root_lock(&cluster), (node_at_root(&cluster, 2), 0));
}

#[test]
fn dropped_lock_task_withdraws_its_request() {
    let mut cluster = three_nodes();
    let objects: Vec<EntityKey> = (0..3).map(|index| cluster.root_object(index)).collect();

    let root_lock_result = lock(&mut cluster, 0, objects[0]);
    assert_eq!(cluster.wait_for(&root_lock_result), Ok(()));

    let player = {
        let ctx = cluster.process_mut(1).context_mut();
        let root = ctx.world.root();
        ctx.world.spawn(root, "Player").unwrap()
    };
    let task = LockObjectTask::new(objects[1]);
    let a_lock = task.result();
    cluster.spawn(1, player, task);
    cluster.update_times(4);
    assert_eq!(root_lock(&cluster).1, 1);

    // the task dies with its owner while still queued
    cluster.process_mut(1).context_mut().despawn(player);
    cluster.update_times(4);
    assert!(!a_lock.is_ready());
    assert_eq!(root_lock(&cluster), (Some(NodeRef::Local), 0));

    let root_unlock = unlock(&mut cluster, 0, objects[0]);
    assert_eq!(cluster.wait_for(&root_unlock), Ok(()));
    assert_eq!(root_lock(&cluster), (None, 0));

    let b_lock = lock(&mut cluster, 2, objects[2]);
    assert_eq!(cluster.wait_for(&b_lock), Ok(()));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(12))]

    // Random lock and unlock calls from all three processes against a model
    // of the owner: one holder, waiters granted in request order.
    #[test]
    fn locks_across_processes_are_exclusive_and_fifo(
        ops in proptest::collection::vec((0usize..3, any::<bool>()), 1..16)
    ) {
        let mut cluster = three_nodes();
        let objects: Vec<EntityKey> = (0..3).map(|index| cluster.root_object(index)).collect();
        let identity = cluster.object_info(0, objects[0]).unwrap().identity;
        let mut holder: Option<usize> = None;
        let mut queue: VecDeque<usize> = VecDeque::new();
        let mut pending: Vec<Option<TaskResult<()>>> = vec![None, None, None];

        for (index, is_lock) in ops {
            if is_lock {
                if holder == Some(index) || queue.contains(&index) {
                    continue;
                }
                pending[index] = Some(lock(&mut cluster, index, objects[index]));
                if holder.is_none() {
                    holder = Some(index);
                } else {
                    queue.push_back(index);
                }
                cluster.update_times(8);
            } else {
                let result = unlock(&mut cluster, index, objects[index]);
                cluster.update_times(8);
                if holder == Some(index) {
                    prop_assert_eq!(result.take(), Some(Ok(())));
                    holder = queue.pop_front();
                } else {
                    prop_assert_eq!(
                        result.take(),
                        Some(Err(ClusterError::NotLocker { identity }))
                    );
                }
            }

            for (process, waiting) in pending.iter_mut().enumerate() {
                if holder == Some(process) {
                    if let Some(granted) = waiting.take() {
                        prop_assert_eq!(granted.take(), Some(Ok(())));
                    }
                } else if let Some(waiting) = waiting {
                    prop_assert!(!waiting.is_ready());
                }
            }
            let expected_locker = holder.and_then(|index| node_at_root(&cluster, index));
            prop_assert_eq!(root_lock(&cluster), (expected_locker, queue.len()));
        }
    }
}
