use log::warn;

use arbor_shared::Identity;

use crate::{
    error::ClusterError,
    messages::{ClusterJoinResponse, RequestClusterJoin},
    network::NodeRef,
    node::{finish_join, NodeState},
    process::Context,
    scheduler::{Step, Task},
    tasks::{child_result, EntityMessageTask, TaskResult},
};

/// Asks the root to let this process into the cluster and applies the
/// roster it answers with. Spawned once the root assigned our identity.
#[derive(Default)]
pub struct JoinClusterTask {
    inner: Option<TaskResult<ClusterJoinResponse>>,
    result: TaskResult<Identity>,
}

impl JoinClusterTask {
    pub fn new() -> Self {
        Self::default()
    }

    /// Our peer identity once the join completed
    pub fn result(&self) -> TaskResult<Identity> {
        self.result.clone()
    }
}

impl Task<Context> for JoinClusterTask {
    fn step(&mut self, ctx: &mut Context) -> Step<Context> {
        if let Some(inner) = self.inner.take() {
            let result = child_result(&inner, "EntityMessageTask")
                .and_then(|response| finish_join(ctx, response));
            if let Err(error) = &result {
                warn!("Joining the cluster failed: {}", error);
                ctx.cluster.set_state(NodeState::Idle);
            }
            self.result.set(result);
            return Step::Done;
        }

        let Some(parent) = ctx.network.parent_client() else {
            self.result.set(Err(ClusterError::NotReady));
            return Step::Done;
        };
        let advertise = ctx.cluster.config().advertise.clone();
        let task = EntityMessageTask::<RequestClusterJoin, ClusterJoinResponse>::new(
            NodeRef::Client(parent),
            Identity::ROOT,
            RequestClusterJoin::new(&advertise),
        );
        self.inner = Some(task.result());
        Step::Yield(Box::new(task))
    }
}
