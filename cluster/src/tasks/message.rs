use arbor_shared::{Identity, Message, ResponseSlot};

use crate::{
    error::ClusterError,
    network::NodeRef,
    process::Context,
    scheduler::{Step, Task},
    tasks::{child_result, TaskResult},
    world::EntityKey,
};

/// Sends `M` to whatever entity `target` names on `node` and waits for the
/// `R` it answers with
pub struct EntityMessageTask<M: Message, R: Message> {
    node: NodeRef,
    target: Identity,
    message: Option<M>,
    slot: Option<ResponseSlot>,
    result: TaskResult<R>,
}

impl<M: Message, R: Message> EntityMessageTask<M, R> {
    pub fn new(node: NodeRef, target: Identity, message: M) -> Self {
        Self {
            node,
            target,
            message: Some(message),
            slot: None,
            result: TaskResult::new(),
        }
    }

    pub fn result(&self) -> TaskResult<R> {
        self.result.clone()
    }
}

impl<M: Message, R: Message> Task<Context> for EntityMessageTask<M, R> {
    fn step(&mut self, ctx: &mut Context) -> Step<Context> {
        if let Some(message) = self.message.take() {
            match ctx.network.send_request(self.node, self.target, &message) {
                Ok(slot) => self.slot = Some(slot),
                Err(error) => {
                    self.result.set(Err(error));
                    return Step::Done;
                }
            }
        }
        let Some(slot) = &self.slot else {
            return Step::Done;
        };
        match slot.take() {
            Some(response) => {
                let response = response
                    .and_then(|envelope| envelope.read::<R>())
                    .map_err(ClusterError::from);
                self.result.set(response);
                Step::Done
            }
            None => Step::Pending,
        }
    }
}

/// Sends `M` to the entity `target` as seen by the process `peer_id`
pub struct ClusterProxyMessageTask<M: Message, R: Message> {
    peer_id: Identity,
    target: Identity,
    message: Option<M>,
    inner: Option<TaskResult<R>>,
    result: TaskResult<R>,
}

impl<M: Message, R: Message> ClusterProxyMessageTask<M, R> {
    pub fn new(peer_id: Identity, target: Identity, message: M) -> Self {
        Self {
            peer_id,
            target,
            message: Some(message),
            inner: None,
            result: TaskResult::new(),
        }
    }

    pub fn result(&self) -> TaskResult<R> {
        self.result.clone()
    }
}

impl<M: Message, R: Message> Task<Context> for ClusterProxyMessageTask<M, R> {
    fn step(&mut self, ctx: &mut Context) -> Step<Context> {
        if let Some(inner) = self.inner.take() {
            self.result.set(child_result(&inner, "EntityMessageTask"));
            return Step::Done;
        }
        let Some(message) = self.message.take() else {
            return Step::Done;
        };
        match ctx.cluster.route(&self.peer_id) {
            Ok(node) => {
                let task = EntityMessageTask::<M, R>::new(node, self.target, message);
                self.inner = Some(task.result());
                Step::Yield(Box::new(task))
            }
            Err(error) => {
                self.result.set(Err(error));
                Step::Done
            }
        }
    }
}

/// Sends `M` to the owner of the cluster object on `entity`, wherever it is
pub struct ClusterObjectMessageTask<M: Message, R: Message> {
    entity: EntityKey,
    message: Option<M>,
    inner: Option<TaskResult<R>>,
    result: TaskResult<R>,
}

impl<M: Message, R: Message> ClusterObjectMessageTask<M, R> {
    pub fn new(entity: EntityKey, message: M) -> Self {
        Self {
            entity,
            message: Some(message),
            inner: None,
            result: TaskResult::new(),
        }
    }

    pub fn result(&self) -> TaskResult<R> {
        self.result.clone()
    }
}

impl<M: Message, R: Message> Task<Context> for ClusterObjectMessageTask<M, R> {
    fn step(&mut self, ctx: &mut Context) -> Step<Context> {
        if let Some(inner) = self.inner.take() {
            self.result.set(child_result(&inner, "ClusterProxyMessageTask"));
            return Step::Done;
        }
        let Some(message) = self.message.take() else {
            return Step::Done;
        };
        let Some(info) = ctx.object_info(self.entity) else {
            self.result.set(Err(ClusterError::ObjectNotFound {
                entity: self.entity,
            }));
            return Step::Done;
        };
        let task = ClusterProxyMessageTask::<M, R>::new(info.owner, info.identity, message);
        self.inner = Some(task.result());
        Step::Yield(Box::new(task))
    }
}
