use log::debug;

use arbor_shared::{Identity, RequestError, ResponseEnvelope, ResponseId, ResponseSlot};

use crate::{
    error::ClusterError,
    messages::{Ack, CancelLock, LockRequest, UnlockRequest},
    network::NodeRef,
    process::Context,
    scheduler::{Step, Task},
    tasks::{child_result, ClusterObjectMessageTask, TaskResult},
    world::EntityKey,
};

/// Acquires the lock on a cluster object. Finishes when the owner grants
/// it, which may be many ticks later if others hold or wait for it. A
/// request that fails or is dropped unanswered is withdrawn at the owner, so
/// the lock never passes to a requester that stopped waiting.
pub struct LockObjectTask {
    entity: EntityKey,
    started: bool,
    pending: Option<PendingLock>,
    result: TaskResult<()>,
}

struct PendingLock {
    node: NodeRef,
    target: Identity,
    response_id: ResponseId,
    slot: ResponseSlot,
}

impl LockObjectTask {
    pub fn new(entity: EntityKey) -> Self {
        Self {
            entity,
            started: false,
            pending: None,
            result: TaskResult::new(),
        }
    }

    pub fn result(&self) -> TaskResult<()> {
        self.result.clone()
    }

    fn send(&mut self, ctx: &mut Context) -> Result<(), ClusterError> {
        let info = ctx
            .object_info(self.entity)
            .ok_or(ClusterError::ObjectNotFound {
                entity: self.entity,
            })?;
        let node = ctx.cluster.route(&info.owner)?;
        let (response_id, slot) = ctx
            .network
            .send_tracked_request(node, info.identity, &LockRequest)?;
        self.pending = Some(PendingLock {
            node,
            target: info.identity,
            response_id,
            slot,
        });
        Ok(())
    }
}

impl PendingLock {
    /// Whether the owner may still hold this request, queued or granted
    fn still_held(outcome: &Option<Result<ResponseEnvelope, RequestError>>) -> bool {
        match outcome {
            None => true,
            Some(Ok(envelope)) => envelope
                .read::<Ack>()
                .map(|ack| ack.success)
                .unwrap_or(true),
            Some(Err(RequestError::SessionClosed)) => false,
            Some(Err(_)) => true,
        }
    }

    fn withdraw(&self, ctx: &mut Context) {
        let cancel = CancelLock {
            response_id: self.response_id,
        };
        match ctx.network.send_message(self.node, self.target, &cancel) {
            Ok(()) => debug!("Withdrew lock request {} on {}", self.response_id, self.target),
            Err(error) => debug!(
                "Could not withdraw lock request {} on {}: {}",
                self.response_id, self.target, error
            ),
        }
    }
}

impl Task<Context> for LockObjectTask {
    fn step(&mut self, ctx: &mut Context) -> Step<Context> {
        if !self.started {
            self.started = true;
            if let Err(error) = self.send(ctx) {
                self.result.set(Err(error));
                return Step::Done;
            }
        }
        let Some(pending) = &self.pending else {
            return Step::Done;
        };
        let outcome = pending.slot.take();
        let result = match &outcome {
            None => return Step::Pending,
            Some(Ok(envelope)) => match envelope.read::<Ack>() {
                Ok(Ack { success: true }) => Ok(()),
                Ok(Ack { success: false }) => Err(ClusterError::LockRejected {
                    identity: pending.target,
                }),
                Err(error) => Err(error.into()),
            },
            Some(Err(error)) => Err(error.clone().into()),
        };
        if result.is_err() && PendingLock::still_held(&outcome) {
            pending.withdraw(ctx);
        }
        self.pending = None;
        self.result.set(result);
        Step::Done
    }

    fn cancel(&mut self, ctx: &mut Context) {
        let Some(pending) = self.pending.take() else {
            return;
        };
        if PendingLock::still_held(&pending.slot.take()) {
            pending.withdraw(ctx);
        }
    }
}

/// Releases a lock this process holds. Fails with `NotLocker` otherwise.
pub struct UnlockObjectTask {
    entity: EntityKey,
    identity: Option<Identity>,
    inner: Option<TaskResult<Ack>>,
    result: TaskResult<()>,
}

impl UnlockObjectTask {
    pub fn new(entity: EntityKey) -> Self {
        Self {
            entity,
            identity: None,
            inner: None,
            result: TaskResult::new(),
        }
    }

    pub fn result(&self) -> TaskResult<()> {
        self.result.clone()
    }
}

impl Task<Context> for UnlockObjectTask {
    fn step(&mut self, ctx: &mut Context) -> Step<Context> {
        if let (Some(inner), Some(identity)) = (self.inner.take(), self.identity) {
            let result = child_result(&inner, "ClusterObjectMessageTask").and_then(|ack| {
                if ack.success {
                    Ok(())
                } else {
                    Err(ClusterError::NotLocker { identity })
                }
            });
            self.result.set(result);
            return Step::Done;
        }
        if self.identity.is_some() {
            return Step::Done;
        }
        let Some(identity) = ctx.world.identity(self.entity) else {
            self.result.set(Err(ClusterError::ObjectNotFound {
                entity: self.entity,
            }));
            return Step::Done;
        };
        let task = ClusterObjectMessageTask::<UnlockRequest, Ack>::new(self.entity, UnlockRequest);
        self.identity = Some(identity);
        self.inner = Some(task.result());
        Step::Yield(Box::new(task))
    }
}
