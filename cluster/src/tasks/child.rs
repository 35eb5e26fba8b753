use arbor_shared::Identity;

use crate::{
    error::ClusterError,
    messages::{ChildInfo, CreateChild, CreateChildResponse, GetChild, GetChildResponse},
    object::{install_object, materialize, ClusterObjectInfo},
    process::Context,
    scheduler::{Step, Task},
    tasks::{child_result, ClusterObjectMessageTask, TaskResult},
    world::EntityKey,
};

/// Finds the child object `name` under `parent`. Answers right away when
/// the parent is ours or the child is already known here, otherwise asks
/// the parent's owner and keeps a local proxy of what it reports.
pub struct GetChildTask {
    parent: EntityKey,
    name: String,
    inner: Option<TaskResult<GetChildResponse>>,
    result: TaskResult<Option<ClusterObjectInfo>>,
}

impl GetChildTask {
    pub fn new(parent: EntityKey, name: &str) -> Self {
        Self {
            parent,
            name: name.to_string(),
            inner: None,
            result: TaskResult::new(),
        }
    }

    pub fn result(&self) -> TaskResult<Option<ClusterObjectInfo>> {
        self.result.clone()
    }

    fn cached(&self, ctx: &Context) -> Option<ClusterObjectInfo> {
        ctx.world
            .child(self.parent, &self.name)
            .and_then(|child| ctx.object_info(child))
    }

    fn resolve(
        &self,
        ctx: &mut Context,
        child: Option<ChildInfo>,
    ) -> Result<Option<ClusterObjectInfo>, ClusterError> {
        let Some(child) = child else {
            return Ok(None);
        };
        // another task may have brought it in while we waited
        if let Some(info) = self.cached(ctx) {
            return Ok(Some(info));
        }
        materialize(ctx, self.parent, &self.name, child.id, child.owner).map(Some)
    }
}

impl Task<Context> for GetChildTask {
    fn step(&mut self, ctx: &mut Context) -> Step<Context> {
        if let Some(inner) = self.inner.take() {
            let result = child_result(&inner, "ClusterObjectMessageTask")
                .and_then(|response| self.resolve(ctx, response.child));
            self.result.set(result);
            return Step::Done;
        }
        if ctx.object(self.parent).is_none() {
            self.result.set(Err(ClusterError::ObjectNotFound {
                entity: self.parent,
            }));
            return Step::Done;
        }

        let cached = self.cached(ctx);
        if ctx.owns(self.parent) || cached.is_some() {
            self.result.set(Ok(cached));
            return Step::Done;
        }
        let task = ClusterObjectMessageTask::<GetChild, GetChildResponse>::new(
            self.parent,
            GetChild {
                name: self.name.clone(),
            },
        );
        self.inner = Some(task.result());
        Step::Yield(Box::new(task))
    }
}

/// Creates the child object `name` under `parent`, owned by this process.
/// A parent owned elsewhere mints the identity, this process keeps a proxy.
pub struct CreateChildObjectTask {
    parent: EntityKey,
    name: String,
    inner: Option<TaskResult<CreateChildResponse>>,
    result: TaskResult<ClusterObjectInfo>,
}

impl CreateChildObjectTask {
    pub fn new(parent: EntityKey, name: &str) -> Self {
        Self {
            parent,
            name: name.to_string(),
            inner: None,
            result: TaskResult::new(),
        }
    }

    pub fn result(&self) -> TaskResult<ClusterObjectInfo> {
        self.result.clone()
    }

    fn create_local(
        &self,
        ctx: &mut Context,
        parent: Identity,
        owner: Identity,
    ) -> Result<ClusterObjectInfo, ClusterError> {
        if ctx.world.child(self.parent, &self.name).is_some() {
            return Err(ClusterError::ChildAlreadyExists {
                name: self.name.clone(),
            });
        }
        let identity = ctx.network.new_identity_under(&parent)?;
        install_object(ctx, self.parent, &self.name, identity, owner)
    }

    fn resolve(
        &self,
        ctx: &mut Context,
        child: Option<Identity>,
    ) -> Result<ClusterObjectInfo, ClusterError> {
        let identity = child.ok_or_else(|| ClusterError::ChildAlreadyExists {
            name: self.name.clone(),
        })?;
        let owner = ctx.network.peer_id().ok_or(ClusterError::NotReady)?;
        materialize(ctx, self.parent, &self.name, identity, owner)
    }
}

impl Task<Context> for CreateChildObjectTask {
    fn step(&mut self, ctx: &mut Context) -> Step<Context> {
        if let Some(inner) = self.inner.take() {
            let result = child_result(&inner, "ClusterObjectMessageTask")
                .and_then(|response| self.resolve(ctx, response.child));
            self.result.set(result);
            return Step::Done;
        }
        let Some(parent) = ctx.object_info(self.parent) else {
            self.result.set(Err(ClusterError::ObjectNotFound {
                entity: self.parent,
            }));
            return Step::Done;
        };
        let Some(peer_id) = ctx.network.peer_id() else {
            self.result.set(Err(ClusterError::NotReady));
            return Step::Done;
        };

        if parent.owner == peer_id {
            let result = self.create_local(ctx, parent.identity, peer_id);
            self.result.set(result);
            return Step::Done;
        }
        let task = ClusterObjectMessageTask::<CreateChild, CreateChildResponse>::new(
            self.parent,
            CreateChild {
                name: self.name.clone(),
            },
        );
        self.inner = Some(task.result());
        Step::Yield(Box::new(task))
    }
}
