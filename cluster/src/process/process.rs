use log::{debug, warn};

use arbor_shared::{transport::Transport, Identity, PeerAddress, Protocol, Tick};

use crate::{
    config::ClusterConfig,
    error::ClusterError,
    handlers::HandlerRegistry,
    messages::ClusterPlugin,
    network::{self, Inbound, NetworkController},
    node::{self, ClusterNode},
    object,
    process::{Context, ProcessEvent},
    scheduler::{Scheduler, Task, TaskKey},
    world::EntityKey,
};

/// One cluster process: its world, sessions, cluster membership and the
/// tasks running against them. Nothing happens between calls to `update`.
pub struct Process {
    context: Context,
    scheduler: Scheduler<Context>,
    handlers: HandlerRegistry,
    request_timeout: Option<Tick>,
}

impl Process {
    /// Create a new Process. The cluster messages are added to `protocol`,
    /// which is then locked.
    pub fn new(
        mut protocol: Protocol,
        config: ClusterConfig,
        transport: Box<dyn Transport>,
    ) -> Result<Self, ClusterError> {
        protocol.try_add_plugin(ClusterPlugin)?;
        protocol.try_lock()?;

        let mut handlers = HandlerRegistry::new();
        network::register_handlers(&mut handlers);
        node::register_handlers(&mut handlers);
        object::register_handlers(&mut handlers);

        let network = NetworkController::new(transport, &protocol);
        Ok(Self {
            context: Context::new(network, ClusterNode::new(config)),
            scheduler: Scheduler::new(),
            handlers,
            request_timeout: protocol.connection.request_timeout_ticks,
        })
    }

    /// Hosts a new cluster, with this process as its root
    pub fn host(&mut self) -> Result<(), ClusterError> {
        node::host(&mut self.context)
    }

    /// Joins the cluster whose root listens at `root_address`. Completes
    /// over the following updates, signalled by `ClusterInitialized`.
    pub fn join(&mut self, root_address: &PeerAddress) -> Result<(), ClusterError> {
        node::join(&mut self.context, root_address)
    }

    /// Runs one tick: read every session, dispatch inbound messages, finish
    /// handshakes, let the cluster node react, expire stale requests, step
    /// every task once, then flush every session.
    pub fn update(&mut self) {
        let tick = self.context.network.advance_tick();
        let first_event = self.context.events.len();

        let inbound = self.context.network.read_phase(&mut self.context.events);
        for message in inbound {
            self.dispatch(message);
        }
        self.context
            .network
            .poll_handshakes(&mut self.context.events);

        let fresh: Vec<ProcessEvent> = self.context.events[first_event..].to_vec();
        node::react(&mut self.context, &fresh);

        if let Some(timeout) = self.request_timeout {
            let expired = self.context.network.expire_requests(timeout);
            if expired > 0 {
                warn!("{} requests timed out at tick {}", expired, tick);
            }
        }

        self.scheduler.tick(&mut self.context);
        self.context.network.write_phase();
    }

    fn dispatch(&mut self, inbound: Inbound) {
        let ctx = &mut self.context;
        let Some(entity) = ctx.world.entity_of(&inbound.target) else {
            warn!(
                "Dropping message kind {} from {:?}, no entity is named {}",
                inbound.kind.net_id(),
                inbound.origin,
                inbound.target
            );
            return;
        };

        let mut handled = false;
        for component in ctx.world.components(entity).to_vec() {
            let Some(handler) = self.handlers.get(component, inbound.kind) else {
                continue;
            };
            handled = true;
            if let Err(error) = handler(ctx, entity, &inbound) {
                warn!(
                    "Handler for message kind {} on {:?} failed: {}",
                    inbound.kind.net_id(),
                    component,
                    error
                );
            }
        }
        if !handled {
            warn!(
                "Dropping message kind {} for {}, no handler is registered for it",
                inbound.kind.net_id(),
                inbound.target
            );
        } else {
            debug!(
                "Dispatched message kind {} to {}",
                inbound.kind.net_id(),
                inbound.target
            );
        }
    }

    // Tasks

    /// Starts `task` on the next update. It stops when `owner` is despawned.
    pub fn spawn<T: Task<Context> + 'static>(&mut self, owner: EntityKey, task: T) -> TaskKey {
        self.scheduler.spawn(owner, Box::new(task))
    }

    pub fn is_running(&self, task: TaskKey) -> bool {
        self.scheduler.is_running(task)
    }

    pub fn tasks_count(&self) -> usize {
        self.scheduler.len()
    }

    // Events

    /// Events raised since the last call
    pub fn take_events(&mut self) -> Vec<ProcessEvent> {
        std::mem::take(&mut self.context.events)
    }

    // Accessors

    pub fn handlers_mut(&mut self) -> &mut HandlerRegistry {
        &mut self.handlers
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut Context {
        &mut self.context
    }

    pub fn network(&self) -> &NetworkController {
        &self.context.network
    }

    pub fn cluster(&self) -> &ClusterNode {
        &self.context.cluster
    }

    pub fn is_ready(&self) -> bool {
        self.context.cluster.is_ready()
    }

    pub fn peer_id(&self) -> Option<Identity> {
        self.context.network.peer_id()
    }

    /// Entity of the root cluster object, once the cluster is initialized
    pub fn root_object(&self) -> Option<EntityKey> {
        self.context.cluster.root_object()
    }
}
