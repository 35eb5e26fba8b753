use std::collections::HashMap;

use arbor_shared::{Message, MessageKind};

use crate::{
    error::HandlerError,
    network::Inbound,
    process::Context,
    world::{ComponentKind, EntityKey},
};

/// Handles one kind of entity message on one kind of component. Requests
/// are answered through `ctx.network.respond`.
pub type Handler = fn(&mut Context, EntityKey, &Inbound) -> Result<(), HandlerError>;

/// Maps (component, message kind) to the handler inbound entity messages
/// are dispatched to. Built once when a process starts.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<(ComponentKind, MessageKind), Handler>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        component: ComponentKind,
        kind: MessageKind,
        handler: Handler,
    ) -> Result<(), HandlerError> {
        if self.handlers.contains_key(&(component, kind)) {
            return Err(HandlerError::DuplicateHandler {
                net_id: kind.net_id(),
            });
        }
        self.handlers.insert((component, kind), handler);
        Ok(())
    }

    /// Adds a built-in handler, replacing any previous one
    pub(crate) fn insert(&mut self, component: ComponentKind, kind: MessageKind, handler: Handler) {
        self.handlers.insert((component, kind), handler);
    }

    /// Registers an application handler for `M` on every cluster object
    pub fn on_cluster_object<M: Message>(&mut self, handler: Handler) -> Result<(), HandlerError> {
        self.register(ComponentKind::ClusterObject, M::KIND, handler)
    }

    pub fn get(&self, component: ComponentKind, kind: MessageKind) -> Option<Handler> {
        self.handlers.get(&(component, kind)).copied()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
