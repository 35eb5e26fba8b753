use std::{any::TypeId, collections::HashMap};

use crate::{messages::error::MessageKindsError, Message, MessageKind};

/// Registry of every message type a process can send or receive
#[derive(Clone, Default)]
pub struct MessageKinds {
    kind_map: HashMap<MessageKind, (TypeId, &'static str)>,
}

impl MessageKinds {
    pub fn new() -> Self {
        Self {
            kind_map: HashMap::new(),
        }
    }

    /// Registers `M`. Registering the same type twice is a no-op.
    pub fn try_add_message<M: Message>(&mut self) -> Result<(), MessageKindsError> {
        let type_id = TypeId::of::<M>();
        match self.kind_map.get(&M::KIND) {
            Some((existing_type, _)) if *existing_type == type_id => Ok(()),
            Some((_, existing)) => Err(MessageKindsError::DuplicateMessageKind {
                net_id: M::KIND.net_id(),
                existing: *existing,
                name: M::NAME,
            }),
            None => {
                self.kind_map.insert(M::KIND, (type_id, M::NAME));
                Ok(())
            }
        }
    }

    pub fn contains(&self, kind: &MessageKind) -> bool {
        self.kind_map.contains_key(kind)
    }

    pub fn name(&self, kind: &MessageKind) -> Result<&'static str, MessageKindsError> {
        self.kind_map
            .get(kind)
            .map(|(_, name)| *name)
            .ok_or(MessageKindsError::NetIdNotFound {
                net_id: kind.net_id(),
            })
    }

    pub fn len(&self) -> usize {
        self.kind_map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kind_map.is_empty()
    }
}
