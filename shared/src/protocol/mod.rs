use crate::{connection::ConnectionConfig, Message, MessageKinds, Tick};

mod error;
pub use error::ProtocolError;

// Protocol Plugin
pub trait ProtocolPlugin {
    fn build(&self, protocol: &mut Protocol);
}

// Protocol
#[derive(Default)]
pub struct Protocol {
    pub message_kinds: MessageKinds,
    /// Limits applied to every session's connection
    pub connection: ConnectionConfig,
    locked: bool,
}

impl Protocol {
    pub fn builder() -> Self {
        Self::default()
    }

    pub fn add_plugin<P: ProtocolPlugin>(&mut self, plugin: P) -> &mut Self {
        self.check_lock();
        plugin.build(self);
        self
    }

    pub fn connection_config(&mut self, config: ConnectionConfig) -> &mut Self {
        self.check_lock();
        self.connection = config;
        self
    }

    pub fn request_timeout(&mut self, ticks: Tick) -> &mut Self {
        self.check_lock();
        self.connection.request_timeout_ticks = Some(ticks);
        self
    }

    pub fn add_message<M: Message>(&mut self) -> &mut Self {
        self.check_lock();
        if let Err(error) = self.message_kinds.try_add_message::<M>() {
            panic!("Cannot add message {}: {}", M::NAME, error);
        }
        self
    }

    // Non-panicking builder methods

    pub fn try_add_plugin<P: ProtocolPlugin>(
        &mut self,
        plugin: P,
    ) -> Result<&mut Self, ProtocolError> {
        self.try_check_lock()?;
        plugin.build(self);
        Ok(self)
    }

    pub fn try_connection_config(
        &mut self,
        config: ConnectionConfig,
    ) -> Result<&mut Self, ProtocolError> {
        self.try_check_lock()?;
        self.connection = config;
        Ok(self)
    }

    pub fn try_add_message<M: Message>(&mut self) -> Result<&mut Self, ProtocolError> {
        self.try_check_lock()?;
        self.message_kinds.try_add_message::<M>()?;
        Ok(self)
    }

    pub fn try_lock(&mut self) -> Result<(), ProtocolError> {
        self.try_check_lock()?;
        self.locked = true;
        Ok(())
    }

    pub fn lock(&mut self) {
        self.check_lock();
        self.locked = true;
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Checks if protocol is locked without panicking
    pub fn try_check_lock(&self) -> Result<(), ProtocolError> {
        if self.locked {
            Err(ProtocolError::AlreadyLocked)
        } else {
            Ok(())
        }
    }

    /// Checks if protocol is locked, panics if it is
    pub fn check_lock(&self) {
        if self.locked {
            panic!("Protocol already locked!");
        }
    }

    pub fn build(&mut self) -> Self {
        std::mem::take(self)
    }
}
