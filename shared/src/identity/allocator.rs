use super::{Identity, IdentityError, IdentityKind};

/// Mints object identities below the identities this process owns.
///
/// One counter is shared by every parent, so local values never repeat
/// within a process. Local 0 is reserved for session controllers and is
/// never handed out.
#[derive(Debug, Default)]
pub struct IdentityAllocator {
    last_local: u16,
}

impl IdentityAllocator {
    pub fn new() -> Self {
        Self { last_local: 0 }
    }

    /// Mints a fresh identity directly below `parent`
    pub fn next_under(&mut self, parent: &Identity) -> Result<Identity, IdentityError> {
        let local = self
            .last_local
            .checked_add(1)
            .ok_or(IdentityError::CounterExhausted {
                issued: self.last_local,
            })?;
        let identity = parent.child(local)?;
        self.last_local = local;
        Ok(identity)
    }

    pub fn issued(&self) -> u16 {
        self.last_local
    }
}

/// Mints session identities for peers admitted by this process
#[derive(Debug, Default)]
pub struct PeerIdentityAllocator {
    last_given: u16,
}

impl PeerIdentityAllocator {
    pub fn new() -> Self {
        Self { last_given: 0 }
    }

    /// Next peer identity below the session controller of `host`
    pub fn next_peer(&mut self, host: &Identity) -> Result<Identity, IdentityError> {
        if !host.is_peer() {
            return Err(IdentityError::NotAPeer { kind: host.kind() });
        }
        let local = self
            .last_given
            .checked_add(1)
            .ok_or(IdentityError::CounterExhausted {
                issued: self.last_given,
            })?;
        let identity = host.child(0)?.child(local)?;
        debug_assert_eq!(identity.kind(), IdentityKind::Session);
        self.last_given = local;
        Ok(identity)
    }
}
