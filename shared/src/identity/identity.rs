use std::fmt;

use arbor_serde::{Serde, SerdeErr, WireReader, WireWrite};

use super::IdentityError;

/// Maximum number of levels an identity path may hold below the root
pub const MAX_IDENTITY_DEPTH: usize = 8;

/// Role of an identity, derived from the path that leads to it
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum IdentityKind {
    Root = 0,
    SessionController = 1,
    Session = 2,
    Object = 3,
}

impl IdentityKind {
    fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Root),
            1 => Some(Self::SessionController),
            2 => Some(Self::Session),
            3 => Some(Self::Object),
            _ => None,
        }
    }

    /// Kind of a child minted with `local` directly below an identity of this kind
    fn child_kind(self, local: u16) -> Self {
        match self {
            Self::Root | Self::Session if local == 0 => Self::SessionController,
            Self::Root | Self::Session => Self::Object,
            Self::SessionController => Self::Session,
            Self::Object => Self::Object,
        }
    }
}

/// Globally unique, hierarchical name for a peer or an object.
///
/// The root process is `Identity::ROOT`. Every peer that joins is given a
/// `Session` identity below the controller (local 0) of the peer that
/// admitted it, and every object a peer mints is an `Object` identity below
/// that peer's session, so the owner of any identity can be read straight
/// from its path.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct Identity {
    kind: IdentityKind,
    depth: u8,
    path: [u16; MAX_IDENTITY_DEPTH],
}

impl Identity {
    pub const ROOT: Identity = Identity {
        kind: IdentityKind::Root,
        depth: 0,
        path: [0; MAX_IDENTITY_DEPTH],
    };

    /// Builds the identity at the end of `path`, deriving every kind along the way
    pub fn from_path(path: &[u16]) -> Result<Self, IdentityError> {
        let mut identity = Self::ROOT;
        for local in path {
            identity = identity.child(*local)?;
        }
        Ok(identity)
    }

    /// Child identity with the given local value
    pub fn child(&self, local: u16) -> Result<Self, IdentityError> {
        let depth = self.depth as usize;
        if depth >= MAX_IDENTITY_DEPTH {
            return Err(IdentityError::DepthExceeded {
                depth,
                max: MAX_IDENTITY_DEPTH,
            });
        }
        let mut path = self.path;
        path[depth] = local;
        Ok(Self {
            kind: self.kind.child_kind(local),
            depth: self.depth + 1,
            path,
        })
    }

    pub fn kind(&self) -> IdentityKind {
        self.kind
    }

    pub fn depth(&self) -> usize {
        self.depth as usize
    }

    pub fn path(&self) -> &[u16] {
        &self.path[..self.depth as usize]
    }

    /// Last level of the path, 0 for the root
    pub fn local(&self) -> u16 {
        match self.depth {
            0 => 0,
            depth => self.path[depth as usize - 1],
        }
    }

    pub fn is_root(&self) -> bool {
        self.kind == IdentityKind::Root
    }

    /// Whether this identity names a process (Root or Session)
    pub fn is_peer(&self) -> bool {
        matches!(self.kind, IdentityKind::Root | IdentityKind::Session)
    }

    pub fn parent(&self) -> Option<Self> {
        match self.depth {
            0 => None,
            depth => Some(self.ancestor(depth - 1)),
        }
    }

    /// Nearest strict ancestor that names a peer, the root for the root itself
    pub fn owner(&self) -> Self {
        let mut depth = self.depth;
        while depth > 0 {
            depth -= 1;
            let ancestor = self.ancestor(depth);
            if ancestor.is_peer() {
                return ancestor;
            }
        }
        Self::ROOT
    }

    /// True for the peer itself and for everything the peer minted directly
    pub fn is_owned_by(&self, peer: &Identity) -> bool {
        self == peer || self.owner() == *peer
    }

    fn ancestor(&self, depth: u8) -> Self {
        let mut identity = Self::ROOT;
        for local in &self.path[..depth as usize] {
            identity.path[identity.depth as usize] = *local;
            identity.kind = identity.kind.child_kind(*local);
            identity.depth += 1;
        }
        identity
    }
}

impl Serde for Identity {
    fn ser(&self, writer: &mut dyn WireWrite) {
        self.depth.ser(writer);
        (self.kind as u8).ser(writer);
        for local in self.path() {
            local.ser(writer);
        }
    }

    fn de(reader: &mut WireReader) -> Result<Self, SerdeErr> {
        let depth = u8::de(reader)? as usize;
        if depth > MAX_IDENTITY_DEPTH {
            return Err(SerdeErr);
        }
        let kind = IdentityKind::from_u8(u8::de(reader)?).ok_or(SerdeErr)?;
        let mut path = [0u16; MAX_IDENTITY_DEPTH];
        for slot in path.iter_mut().take(depth) {
            *slot = u16::de(reader)?;
        }
        let identity = Self::from_path(&path[..depth]).map_err(|_| SerdeErr)?;
        // the kind byte is redundant with the path, a mismatch means a corrupt peer
        if identity.kind != kind {
            return Err(SerdeErr);
        }
        Ok(identity)
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}(", self.kind)?;
        for (index, local) in self.path().iter().enumerate() {
            if index > 0 {
                write!(f, ".")?;
            }
            write!(f, "{}", local)?;
        }
        write!(f, ")")
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
