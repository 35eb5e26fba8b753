mod allocator;
mod error;
mod identity;

pub use allocator::{IdentityAllocator, PeerIdentityAllocator};
pub use error::IdentityError;
pub use identity::{Identity, IdentityKind, MAX_IDENTITY_DEPTH};
