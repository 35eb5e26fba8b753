mod error;
mod frame;
mod network_event;

pub use error::EventError;
pub use frame::{pack_frames, read_frame};
pub use network_event::{
    EntityMessageEvent, ExecKind, NetworkEvent, ResponseEvent, RpcEvent, SyncEvent,
    MAX_PAYLOAD_BYTES, MAX_RPC_PARAMS,
};
