mod context;
mod events;
mod process;

pub use context::Context;
pub use events::ProcessEvent;
pub use process::Process;
