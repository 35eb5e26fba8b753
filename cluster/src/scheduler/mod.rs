mod scheduler;
mod task;

pub use scheduler::{Scheduler, TaskKey};
pub use task::{Step, Task, TaskContext};
