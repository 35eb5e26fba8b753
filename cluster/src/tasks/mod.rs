//! Cluster protocol operations as scheduler tasks. Spawn one with
//! `Process::spawn`, keep the cell returned by its `result()` and check it
//! after later updates.

mod child;
mod join;
mod lock;
mod message;

pub use child::{CreateChildObjectTask, GetChildTask};
pub use join::JoinClusterTask;
pub use lock::{LockObjectTask, UnlockObjectTask};
pub use message::{ClusterObjectMessageTask, ClusterProxyMessageTask, EntityMessageTask};

use arbor_shared::Outcome;

use crate::error::ClusterError;

/// Where a task leaves its result
pub type TaskResult<T> = Outcome<Result<T, ClusterError>>;

/// Result a finished sub-task left behind
fn child_result<T>(child: &TaskResult<T>, task: &'static str) -> Result<T, ClusterError> {
    child
        .take()
        .unwrap_or(Err(ClusterError::NoResult { task }))
}
