use std::collections::VecDeque;

use log::debug;

use arbor_shared::{Identity, ResponseId};

use crate::{network::NodeRef, world::EntityKey};

/// One lock request: who sent it and the id its grant is answered on
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LockWaiter {
    pub node: NodeRef,
    pub response_id: ResponseId,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum UnlockOutcome {
    /// Requester did not hold the lock, nothing changed
    NotLocker,
    /// Lock is free again
    Released,
    /// Lock passed to the next waiter, whose request must now be answered
    Handover(LockWaiter),
}

/// Cluster object state kept beside its entity. The owner is the only
/// process whose copy of the lock state is authoritative.
#[derive(Clone, Debug)]
pub struct ClusterObject {
    owner: Identity,
    holder: Option<LockWaiter>,
    waiters: VecDeque<LockWaiter>,
}

impl ClusterObject {
    pub fn new(owner: Identity) -> Self {
        Self {
            owner,
            holder: None,
            waiters: VecDeque::new(),
        }
    }

    /// Peer identity of the owning process
    pub fn owner(&self) -> Identity {
        self.owner
    }

    pub fn locker(&self) -> Option<NodeRef> {
        self.holder.map(|holder| holder.node)
    }

    /// The granted request currently holding the lock
    pub fn holder(&self) -> Option<LockWaiter> {
        self.holder
    }

    pub fn is_locked(&self) -> bool {
        self.holder.is_some()
    }

    pub fn waiting(&self) -> usize {
        self.waiters.len()
    }

    /// Takes the lock if it is free, otherwise queues the requester.
    /// Returns true when the lock was granted right away.
    pub fn lock(&mut self, node: NodeRef, response_id: ResponseId) -> bool {
        let request = LockWaiter { node, response_id };
        if self.holder.is_none() {
            self.holder = Some(request);
            true
        } else {
            self.waiters.push_back(request);
            false
        }
    }

    pub fn unlock(&mut self, node: NodeRef) -> UnlockOutcome {
        if self.locker() != Some(node) {
            return UnlockOutcome::NotLocker;
        }
        self.pass_lock()
    }

    /// Withdraws one lock request its sender gave up on. A queued request
    /// leaves the queue. A granted one releases the lock, which passes on.
    /// Returns the waiter that received the lock.
    pub fn cancel(&mut self, node: NodeRef, response_id: ResponseId) -> Option<LockWaiter> {
        let request = LockWaiter { node, response_id };
        if self.holder == Some(request) {
            return match self.pass_lock() {
                UnlockOutcome::Handover(waiter) => Some(waiter),
                _ => None,
            };
        }
        self.waiters.retain(|waiter| *waiter != request);
        None
    }

    /// Forgets a node that went away: its queued requests are dropped and a
    /// lock it held passes on. Returns the waiter that received the lock.
    pub fn release_node(&mut self, node: NodeRef) -> Option<LockWaiter> {
        let before = self.waiters.len();
        self.waiters.retain(|waiter| waiter.node != node);
        let dropped = before - self.waiters.len();
        if dropped > 0 {
            debug!("Dropped {} queued lock requests of {:?}", dropped, node);
        }
        if self.locker() != Some(node) {
            return None;
        }
        match self.pass_lock() {
            UnlockOutcome::Handover(waiter) => Some(waiter),
            _ => None,
        }
    }

    fn pass_lock(&mut self) -> UnlockOutcome {
        match self.waiters.pop_front() {
            Some(waiter) => {
                self.holder = Some(waiter);
                UnlockOutcome::Handover(waiter)
            }
            None => {
                self.holder = None;
                UnlockOutcome::Released
            }
        }
    }
}

/// Where a cluster object lives locally and who owns it
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ClusterObjectInfo {
    pub entity: EntityKey,
    pub identity: Identity,
    pub owner: Identity,
}
