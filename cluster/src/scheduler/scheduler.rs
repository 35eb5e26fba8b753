use std::collections::BTreeMap;

use log::{debug, trace};

use crate::{
    scheduler::task::{Step, Task, TaskContext},
    world::EntityKey,
};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskKey(u64);

struct TaskSlot<C> {
    owner: EntityKey,
    // innermost active child last
    stack: Vec<Box<dyn Task<C>>>,
}

/// Steps every active task once per tick, in spawn order
pub struct Scheduler<C: TaskContext> {
    tasks: BTreeMap<TaskKey, TaskSlot<C>>,
    next_key: u64,
}

impl<C: TaskContext> Default for Scheduler<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: TaskContext> Scheduler<C> {
    pub fn new() -> Self {
        Self {
            tasks: BTreeMap::new(),
            next_key: 0,
        }
    }

    /// Schedules `task` for the next tick. It is dropped without further
    /// stepping once `owner` no longer exists.
    pub fn spawn(&mut self, owner: EntityKey, task: Box<dyn Task<C>>) -> TaskKey {
        let key = TaskKey(self.next_key);
        self.next_key += 1;
        trace!("Spawned task {:?} '{}' on {:?}", key, task.name(), owner);
        self.tasks.insert(
            key,
            TaskSlot {
                owner,
                stack: vec![task],
            },
        );
        key
    }

    pub fn is_running(&self, key: TaskKey) -> bool {
        self.tasks.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn tick(&mut self, ctx: &mut C) {
        for (owner, task) in ctx.take_spawned() {
            self.spawn(owner, task);
        }

        let keys: Vec<TaskKey> = self.tasks.keys().copied().collect();
        for key in keys {
            let Some(slot) = self.tasks.get_mut(&key) else {
                continue;
            };
            if !ctx.is_alive(slot.owner) {
                debug!("Owner {:?} of task {:?} is gone, dropping it", slot.owner, key);
                for task in slot.stack.iter_mut().rev() {
                    task.cancel(ctx);
                }
                self.tasks.remove(&key);
                continue;
            }
            if Self::step_slot(slot, ctx) {
                self.tasks.remove(&key);
            }
        }
    }

    /// Steps the innermost task until it is pending or the whole stack is
    /// done. Returns true once the stack is empty.
    fn step_slot(slot: &mut TaskSlot<C>, ctx: &mut C) -> bool {
        while let Some(task) = slot.stack.last_mut() {
            match task.step(ctx) {
                Step::Pending => return false,
                Step::Yield(child) => slot.stack.push(child),
                Step::Done => {
                    slot.stack.pop();
                }
            }
        }
        true
    }
}
