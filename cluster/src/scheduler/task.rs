use crate::world::EntityKey;

/// What a task asks of the scheduler after one step
pub enum Step<C> {
    /// Nothing more to do this tick, step again next tick
    Pending,
    /// Suspend until the child finishes. The child is stepped right away and
    /// the parent resumes in the same tick the child completes.
    Yield(Box<dyn Task<C>>),
    Done,
}

/// A resumable unit of protocol logic
pub trait Task<C> {
    fn step(&mut self, ctx: &mut C) -> Step<C>;

    /// Called instead of further steps when the scheduler drops the task
    /// before it finished, so it can withdraw requests still in flight
    fn cancel(&mut self, _ctx: &mut C) {}

    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// What the scheduler needs from the state tasks run against
pub trait TaskContext: Sized {
    /// Whether the entity owning a task still exists
    fn is_alive(&self, owner: EntityKey) -> bool;

    /// Tasks spawned by other tasks or handlers since the last call
    fn take_spawned(&mut self) -> Vec<(EntityKey, Box<dyn Task<Self>>)>;
}
