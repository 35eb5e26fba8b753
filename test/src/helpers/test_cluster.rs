use arbor_cluster::{
    ClusterConfig, ClusterError, ClusterObjectInfo, Context, EntityKey, Identity, PeerAddress,
    Process, Protocol, Task, TaskKey, TaskResult,
};

use crate::{protocol, register_greeting, LocalTransport};

/// Upper bound on updates a test waits for something to happen
pub const MAX_TICKS: usize = 64;

pub fn init_logging() {
    env_logger::builder().is_test(true).try_init().ok();
}

/// Several processes sharing one in-memory network, updated in lockstep.
/// Process 0 is the root once `host` was called.
pub struct TestCluster {
    pub transport: LocalTransport,
    pub processes: Vec<Process>,
    protocol: fn() -> Protocol,
}

impl Default for TestCluster {
    fn default() -> Self {
        Self::new()
    }
}

impl TestCluster {
    pub fn new() -> Self {
        Self::with_protocol(protocol)
    }

    /// Builds every process with the protocol `protocol` returns
    pub fn with_protocol(protocol: fn() -> Protocol) -> Self {
        Self {
            transport: LocalTransport::new(),
            processes: Vec::new(),
            protocol,
        }
    }

    /// Adds a process that has neither hosted nor joined yet
    pub fn add(&mut self, advertise: &PeerAddress) -> usize {
        let mut process = Process::new(
            (self.protocol)(),
            ClusterConfig::new(advertise.clone()),
            self.transport.boxed(),
        )
        .expect("process could not be created");
        register_greeting(&mut process);
        self.processes.push(process);
        self.processes.len() - 1
    }

    /// Adds the root process, listening at `advertise`
    pub fn host(&mut self, advertise: PeerAddress) -> usize {
        let index = self.add(&advertise);
        self.processes[index].host().expect("root could not host");
        index
    }

    /// Adds a process that joins the root at `root_address`
    pub fn join_at(&mut self, root_address: &PeerAddress, advertise: PeerAddress) -> usize {
        let index = self.add(&advertise);
        self.processes[index]
            .join(root_address)
            .expect("process could not start joining");
        index
    }

    /// Adds a process joining the root (process 0) and updates until it is ready
    pub fn join(&mut self, advertise: PeerAddress) -> usize {
        let root_address = self.processes[0].cluster().config().advertise.clone();
        let index = self.join_at(&root_address, advertise);
        assert!(
            self.update_until(|cluster| cluster.processes[index].is_ready()),
            "process {} never joined",
            index
        );
        index
    }

    pub fn process(&self, index: usize) -> &Process {
        &self.processes[index]
    }

    pub fn process_mut(&mut self, index: usize) -> &mut Process {
        &mut self.processes[index]
    }

    /// Updates every process once, in order
    pub fn update(&mut self) {
        for process in self.processes.iter_mut() {
            process.update();
        }
    }

    pub fn update_times(&mut self, times: usize) {
        for _ in 0..times {
            self.update();
        }
    }

    /// Updates until `done` holds, giving up after `MAX_TICKS` rounds
    pub fn update_until(&mut self, done: impl Fn(&TestCluster) -> bool) -> bool {
        for _ in 0..MAX_TICKS {
            if done(self) {
                return true;
            }
            self.update();
        }
        done(self)
    }

    /// Updates until `result` resolves and returns it
    pub fn wait_for<T>(&mut self, result: &TaskResult<T>) -> Result<T, ClusterError> {
        let resolved = self.update_until(|_| result.is_ready());
        assert!(resolved, "task did not finish within {} updates", MAX_TICKS);
        result.take().expect("result was already taken")
    }

    pub fn spawn<T: Task<Context> + 'static>(
        &mut self,
        index: usize,
        owner: EntityKey,
        task: T,
    ) -> TaskKey {
        self.processes[index].spawn(owner, task)
    }

    /// Entity of the root cluster object on process `index`
    pub fn root_object(&self, index: usize) -> EntityKey {
        self.processes[index]
            .root_object()
            .expect("process has no root object yet")
    }

    pub fn peer_id(&self, index: usize) -> Identity {
        self.processes[index]
            .peer_id()
            .expect("process has no peer identity yet")
    }

    /// Object info for `entity` on process `index`
    pub fn object_info(&self, index: usize, entity: EntityKey) -> Option<ClusterObjectInfo> {
        self.processes[index].context().object_info(entity)
    }
}
