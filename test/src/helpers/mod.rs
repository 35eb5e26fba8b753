mod test_cluster;

pub use test_cluster::{init_logging, TestCluster, MAX_TICKS};
