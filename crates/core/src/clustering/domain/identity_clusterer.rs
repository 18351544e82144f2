use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;

use crate::aggregation::domain::feature_aggregator::AggregatedFeatures;
use crate::clustering::domain::identity_cluster::ClusteringOutcome;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ClusterError {
    #[error("target cluster count must be between 1 and {available}, got {requested}")]
    InvalidTargetCount { requested: usize, available: usize },
    #[error("clustering cancelled after {iterations} pruning steps")]
    Cancelled { iterations: usize },
    #[error("clustering deadline exceeded after {iterations} pruning steps")]
    DeadlineExceeded { iterations: usize },
}

/// Progress callback: `(pruned_edges, initial_edges)`. Returning `false` cancels.
pub type ProgressFn = Box<dyn Fn(usize, usize) -> bool + Send>;

/// Runtime knobs for one clustering call.
pub struct ClusteringConfig {
    /// Threads used for the pairwise similarity pass (1 = inline).
    pub workers: usize,
    pub cancelled: Arc<AtomicBool>,
    pub deadline: Option<Instant>,
    pub on_progress: Option<ProgressFn>,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            workers: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            cancelled: Arc::new(AtomicBool::new(false)),
            deadline: None,
            on_progress: None,
        }
    }
}

/// Domain interface for partitioning identifiers into identity clusters.
///
/// Every identifier with a profile ends up in exactly one cluster, and
/// identifiers that share a frame never share a cluster.
pub trait IdentityClusterer: Send {
    fn cluster(
        &self,
        features: &AggregatedFeatures,
        target: usize,
    ) -> Result<ClusteringOutcome, ClusterError>;
}
