//! Greedy weakest-edge pruning clusterer.
//!
//! Builds the co-occurrence-vetoed similarity graph over identifier
//! profiles, then cuts the globally weakest edge one at a time until the
//! component count reaches the target. Each connected component of the
//! pruned graph is one identity. No similarity threshold is needed: the
//! target count decides how far pruning goes.

use std::sync::atomic::Ordering;
use std::time::Instant;

use crate::aggregation::domain::feature_aggregator::AggregatedFeatures;
use crate::clustering::domain::identity_cluster::{
    ClusteringOutcome, ClusteringStats, IdentityCluster, TargetStatus,
};
use crate::clustering::domain::identity_clusterer::{
    ClusterError, ClusteringConfig, IdentityClusterer,
};
use crate::clustering::domain::similarity_graph::SimilarityGraph;
use crate::clustering::infrastructure::similarity_matrix::similarity_matrix;

pub struct PruningClusterer {
    config: ClusteringConfig,
}

impl PruningClusterer {
    pub fn new(config: ClusteringConfig) -> Self {
        Self { config }
    }

    fn check_interrupt(&self, pruned: usize, total: usize) -> Result<(), ClusterError> {
        if self.config.cancelled.load(Ordering::Relaxed) {
            return Err(ClusterError::Cancelled { iterations: pruned });
        }
        if let Some(deadline) = self.config.deadline {
            if Instant::now() >= deadline {
                return Err(ClusterError::DeadlineExceeded { iterations: pruned });
            }
        }
        if let Some(ref callback) = self.config.on_progress {
            if !callback(pruned, total) {
                return Err(ClusterError::Cancelled { iterations: pruned });
            }
        }
        Ok(())
    }
}

impl Default for PruningClusterer {
    fn default() -> Self {
        Self::new(ClusteringConfig::default())
    }
}

impl IdentityClusterer for PruningClusterer {
    fn cluster(
        &self,
        features: &AggregatedFeatures,
        target: usize,
    ) -> Result<ClusteringOutcome, ClusterError> {
        let available = features.observed_identifiers();
        if target == 0 || (available > 0 && target > available) {
            return Err(ClusterError::InvalidTargetCount {
                requested: target,
                available,
            });
        }
        if available == 0 {
            return Ok(ClusteringOutcome::empty());
        }

        let vectors = features.feature_vectors();
        let similarity = similarity_matrix(&vectors, self.config.workers);
        let mut graph = SimilarityGraph::build(&features.profiles, &features.cooccurrence, &similarity);

        let initial_edges = graph.edge_count();
        let mut components = graph.component_count();
        log::info!(
            "Similarity graph: {} identifiers, {} edges, {} co-occurring pairs, {} components",
            graph.node_count(),
            initial_edges,
            graph.vetoed_pairs(),
            components
        );

        let mut pruned = 0;
        // Past the target, keep pruning until no component joins two faces seen in the same frame.
        while graph.edge_count() > 0 && (components < target || graph.has_conflict()) {
            self.check_interrupt(pruned, initial_edges)?;
            let Some(edge) = graph.remove_weakest_edge() else {
                break;
            };
            pruned += 1;
            components = graph.component_count();
            log::debug!(
                "Pruned {} - {} (similarity {:.6}): {components} components",
                graph.nodes()[edge.a],
                graph.nodes()[edge.b],
                edge.weight
            );
        }

        let status = match components.cmp(&target) {
            std::cmp::Ordering::Equal => TargetStatus::Reached,
            std::cmp::Ordering::Less => TargetStatus::Exhausted {
                requested: target,
                achieved: components,
            },
            std::cmp::Ordering::Greater => TargetStatus::Exceeded {
                requested: target,
                achieved: components,
            },
        };
        match status {
            TargetStatus::Reached => {
                log::info!("Reached {target} identities after pruning {pruned} edges")
            }
            TargetStatus::Exhausted { achieved, .. } => log::warn!(
                "No edges left to prune: {achieved} identities found, {target} requested"
            ),
            TargetStatus::Exceeded { achieved, .. } => log::warn!(
                "Co-occurring faces force {achieved} identities, {target} requested"
            ),
        }

        let clusters = graph
            .components()
            .into_iter()
            .enumerate()
            .map(|(i, members)| IdentityCluster::new(i, members))
            .collect();

        Ok(ClusteringOutcome {
            clusters,
            status,
            excluded: features.excluded.clone(),
            stats: ClusteringStats {
                identifiers: graph.node_count(),
                vetoed_pairs: graph.vetoed_pairs(),
                initial_edges,
                pruned_edges: pruned,
            },
        })
    }
}
