use std::collections::BTreeSet;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::shared::constants::CLUSTER_LABEL_PREFIX;
use crate::shared::identifier::Identifier;

/// A set of identifiers inferred to be the same person.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IdentityCluster {
    pub label: String,
    pub members: BTreeSet<Identifier>,
}

impl IdentityCluster {
    pub fn new(index: usize, members: BTreeSet<Identifier>) -> Self {
        Self {
            label: format!("{CLUSTER_LABEL_PREFIX}{index}"),
            members,
        }
    }
}

/// How the final cluster count relates to the requested target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TargetStatus {
    /// Component count equals the target.
    Reached,
    /// Every edge was pruned and the count is still below the target.
    Exhausted { requested: usize, achieved: usize },
    /// More components than the target. Either co-occurrence alone already
    /// split the graph beyond it, or pruning continued past it to separate two
    /// faces from the same frame that were linked through a third. Edges are
    /// never added back, so the finer partition is returned.
    Exceeded { requested: usize, achieved: usize },
}

impl TargetStatus {
    pub fn is_reached(&self) -> bool {
        matches!(self, TargetStatus::Reached)
    }
}

/// Counters describing one clustering run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ClusteringStats {
    pub identifiers: usize,
    pub vetoed_pairs: usize,
    pub initial_edges: usize,
    pub pruned_edges: usize,
}

/// Result of clustering: the partition plus how it was reached.
#[derive(Clone, Debug, PartialEq)]
pub struct ClusteringOutcome {
    /// Clusters in label order (`unique_face_0`, `unique_face_1`, ...).
    pub clusters: Vec<IdentityCluster>,
    pub status: TargetStatus,
    /// Identifiers left out for lack of a usable profile.
    pub excluded: Vec<Identifier>,
    pub stats: ClusteringStats,
}

impl ClusteringOutcome {
    pub fn empty() -> Self {
        Self {
            clusters: Vec::new(),
            status: TargetStatus::Reached,
            excluded: Vec::new(),
            stats: ClusteringStats::default(),
        }
    }

    pub fn cluster_count(&self) -> usize {
        self.clusters.len()
    }

    /// Label of the cluster containing `id`, if any.
    pub fn label_of(&self, id: &Identifier) -> Option<&str> {
        self.clusters
            .iter()
            .find(|c| c.members.contains(id))
            .map(|c| c.label.as_str())
    }

    /// Pretty-printed `{ label: [identifier, ...] }` mapping in label order.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl Serialize for ClusteringOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.clusters.len()))?;
        for cluster in &self.clusters {
            map.serialize_entry(&cluster.label, &cluster.members)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn members(tokens: &[&str]) -> BTreeSet<Identifier> {
        tokens.iter().map(|t| Identifier::from(*t)).collect()
    }

    #[test]
    fn test_label_uses_prefix_and_index() {
        assert_eq!(IdentityCluster::new(3, BTreeSet::new()).label, "unique_face_3");
    }

    #[test]
    fn test_json_keeps_label_order_past_ten() {
        let clusters: Vec<IdentityCluster> = (0..12)
            .map(|i| IdentityCluster::new(i, members(&[format!("id{i}").as_str()])))
            .collect();
        let outcome = ClusteringOutcome {
            clusters,
            ..ClusteringOutcome::empty()
        };
        let json = outcome.to_json().unwrap();
        let pos2 = json.find("\"unique_face_2\"").unwrap();
        let pos10 = json.find("\"unique_face_10\"").unwrap();
        assert!(pos2 < pos10);
    }

    #[test]
    fn test_json_mapping_shape() {
        let outcome = ClusteringOutcome {
            clusters: vec![IdentityCluster::new(0, members(&["face_9", "face_15"]))],
            ..ClusteringOutcome::empty()
        };
        let value: serde_json::Value = serde_json::from_str(&outcome.to_json().unwrap()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({ "unique_face_0": ["face_15", "face_9"] })
        );
    }

    #[test]
    fn test_label_of() {
        let outcome = ClusteringOutcome {
            clusters: vec![
                IdentityCluster::new(0, members(&["a"])),
                IdentityCluster::new(1, members(&["b", "c"])),
            ],
            ..ClusteringOutcome::empty()
        };
        assert_eq!(outcome.label_of(&Identifier::from("c")), Some("unique_face_1"));
        assert_eq!(outcome.label_of(&Identifier::from("z")), None);
    }

    #[test]
    fn test_empty_outcome_is_reached() {
        let outcome = ClusteringOutcome::empty();
        assert!(outcome.status.is_reached());
        assert_eq!(outcome.to_json().unwrap(), "{}");
    }
}
