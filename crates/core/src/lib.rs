//! Face identity deduplication.
//!
//! Merges the transient track identifiers a face detector assigns across a
//! video into a requested number of identities, using mean bounding-box
//! geometry as the feature and frame co-occurrence as a hard constraint.

pub mod aggregation;
pub mod clustering;
pub mod ingestion;
pub mod pipeline;
pub mod shared;

pub use crate::clustering::domain::identity_cluster::{
    ClusteringOutcome, IdentityCluster, TargetStatus,
};
pub use crate::clustering::domain::identity_clusterer::ClusterError;
pub use crate::pipeline::extract_unique_faces_use_case::compute_identity_clusters;
pub use crate::shared::detection::{BoundingBox, Detection};
pub use crate::shared::identifier::Identifier;
