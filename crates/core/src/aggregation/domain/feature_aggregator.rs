use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use crate::aggregation::domain::identifier_profile::IdentifierProfile;
use crate::shared::detection::Detection;
use crate::shared::identifier::Identifier;

/// Per-identifier profiles plus the frame co-occurrence table.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AggregatedFeatures {
    pub profiles: BTreeMap<Identifier, IdentifierProfile>,
    /// frame → identifiers observed together in that frame.
    pub cooccurrence: BTreeMap<u64, BTreeSet<Identifier>>,
    /// Identifiers seen in the input that have no usable profile.
    pub excluded: Vec<Identifier>,
}

impl AggregatedFeatures {
    /// Number of distinct identifiers observed, with or without a profile.
    pub fn observed_identifiers(&self) -> usize {
        self.profiles.len() + self.excluded.len()
    }

    /// Indices into [`IdentifierProfile::vector`] that are finite for every profile.
    pub fn shared_feature_columns(&self) -> Vec<usize> {
        (0..4)
            .filter(|&col| self.profiles.values().all(|p| p.vector()[col].is_finite()))
            .collect()
    }

    /// Profile vectors in identifier order, narrowed to the shared columns
    /// so every vector has the same dimensions.
    pub fn feature_vectors(&self) -> Vec<Vec<f64>> {
        let columns = self.shared_feature_columns();
        if columns.len() < 4 && !self.profiles.is_empty() {
            log::warn!(
                "Comparing profiles over {} of 4 box fields; the rest are missing for some identifiers",
                columns.len()
            );
        }
        self.profiles
            .values()
            .map(|p| {
                let vector = p.vector();
                columns.iter().map(|&col| vector[col]).collect()
            })
            .collect()
    }
}

/// Reduces raw detections to one mean feature vector per identifier.
///
/// Non-finite box fields are dropped per field before averaging. A field
/// with no finite value at all stays NaN in the profile. An identifier with
/// no finite value in any field is reported in [`AggregatedFeatures::excluded`].
pub struct FeatureAggregator;

impl FeatureAggregator {
    pub fn new() -> Self {
        Self
    }

    pub fn aggregate(&self, detections: &[Detection]) -> AggregatedFeatures {
        let mut by_identifier: BTreeMap<&Identifier, Vec<&Detection>> = BTreeMap::new();
        let mut cooccurrence: BTreeMap<u64, BTreeSet<Identifier>> = BTreeMap::new();

        for det in detections {
            by_identifier.entry(&det.identifier).or_default().push(det);
            cooccurrence
                .entry(det.frame)
                .or_default()
                .insert(det.identifier.clone());
        }

        let mut profiles = BTreeMap::new();
        let mut excluded = Vec::new();

        for (identifier, mut dets) in by_identifier {
            // Fixed summation order keeps the means bit-identical for any input order.
            dets.sort_by(|a, b| canonical_order(a, b));
            match mean_profile(&dets) {
                Some(profile) => {
                    profiles.insert(identifier.clone(), profile);
                }
                None => {
                    log::warn!(
                        "Identifier {identifier} has no usable box data in {} detection(s); excluded from clustering",
                        dets.len()
                    );
                    excluded.push(identifier.clone());
                }
            }
        }

        log::debug!(
            "Aggregated {} profiles over {} frames ({} excluded)",
            profiles.len(),
            cooccurrence.len(),
            excluded.len()
        );

        AggregatedFeatures {
            profiles,
            cooccurrence,
            excluded,
        }
    }
}

impl Default for FeatureAggregator {
    fn default() -> Self {
        Self::new()
    }
}

fn canonical_order(a: &Detection, b: &Detection) -> Ordering {
    a.frame.cmp(&b.frame).then_with(|| {
        a.bbox
            .features()
            .iter()
            .zip(b.bbox.features().iter())
            .map(|(x, y)| x.total_cmp(y))
            .find(|o| o.is_ne())
            .unwrap_or(Ordering::Equal)
    })
}

fn mean_profile(dets: &[&Detection]) -> Option<IdentifierProfile> {
    let mut sums = [0.0f64; 4];
    let mut counts = [0usize; 4];

    for det in dets {
        for (i, value) in det.bbox.features().into_iter().enumerate() {
            if value.is_finite() {
                sums[i] += value;
                counts[i] += 1;
            }
        }
    }

    if counts.iter().all(|&c| c == 0) {
        return None;
    }

    let mean = |i: usize| match counts[i] {
        0 => f64::NAN,
        n => sums[i] / n as f64,
    };
    Some(IdentifierProfile {
        width: mean(0),
        height: mean(1),
        x0: mean(2),
        y0: mean(3),
        detections: dets.len(),
    })
}
