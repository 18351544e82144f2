//! Shared math utilities for clustering.
//!
//! Provides cosine similarity and union-find connectivity used by the
//! similarity graph and the pruning clusterer.

use std::collections::{BTreeSet, HashMap};

/// Cosine similarity of two feature vectors.
///
/// Returns 0.0 when either vector has zero norm (undefined, treated as
/// dissimilar so no edge is created).
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let mut dot = 0.0;
    let mut norm_a = 0.0;
    let mut norm_b = 0.0;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom == 0.0 {
        return 0.0;
    }
    dot / denom
}

/// Find root of element `i` with path halving for amortized near-O(1).
pub fn find(parent: &mut [usize], mut i: usize) -> usize {
    while parent[i] != i {
        parent[i] = parent[parent[i]];
        i = parent[i];
    }
    i
}

/// Merge the sets containing `a` and `b`. Returns `true` if they were disjoint.
pub fn union(parent: &mut [usize], a: usize, b: usize) -> bool {
    let ra = find(parent, a);
    let rb = find(parent, b);
    if ra != rb {
        parent[ra] = rb;
        true
    } else {
        false
    }
}

/// Number of disjoint sets in a union-find `parent` array.
pub fn count_roots(parent: &mut [usize]) -> usize {
    (0..parent.len()).filter(|&i| find(parent, i) == i).count()
}

/// Collect union-find sets as groups of node indices.
///
/// Groups are sorted by their smallest index, so when indices follow the
/// canonical identifier order the output order is deterministic.
pub fn collect_groups(parent: &mut [usize]) -> Vec<BTreeSet<usize>> {
    let mut groups: HashMap<usize, BTreeSet<usize>> = HashMap::new();
    for idx in 0..parent.len() {
        let root = find(parent, idx);
        groups.entry(root).or_default().insert(idx);
    }

    let mut result: Vec<BTreeSet<usize>> = groups.into_values().collect();
    result.sort_by_key(|g| g.first().copied());
    result
}
