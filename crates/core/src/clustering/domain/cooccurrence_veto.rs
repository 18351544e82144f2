use std::collections::{BTreeMap, BTreeSet};

use crate::shared::identifier::Identifier;

/// Pairs of nodes that were observed in the same frame.
///
/// Two identifiers visible simultaneously are different people, so a vetoed
/// pair may never be joined by an edge, whatever its similarity. The veto is
/// frame-independent: one shared frame forbids the pair for the whole run.
#[derive(Clone, Debug, Default)]
pub struct CooccurrenceVeto {
    pairs: BTreeSet<(usize, usize)>,
}

impl CooccurrenceVeto {
    /// Builds the veto over node indices.
    ///
    /// `index` maps identifiers to graph nodes; identifiers absent from it
    /// (e.g. excluded for lack of a profile) are ignored.
    pub fn from_frames(
        frames: &BTreeMap<u64, BTreeSet<Identifier>>,
        index: &BTreeMap<&Identifier, usize>,
    ) -> Self {
        let mut pairs = BTreeSet::new();
        for identifiers in frames.values() {
            let nodes: Vec<usize> = identifiers
                .iter()
                .filter_map(|id| index.get(id).copied())
                .collect();
            for (k, &a) in nodes.iter().enumerate() {
                for &b in &nodes[k + 1..] {
                    pairs.insert(ordered(a, b));
                }
            }
        }
        Self { pairs }
    }

    pub fn forbids(&self, a: usize, b: usize) -> bool {
        self.pairs.contains(&ordered(a, b))
    }

    /// Vetoed pairs as `(lower, higher)` node indices.
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.pairs.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

fn ordered(a: usize, b: usize) -> (usize, usize) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}
