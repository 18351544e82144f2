use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, VecDeque};

use ndarray::Array2;

use crate::aggregation::domain::identifier_profile::IdentifierProfile;
use crate::clustering::domain::cooccurrence_veto::CooccurrenceVeto;
use crate::clustering::infrastructure::math;
use crate::shared::identifier::Identifier;

/// Undirected weighted edge between node indices `a < b`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Edge {
    pub a: usize,
    pub b: usize,
    pub weight: f64,
}

impl Edge {
    /// Canonical total order: weight ascending, then `(a, b)`.
    ///
    /// Nodes are indexed in identifier order, so ties resolve
    /// lexicographically by the identifier pair.
    fn canonical_cmp(&self, other: &Edge) -> Ordering {
        self.weight
            .total_cmp(&other.weight)
            .then_with(|| self.a.cmp(&other.a))
            .then_with(|| self.b.cmp(&other.b))
    }
}

/// Similarity graph over identifier profiles.
///
/// Nodes are identifiers in canonical (sorted) order. Edges exist only for
/// distinct, non-vetoed pairs with nonzero similarity, and are kept sorted
/// in canonical order so the weakest edge is always at the front.
#[derive(Clone, Debug)]
pub struct SimilarityGraph {
    nodes: Vec<Identifier>,
    edges: VecDeque<Edge>,
    veto: CooccurrenceVeto,
}

impl SimilarityGraph {
    /// Builds the graph from profiles, frame co-occurrence and a precomputed
    /// similarity matrix indexed in `profiles` key order.
    pub fn build(
        profiles: &BTreeMap<Identifier, IdentifierProfile>,
        cooccurrence: &BTreeMap<u64, BTreeSet<Identifier>>,
        similarity: &Array2<f64>,
    ) -> Self {
        let nodes: Vec<Identifier> = profiles.keys().cloned().collect();
        let index: BTreeMap<&Identifier, usize> =
            profiles.keys().enumerate().map(|(i, id)| (id, i)).collect();
        let veto = CooccurrenceVeto::from_frames(cooccurrence, &index);

        let n = nodes.len();
        let mut edges = Vec::new();
        for a in 0..n {
            for b in (a + 1)..n {
                if veto.forbids(a, b) {
                    continue;
                }
                let weight = similarity[[a, b]];
                if weight != 0.0 {
                    edges.push(Edge { a, b, weight });
                }
            }
        }

        Self::from_edges(nodes, edges, veto)
    }

    fn from_edges(nodes: Vec<Identifier>, mut edges: Vec<Edge>, veto: CooccurrenceVeto) -> Self {
        edges.sort_by(Edge::canonical_cmp);
        Self {
            nodes,
            edges: edges.into(),
            veto,
        }
    }

    pub fn nodes(&self) -> &[Identifier] {
        &self.nodes
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn vetoed_pairs(&self) -> usize {
        self.veto.len()
    }

    /// Edges in canonical order, weakest first.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter()
    }

    pub fn has_edge(&self, a: &Identifier, b: &Identifier) -> bool {
        let (Some(ia), Some(ib)) = (self.index_of(a), self.index_of(b)) else {
            return false;
        };
        let (lo, hi) = if ia <= ib { (ia, ib) } else { (ib, ia) };
        self.edges.iter().any(|e| e.a == lo && e.b == hi)
    }

    pub fn weakest_edge(&self) -> Option<&Edge> {
        self.edges.front()
    }

    /// Permanently removes the globally weakest edge.
    pub fn remove_weakest_edge(&mut self) -> Option<Edge> {
        self.edges.pop_front()
    }

    /// Connected-component count, recomputed from the current edge set.
    pub fn component_count(&self) -> usize {
        let mut parent = self.union_all();
        math::count_roots(&mut parent)
    }

    /// Whether some component still joins two identifiers that share a frame.
    ///
    /// No vetoed pair has a direct edge, but two of them can still be
    /// connected through a third identifier similar to both.
    pub fn has_conflict(&self) -> bool {
        let mut parent = self.union_all();
        self.veto
            .pairs()
            .any(|(a, b)| math::find(&mut parent, a) == math::find(&mut parent, b))
    }

    /// Connected components as identifier sets, ordered by smallest member.
    pub fn components(&self) -> Vec<BTreeSet<Identifier>> {
        let mut parent = self.union_all();
        math::collect_groups(&mut parent)
            .into_iter()
            .map(|group| group.into_iter().map(|i| self.nodes[i].clone()).collect())
            .collect()
    }

    fn union_all(&self) -> Vec<usize> {
        let mut parent: Vec<usize> = (0..self.nodes.len()).collect();
        for edge in &self.edges {
            math::union(&mut parent, edge.a, edge.b);
        }
        parent
    }

    fn index_of(&self, id: &Identifier) -> Option<usize> {
        self.nodes.binary_search(id).ok()
    }
}
