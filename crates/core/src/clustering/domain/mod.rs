pub mod cooccurrence_veto;
pub mod identity_cluster;
pub mod identity_clusterer;
pub mod similarity_graph;
