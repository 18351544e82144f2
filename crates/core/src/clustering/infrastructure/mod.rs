pub mod math;
pub mod pruning_clusterer;
pub mod similarity_matrix;
