/// Prefix of synthesized identity cluster labels (`unique_face_0`, ...).
pub const CLUSTER_LABEL_PREFIX: &str = "unique_face_";
