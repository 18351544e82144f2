pub mod feature_aggregator;
pub mod identifier_profile;
