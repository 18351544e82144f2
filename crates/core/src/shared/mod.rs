pub mod constants;
pub mod detection;
pub mod identifier;
