pub mod hume_json_reader;
pub mod in_memory_source;
