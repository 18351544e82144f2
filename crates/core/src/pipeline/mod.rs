pub mod extract_unique_faces_use_case;
pub mod pipeline_logger;
