use crate::ingestion::domain::detection_source::{DetectionSource, IngestError};
use crate::shared::detection::Detection;

/// Detection source backed by records already held in memory.
pub struct InMemorySource {
    detections: Vec<Detection>,
}

impl InMemorySource {
    pub fn new(detections: Vec<Detection>) -> Self {
        Self { detections }
    }
}

impl DetectionSource for InMemorySource {
    fn load(&mut self) -> Result<Vec<Detection>, IngestError> {
        Ok(std::mem::take(&mut self.detections))
    }
}
