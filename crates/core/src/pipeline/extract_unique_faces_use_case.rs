use std::time::Instant;

use crate::aggregation::domain::feature_aggregator::FeatureAggregator;
use crate::clustering::domain::identity_cluster::ClusteringOutcome;
use crate::clustering::domain::identity_clusterer::{
    ClusterError, ClusteringConfig, IdentityClusterer,
};
use crate::clustering::infrastructure::pruning_clusterer::PruningClusterer;
use crate::ingestion::domain::detection_source::DetectionSource;
use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::shared::detection::Detection;

/// Clusters in-memory detections into `target` identities with default settings.
///
/// Empty input yields an empty outcome. The returned clusters partition
/// every identifier that has a usable profile.
pub fn compute_identity_clusters(
    detections: &[Detection],
    target: usize,
) -> Result<ClusteringOutcome, ClusterError> {
    let features = FeatureAggregator::new().aggregate(detections);
    PruningClusterer::new(ClusteringConfig::default()).cluster(&features, target)
}

/// Loads detections, aggregates profiles and merges identifiers into
/// `target` unique faces.
pub struct ExtractUniqueFacesUseCase {
    source: Box<dyn DetectionSource>,
    aggregator: FeatureAggregator,
    clusterer: Box<dyn IdentityClusterer>,
    logger: Box<dyn PipelineLogger>,
}

impl ExtractUniqueFacesUseCase {
    pub fn new(
        source: Box<dyn DetectionSource>,
        clusterer: Box<dyn IdentityClusterer>,
        logger: Box<dyn PipelineLogger>,
    ) -> Self {
        Self {
            source,
            aggregator: FeatureAggregator::new(),
            clusterer,
            logger,
        }
    }

    pub fn execute(
        &mut self,
        target: usize,
    ) -> Result<ClusteringOutcome, Box<dyn std::error::Error>> {
        let started = Instant::now();
        let detections = self.source.load()?;
        self.logger.timing("load", elapsed_ms(started));
        self.logger.metric("detections", detections.len() as f64);

        let started = Instant::now();
        let features = self.aggregator.aggregate(&detections);
        self.logger.timing("aggregate", elapsed_ms(started));
        self.logger.metric("identifiers", features.profiles.len() as f64);
        self.logger.metric("frames", features.cooccurrence.len() as f64);
        if !features.excluded.is_empty() {
            self.logger.info(&format!(
                "{} identifier(s) without usable box data were excluded",
                features.excluded.len()
            ));
        }

        let started = Instant::now();
        let outcome = self.clusterer.cluster(&features, target)?;
        self.logger.timing("cluster", elapsed_ms(started));
        self.logger.metric("edges", outcome.stats.initial_edges as f64);
        self.logger.metric("pruned_edges", outcome.stats.pruned_edges as f64);
        self.logger.metric("clusters", outcome.cluster_count() as f64);

        self.logger.info(&format!(
            "Merged {} identifiers into {} unique faces",
            outcome.stats.identifiers,
            outcome.cluster_count()
        ));
        self.logger.summary();
        Ok(outcome)
    }
}

fn elapsed_ms(started: Instant) -> f64 {
    started.elapsed().as_secs_f64() * 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use crate::aggregation::domain::feature_aggregator::AggregatedFeatures;
    use crate::clustering::domain::identity_cluster::TargetStatus;
    use crate::ingestion::domain::detection_source::IngestError;
    use crate::ingestion::infrastructure::in_memory_source::InMemorySource;
    use crate::shared::detection::BoundingBox;
    use crate::shared::identifier::Identifier;

    // --- Stubs ---

    struct FailingSource;

    impl DetectionSource for FailingSource {
        fn load(&mut self) -> Result<Vec<Detection>, IngestError> {
            Err(IngestError::MissingField {
                field: "box",
                context: "face group 0 prediction 2".to_string(),
            })
        }
    }

    struct RecordingClusterer {
        seen: Arc<Mutex<Vec<(AggregatedFeatures, usize)>>>,
    }

    impl IdentityClusterer for RecordingClusterer {
        fn cluster(
            &self,
            features: &AggregatedFeatures,
            target: usize,
        ) -> Result<ClusteringOutcome, ClusterError> {
            self.seen.lock().unwrap().push((features.clone(), target));
            Ok(ClusteringOutcome::empty())
        }
    }

    #[derive(Default)]
    struct SharedLog {
        timings: Vec<String>,
        metrics: Vec<(String, f64)>,
        summaries: usize,
    }

    struct RecordingLogger {
        log: Arc<Mutex<SharedLog>>,
    }

    impl PipelineLogger for RecordingLogger {
        fn timing(&mut self, stage: &str, _duration_ms: f64) {
            self.log.lock().unwrap().timings.push(stage.to_string());
        }
        fn metric(&mut self, name: &str, value: f64) {
            self.log
                .lock()
                .unwrap()
                .metrics
                .push((name.to_string(), value));
        }
        fn info(&mut self, _message: &str) {}
        fn summary(&self) {
            self.log.lock().unwrap().summaries += 1;
        }
    }

    // --- Helpers ---

    fn det(id: &str, frame: u64, x: f64, y: f64, w: f64, h: f64) -> Detection {
        Detection::new(id, frame, BoundingBox::new(x, y, w, h))
    }

    fn inline_clusterer() -> Box<dyn IdentityClusterer> {
        Box::new(PruningClusterer::new(ClusteringConfig {
            workers: 1,
            ..ClusteringConfig::default()
        }))
    }

    fn video_detections() -> Vec<Detection> {
        vec![
            // Two people on screen together in frames 0-1.
            det("face_1", 0, 100.0, 100.0, 30.0, 40.0),
            det("face_2", 0, 400.0, 90.0, 60.0, 70.0),
            det("face_1", 1, 101.0, 100.0, 30.0, 40.0),
            det("face_2", 1, 401.0, 91.0, 60.0, 70.0),
            // Detector lost both tracks and re-assigned identifiers.
            det("face_3", 5, 102.0, 101.0, 31.0, 40.0),
            det("face_4", 5, 399.0, 92.0, 61.0, 69.0),
            det("face_3", 6, 103.0, 101.0, 31.0, 41.0),
            det("face_4", 6, 398.0, 92.0, 61.0, 70.0),
        ]
    }

    // --- Tests ---

    #[test]
    fn test_reassigned_tracks_merge_back_to_two_people() {
        let mut use_case = ExtractUniqueFacesUseCase::new(
            Box::new(InMemorySource::new(video_detections())),
            inline_clusterer(),
            Box::new(crate::pipeline::pipeline_logger::NullPipelineLogger),
        );
        let outcome = use_case.execute(2).unwrap();

        assert_eq!(outcome.status, TargetStatus::Reached);
        assert_eq!(outcome.cluster_count(), 2);
        let id = |t: &str| Identifier::from(t);
        assert_eq!(outcome.label_of(&id("face_1")), outcome.label_of(&id("face_3")));
        assert_eq!(outcome.label_of(&id("face_2")), outcome.label_of(&id("face_4")));
        assert_ne!(outcome.label_of(&id("face_1")), outcome.label_of(&id("face_2")));
    }

    #[test]
    fn test_features_and_target_reach_clusterer() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut use_case = ExtractUniqueFacesUseCase::new(
            Box::new(InMemorySource::new(video_detections())),
            Box::new(RecordingClusterer { seen: seen.clone() }),
            Box::new(crate::pipeline::pipeline_logger::NullPipelineLogger),
        );
        use_case.execute(3).unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0.profiles.len(), 4);
        assert_eq!(seen[0].0.cooccurrence.len(), 4);
        assert_eq!(seen[0].1, 3);
    }

    #[test]
    fn test_logger_receives_stage_timings_and_summary() {
        let log = Arc::new(Mutex::new(SharedLog::default()));
        let mut use_case = ExtractUniqueFacesUseCase::new(
            Box::new(InMemorySource::new(video_detections())),
            inline_clusterer(),
            Box::new(RecordingLogger { log: log.clone() }),
        );
        use_case.execute(2).unwrap();

        let log = log.lock().unwrap();
        assert_eq!(log.timings, vec!["load", "aggregate", "cluster"]);
        assert!(log
            .metrics
            .iter()
            .any(|(name, value)| name == "identifiers" && *value == 4.0));
        assert!(log.metrics.iter().any(|(name, _)| name == "pruned_edges"));
        assert_eq!(log.summaries, 1);
    }

    #[test]
    fn test_ingest_error_propagates() {
        let mut use_case = ExtractUniqueFacesUseCase::new(
            Box::new(FailingSource),
            inline_clusterer(),
            Box::new(crate::pipeline::pipeline_logger::NullPipelineLogger),
        );
        let err = use_case.execute(2).unwrap_err();
        assert!(err.downcast_ref::<IngestError>().is_some());
    }

    #[test]
    fn test_invalid_target_propagates() {
        let mut use_case = ExtractUniqueFacesUseCase::new(
            Box::new(InMemorySource::new(video_detections())),
            inline_clusterer(),
            Box::new(crate::pipeline::pipeline_logger::NullPipelineLogger),
        );
        let err = use_case.execute(9).unwrap_err();
        assert_eq!(
            err.downcast_ref::<ClusterError>(),
            Some(&ClusterError::InvalidTargetCount {
                requested: 9,
                available: 4
            })
        );
    }

    #[test]
    fn test_compute_identity_clusters_on_empty_input() {
        let outcome = compute_identity_clusters(&[], 1).unwrap();
        assert!(outcome.clusters.is_empty());
    }

    #[test]
    fn test_compute_identity_clusters_is_repeatable() {
        let dets = video_detections();
        let first = compute_identity_clusters(&dets, 2).unwrap();
        let second = compute_identity_clusters(&dets, 2).unwrap();
        assert_eq!(first.to_json().unwrap(), second.to_json().unwrap());
    }
}
