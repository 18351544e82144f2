//! Reader for Hume batch-prediction JSON exports.
//!
//! Only the face model's grouped predictions are consumed:
//! `[0].results.predictions[0].models.face.grouped_predictions[*]`, where
//! each group carries one detector `id` and its per-frame boxes.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::ingestion::domain::detection_source::{DetectionSource, IngestError};
use crate::shared::detection::{BoundingBox, Detection};
use crate::shared::identifier::Identifier;

#[derive(Deserialize)]
struct Job {
    results: Option<JobResults>,
}

#[derive(Deserialize)]
struct JobResults {
    #[serde(default)]
    predictions: Vec<SourcePrediction>,
}

#[derive(Deserialize)]
struct SourcePrediction {
    models: Models,
}

#[derive(Deserialize)]
struct Models {
    face: Option<FaceModel>,
}

#[derive(Deserialize)]
struct FaceModel {
    #[serde(default)]
    grouped_predictions: Vec<FaceGroup>,
}

#[derive(Deserialize)]
struct FaceGroup {
    id: Option<serde_json::Value>,
    #[serde(default)]
    predictions: Vec<FacePrediction>,
}

#[derive(Deserialize)]
struct FacePrediction {
    frame: Option<u64>,
    #[serde(rename = "box")]
    bbox: Option<RawBox>,
}

#[derive(Deserialize)]
struct RawBox {
    x: Option<f64>,
    y: Option<f64>,
    w: Option<f64>,
    h: Option<f64>,
}

impl RawBox {
    fn into_bbox(self) -> BoundingBox {
        BoundingBox::new(
            self.x.unwrap_or(f64::NAN),
            self.y.unwrap_or(f64::NAN),
            self.w.unwrap_or(f64::NAN),
            self.h.unwrap_or(f64::NAN),
        )
    }
}

/// Detection source reading a Hume JSON file from disk.
pub struct HumeJsonReader {
    path: PathBuf,
}

impl HumeJsonReader {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }
}

impl DetectionSource for HumeJsonReader {
    fn load(&mut self) -> Result<Vec<Detection>, IngestError> {
        let text = fs::read_to_string(&self.path).map_err(|source| IngestError::Io {
            path: self.path.clone(),
            source,
        })?;
        let detections = parse(&text)?;
        log::info!(
            "Loaded {} face detections from {}",
            detections.len(),
            self.path.display()
        );
        Ok(detections)
    }
}

/// Parses a Hume JSON document into detection records.
///
/// Groups whose first prediction has no `frame` come from still images and
/// are skipped. Inside a video group every prediction must carry both
/// `frame` and `box`; box coordinates reported as `null` become NaN.
pub fn parse(json: &str) -> Result<Vec<Detection>, IngestError> {
    let jobs: Vec<Job> = serde_json::from_str(json)?;
    let job = jobs.into_iter().next().ok_or(IngestError::MissingField {
        field: "results",
        context: "empty job list".to_string(),
    })?;
    let results = job.results.ok_or(IngestError::MissingField {
        field: "results",
        context: "job 0".to_string(),
    })?;
    let source = results
        .predictions
        .into_iter()
        .next()
        .ok_or(IngestError::MissingField {
            field: "predictions",
            context: "job 0 results".to_string(),
        })?;
    let face = source.models.face.ok_or(IngestError::MissingField {
        field: "face",
        context: "job 0 models".to_string(),
    })?;

    let mut detections = Vec::new();
    for (group_idx, group) in face.grouped_predictions.into_iter().enumerate() {
        let context = format!("face group {group_idx}");
        let identifier = parse_identifier(group.id, &context)?;

        match group.predictions.first() {
            None => {
                log::warn!("Skipping {context} ({identifier}): no predictions");
                continue;
            }
            Some(first) if first.frame.is_none() => {
                log::warn!("Skipping {context} ({identifier}): not a video prediction");
                continue;
            }
            Some(_) => {}
        }

        for (idx, prediction) in group.predictions.into_iter().enumerate() {
            let frame = prediction.frame.ok_or_else(|| IngestError::MissingField {
                field: "frame",
                context: format!("{context} prediction {idx}"),
            })?;
            let bbox = prediction.bbox.ok_or_else(|| IngestError::MissingField {
                field: "box",
                context: format!("{context} prediction {idx}"),
            })?;
            detections.push(Detection {
                identifier: identifier.clone(),
                frame,
                bbox: bbox.into_bbox(),
            });
        }
    }

    Ok(detections)
}

fn parse_identifier(
    raw: Option<serde_json::Value>,
    context: &str,
) -> Result<Identifier, IngestError> {
    match raw {
        Some(serde_json::Value::String(s)) => Ok(Identifier::from(s)),
        Some(serde_json::Value::Number(n)) => n
            .as_u64()
            .map(Identifier::from)
            .ok_or_else(|| IngestError::InvalidIdentifier {
                context: context.to_string(),
            }),
        Some(_) => Err(IngestError::InvalidIdentifier {
            context: context.to_string(),
        }),
        None => Err(IngestError::MissingField {
            field: "id",
            context: context.to_string(),
        }),
    }
}
