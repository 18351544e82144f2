use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Parser;

use face_dedup_core::clustering::domain::identity_cluster::{ClusteringOutcome, TargetStatus};
use face_dedup_core::clustering::domain::identity_clusterer::{ClusteringConfig, ProgressFn};
use face_dedup_core::clustering::infrastructure::pruning_clusterer::PruningClusterer;
use face_dedup_core::ingestion::infrastructure::hume_json_reader::HumeJsonReader;
use face_dedup_core::pipeline::extract_unique_faces_use_case::ExtractUniqueFacesUseCase;
use face_dedup_core::pipeline::pipeline_logger::StdoutPipelineLogger;

/// Merge per-track face identifiers from a Hume JSON export into unique faces.
#[derive(Parser, Debug)]
#[command(name = "face-dedup")]
struct Cli {
    /// Hume batch-prediction JSON file.
    input: PathBuf,

    /// Number of unique faces (people) expected in the video.
    #[arg(long)]
    faces: usize,

    /// Write the mapping to this file instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Threads for the pairwise similarity pass (default: all cores).
    #[arg(long)]
    workers: Option<usize>,

    /// Abort if clustering runs longer than this many seconds.
    #[arg(long)]
    timeout_secs: Option<u64>,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let mut config = ClusteringConfig::default();
    if let Some(workers) = cli.workers {
        config.workers = workers;
    }
    config.deadline = cli
        .timeout_secs
        .map(|secs| Instant::now() + Duration::from_secs(secs));
    let progress_shown = Arc::new(AtomicBool::new(false));
    config.on_progress = Some(pruning_progress(progress_shown.clone()));

    let mut use_case = ExtractUniqueFacesUseCase::new(
        Box::new(HumeJsonReader::new(&cli.input)),
        Box::new(PruningClusterer::new(config)),
        Box::new(StdoutPipelineLogger::new()),
    );
    let outcome = use_case.execute(cli.faces)?;
    if progress_shown.load(Ordering::Relaxed) {
        eprintln!();
    }

    report_status(&outcome);
    write_mapping(&outcome, cli.output.as_deref())
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if !cli.input.exists() {
        return Err(format!("Input file not found: {}", cli.input.display()).into());
    }
    if cli.faces == 0 {
        return Err("--faces must be at least 1".into());
    }
    if cli.workers == Some(0) {
        return Err("--workers must be at least 1".into());
    }
    if cli.timeout_secs == Some(0) {
        return Err("--timeout-secs must be at least 1".into());
    }
    Ok(())
}

/// Progress line on stderr; `shown` is set once anything was printed.
fn pruning_progress(shown: Arc<AtomicBool>) -> ProgressFn {
    Box::new(move |pruned, total| {
        eprint!("\rPruning edge {pruned}/{total}");
        shown.store(true, Ordering::Relaxed);
        true
    })
}

fn report_status(outcome: &ClusteringOutcome) {
    match outcome.status {
        TargetStatus::Reached => {}
        TargetStatus::Exhausted {
            requested,
            achieved,
        } => log::warn!(
            "Only {achieved} of {requested} requested faces could be separated; returning the finest partition"
        ),
        TargetStatus::Exceeded {
            requested,
            achieved,
        } => log::warn!(
            "Faces seen together in the same frame force {achieved} identities ({requested} requested)"
        ),
    }
    for id in &outcome.excluded {
        log::warn!("Identifier {id} had no usable box data and is not in the mapping");
    }
}

fn write_mapping(
    outcome: &ClusteringOutcome,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let json = outcome.to_json()?;
    match output {
        Some(path) => {
            fs::write(path, json + "\n")?;
            log::info!(
                "Wrote {} unique faces to {}",
                outcome.cluster_count(),
                path.display()
            );
        }
        None => println!("{json}"),
    }
    Ok(())
}
