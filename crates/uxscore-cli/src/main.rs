//! uxscore - design evaluation from the command line
//!
//! ## Commands
//!
//! - `evaluate`: score every frame of a design document for one iteration
//! - `contrast`: WCAG contrast ratio between two hex colours
//! - `resources`: learning resources for a set of heuristic scores
//!
//! Reports are printed to stdout as pretty JSON; logs go to stderr.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, Level};

use uxscore_core::contrast::is_large_text;
use uxscore_core::metrics::METRICS;
use uxscore_core::{
    contrast_ratio, init_tracing, select_resources, wcag_level, BlockingPoolScanner,
    CategoryScores, Color, ContrastPolicy, DesignEvaluator, EngineConfig, EvaluationReport,
    EvaluationRequest, HeuristicBreakdownItem, HeuristicCode, LogFormat, Node, Resource,
    ScanSettings, ScoreCandidate, ScoringMode, WcagLevel,
};

#[derive(Parser)]
#[command(name = "uxscore")]
#[command(version = uxscore_core::VERSION)]
#[command(about = "Usability and accessibility scoring for design documents", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a design document for one iteration
    Evaluate {
        /// Path to the document node tree (JSON)
        #[arg(short, long)]
        document: PathBuf,

        /// Path to externally proposed scores (JSON)
        #[arg(short, long)]
        candidate: Option<PathBuf>,

        /// Engine configuration (TOML)
        #[arg(long, env = "UXSCORE_CONFIG")]
        config: Option<PathBuf>,

        /// Current iteration, starting at 1
        #[arg(long, default_value = "1")]
        iteration: u32,

        /// Total number of iterations
        #[arg(long, default_value = "1")]
        total: u32,

        /// Scoring mode: raw or progressive
        #[arg(long, default_value = "raw")]
        mode: ScoringMode,

        /// Run identifier used for seeding (random if omitted)
        #[arg(long)]
        run_id: Option<String>,

        /// Reference to the rendered image, used for seeding
        #[arg(long)]
        image_ref: Option<String>,

        /// Never let a category drop below the previous iteration
        #[arg(long)]
        monotonic: bool,

        /// Previous iteration's scores by frame id (JSON)
        #[arg(long)]
        previous: Option<PathBuf>,

        /// Scan interactive elements on this many worker tasks
        #[arg(long)]
        workers: Option<usize>,
    },

    /// Contrast ratio and WCAG level of a colour pair
    Contrast {
        /// Foreground colour (#rgb, #rrggbb or #rrggbbaa)
        #[arg(long)]
        fg: Color,

        /// Background colour
        #[arg(long)]
        bg: Color,

        /// Font size in px, for the large-text thresholds
        #[arg(long, default_value = "16")]
        size: f64,

        /// Font weight
        #[arg(long)]
        weight: Option<f64>,
    },

    /// Recommend learning resources for heuristic scores
    Resources {
        /// Heuristic scores and optional breakdown (JSON)
        #[arg(short, long)]
        scores: PathBuf,
    },
}

/// Output wrapper shared by every command.
#[derive(Serialize)]
struct Envelope<T: Serialize> {
    tool: &'static str,
    version: &'static str,
    generated_at: DateTime<Utc>,
    result: T,
}

impl<T: Serialize> Envelope<T> {
    fn new(result: T) -> Self {
        Self {
            tool: "uxscore",
            version: uxscore_core::VERSION,
            generated_at: Utc::now(),
            result,
        }
    }
}

#[derive(Debug, Serialize)]
struct ContrastReport {
    foreground: String,
    background: String,
    ratio: f64,
    score: f64,
    large_text: bool,
    level: WcagLevel,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ResourceInput {
    scores: BTreeMap<HeuristicCode, f64>,
    breakdown: Vec<HeuristicBreakdownItem>,
}

struct EvaluateArgs {
    document: PathBuf,
    candidate: Option<PathBuf>,
    config: Option<PathBuf>,
    iteration: u32,
    total: u32,
    mode: ScoringMode,
    run_id: Option<String>,
    image_ref: Option<String>,
    monotonic: bool,
    previous: Option<PathBuf>,
    workers: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let format = if cli.json {
        LogFormat::Json
    } else {
        LogFormat::Pretty
    };
    init_tracing(format, level);

    match cli.command {
        Commands::Evaluate {
            document,
            candidate,
            config,
            iteration,
            total,
            mode,
            run_id,
            image_ref,
            monotonic,
            previous,
            workers,
        } => {
            cmd_evaluate(EvaluateArgs {
                document,
                candidate,
                config,
                iteration,
                total,
                mode,
                run_id,
                image_ref,
                monotonic,
                previous,
                workers,
            })
            .await
        }
        Commands::Contrast {
            fg,
            bg,
            size,
            weight,
        } => cmd_contrast(&fg, &bg, size, weight),
        Commands::Resources { scores } => cmd_resources(&scores),
    }
}

async fn cmd_evaluate(args: EvaluateArgs) -> Result<()> {
    let report = run_evaluate(args).await?;
    METRICS.flush();
    print_json(&Envelope::new(report))
}

fn cmd_contrast(fg: &Color, bg: &Color, size: f64, weight: Option<f64>) -> Result<()> {
    print_json(&Envelope::new(contrast_report(fg, bg, size, weight)))
}

fn cmd_resources(path: &Path) -> Result<()> {
    let resources = run_resources(path)?;
    print_json(&Envelope::new(resources))
}

async fn run_evaluate(args: EvaluateArgs) -> Result<EvaluationReport> {
    let config = match &args.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("Failed to load config: {:?}", path))?,
        None => EngineConfig::default(),
    };

    let document = std::fs::read_to_string(&args.document)
        .with_context(|| format!("Failed to read document: {:?}", args.document))?;
    let document = Node::from_json(&document)
        .with_context(|| format!("Invalid document in {:?}", args.document))?;

    let candidate: ScoreCandidate = match &args.candidate {
        Some(path) => read_json_file(path)?,
        None => ScoreCandidate::default(),
    };
    let previous: BTreeMap<String, CategoryScores> = match &args.previous {
        Some(path) => read_json_file(path)?,
        None => BTreeMap::new(),
    };

    let run_id = args
        .run_id
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let mut request = EvaluationRequest::new(run_id, args.iteration, args.total)
        .with_mode(args.mode)
        .with_candidate(candidate)
        .with_monotonic(args.monotonic);
    if let Some(image_ref) = args.image_ref {
        request = request.with_image_ref(image_ref);
    }
    request.previous = previous;

    info!(
        run_id = %request.run_id,
        iteration = request.iteration,
        total_iterations = request.total_iterations,
        mode = %request.mode,
        "evaluating document"
    );

    let evaluator = DesignEvaluator::new(config);
    let report = match args.workers {
        Some(workers) => {
            let scanner = BlockingPoolScanner::new(ScanSettings {
                max_concurrent: workers.max(1),
                ..config.scan
            });
            evaluator
                .evaluate_concurrent(&document, &request, &scanner)
                .await
                .context("Concurrent evaluation failed")?
        }
        None => evaluator.evaluate(&document, &request),
    };
    Ok(report)
}

fn contrast_report(fg: &Color, bg: &Color, size: f64, weight: Option<f64>) -> ContrastReport {
    let ratio = contrast_ratio(fg, bg);
    let large_text = is_large_text(size, weight);
    ContrastReport {
        foreground: fg.to_hex(),
        background: bg.to_hex(),
        ratio,
        score: EngineConfig::default().contrast.score(ratio),
        large_text,
        level: wcag_level(ratio, large_text),
    }
}

fn run_resources(path: &Path) -> Result<Vec<Resource>> {
    let input: ResourceInput = read_json_file(path)?;
    Ok(select_resources(&input.scores, &input.breakdown))
}

fn read_json_file<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read JSON file: {:?}", path))?;
    serde_json::from_str(&content).with_context(|| format!("Invalid JSON in {:?}", path))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document_json() -> serde_json::Value {
        json!({
            "id": "0:0",
            "type": "CANVAS_GROUP",
            "children": []
        })
    }

    fn write(dir: &Path, name: &str, value: &serde_json::Value) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, serde_json::to_string(value).unwrap()).unwrap();
        path
    }

    fn args(document: PathBuf) -> EvaluateArgs {
        EvaluateArgs {
            document,
            candidate: None,
            config: None,
            iteration: 1,
            total: 1,
            mode: ScoringMode::Raw,
            run_id: Some("run-test".to_string()),
            image_ref: None,
            monotonic: false,
            previous: None,
            workers: None,
        }
    }

    fn frame_document() -> serde_json::Value {
        json!({
            "id": "0:0",
            "type": "GROUP",
            "children": [{
                "id": "1:1",
                "type": "FRAME",
                "name": "Home",
                "absoluteBoundingBox": {"x": 0, "y": 0, "width": 200, "height": 400},
                "children": [{
                    "id": "1:2",
                    "type": "TEXT",
                    "characters": "Hello",
                    "style": {"fontSize": 24},
                    "absoluteBoundingBox": {"x": 16, "y": 16, "width": 100, "height": 30}
                }]
            }]
        })
    }

    #[tokio::test]
    async fn test_evaluate_rejects_unknown_node_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "doc.json", &document_json());
        let err = run_evaluate(args(path)).await.unwrap_err();
        assert!(format!("{err:#}").contains("CANVAS_GROUP"));
    }

    #[tokio::test]
    async fn test_evaluate_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "doc.json", &frame_document());
        let report = run_evaluate(args(path)).await.unwrap();
        assert_eq!(report.run_id, "run-test");
        assert_eq!(report.frames.len(), 1);
        assert_eq!(report.frames[0].frame_name, "Home");
    }

    #[tokio::test]
    async fn test_evaluate_with_workers_matches_inline() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "doc.json", &frame_document());
        let inline = run_evaluate(args(path.clone())).await.unwrap();
        let mut pooled_args = args(path);
        pooled_args.workers = Some(2);
        let pooled = run_evaluate(pooled_args).await.unwrap();
        assert_eq!(inline.frames, pooled.frames);
    }

    #[tokio::test]
    async fn test_evaluate_generates_run_id() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "doc.json", &frame_document());
        let mut a = args(path);
        a.run_id = None;
        let report = run_evaluate(a).await.unwrap();
        assert!(uuid::Uuid::parse_str(&report.run_id).is_ok());
    }

    #[test]
    fn test_contrast_report() {
        let report = contrast_report(&Color::BLACK, &Color::WHITE, 16.0, None);
        assert!((report.ratio - 21.0).abs() < 1e-9);
        assert_eq!(report.level, WcagLevel::AAA);
        assert_eq!(report.foreground, Color::BLACK.to_hex());
    }

    #[test]
    fn test_resources_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            "scores.json",
            &json!({"scores": {"H1": 20, "H7": 30}}),
        );
        let resources = run_resources(&path).unwrap();
        assert!(resources.len() > 5);
        assert!(resources.iter().any(|r| r.url.contains("hicks-law")));
    }

    #[test]
    fn test_read_json_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{").unwrap();
        let err = read_json_file::<serde_json::Value>(&path).unwrap_err();
        assert!(err.to_string().contains("broken.json"));
    }
}
