//! CLI entry point for the credit default feature-engineering pipeline.

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use credit_prep::{
    Pipeline, PipelineConfig, PipelineConfigBuilder, ReportGenerator, SplitReport, load_csv,
    types::ClassDistribution,
};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Credit default feature engineering and stratified split",
    long_about = "Cleans the UCI credit card default table, bounds outliers, derives \
                  features, corrects skew and produces a stratified train/test split.\n\n\
                  EXAMPLES:\n  \
                  # Defaults (1%/99% winsorization, 20% test, seed 42)\n  \
                  credit-prep -i UCI_Credit_Card.csv\n\n  \
                  # Custom split and a JSON report on disk\n  \
                  credit-prep -i UCI_Credit_Card.csv --test-size 0.25 --seed 7 -r -o results/\n\n  \
                  # Machine-readable output\n  \
                  credit-prep -i UCI_Credit_Card.csv --json | jq .class_balance"
)]
struct Args {
    /// Path to the CSV file to process
    #[arg(short, long)]
    input: String,

    /// Output directory for the JSON report
    #[arg(short, long, default_value = "./outputs")]
    output: String,

    /// Target column (binary label)
    #[arg(short, long)]
    target: Option<String>,

    /// Lower winsorization quantile (0.0 - 1.0)
    #[arg(long)]
    lower_quantile: Option<f64>,

    /// Upper winsorization quantile (0.0 - 1.0)
    #[arg(long)]
    upper_quantile: Option<f64>,

    /// Fraction of rows held out for testing
    #[arg(long)]
    test_size: Option<f64>,

    /// Seed for the stratified shuffle
    #[arg(long)]
    seed: Option<u64>,

    /// JSON file with a pipeline configuration
    ///
    /// Explicit flags override values from this file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show errors and final result)
    #[arg(short, long)]
    quiet: bool,

    /// Output JSON to stdout instead of human-readable summary
    ///
    /// Disables all progress logs; only outputs the final JSON report.
    #[arg(long)]
    json: bool,

    /// Write a JSON report to the output directory
    ///
    /// The report will be saved as <input_name>_report.json
    #[arg(short = 'r', long)]
    emit_report: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, args.quiet, args.json);

    let config = resolve_config(&args)?;
    let pipeline = build_pipeline(&args, config)?;

    let data = load_csv(&args.input)?;

    run_pipeline(&pipeline, &args, data)
}

/// Merge the optional config file with explicit flags.
fn resolve_config(args: &Args) -> Result<PipelineConfig> {
    let base = match &args.config {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str::<PipelineConfig>(&content)
                .with_context(|| format!("Invalid config file {}", path.display()))?
        }
        None => PipelineConfig::default(),
    };

    let mut builder = PipelineConfigBuilder::from_config(base);

    if let Some(ref target) = args.target {
        builder = builder.target_column(target);
    }
    if let Some(lower) = args.lower_quantile {
        builder = builder.winsorize_lower(lower);
    }
    if let Some(upper) = args.upper_quantile {
        builder = builder.winsorize_upper(upper);
    }
    if let Some(test_size) = args.test_size {
        builder = builder.test_size(test_size);
    }
    if let Some(seed) = args.seed {
        builder = builder.random_seed(seed);
    }

    Ok(builder.build()?)
}

fn build_pipeline(args: &Args, config: PipelineConfig) -> Result<Pipeline> {
    let mut builder = Pipeline::builder().config(config);

    if !args.quiet && !args.json {
        builder = builder.on_progress(|update| {
            info!(
                "[{:.0}%] {}: {}",
                update.progress * 100.0,
                update.stage.display_name(),
                update.message
            );
        });
    }

    Ok(builder.build()?)
}

/// Run pipeline and print results
fn run_pipeline(pipeline: &Pipeline, args: &Args, data: polars::prelude::DataFrame) -> Result<()> {
    info!("{}", "=".repeat(80));
    info!("Starting feature-engineering pipeline...");
    info!("{}", "=".repeat(80));

    // Pipeline::process already logs the failure
    let result = pipeline
        .process(data)
        .map_err(|e| anyhow!("Pipeline failed: {}", e))?;

    let report = ReportGenerator::build_report(&args.input, pipeline.config(), &result.summary);

    // --json: stdout carries only the report
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if args.emit_report {
        let generator = ReportGenerator::new(PathBuf::from(&args.output));
        let report_path = generator.write_report_to_file(&report, &extract_file_stem(&args.input))?;
        info!("Report written to: {}", report_path.display());
    }

    print_human_readable_summary(&report);

    Ok(())
}

/// Extract the file stem (name without extension) from a path.
fn extract_file_stem(path: &str) -> String {
    Path::new(path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output")
        .to_string()
}

fn format_distribution(dist: &ClassDistribution) -> String {
    dist.classes
        .iter()
        .map(|share| {
            format!(
                "{}: {} ({:.1}%)",
                share.class,
                share.count,
                share.proportion * 100.0
            )
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Print a human-readable summary of the run.
///
/// This is the default output when `--json` is not specified.
fn print_human_readable_summary(report: &SplitReport) {
    let shapes = &report.shapes;
    let balance = &report.class_balance;

    println!();
    println!("{}", "=".repeat(80));
    println!("FEATURE ENGINEERING COMPLETE");
    println!("{}", "=".repeat(80));
    println!();

    println!("Input:  {}", report.input_file);
    println!("Target: {}", report.target_column);
    println!();

    println!("Shapes (rows x columns):");
    println!("  Initial:    {} x {}", shapes.initial.0, shapes.initial.1);
    println!("  Cleaned:    {} x {}", shapes.cleaned.0, shapes.cleaned.1);
    println!("  Engineered: {} x {}", shapes.engineered.0, shapes.engineered.1);
    println!("  Train:      {} x {}", shapes.train.0, shapes.train.1);
    println!("  Test:       {} x {}", shapes.test.0, shapes.test.1);
    println!();

    println!("Class proportions:");
    println!("  Overall: {}", format_distribution(&balance.overall));
    println!("  Train:   {}", format_distribution(&balance.train));
    println!("  Test:    {}", format_distribution(&balance.test));
    println!("  Max gap: {:.4}", balance.max_proportion_gap);
    println!();

    println!("Processing Summary:");
    println!("  Duration: {}ms", report.duration_ms);
    println!(
        "  Duplicates removed: {}, values imputed: {}, codes remapped: {}",
        report.cleaning.duplicates_removed,
        report.cleaning.values_imputed,
        report.cleaning.codes_remapped
    );
    let clipped: usize = report.bounds.iter().map(|b| b.clipped()).sum();
    println!(
        "  Values clipped: {} across {} columns",
        clipped,
        report.bounds.len()
    );
    println!("  Derived features: {}", report.derived_columns.len());
    println!(
        "  Log-transformed columns: {}",
        report.log_transformed_columns.len()
    );
    println!();

    if !report.warnings.is_empty() {
        println!("Warnings:");
        for warning in &report.warnings {
            println!("  ! {}", warning);
        }
        println!();
    }

    println!("Use --json for machine-readable output");
    println!("Use --emit-report to save the JSON report");
    println!("{}", "=".repeat(80));
}
