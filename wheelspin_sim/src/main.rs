//! WheelSpin DST Simulator CLI
//!
//! Run deterministic wheel scenarios, or spin a real entry file live.

use clap::Parser;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;
use wheelspin_core::SpinConfig;
use wheelspin_sim::live::spin_file;
use wheelspin_sim::scenarios::ScenarioId;
use wheelspin_sim::{ScenarioResult, ScenarioRunner};

/// WheelSpin Deterministic Simulation Testing
#[derive(Parser, Debug)]
#[command(name = "wheelspin-sim")]
#[command(about = "Run deterministic simulation tests for the WheelSpin selection engine")]
struct Args {
    /// Master seed for determinism (0 = random from time)
    #[arg(short, long, default_value = "42")]
    seed: u64,

    /// Scenario to run (classic_spin, jittery_frames, reload_mid_spin, ..., all)
    #[arg(short = 'S', long, default_value = "all")]
    scenario: String,

    /// Number of consecutive seeds to test (for CI mode)
    #[arg(long, default_value = "1")]
    seeds: usize,

    /// Frame rate in Hz
    #[arg(long, default_value = "60")]
    fps: u32,

    /// Standard deviation of extra frame delay in milliseconds
    #[arg(long, default_value = "0")]
    jitter_ms: f64,

    /// Time budget per spin in seconds
    #[arg(short, long, default_value = "60")]
    duration: f64,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// JSON output for CI parsing
    #[arg(long)]
    json: bool,

    /// Export frame-by-frame data of a single scenario to a JSON file
    #[arg(long)]
    export: Option<String>,

    /// JSON file overriding the spin constants
    #[arg(long)]
    config: Option<PathBuf>,

    /// Spin this newline-separated entry file live instead of running scenarios
    #[arg(long)]
    entries: Option<PathBuf>,

    /// Shuffle the entries before a live spin
    #[arg(long)]
    shuffle: bool,

    /// Copy the live winner out (removes it and records it)
    #[arg(long)]
    copy: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize logging
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }

    let config = match &args.config {
        Some(path) => match SpinConfig::from_json_file(path) {
            Ok(config) => config,
            Err(e) => {
                error!("{}: {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
        None => SpinConfig::default(),
    };

    if let Some(path) = &args.entries {
        return run_live(path, config, &args).await;
    }

    if !args.json {
        info!("WheelSpin DST Simulator v{}", env!("CARGO_PKG_VERSION"));
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    }

    // Parse scenarios
    let scenarios: Vec<ScenarioId> = if args.scenario == "all" {
        ScenarioId::all()
    } else {
        match args.scenario.parse() {
            Ok(id) => vec![id],
            Err(e) => {
                eprintln!("Error: {}", e);
                let names: Vec<&str> = ScenarioId::all().into_iter().map(|s| s.name()).collect();
                eprintln!("Available scenarios: {}, all", names.join(", "));
                return ExitCode::FAILURE;
            }
        }
    };

    // Determine base seed
    let base_seed = if args.seed == 0 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(42)
    } else {
        args.seed
    };

    let runner_for = |seed: u64| {
        ScenarioRunner::new(seed)
            .with_frame_rate(args.fps)
            .with_jitter(args.jitter_ms)
            .with_duration(args.duration)
            .with_config(config.clone())
    };

    // Handle --export mode
    if let Some(export_path) = &args.export {
        if scenarios.len() > 1 {
            eprintln!("Error: --export only supports a single scenario, not 'all'");
            return ExitCode::FAILURE;
        }

        info!("Running with export to: {}", export_path);
        let (result, export) = runner_for(base_seed).run_exported(scenarios[0]).await;

        if let Err(e) = export.write_to_file(export_path) {
            error!("Failed to write {}: {}", export_path, e);
            return ExitCode::FAILURE;
        }

        return if result.passed {
            info!(
                "✓ {} (seed={}) PASSED - {} frames exported to {}",
                scenarios[0].name(),
                base_seed,
                export.frames.len(),
                export_path
            );
            ExitCode::SUCCESS
        } else {
            error!(
                "✗ {} FAILED: {}",
                scenarios[0].name(),
                result.failure_reason.as_deref().unwrap_or("unknown")
            );
            ExitCode::FAILURE
        };
    }

    // Run simulations
    let mut all_results: Vec<ScenarioResult> = Vec::new();
    let mut failed_count = 0;

    for seed_offset in 0..args.seeds {
        let seed = base_seed.wrapping_add(seed_offset as u64);
        let runner = runner_for(seed);

        for scenario in &scenarios {
            let result = runner.run(*scenario).await;

            if !args.json {
                if result.passed {
                    info!(
                        "✓ {} (seed={}) PASSED{}",
                        scenario.name(),
                        seed,
                        result
                            .winner
                            .as_deref()
                            .map(|w| format!(" - winner: {}", w))
                            .unwrap_or_default()
                    );
                } else {
                    error!(
                        "✗ {} (seed={}) FAILED: {}",
                        scenario.name(),
                        seed,
                        result.failure_reason.as_deref().unwrap_or("unknown")
                    );
                }
            }

            if !result.passed {
                failed_count += 1;
            }

            all_results.push(result);
        }
    }

    // Summary
    let total = all_results.len();
    let passed = total - failed_count;

    if args.json {
        let summary = serde_json::json!({
            "total": total,
            "passed": passed,
            "failed": failed_count,
            "results": all_results.iter().map(|r| {
                serde_json::json!({
                    "scenario": r.scenario.name(),
                    "seed": r.seed,
                    "passed": r.passed,
                    "frames": r.total_frames,
                    "time_secs": r.final_time_secs,
                    "winner": r.winner,
                    "stale_frames_rejected": r.metrics.stale_frames_rejected,
                    "max_frame_gap_ms": r.metrics.max_frame_gap_ms,
                    "failure_reason": r.failure_reason,
                })
            }).collect::<Vec<_>>(),
        });
        match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                error!("Failed to serialize summary: {}", e);
                return ExitCode::FAILURE;
            }
        }
    } else {
        info!("");
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

        if failed_count == 0 {
            info!("✅ All {} scenario runs passed!", total);
        } else {
            error!("❌ {}/{} scenario runs failed!", failed_count, total);

            for result in all_results.iter().filter(|r| !r.passed) {
                error!(
                    "  - {} seed={}: {}",
                    result.scenario.name(),
                    result.seed,
                    result.failure_reason.as_deref().unwrap_or("unknown")
                );
            }
        }
    }

    // Exit with proper code for CI
    if failed_count > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

async fn run_live(path: &Path, config: SpinConfig, args: &Args) -> ExitCode {
    match spin_file(path, config, args.shuffle, args.copy).await {
        Ok(outcome) => {
            if args.json {
                let summary = serde_json::json!({
                    "winner": outcome.winner,
                    "frames": outcome.frames,
                    "elapsed_ms": outcome.elapsed.as_millis() as u64,
                    "copied": outcome.record.is_some(),
                    "remaining": outcome.remaining,
                });
                println!("{}", summary);
            } else {
                println!("{}", outcome.winner);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Live spin failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
