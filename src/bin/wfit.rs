//! Wfit CLI - Command-line interface for the wfit monitoring engine
//!
//! Commands:
//! - replay: Drive the sleep monitor over recorded sensor samples
//! - aggregate: Group recorded intervals into daily summaries
//! - classify: Classify one (movement, heart-rate) pair
//! - zone: Classify one heart rate into its intensity zone

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use wfit_core::classifier::TICK_INTERVAL_MINUTES;
use wfit_core::sensors::{HeartRateGate, MotionDetector, SensorSample};
use wfit_core::store::{sweep_old_intervals, IntervalStore, MemoryIntervalStore};
use wfit_core::types::{MonitorEvent, SleepInterval};
use wfit_core::{aggregate, classify_phase, zone_for, SleepMonitor, ENGINE_VERSION};

/// Wfit - On-device monitoring engine for watch heart-rate and sleep tracking
#[derive(Parser)]
#[command(name = "wfit")]
#[command(version = ENGINE_VERSION)]
#[command(about = "Replay sensor data through the sleep and heart-rate monitors", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Drive the sleep monitor over recorded sensor samples
    Replay {
        /// Input file of NDJSON sensor samples (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file for recorded intervals (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Output format; defaults to pretty JSON on a TTY, NDJSON otherwise
        #[arg(long)]
        output_format: Option<OutputFormat>,

        /// Seed the interval store from a previous replay's JSON
        #[arg(long)]
        load_intervals: Option<PathBuf>,

        /// Save the interval store JSON after the replay
        #[arg(long)]
        save_intervals: Option<PathBuf>,
    },

    /// Group recorded intervals into daily summaries
    Aggregate {
        /// Input file of intervals (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Input format
        #[arg(long, default_value = "ndjson")]
        input_format: InputFormat,

        /// Output file for daily summaries (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Output format; defaults to pretty JSON on a TTY, NDJSON otherwise
        #[arg(long)]
        output_format: Option<OutputFormat>,

        /// Apply the 7-day retention sweep before aggregating, relative to
        /// this date (YYYY-MM-DD)
        #[arg(long)]
        sweep_from: Option<String>,
    },

    /// Classify one (movement, heart-rate) pair into a sleep phase
    Classify {
        /// Minutes since the last detected movement
        #[arg(long)]
        movement_minutes: f64,

        /// Current heart rate (bpm)
        #[arg(long)]
        heart_rate: i32,
    },

    /// Classify one heart rate into its intensity zone
    Zone {
        /// Heart rate (bpm)
        #[arg(long)]
        heart_rate: i32,
    },
}

#[derive(Clone, ValueEnum)]
enum InputFormat {
    /// Newline-delimited JSON (one interval per line)
    Ndjson,
    /// JSON array of intervals
    Json,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Newline-delimited JSON (one record per line)
    Ndjson,
    /// JSON array
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), WfitCliError> {
    match cli.command {
        Commands::Replay {
            input,
            output,
            output_format,
            load_intervals,
            save_intervals,
        } => cmd_replay(
            &input,
            &output,
            output_format,
            load_intervals.as_deref(),
            save_intervals.as_deref(),
        ),

        Commands::Aggregate {
            input,
            input_format,
            output,
            output_format,
            sweep_from,
        } => cmd_aggregate(&input, input_format, &output, output_format, sweep_from),

        Commands::Classify {
            movement_minutes,
            heart_rate,
        } => {
            let phase = classify_phase(movement_minutes, heart_rate);
            println!("{}", phase.as_str());
            Ok(())
        }

        Commands::Zone { heart_rate } => {
            println!("{}", zone_for(heart_rate).as_str());
            Ok(())
        }
    }
}

fn cmd_replay(
    input: &PathBuf,
    output: &PathBuf,
    output_format: Option<OutputFormat>,
    load_intervals: Option<&std::path::Path>,
    save_intervals: Option<&std::path::Path>,
) -> Result<(), WfitCliError> {
    let input_data = read_input(input)?;

    let mut samples: Vec<SensorSample> = Vec::new();
    for line in input_data.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let sample: SensorSample = serde_json::from_str(trimmed)
            .map_err(|e| WfitCliError::ParseError(format!("Failed to parse sample: {e}")))?;
        samples.push(sample);
    }

    if samples.is_empty() {
        return Err(WfitCliError::NoSamples);
    }
    samples.sort_by_key(|s| s.timestamp);

    let store = match load_intervals {
        Some(path) => {
            let json = fs::read_to_string(path)?;
            MemoryIntervalStore::from_json(&json)?
        }
        None => MemoryIntervalStore::new(),
    };

    let start = samples[0].timestamp;
    let end = samples[samples.len() - 1].timestamp;

    let mut monitor = SleepMonitor::new(store);
    let mut detector = MotionDetector::new(start);
    let mut gate = HeartRateGate::new();
    let mut last_tick = start;

    monitor.handle_event(MonitorEvent::Start, start);

    for sample in &samples {
        let now = sample.timestamp;
        if let Some(accel) = sample.accel {
            detector.process_sample(accel, now);
        }
        if let Some(bpm) = sample.heart_rate_bpm {
            gate.accept(bpm, now);
        }

        // Classifier cadence: one tick per interval, not per sample
        if (now - last_tick).num_minutes() >= TICK_INTERVAL_MINUTES {
            let heart_rate = gate.latest().unwrap_or(0);
            monitor.tick(now, detector.minutes_since_movement(now), heart_rate);
            last_tick = now;
        }
    }

    monitor.handle_event(MonitorEvent::Stop, end);

    let store = monitor.into_store();
    if let Some(path) = save_intervals {
        fs::write(path, store.to_json()?)?;
    }

    let intervals = store.all()?;
    let output_data = format_records(&intervals, resolve_format(output_format, output))?;
    write_output(output, &output_data)
}

fn cmd_aggregate(
    input: &PathBuf,
    input_format: InputFormat,
    output: &PathBuf,
    output_format: Option<OutputFormat>,
    sweep_from: Option<String>,
) -> Result<(), WfitCliError> {
    let input_data = read_input(input)?;

    let intervals: Vec<SleepInterval> = match input_format {
        InputFormat::Ndjson => {
            let mut parsed = Vec::new();
            for line in input_data.lines() {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let interval: SleepInterval = serde_json::from_str(trimmed).map_err(|e| {
                    WfitCliError::ParseError(format!("Failed to parse interval: {e}"))
                })?;
                parsed.push(interval);
            }
            parsed
        }
        InputFormat::Json => serde_json::from_str(&input_data)
            .map_err(|e| WfitCliError::ParseError(format!("Failed to parse intervals: {e}")))?,
    };

    let intervals = match sweep_from {
        Some(date_str) => {
            let today = chrono::NaiveDate::parse_from_str(&date_str, "%Y-%m-%d")
                .map_err(|e| WfitCliError::ParseError(format!("Invalid sweep date: {e}")))?;
            let mut store = MemoryIntervalStore::new();
            for interval in intervals {
                store.insert(interval)?;
            }
            sweep_old_intervals(&mut store, today)?;
            store.all()?
        }
        None => intervals,
    };

    let summaries = aggregate(&intervals);
    let output_data = format_records(&summaries, resolve_format(output_format, output))?;
    write_output(output, &output_data)
}

// Helper functions

fn read_input(input: &PathBuf) -> Result<String, WfitCliError> {
    if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn write_output(output: &PathBuf, data: &str) -> Result<(), WfitCliError> {
    if output.to_string_lossy() == "-" {
        print!("{data}");
        Ok(())
    } else {
        fs::write(output, data)?;
        Ok(())
    }
}

fn resolve_format(requested: Option<OutputFormat>, output: &PathBuf) -> OutputFormat {
    requested.unwrap_or_else(|| {
        if output.to_string_lossy() == "-" && atty::is(atty::Stream::Stdout) {
            OutputFormat::JsonPretty
        } else {
            OutputFormat::Ndjson
        }
    })
}

fn format_records<T: serde::Serialize>(
    records: &[T],
    format: OutputFormat,
) -> Result<String, WfitCliError> {
    match format {
        OutputFormat::Ndjson => {
            let mut lines: Vec<String> = Vec::new();
            for record in records {
                lines.push(serde_json::to_string(record)?);
            }
            Ok(lines.join("\n") + "\n")
        }
        OutputFormat::Json => Ok(serde_json::to_string(records)?),
        OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(records)?),
    }
}

// Error types

#[derive(Debug)]
enum WfitCliError {
    Io(io::Error),
    Engine(wfit_core::MonitorError),
    Json(serde_json::Error),
    NoSamples,
    ParseError(String),
}

impl From<io::Error> for WfitCliError {
    fn from(e: io::Error) -> Self {
        WfitCliError::Io(e)
    }
}

impl From<wfit_core::MonitorError> for WfitCliError {
    fn from(e: wfit_core::MonitorError) -> Self {
        WfitCliError::Engine(e)
    }
}

impl From<serde_json::Error> for WfitCliError {
    fn from(e: serde_json::Error) -> Self {
        WfitCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<WfitCliError> for CliError {
    fn from(e: WfitCliError) -> Self {
        match e {
            WfitCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            WfitCliError::Engine(e) => CliError {
                code: "ENGINE_ERROR".to_string(),
                message: e.to_string(),
                hint: None,
            },
            WfitCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            WfitCliError::NoSamples => CliError {
                code: "NO_SAMPLES".to_string(),
                message: "No sensor samples found in input".to_string(),
                hint: Some("Ensure input file is not empty".to_string()),
            },
            WfitCliError::ParseError(msg) => CliError {
                code: "PARSE_ERROR".to_string(),
                message: msg,
                hint: Some("Check input format".to_string()),
            },
        }
    }
}
