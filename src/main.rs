//! Shrinkwrap CLI - batch image compression with a fixed worker pool.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use console::style;
use tracing::warn;

use shrinkwrap::report::human_size;
use shrinkwrap::{scan, Config, Coordinator};

/// How long the confirmation prompt waits before assuming "No"
const CONFIRM_TIMEOUT: Duration = Duration::from_secs(10);

/// Shrinkwrap - Parallel Batch Image Compressor
#[derive(Parser)]
#[command(
    name = "shrinkwrap",
    version,
    about = "Compress trees of JPEG/PNG images to a pixel budget, in parallel",
    long_about = "Shrinkwrap walks a directory tree (or takes a single file), downscales \
                  every JPEG/PNG over the configured pixel budget, optionally stamps a text \
                  watermark, and re-encodes into a mirrored compressed_files tree using a \
                  fixed pool of worker threads. Each run ends with a summary report."
)]
struct Cli {
    /// Input file or directory
    #[arg(value_name = "PATH")]
    input: PathBuf,

    /// Maximum number of pixels for a compressed image
    #[arg(short = 's', long, value_name = "PIXELS")]
    max_pixels: Option<u64>,

    /// Number of worker threads (default: logical CPU count)
    #[arg(short = 't', long, value_name = "COUNT")]
    workers: Option<usize>,

    /// Directory to place the compressed tree under (default: the input)
    #[arg(short = 'd', long, value_name = "PATH")]
    output_dir: Option<PathBuf>,

    /// Watermark text (empty disables watermarking)
    #[arg(short = 'w', long, value_name = "TEXT")]
    watermark: Option<String>,

    /// Path to the watermark font file
    #[arg(short = 'f', long, value_name = "FILE")]
    font: Option<PathBuf>,

    /// Skip the confirmation prompt
    #[arg(short = 'y', long = "yes")]
    yes: bool,

    /// Also write the run report as JSON
    #[arg(long)]
    json_report: bool,

    /// Configuration file (TOML or YAML)
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short = 'v', long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    shrinkwrap::init(cli.verbose);

    if let Err(err) = run(cli) {
        eprintln!("{} {:#}", style("error:").red().bold(), err);
        process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = build_config(&cli)?;
    config.validate()?;

    let input_metadata = std::fs::metadata(&cli.input)
        .with_context(|| format!("failed to access input path {}", cli.input.display()))?;

    let output_base = match &config.output_dir {
        Some(dir) => dir.clone(),
        None if input_metadata.is_dir() => cli.input.clone(),
        None => cli
            .input
            .parent()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(".")),
    };
    let output_root = output_base.join("compressed_files");

    let scanned = scan(&cli.input, &output_root)?;

    println!(
        "Total files to be compressed: {}",
        style(scanned.items.len()).bold()
    );
    println!(
        "Total size of current files: {}",
        style(human_size(scanned.total_bytes)).bold()
    );
    println!(
        "Approximate size after conversion: {}",
        human_size(scanned.total_bytes / 2)
    );
    println!(
        "Estimated time required: {:.1?}",
        Duration::from_millis(500 * scanned.items.len() as u64)
    );

    if !config.skip_confirmation && !confirm(CONFIRM_TIMEOUT)? {
        println!("Operation cancelled.");
        return Ok(());
    }

    let total_input_bytes = scanned.total_bytes;
    let report = Coordinator::new(config.clone())
        .run(scanned.items, &output_root, total_input_bytes)?;

    println!();
    println!("Actual time taken: {:.2?}", report.elapsed());
    println!(
        "Compressed {} of {} files ({} -> {})",
        style(report.succeeded()).green(),
        report.total_files,
        human_size(report.total_input_bytes),
        human_size(report.total_output_bytes)
    );
    if !report.failed_files.is_empty() {
        println!(
            "{} {} files failed; see the report for details",
            style("warning:").yellow().bold(),
            report.failed_files.len()
        );
    }

    let report_path = output_root.join("report.txt");
    report.write_text(&report_path)?;
    if config.json_report {
        report.write_json(&output_root.join("report.json"))?;
    }

    println!("Compression completed successfully");
    Ok(())
}

/// Assemble the effective configuration: defaults, then the config file,
/// then command-line overrides.
fn build_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => Config::default(),
    };

    if let Some(max_pixels) = cli.max_pixels {
        config.max_pixels = max_pixels;
    }
    if let Some(workers) = cli.workers {
        config.workers = workers;
    }
    if cli.output_dir.is_some() {
        config.output_dir = cli.output_dir.clone();
    }
    if cli.watermark.is_some() {
        config.watermark_text = cli.watermark.clone();
    }
    if let Some(font) = &cli.font {
        config.font_path = font.clone();
    }
    if cli.yes {
        config.skip_confirmation = true;
    }
    if cli.json_report {
        config.json_report = true;
    }

    Ok(config)
}

/// Ask for confirmation on stdin, defaulting to "No" after the timeout.
fn confirm(timeout: Duration) -> anyhow::Result<bool> {
    print!("Do you want to proceed? (Y/N): ");
    io::stdout().flush()?;

    let (sender, receiver) = mpsc::channel();
    thread::spawn(move || {
        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line).is_ok() {
            let _ = sender.send(line.trim().to_lowercase());
        }
    });

    match receiver.recv_timeout(timeout) {
        Ok(answer) => Ok(answer == "y"),
        Err(_) => {
            println!();
            warn!("no input received, defaulting to 'No'");
            Ok(false)
        }
    }
}
