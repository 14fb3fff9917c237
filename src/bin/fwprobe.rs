//! fwprobe command line frontend.

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use fwprobe::engine::catalog;
use fwprobe::logging::{init_tracing, init_tracing_json};
use fwprobe::{AnalysisResult, AnalyzeOptions, Analyzer, EngineConfig};

#[derive(Parser, Debug)]
#[command(name = "fwprobe")]
#[command(about = "Identify firmware platforms, map their regions and extract artifacts")]
#[command(version)]
struct Cli {
    /// Firmware image to analyze
    #[arg(required_unless_present = "list_platforms")]
    firmware: Option<PathBuf>,

    /// Pin a platform profile instead of detecting one
    #[arg(short, long, value_name = "NAME")]
    platform: Option<String>,

    /// Extraction output directory
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Skip artifact extraction
    #[arg(long)]
    no_extract: bool,

    /// Write the JSON report to this file
    #[arg(short, long, value_name = "FILE")]
    report: Option<PathBuf>,

    /// Print the JSON report instead of the summary
    #[arg(long)]
    json: bool,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,

    /// Delegated unpacker timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Delegated unpacker program
    #[arg(long, value_name = "PROG")]
    unpacker: Option<String>,

    /// Never run the delegated unpacker
    #[arg(long)]
    no_delegate: bool,

    /// Engine configuration (JSON)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// List known platform profiles and exit
    #[arg(long)]
    list_platforms: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.json_logs {
        init_tracing_json();
    } else {
        init_tracing();
    }

    if cli.list_platforms {
        list_platforms();
        return Ok(());
    }

    let Some(firmware) = cli.firmware.as_ref() else {
        bail!("no firmware image given");
    };

    let mut config = match &cli.config {
        Some(path) => EngineConfig::from_json_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => EngineConfig::default(),
    };
    if let Some(secs) = cli.timeout {
        config.extraction.delegate.timeout_secs = secs;
    }
    if let Some(program) = &cli.unpacker {
        config.extraction.delegate.program = program.clone();
    }
    if cli.no_delegate {
        config.extraction.delegate.enabled = false;
    }

    let options = AnalyzeOptions {
        platform_hint: cli.platform.clone(),
        output_dir: cli.output.clone(),
        extract: !cli.no_extract,
        ..AnalyzeOptions::default()
    };

    info!(firmware = %firmware.display(), "Analyzing firmware");
    let result = Analyzer::new(config)
        .analyze_with(firmware, &options)
        .with_context(|| format!("failed to analyze {}", firmware.display()))?;

    let json = result.to_json_string().context("failed to serialize report")?;
    if let Some(path) = &cli.report {
        std::fs::write(path, &json)
            .with_context(|| format!("failed to write report {}", path.display()))?;
        info!(report = %path.display(), "Report written");
    }

    if cli.json {
        println!("{json}");
    } else {
        print_summary(&result);
    }
    Ok(())
}

fn list_platforms() {
    for profile in catalog::profiles() {
        println!(
            "{:<22} {:<24} {}",
            profile.name,
            profile.family.to_string(),
            profile.description
        );
    }
}

fn print_summary(result: &AnalysisResult) {
    println!("Firmware: {} ({} bytes)", result.source_path.display(), result.source_size);
    match &result.detected_platform {
        Some(p) => {
            let pinned = if p.pinned { " [pinned]" } else { "" };
            println!(
                "Platform: {} ({}, {}){pinned}, confidence {:.2}",
                p.name, p.family, p.architecture, result.confidence
            );
        }
        None => println!("Platform: not detected (confidence {:.2})", result.confidence),
    }

    if !result.candidates.is_empty() {
        println!("\nCandidates:");
        for c in result.candidates.iter().take(5) {
            println!("  {:<22} {:.2}  {} signatures", c.platform, c.confidence, c.distinct_signatures);
        }
    }

    if !result.partitions.is_empty() {
        println!("\nPartitions:");
        for p in &result.partitions {
            println!(
                "  {} #{:<3} 0x{:010x} +0x{:010x}  {}",
                p.scheme, p.number, p.offset, p.length, p.type_name
            );
        }
    }

    if !result.regions.is_empty() {
        println!("\nRegions:");
        for r in &result.regions {
            println!(
                "  {:<10} 0x{:08x} +0x{:08x}  {:.2}  {}",
                r.category.to_string(),
                r.offset,
                r.size,
                r.confidence,
                r.signatures.join(", ")
            );
        }
    }

    println!("\nBoot sequence:");
    for step in &result.boot_sequence {
        println!("  {}", step.description);
    }

    if !result.artifacts.is_empty() {
        println!("\nArtifacts ({}):", result.extraction.strategy);
        for a in &result.artifacts {
            let partial = if a.complete { "" } else { " [incomplete]" };
            println!("  {}  {} bytes  {}{partial}", a.path.display(), a.size_bytes, a.description);
        }
    }

    for w in &result.warnings {
        println!("warning: {w}");
    }
    for e in &result.errors {
        println!("error: {e}");
    }
    for n in &result.notes {
        println!("note: {n}");
    }
}
