//! Batch converter from saved annotation documents to threshold CSV tables

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use log::{info, warn};

use audimark::extract::{CalibrationSource, extract_thresholds, thresholds_to_csv};
use audimark::persistence::load_annotation;

/// Convert a directory of annotation JSON documents into one threshold CSV
/// per report.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Directory with annotation documents in JSON format
    #[arg(short, long)]
    input_dir: PathBuf,
    /// Directory where the CSVs are written, one per annotation
    #[arg(short, long)]
    output_dir: PathBuf,
    /// Calibrate each audiogram panel from its own corners instead of
    /// reusing the first panel's calibration for the whole report
    #[arg(long)]
    per_audiogram: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let source = if cli.per_audiogram {
        CalibrationSource::PerAudiogram
    } else {
        CalibrationSource::FirstAudiogram
    };

    fs::create_dir_all(&cli.output_dir)
        .with_context(|| format!("creating {}", cli.output_dir.display()))?;

    let entries = fs::read_dir(&cli.input_dir)
        .with_context(|| format!("reading {}", cli.input_dir.display()))?;

    let mut converted = 0usize;
    for entry in entries {
        let path = entry?.path();
        if path.extension().is_none_or(|ext| ext != "json") {
            continue;
        }
        match convert(&path, &cli.output_dir, source) {
            Ok(output) => {
                converted += 1;
                info!("wrote {}", output.display());
            }
            Err(err) => warn!("skipping {}: {err:#}", path.display()),
        }
    }
    info!("converted {converted} annotation(s)");
    Ok(())
}

fn convert(path: &Path, output_dir: &Path, source: CalibrationSource) -> anyhow::Result<PathBuf> {
    let annotation = load_annotation(path)?;
    let thresholds = extract_thresholds(&annotation, source)?;
    let stem = path
        .file_stem()
        .with_context(|| format!("no file stem in {}", path.display()))?;
    let output = output_dir.join(stem).with_extension("csv");
    fs::write(&output, thresholds_to_csv(&thresholds))
        .with_context(|| format!("writing {}", output.display()))?;
    Ok(output)
}
