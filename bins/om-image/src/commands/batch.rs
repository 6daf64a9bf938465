//! Batch command - prepare every photo under a directory

use super::PrepareOverrides;
use crate::OutputFormat;
use openmarket_cli::output::{format_count, format_size, Status};
use openmarket_cli::progress::{file_progress, finish_error, finish_success};
use openmarket_core::{Error, ErrorCode, Result};
use openmarket_image::{ImageFormat, ImageUploadPreparer, PreparerConfig};
use openmarket_telemetry::{metrics, Timer};
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Serialize)]
struct BatchEntry {
    input: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    output: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    final_len: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    within_budget: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct JsonBatchOutput {
    total: usize,
    prepared: usize,
    over_budget: usize,
    failed: usize,
    photos: Vec<BatchEntry>,
    metrics: serde_json::Value,
}

/// Run batch command
pub fn run(
    dir: &Path,
    out_dir: &Path,
    quiet: bool,
    overrides: &PrepareOverrides,
    config: &PreparerConfig,
    format: OutputFormat,
) -> Result<()> {
    if !dir.is_dir() {
        return Err(Error::new(
            ErrorCode::DirectoryNotFound,
            format!("Directory not found: {}", dir.display()),
        ));
    }
    let preparer = overrides.preparer(config)?;

    let photos = collect_photos(dir);
    std::fs::create_dir_all(out_dir)?;

    let pb = file_progress(photos.len() as u64, quiet || format == OutputFormat::Json);
    let entries: Vec<BatchEntry> = photos
        .par_iter()
        .map(|input| {
            let entry = prepare_one(&preparer, dir, out_dir, input);
            pb.inc(1);
            entry
        })
        .collect();

    let failed = entries.iter().filter(|e| e.error.is_some()).count();
    let over_budget = entries
        .iter()
        .filter(|e| e.within_budget == Some(false))
        .count();
    let prepared = entries.len() - failed;

    if failed == 0 {
        finish_success(&pb, "Done");
    } else {
        finish_error(&pb, &format!("{} failed", format_count(failed, "photo", "photos")));
    }

    match format {
        OutputFormat::Json => {
            let doc = JsonBatchOutput {
                total: entries.len(),
                prepared,
                over_budget,
                failed,
                photos: entries,
                metrics: metrics().export_json(),
            };
            println!("{}", serde_json::to_string_pretty(&doc)?);
        }
        OutputFormat::Text => print_summary(&entries, prepared, over_budget),
    }

    if failed > 0 {
        return Err(Error::new(
            ErrorCode::PreparationFailed,
            format!("{} of {} could not be prepared", failed, format_count(photos.len(), "photo", "photos")),
        ));
    }
    Ok(())
}

fn collect_photos(dir: &Path) -> Vec<PathBuf> {
    let mut photos: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| has_photo_extension(p))
        .collect();
    photos.sort();
    photos
}

fn has_photo_extension(path: &Path) -> bool {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return false;
    };
    ImageFormat::ALL
        .iter()
        .filter(|f| f.is_decodable())
        .flat_map(|f| f.extensions())
        .any(|known| known.eq_ignore_ascii_case(ext))
}

/// `<dir>/a/b.png` is written to `<out_dir>/a/b.jpg`.
fn output_path(dir: &Path, out_dir: &Path, input: &Path) -> PathBuf {
    let relative = input.strip_prefix(dir).unwrap_or(input);
    out_dir.join(relative).with_extension("jpg")
}

fn prepare_one(preparer: &ImageUploadPreparer, dir: &Path, out_dir: &Path, input: &Path) -> BatchEntry {
    let output = output_path(dir, out_dir, input);
    let _timer = Timer::start("prepare_ms");

    let result = std::fs::read(input)
        .map_err(|e| e.to_string())
        .and_then(|data| preparer.prepare_bytes(&data).map_err(|e| e.to_string()))
        .and_then(|prepared| {
            if let Some(parent) = output.parent() {
                std::fs::create_dir_all(parent).map_err(|e| e.to_string())?;
            }
            std::fs::write(&output, prepared.encoded.as_bytes()).map_err(|e| e.to_string())?;
            Ok(prepared)
        });

    match result {
        Ok(prepared) => {
            metrics().increment("photos_prepared");
            if !prepared.report.within_budget {
                metrics().increment("photos_over_budget");
            }
            BatchEntry {
                input: input.to_path_buf(),
                output: Some(output),
                final_len: Some(prepared.report.final_len),
                within_budget: Some(prepared.report.within_budget),
                error: None,
            }
        }
        Err(error) => {
            metrics().increment("photos_failed");
            tracing::warn!(path = %input.display(), %error, "Photo could not be prepared");
            BatchEntry {
                input: input.to_path_buf(),
                output: None,
                final_len: None,
                within_budget: None,
                error: Some(error),
            }
        }
    }
}

fn print_summary(entries: &[BatchEntry], prepared: usize, over_budget: usize) {
    Status::header("Batch summary");
    for entry in entries {
        match (&entry.error, entry.final_len) {
            (Some(error), _) => Status::error(&format!("{}: {}", entry.input.display(), error)),
            (None, Some(len)) if entry.within_budget == Some(false) => Status::warning(&format!(
                "{}: {} (over budget)",
                entry.input.display(),
                format_size(len as u64)
            )),
            (None, Some(len)) => {
                Status::success(&format!("{}: {}", entry.input.display(), format_size(len as u64)))
            }
            (None, None) => {}
        }
    }

    let stats = metrics().histogram_stats("prepare_ms");
    println!();
    Status::info(&format!(
        "{} prepared, {} over budget, p50 {:.0}ms",
        format_count(prepared, "photo", "photos"),
        over_budget,
        stats.p50
    ));
}
