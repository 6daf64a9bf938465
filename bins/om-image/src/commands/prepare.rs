//! Prepare command - compress a single photo for upload

use super::{default_output, read_photo, PrepareOverrides};
use crate::OutputFormat;
use openmarket_cli::output::{format_size, print_report, Status};
use openmarket_cli::progress::{finish_error, spinner};
use openmarket_core::{Error, Result};
use openmarket_image::{PreparationReport, PreparerConfig};
use openmarket_telemetry::Timer;
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Serialize)]
struct JsonPrepareOutput<'a> {
    input: String,
    output: String,
    mime_type: &'static str,
    elapsed_ms: u64,
    report: &'a PreparationReport,
}

/// Run prepare command
pub fn run(
    input: &Path,
    output: Option<&Path>,
    overrides: &PrepareOverrides,
    config: &PreparerConfig,
    format: OutputFormat,
) -> Result<()> {
    let preparer = overrides.preparer(config)?;
    let data = read_photo(input)?;

    let pb = (format == OutputFormat::Text)
        .then(|| spinner(&format!("Preparing {}", input.display())));

    let timer = Timer::start("prepare_ms");
    let prepared = preparer.prepare_bytes(&data);
    let elapsed = timer.stop();

    let prepared = match prepared {
        Ok(prepared) => {
            if let Some(pb) = &pb {
                pb.finish_and_clear();
            }
            prepared
        }
        Err(e) => {
            if let Some(pb) = &pb {
                finish_error(pb, &e.to_string());
            }
            return Err(Error::from(e).with_context(format!("While preparing {}", input.display())));
        }
    };

    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_output(input));
    std::fs::write(&output, prepared.encoded.as_bytes())
        .map_err(|e| Error::io(format!("Failed to write {}: {}", output.display(), e)))?;

    match format {
        OutputFormat::Json => {
            let doc = JsonPrepareOutput {
                input: input.display().to_string(),
                output: output.display().to_string(),
                mime_type: prepared.encoded.mime_type(),
                elapsed_ms: elapsed.as_millis() as u64,
                report: &prepared.report,
            };
            println!("{}", serde_json::to_string_pretty(&doc)?);
        }
        OutputFormat::Text => {
            let name = input
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| input.display().to_string());
            print_report(&name, &prepared.report, elapsed);
            Status::info(&format!(
                "Wrote {} ({})",
                output.display(),
                format_size(prepared.encoded.len() as u64)
            ));
        }
    }

    Ok(())
}
