//! Detect command - identify a photo's format

use super::read_photo;
use crate::OutputFormat;
use openmarket_cli::output::Status;
use openmarket_core::{Result, ResultExt};
use openmarket_image::detect_format;
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Serialize)]
struct JsonDetectOutput {
    path: String,
    format: &'static str,
    mime_type: &'static str,
    extensions: &'static [&'static str],
    decodable: bool,
}

/// Run detect command
pub fn run(path: &Path, format: OutputFormat) -> Result<()> {
    let data = read_photo(path)?;
    let detected = detect_format(&data)
        .map_err(openmarket_core::Error::from)
        .context(format!("While reading {}", path.display()))?;

    match format {
        OutputFormat::Json => {
            let doc = JsonDetectOutput {
                path: path.display().to_string(),
                format: detected.name(),
                mime_type: detected.mime_type(),
                extensions: detected.extensions(),
                decodable: detected.is_decodable(),
            };
            println!("{}", serde_json::to_string_pretty(&doc)?);
        }
        OutputFormat::Text => {
            println!("Format: {}", detected.name());
            println!("MIME: {}", detected.mime_type());
            println!("Extensions: {}", detected.extensions().join(", "));
            if detected.is_decodable() {
                Status::success("Can be prepared for upload");
            } else {
                Status::warning("Cannot be decoded; export the photo as JPEG first");
            }
        }
    }

    Ok(())
}
