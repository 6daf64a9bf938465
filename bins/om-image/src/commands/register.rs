//! Register command - build a product registration request offline
//!
//! Drives the registration controller the way the product screen does:
//! pick each photo into the next free slot, select the currency, then
//! submit. The request body is written to a file instead of the network.

use crate::OutputFormat;
use openmarket_cli::output::{format_size, Status};
use openmarket_core::{Error, ErrorCode, Result, ResultExt};
use openmarket_image::{ImageUploadPreparer, PreparationReport, PreparerConfig};
use openmarket_register::{
    Currency, CurrencyControl, GallerySelection, PhotoPickerDelegate, ProductDraft,
    ProductUploader, RegisterError, RegisterProductController, RegistrationRequest, SubmitAction,
    UploadError, UploadReceipt, MAX_PRODUCT_IMAGES,
};
use serde::Serialize;
use std::path::{Path, PathBuf};

use super::read_photo;

/// Writes the multipart body to a file.
pub struct FileUploader {
    path: PathBuf,
}

impl FileUploader {
    /// Uploader that writes to `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ProductUploader for FileUploader {
    fn upload(&self, request: &RegistrationRequest) -> std::result::Result<UploadReceipt, UploadError> {
        let body = request.multipart_body()?;
        std::fs::write(&self.path, &body)?;
        tracing::debug!(
            path = %self.path.display(),
            content_type = %request.content_type(),
            "Wrote registration body"
        );
        Ok(UploadReceipt {
            request_id: request.id(),
            body_len: body.len(),
        })
    }
}

#[derive(Debug, Serialize)]
struct JsonRegisterOutput {
    receipt: UploadReceipt,
    out: String,
    currency: Currency,
    photos: Vec<PreparationReport>,
}

/// Run register command
pub fn run(
    draft_path: &Path,
    currency: Currency,
    images: &[PathBuf],
    out: &Path,
    config: &PreparerConfig,
    format: OutputFormat,
) -> Result<()> {
    if images.len() > MAX_PRODUCT_IMAGES {
        return Err(Error::validation(format!(
            "At most {} photos can be attached, got {}",
            MAX_PRODUCT_IMAGES,
            images.len()
        )));
    }

    let draft = load_draft(draft_path)?;

    let preparer = ImageUploadPreparer::new(config.clone())?;
    let decoder = preparer.clone();
    let mut controller = RegisterProductController::new(preparer, FileUploader::new(out));
    controller.select_currency(currency.index());

    let mut reports = Vec::with_capacity(images.len());
    for path in images {
        let photo = decoder
            .decode(&read_photo(path)?)
            .map_err(Error::from)
            .context(format!("While reading {}", path.display()))?;

        let item = controller.slots().active_count();
        let request = controller
            .select_item(item)
            .ok_or_else(|| Error::validation("No free photo slot"))?;
        let report = controller
            .did_pick(&photo)
            .map_err(register_error)
            .context(format!("While preparing {}", path.display()))?;

        if format == OutputFormat::Text {
            Status::info(&format!(
                "Slot {}: {} -> {}",
                request.slot + 1,
                path.display(),
                format_size(report.final_len as u64)
            ));
        }
        reports.push(report.clone());
    }

    let receipt = controller.submit(&draft).map_err(register_error)?;

    match format {
        OutputFormat::Json => {
            let doc = JsonRegisterOutput {
                receipt,
                out: out.display().to_string(),
                currency: controller.currency(),
                photos: reports,
            };
            println!("{}", serde_json::to_string_pretty(&doc)?);
        }
        OutputFormat::Text => {
            Status::success(&format!(
                "Request {} written to {} ({})",
                receipt.request_id,
                out.display(),
                format_size(receipt.body_len as u64)
            ));
        }
    }

    Ok(())
}

fn load_draft(path: &Path) -> Result<ProductDraft> {
    if !path.is_file() {
        return Err(Error::file_not_found(path));
    }
    let content = std::fs::read_to_string(path)?;
    let draft = serde_json::from_str(&content)
        .map_err(Error::from)
        .context(format!("While reading {}", path.display()))?;
    Ok(draft)
}

fn register_error(err: RegisterError) -> Error {
    match err {
        RegisterError::Validation(e) => Error::validation(format!("{}: {}", e.title(), e)),
        RegisterError::Image(e) => e.into(),
        RegisterError::Upload(UploadError::Rejected { status, message }) => Error::new(
            ErrorCode::UploadRejected,
            format!("Rejected with status {}: {}", status, message),
        ),
        RegisterError::Upload(e) => Error::upload(e.to_string()).with_source(e),
        other => Error::new(ErrorCode::Internal, other.to_string()),
    }
}
