//! CLI command implementations

pub mod batch;
pub mod detect;
pub mod prepare;
pub mod register;

use clap::Args;
use openmarket_core::{Error, Result};
use openmarket_image::{ImageUploadPreparer, OverBudgetPolicy, PreparerConfig};
use std::path::{Path, PathBuf};

/// Command-line overrides for the `[prepare]` config section
#[derive(Debug, Clone, Default, Args)]
pub struct PrepareOverrides {
    /// Byte budget for each prepared photo
    #[arg(short, long)]
    pub budget: Option<usize>,

    /// JPEG quality, 1 to 100
    #[arg(long)]
    pub quality: Option<u8>,

    /// Fail instead of keeping a photo that stays over budget
    #[arg(long)]
    pub strict: bool,
}

impl PrepareOverrides {
    /// Apply the overrides on top of `base`.
    pub fn apply(&self, base: &PreparerConfig) -> PreparerConfig {
        let mut config = base.clone();
        if let Some(budget) = self.budget {
            config.budget_bytes = budget;
        }
        if let Some(quality) = self.quality {
            config.quality = quality;
        }
        if self.strict {
            config.over_budget = OverBudgetPolicy::Reject;
        }
        config
    }

    /// Build a preparer from `base` plus the overrides.
    pub fn preparer(&self, base: &PreparerConfig) -> Result<ImageUploadPreparer> {
        ImageUploadPreparer::new(self.apply(base)).map_err(|e| {
            Error::config_invalid(e.to_string())
                .with_suggestion("Check --budget and --quality")
        })
    }
}

/// Read a photo, reporting a missing file with its path.
pub fn read_photo(path: &Path) -> Result<Vec<u8>> {
    if !path.is_file() {
        return Err(Error::file_not_found(path));
    }
    Ok(std::fs::read(path)?)
}

/// `photo.png` becomes `photo-upload.jpg` next to it.
pub fn default_output(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "photo".to_string());
    input.with_file_name(format!("{}-upload.jpg", stem))
}
