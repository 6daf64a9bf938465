//! Preparer configuration.
//!
//! Deserialized from the `[prepare]` table of the application config; every
//! field has a default so an empty table is valid.

use crate::budget::{CompressionBudget, DEFAULT_BUDGET_BYTES};
use crate::error::{ImageError, Result};
use serde::{Deserialize, Serialize};

/// What to do when every resample attempt is spent and the photo is still too large.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverBudgetPolicy {
    /// Return the smallest encoding reached and flag it in the report
    #[default]
    Accept,
    /// Fail with [`ImageError::BudgetNotAchieved`]
    Reject,
}

/// Settings for [`crate::ImageUploadPreparer`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreparerConfig {
    /// Maximum encoded size in bytes
    #[serde(default = "default_budget_bytes")]
    pub budget_bytes: usize,

    /// JPEG quality (1-100), fixed across attempts
    #[serde(default = "default_quality")]
    pub quality: u8,

    /// Policy once the scale schedule is exhausted
    #[serde(default)]
    pub over_budget: OverBudgetPolicy,

    /// Background (RGB) that transparent pixels are flattened onto
    #[serde(default = "default_background")]
    pub background: [u8; 3],

    /// Largest source, in pixels, that `prepare_bytes` will decode
    #[serde(default = "default_max_source_pixels")]
    pub max_source_pixels: u64,
}

impl Default for PreparerConfig {
    fn default() -> Self {
        Self {
            budget_bytes: default_budget_bytes(),
            quality: default_quality(),
            over_budget: OverBudgetPolicy::default(),
            background: default_background(),
            max_source_pixels: default_max_source_pixels(),
        }
    }
}

impl PreparerConfig {
    /// The configured budget.
    pub fn budget(&self) -> CompressionBudget {
        CompressionBudget::new(self.budget_bytes)
    }

    /// Reject values the preparer cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.budget_bytes == 0 {
            return Err(ImageError::InvalidConfig(
                "budget_bytes must be greater than zero".into(),
            ));
        }
        if !(1..=100).contains(&self.quality) {
            return Err(ImageError::InvalidConfig(format!(
                "quality must be between 1 and 100, got {}",
                self.quality
            )));
        }
        if self.max_source_pixels == 0 {
            return Err(ImageError::InvalidConfig(
                "max_source_pixels must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

fn default_budget_bytes() -> usize {
    DEFAULT_BUDGET_BYTES
}

fn default_quality() -> u8 {
    50
}

fn default_background() -> [u8; 3] {
    [255, 255, 255]
}

fn default_max_source_pixels() -> u64 {
    100_000_000
}
