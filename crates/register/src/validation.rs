//! Draft validation.
//!
//! Turns the raw text of the registration form into [`PostParameter`],
//! stopping at the first field that does not pass.

use crate::currency::Currency;
use crate::slots::ImageSlots;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use thiserror::Error;

/// Allowed product name length, in characters.
pub const NAME_LENGTH: RangeInclusive<usize> = 3..=100;

/// Allowed description length, in characters.
pub const DESCRIPTION_LENGTH: RangeInclusive<usize> = 10..=1000;

/// Raw form input, exactly as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductDraft {
    /// Product name
    pub name: String,
    /// Price in the selected currency
    pub price: String,
    /// Discount amount; empty means none
    pub discounted_price: String,
    /// Stock count; empty or non-numeric leaves it unset
    pub stock: String,
    /// Free-form description
    pub description: String,
}

/// Validated listing fields, in the marketplace's wire shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostParameter {
    /// Product name
    pub name: String,
    /// Description
    pub description: String,
    /// Price
    pub price: f64,
    /// Currency
    pub currency: Currency,
    /// Discount amount
    pub discounted_price: f64,
    /// Stock count
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock: Option<u32>,
}

/// Why a draft was refused.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// No photo selected
    #[error("Add at least one photo")]
    MissingImage,

    /// Name length outside the allowed range
    #[error("Product name must be {min} to {max} characters, got {len}")]
    InvalidName {
        /// Characters entered
        len: usize,
        /// Minimum
        min: usize,
        /// Maximum
        max: usize,
    },

    /// Description length outside the allowed range
    #[error("Description must be {min} to {max} characters, got {len}")]
    InvalidDescription {
        /// Characters entered
        len: usize,
        /// Minimum
        min: usize,
        /// Maximum
        max: usize,
    },

    /// Price missing, malformed, or not positive
    #[error("Invalid price for {currency}: {input:?}")]
    InvalidPrice {
        /// Raw input
        input: String,
        /// Selected currency
        currency: Currency,
    },

    /// Discount malformed or above the price
    #[error("Invalid discounted price {input:?}: must be between 0 and the price")]
    InvalidDiscountedPrice {
        /// Raw input
        input: String,
    },
}

impl ValidationError {
    /// Short title for an alert.
    pub fn title(&self) -> &'static str {
        match self {
            ValidationError::MissingImage => "Photo",
            ValidationError::InvalidName { .. } => "Product name",
            ValidationError::InvalidDescription { .. } => "Description",
            ValidationError::InvalidPrice { .. } => "Price",
            ValidationError::InvalidDiscountedPrice { .. } => "Discounted price",
        }
    }
}

/// Validate `draft` for `currency` against the selected photos.
pub fn validate<T>(
    draft: &ProductDraft,
    currency: Currency,
    images: &ImageSlots<T>,
) -> Result<PostParameter, ValidationError> {
    if images.is_empty() {
        return Err(ValidationError::MissingImage);
    }

    let name = draft.name.trim();
    let len = name.chars().count();
    if !NAME_LENGTH.contains(&len) {
        return Err(ValidationError::InvalidName {
            len,
            min: *NAME_LENGTH.start(),
            max: *NAME_LENGTH.end(),
        });
    }

    let description = draft.description.trim();
    let len = description.chars().count();
    if !DESCRIPTION_LENGTH.contains(&len) {
        return Err(ValidationError::InvalidDescription {
            len,
            min: *DESCRIPTION_LENGTH.start(),
            max: *DESCRIPTION_LENGTH.end(),
        });
    }

    let price = parse_amount(&draft.price, currency)
        .filter(|p| *p > 0.0)
        .ok_or_else(|| ValidationError::InvalidPrice {
            input: draft.price.clone(),
            currency,
        })?;

    let discounted_price = if draft.discounted_price.trim().is_empty() {
        0.0
    } else {
        parse_amount(&draft.discounted_price, currency)
            .filter(|d| *d <= price)
            .ok_or_else(|| ValidationError::InvalidDiscountedPrice {
                input: draft.discounted_price.clone(),
            })?
    };

    let stock = draft.stock.trim().parse::<u32>().ok();

    Ok(PostParameter {
        name: name.to_string(),
        description: description.to_string(),
        price,
        currency,
        discounted_price,
        stock,
    })
}

/// Parse a non-negative amount. Whole numbers only for currencies without
/// fractions, at most two decimals otherwise.
fn parse_amount(input: &str, currency: Currency) -> Option<f64> {
    let input = input.trim();
    if input.is_empty() || !input.bytes().all(|b| b.is_ascii_digit() || b == b'.') {
        return None;
    }

    match input.split_once('.') {
        None => input.parse::<u64>().ok().map(|v| v as f64),
        Some(_) if !currency.allows_fraction() => None,
        Some((whole, frac)) if !whole.is_empty() && frac.len() <= 2 && !frac.contains('.') => {
            input.parse::<f64>().ok()
        }
        Some(_) => None,
    }
}
