//! Core utilities for OpenMarket tools
//!
//! This crate provides shared functionality used by the command-line tools:
//!
//! - **Error handling**: coded errors with context, recovery suggestions and exit codes
//! - **Configuration**: TOML configuration discovery, loading and validation
//!
//! # Example
//!
//! ```rust,no_run
//! use openmarket_core::config::Config;
//!
//! let config = Config::load(None).expect("invalid configuration");
//! println!("Upload budget: {} bytes", config.schema.prepare.budget_bytes);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;

pub use error::{exit_codes, Error, ErrorCode, Result, ResultExt};
