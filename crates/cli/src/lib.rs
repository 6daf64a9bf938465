//! Terminal helpers shared by OpenMarket binaries
//!
//! - Status lines and size formatting
//! - Preparation report rendering
//! - Progress bars for batch runs

#![warn(missing_docs)]

pub mod output;
pub mod progress;
