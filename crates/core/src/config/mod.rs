//! Configuration loading and schema definitions
//!
//! Settings shared by the OpenMarket command-line tools.

mod loader;
mod schema;

pub use loader::{Config, CONFIG_CANDIDATES};
pub use schema::*;
