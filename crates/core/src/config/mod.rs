//! Configuration loading and schema definitions
//!
//! Widget settings: map defaults, geolocation options, submission timing
//! and log level. Every field has a default, so a missing file is fine.

mod loader;
mod schema;

pub use loader::Config;
pub use schema::*;
