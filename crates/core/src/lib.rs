//! Core utilities for the Fixmap issue reporter
//!
//! This crate provides functionality shared by the widget and its hosts:
//!
//! - **Error handling**: Errors with codes, context, and recovery suggestions
//! - **Configuration**: TOML-based configuration with defaults and validation
//! - **Validation**: A fluent validator for form and configuration fields
//!
//! # Example
//!
//! ```rust,no_run
//! use fixmap_core::config::Config;
//!
//! let config = Config::load(None).expect("config");
//! config.validate().expect("valid config");
//! println!("default zoom: {}", config.schema.map.default_zoom);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod validation;

pub use error::{Error, ErrorCode, Result, ResultExt};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{Config, ConfigSchema};
    pub use crate::error::{Error, ErrorCode, Result, ResultExt};
    pub use crate::validation::{ValidationResult, Validator};
}
