//! # AIMG Common Library
//!
//! Shared code for the AIMG image collection tools including:
//! - Error and result types
//! - Configuration loading and root folder resolution
//! - Image identifier generation and parsing
//! - Display mode definitions
//! - Timestamp helpers

pub mod config;
pub mod display;
pub mod error;
pub mod time;
pub mod uuid_utils;

pub use display::DisplayMode;
pub use error::{Error, Result};
