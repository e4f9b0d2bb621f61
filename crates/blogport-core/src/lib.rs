//! Blogport Core Library
//!
//! Core types, configuration, and the CSV codec shared by the Blogport crates.

pub mod codec;
pub mod config;
pub mod error;
pub mod record;

pub use config::{CmsConfig, Config, ImportConfig, ProcessingConfig, ServerConfig};
pub use error::{CoreError, Result};
pub use record::ImportRecord;
