//! Blogport CMS Client
//!
//! Authenticated client for the subset of the content management API used by
//! the import and export pipelines.
//!
//! # Modules
//!
//! - [`client`] - HTTP client for spaces, entries and assets
//! - [`types`] - Wire types for request and response bodies
//! - [`error`] - Error type for remote calls

pub mod client;
pub mod error;
pub mod types;

pub use client::{CmsClient, Credentials};
pub use error::{CmsError, Result};
pub use types::{Asset, AssetFile, Entry, EntryFields, Link, NewAsset, Sys};
