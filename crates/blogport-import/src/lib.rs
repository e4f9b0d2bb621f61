//! Blogport Import Library
//!
//! Moves blog posts between CSV files and the CMS.
//!
//! # Modules
//!
//! - [`duplicates`] - Existing-title lookup and duplicate detection
//! - [`assets`] - Image upload, processing and publishing
//! - [`entries`] - Entry creation and publishing
//! - [`orchestrator`] - Per-batch sequencing and reporting
//! - [`export`] - Conversion of existing entries back into records
//! - [`report`] - Per-record outcomes and the batch report
//! - [`error`] - Fatal, operator-facing errors

pub mod assets;
pub mod duplicates;
pub mod entries;
pub mod error;
pub mod export;
pub mod orchestrator;
pub mod report;

pub use assets::{AssetUploader, ImageStep};
pub use duplicates::{ExistingTitles, is_duplicate, load_existing_titles};
pub use entries::{EntryPublisher, EntryStep};
pub use error::{ImportError, Result};
pub use export::export_records;
pub use orchestrator::Importer;
pub use report::{ImportOutcome, ImportReport, OutcomeStatus, RecordError};
