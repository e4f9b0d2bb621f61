//! Duplicate detection against entries already in the CMS.

use std::collections::HashSet;

use blogport_cms::CmsClient;
use blogport_core::ImportRecord;
use tracing::{info, warn};

/// Titles of entries that already exist remotely.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExistingTitles(HashSet<String>);

impl ExistingTitles {
    /// Whether `title` is present, compared byte for byte.
    #[must_use]
    pub fn contains(&self, title: &str) -> bool {
        self.0.contains(title)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for ExistingTitles {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Fetch the titles of up to `limit` entries of `content_type`.
///
/// Fails open: if the listing fails, the batch proceeds as if nothing exists.
pub async fn load_existing_titles(
    client: &CmsClient,
    content_type: &str,
    limit: usize,
) -> ExistingTitles {
    let entries = match client.list_entries(content_type, limit).await {
        Ok(entries) => entries,
        Err(e) => {
            warn!(error = %e, "could not list existing entries, skipping duplicate check");
            return ExistingTitles::default();
        }
    };

    let titles: ExistingTitles = entries
        .iter()
        .filter_map(|entry| entry.text("title", client.locale()))
        .collect();

    info!(count = titles.len(), "found existing entries");
    titles
}

/// Whether `record` duplicates an existing entry. Exact title match only.
#[must_use]
pub fn is_duplicate(record: &ImportRecord, existing: &ExistingTitles) -> bool {
    existing.contains(&record.title)
}
