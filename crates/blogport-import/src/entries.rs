//! Entry creation and publishing.

use blogport_cms::{CmsClient, CmsError, EntryFields, Link, types::localized};
use blogport_core::ImportRecord;
use tracing::{error, info, warn};

use crate::assets::display_title;

/// Result of the entry sub-step for one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryStep {
    /// Entry created and published.
    Published { entry_id: String },
    /// Entry created but left as a draft.
    Draft { entry_id: String, reason: String },
    /// Entry could not be created.
    Failed { message: String },
}

/// Map a record onto entry fields for `locale`.
///
/// Optional fields are only written when they carry a value.
#[must_use]
pub fn entry_fields(record: &ImportRecord, locale: &str, asset_id: Option<&str>) -> EntryFields {
    EntryFields {
        title: localized(locale, display_title(record).to_string()),
        slug: localized(locale, record.slug.clone()),
        author: localized(locale, record.author.clone().unwrap_or_default()),
        price: localized(locale, record.price_or_zero()),
        description: record.content().map(|c| localized(locale, c.to_string())),
        categories: record.categories().map(|c| localized(locale, c.to_string())),
        image: asset_id.map(|id| localized(locale, Link::asset(id))),
    }
}

/// Creates and publishes entries of one content type.
#[derive(Debug)]
pub struct EntryPublisher<'a> {
    client: &'a CmsClient,
    content_type: &'a str,
}

impl<'a> EntryPublisher<'a> {
    #[must_use]
    pub fn new(client: &'a CmsClient, content_type: &'a str) -> Self {
        Self {
            client,
            content_type,
        }
    }

    /// Create the entry for `record`, linking `asset_id` if given, then
    /// publish it.
    pub async fn publish(&self, record: &ImportRecord, asset_id: Option<&str>) -> EntryStep {
        let fields = entry_fields(record, self.client.locale(), asset_id);

        let entry = match self.client.create_entry(self.content_type, &fields).await {
            Ok(entry) => entry,
            Err(e) => {
                error!(title = %record.title, error = %e, "entry creation failed");
                return EntryStep::Failed {
                    message: creation_failure_message(&e),
                };
            }
        };

        let entry_id = entry.sys.id;
        let version = entry.sys.version.unwrap_or(1);

        match self.client.publish_entry(&entry_id, version).await {
            Ok(_) => {
                info!(title = %record.title, %entry_id, "entry published");
                EntryStep::Published { entry_id }
            }
            Err(e) => {
                warn!(title = %record.title, %entry_id, error = %e, "entry publish failed, left as draft");
                EntryStep::Draft {
                    entry_id,
                    reason: e.to_string(),
                }
            }
        }
    }
}

fn creation_failure_message(err: &CmsError) -> String {
    match err.api_message() {
        Some(message) => message.to_string(),
        None => format!("Failed to create entry: {err}"),
    }
}
