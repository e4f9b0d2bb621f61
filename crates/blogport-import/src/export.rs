//! Conversion of CMS entries back into records.

use std::collections::HashMap;

use blogport_cms::{CmsClient, Entry, Result};
use blogport_core::ImportRecord;
use serde_json::Value;
use tracing::{debug, info, warn};

/// Fetch up to `limit` entries of `content_type` as records.
///
/// Linked images are resolved to their delivery URL. An image that cannot be
/// resolved exports as an empty URL.
pub async fn export_records(
    client: &CmsClient,
    content_type: &str,
    limit: usize,
) -> Result<Vec<ImportRecord>> {
    let entries = client.list_entries(content_type, limit).await?;
    let locale = client.locale();

    let mut urls: HashMap<String, String> = HashMap::new();
    let mut records = Vec::with_capacity(entries.len());

    for entry in &entries {
        let mut record = entry_record(entry, locale);

        if let Some(asset_id) = entry.linked_asset_id("image", locale) {
            let url = match urls.get(&asset_id) {
                Some(url) => url.clone(),
                None => {
                    let url = resolve_image(client, &asset_id).await;
                    urls.insert(asset_id, url.clone());
                    url
                }
            };
            record.image_url = Some(url);
        }

        records.push(record);
    }

    info!(count = records.len(), assets = urls.len(), "exported entries");
    Ok(records)
}

async fn resolve_image(client: &CmsClient, asset_id: &str) -> String {
    match client.asset(asset_id).await {
        Ok(asset) => asset.delivery_url(client.locale()).unwrap_or_else(|| {
            debug!(asset_id, "linked asset has no delivery URL");
            String::new()
        }),
        Err(e) => {
            warn!(asset_id, error = %e, "could not resolve linked asset");
            String::new()
        }
    }
}

/// Map entry fields onto a record. Image URLs are resolved separately.
pub(crate) fn entry_record(entry: &Entry, locale: &str) -> ImportRecord {
    let text = |name: &str| entry.text(name, locale).map(str::to_string);

    ImportRecord {
        title: text("title").unwrap_or_default(),
        slug: text("slug").unwrap_or_default(),
        author: Some(text("author").unwrap_or_default()),
        price: entry.number("price", locale),
        content: Some(text("description").unwrap_or_default()),
        categories: Some(categories(entry.field("categories", locale))),
        published_at: Some(entry.sys.published_at.clone().unwrap_or_default()),
        image_url: Some(String::new()),
    }
}

/// Categories are written as one string but may be stored as a list by
/// other tools.
fn categories(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join(", "),
        _ => String::new(),
    }
}
