//! Import records exchanged between the CSV codec, the HTTP API and the
//! import pipeline.

use serde::{Deserialize, Deserializer, Serialize};

/// One post to be imported into the CMS.
///
/// Produced by [`crate::codec::parse`] from one CSV data row, or received as
/// JSON from a browser client. The title is the only identity used for
/// de-duplication.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRecord {
    /// Post title.
    #[serde(default)]
    pub title: String,

    /// URL slug.
    #[serde(default)]
    pub slug: String,

    /// Author name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    /// Price; JSON clients may send a number or a numeric string.
    #[serde(
        default,
        deserialize_with = "lenient_price",
        skip_serializing_if = "Option::is_none"
    )]
    pub price: Option<f64>,

    /// Body text, stored as the entry description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    /// Free-form category list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<String>,

    /// Original publication timestamp, informational only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,

    /// Remote image to upload as a CMS asset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl ImportRecord {
    /// Create a record with just a title and slug.
    pub fn new(title: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            slug: slug.into(),
            ..Self::default()
        }
    }

    /// Image URL if present and non-blank.
    #[must_use]
    pub fn image_url(&self) -> Option<&str> {
        non_blank(self.image_url.as_deref())
    }

    /// Content if present and non-empty.
    #[must_use]
    pub fn content(&self) -> Option<&str> {
        non_blank(self.content.as_deref())
    }

    /// Categories if present and non-empty.
    #[must_use]
    pub fn categories(&self) -> Option<&str> {
        non_blank(self.categories.as_deref())
    }

    /// Price, zero when absent.
    #[must_use]
    pub fn price_or_zero(&self) -> f64 {
        self.price.unwrap_or(0.0)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Parse a price the way a form field would be read: numbers pass through,
/// numeric strings are parsed, anything else is treated as absent.
pub fn parse_price(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|p| p.is_finite())
}

fn lenient_price<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => parse_price(&s),
        _ => None,
    })
}
