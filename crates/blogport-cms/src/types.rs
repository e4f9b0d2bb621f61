//! Wire types for the content management API.
//!
//! Every field value is localized: the JSON shape is
//! `{ "<field>": { "<locale>": <value> } }`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Map from locale code to field value.
pub type Localized<T> = BTreeMap<String, T>;

/// Build a single-locale value.
pub fn localized<T>(locale: &str, value: T) -> Localized<T> {
    BTreeMap::from([(locale.to_string(), value)])
}

/// System metadata attached to every CMS resource.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sys {
    /// Opaque resource id.
    pub id: String,

    /// Revision counter; mutating calls must echo it.
    #[serde(default)]
    pub version: Option<u64>,

    /// When the current published revision went live.
    #[serde(default)]
    pub published_at: Option<String>,

    /// Revision that was last published.
    #[serde(default)]
    pub published_version: Option<u64>,
}

/// A space environment; only read to prove the token works.
#[derive(Debug, Clone, Deserialize)]
pub struct EnvironmentInfo {
    pub sys: Sys,
    #[serde(default)]
    pub name: Option<String>,
}

/// Paginated listing response.
#[derive(Debug, Clone, Deserialize)]
pub struct Collection<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    #[serde(default)]
    pub total: Option<u64>,
}

/// A link to another resource, as stored in reference fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub sys: LinkSys,
}

/// Target of a [`Link`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkSys {
    #[serde(rename = "type")]
    pub kind: String,
    pub link_type: String,
    pub id: String,
}

impl Link {
    /// Link to an asset by id.
    pub fn asset(id: impl Into<String>) -> Self {
        Self {
            sys: LinkSys {
                kind: "Link".to_string(),
                link_type: "Asset".to_string(),
                id: id.into(),
            },
        }
    }
}

/// File attached to an asset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetFile {
    pub content_type: String,
    pub file_name: String,

    /// Remote source the CMS fetches during processing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upload: Option<String>,

    /// Delivery URL, present once processing has finished.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Localized asset fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<Localized<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<Localized<AssetFile>>,
}

/// Request body for asset creation.
#[derive(Debug, Clone, Serialize)]
pub struct NewAsset {
    pub fields: AssetFields,
}

impl NewAsset {
    /// Asset whose file the CMS will fetch from `upload_url`.
    pub fn remote(
        locale: &str,
        title: &str,
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        upload_url: impl Into<String>,
    ) -> Self {
        Self {
            fields: AssetFields {
                title: Some(localized(locale, title.to_string())),
                file: Some(localized(
                    locale,
                    AssetFile {
                        content_type: content_type.into(),
                        file_name: file_name.into(),
                        upload: Some(upload_url.into()),
                        url: None,
                    },
                )),
            },
        }
    }
}

/// An asset as returned by the CMS.
#[derive(Debug, Clone, Deserialize)]
pub struct Asset {
    pub sys: Sys,
    #[serde(default)]
    pub fields: AssetFields,
}

impl Asset {
    /// File for `locale`, if any.
    #[must_use]
    pub fn file(&self, locale: &str) -> Option<&AssetFile> {
        self.fields.file.as_ref().and_then(|f| f.get(locale))
    }

    /// Whether processing produced a delivery URL for `locale`.
    #[must_use]
    pub fn is_processed(&self, locale: &str) -> bool {
        self.file(locale)
            .and_then(|f| f.url.as_deref())
            .is_some_and(|u| !u.is_empty())
    }

    /// Delivery URL with an explicit scheme.
    ///
    /// The CMS returns protocol-relative URLs (`//images.example.net/...`).
    #[must_use]
    pub fn delivery_url(&self, locale: &str) -> Option<String> {
        let url = self.file(locale)?.url.as_deref()?;
        if url.is_empty() {
            None
        } else if url.starts_with("//") {
            Some(format!("https:{url}"))
        } else {
            Some(url.to_string())
        }
    }
}

/// Blog post fields written on entry creation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryFields {
    pub title: Localized<String>,
    pub slug: Localized<String>,
    pub author: Localized<String>,
    pub price: Localized<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Localized<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categories: Option<Localized<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<Localized<Link>>,
}

/// Request body for entry creation.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct NewEntry<'a> {
    pub fields: &'a EntryFields,
}

/// An entry as returned by the CMS. Fields are kept untyped because the
/// listing may contain entries written by other tools.
#[derive(Debug, Clone, Deserialize)]
pub struct Entry {
    pub sys: Sys,
    #[serde(default)]
    pub fields: BTreeMap<String, Localized<Value>>,
}

impl Entry {
    /// Raw value of `field` in `locale`.
    #[must_use]
    pub fn field(&self, name: &str, locale: &str) -> Option<&Value> {
        self.fields.get(name).and_then(|f| f.get(locale))
    }

    /// String value of `field` in `locale`.
    #[must_use]
    pub fn text(&self, name: &str, locale: &str) -> Option<&str> {
        self.field(name, locale).and_then(Value::as_str)
    }

    /// Numeric value of `field` in `locale`.
    #[must_use]
    pub fn number(&self, name: &str, locale: &str) -> Option<f64> {
        self.field(name, locale).and_then(Value::as_f64)
    }

    /// Id of the asset linked from `field` in `locale`.
    #[must_use]
    pub fn linked_asset_id(&self, name: &str, locale: &str) -> Option<String> {
        let link: Link = serde_json::from_value(self.field(name, locale)?.clone()).ok()?;
        (link.sys.link_type == "Asset").then_some(link.sys.id)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_new_asset_shape() {
        let asset = NewAsset::remote("en-US", "Cover", "cover.png", "image/png", "https://x/c.png");
        let value = serde_json::to_value(&asset).unwrap();

        assert_eq!(
            value,
            json!({
                "fields": {
                    "title": { "en-US": "Cover" },
                    "file": { "en-US": {
                        "contentType": "image/png",
                        "fileName": "cover.png",
                        "upload": "https://x/c.png"
                    }}
                }
            })
        );
    }

    #[test]
    fn test_entry_fields_skip_absent_optionals() {
        let fields = EntryFields {
            title: localized("en-US", "Post".to_string()),
            slug: localized("en-US", "post".to_string()),
            author: localized("en-US", String::new()),
            price: localized("en-US", 0.0),
            description: None,
            categories: None,
            image: Some(localized("en-US", Link::asset("asset1"))),
        };
        let value = serde_json::to_value(&fields).unwrap();

        assert!(value.get("description").is_none());
        assert!(value.get("categories").is_none());
        assert_eq!(
            value["image"]["en-US"],
            json!({ "sys": { "type": "Link", "linkType": "Asset", "id": "asset1" } })
        );
    }

    #[test]
    fn test_entry_accessors() {
        let entry: Entry = serde_json::from_value(json!({
            "sys": { "id": "e1", "version": 3, "publishedAt": "2024-03-01T10:00:00Z" },
            "fields": {
                "title": { "en-US": "Hello" },
                "price": { "en-US": 4.5 },
                "image": { "en-US": { "sys": { "type": "Link", "linkType": "Asset", "id": "a9" } } }
            }
        }))
        .unwrap();

        assert_eq!(entry.sys.version, Some(3));
        assert_eq!(entry.sys.published_at.as_deref(), Some("2024-03-01T10:00:00Z"));
        assert_eq!(entry.text("title", "en-US"), Some("Hello"));
        assert_eq!(entry.text("title", "de-DE"), None);
        assert_eq!(entry.number("price", "en-US"), Some(4.5));
        assert_eq!(entry.linked_asset_id("image", "en-US"), Some("a9".to_string()));
        assert_eq!(entry.linked_asset_id("title", "en-US"), None);
    }

    #[test]
    fn test_asset_delivery_url() {
        let asset: Asset = serde_json::from_value(json!({
            "sys": { "id": "a1", "version": 2 },
            "fields": { "file": { "en-US": {
                "contentType": "image/png",
                "fileName": "a.png",
                "url": "//images.example.net/a.png"
            }}}
        }))
        .unwrap();

        assert!(asset.is_processed("en-US"));
        assert_eq!(
            asset.delivery_url("en-US").as_deref(),
            Some("https://images.example.net/a.png")
        );
        assert!(!asset.is_processed("de-DE"));
    }
}
