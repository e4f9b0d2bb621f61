//! Image upload.
//!
//! An asset moves through create → process → publish. Processing runs
//! asynchronously on the CMS side, so after requesting it the uploader polls
//! the asset with exponential backoff until a delivery URL appears or the
//! configured timeout passes, then publishes at the version it last saw.
//! Every failure here degrades the record instead of failing it.

use blogport_cms::{CmsClient, NewAsset};
use blogport_core::{ImportRecord, ProcessingConfig};
use tokio::time::{Instant, sleep};
use tracing::{debug, info, warn};

/// Content type declared for uploaded images.
pub const IMAGE_CONTENT_TYPE: &str = "image/png";

/// Result of the image sub-step for one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageStep {
    /// The record has no image.
    Skipped,
    /// Asset created, processed and published.
    Published { asset_id: String },
    /// Asset created but not published. It is still linked from the entry.
    Unpublished { asset_id: String, reason: String },
    /// Asset could not be created; the entry gets no image.
    Failed { reason: String },
}

impl ImageStep {
    /// Asset to link from the entry, if one was created.
    #[must_use]
    pub fn asset_id(&self) -> Option<&str> {
        match self {
            Self::Published { asset_id } | Self::Unpublished { asset_id, .. } => Some(asset_id),
            Self::Skipped | Self::Failed { .. } => None,
        }
    }

    /// Warning to attach to the record outcome, if degraded.
    #[must_use]
    pub fn warning(&self) -> Option<String> {
        match self {
            Self::Unpublished { reason, .. } => Some(format!("image not published: {reason}")),
            Self::Failed { reason } => Some(format!("image not uploaded: {reason}")),
            Self::Skipped | Self::Published { .. } => None,
        }
    }
}

/// Title used for assets and entries when the record has none.
pub(crate) fn display_title(record: &ImportRecord) -> &str {
    if record.title.is_empty() {
        "Untitled"
    } else {
        &record.title
    }
}

/// File name for the uploaded image, derived from the slug.
#[must_use]
pub fn image_file_name(record: &ImportRecord) -> String {
    let stem = if record.slug.is_empty() {
        "image"
    } else {
        &record.slug
    };
    format!("{stem}.png")
}

/// Uploads record images as CMS assets.
#[derive(Debug)]
pub struct AssetUploader<'a> {
    client: &'a CmsClient,
    processing: &'a ProcessingConfig,
}

impl<'a> AssetUploader<'a> {
    #[must_use]
    pub fn new(client: &'a CmsClient, processing: &'a ProcessingConfig) -> Self {
        Self { client, processing }
    }

    /// Upload the record's image, if it has one.
    pub async fn upload(&self, record: &ImportRecord) -> ImageStep {
        let Some(image_url) = record.image_url() else {
            return ImageStep::Skipped;
        };

        let new_asset = NewAsset::remote(
            self.client.locale(),
            display_title(record),
            image_file_name(record),
            IMAGE_CONTENT_TYPE,
            image_url,
        );

        let asset = match self.client.create_asset(&new_asset).await {
            Ok(asset) => asset,
            Err(e) => {
                warn!(title = %record.title, error = %e, "image upload failed");
                return ImageStep::Failed {
                    reason: e.to_string(),
                };
            }
        };

        let asset_id = asset.sys.id;
        let created_version = asset.sys.version.unwrap_or(1);
        debug!(%asset_id, created_version, "asset created");

        sleep(self.processing.initial_delay()).await;

        if let Err(e) = self.client.process_asset(&asset_id, created_version).await {
            warn!(%asset_id, error = %e, "asset processing request failed");
            return ImageStep::Unpublished {
                asset_id,
                reason: format!("processing failed: {e}"),
            };
        }

        let version = self
            .wait_until_processed(&asset_id, created_version + 1)
            .await;

        match self.client.publish_asset(&asset_id, version).await {
            Ok(_) => {
                info!(%asset_id, "asset published");
                ImageStep::Published { asset_id }
            }
            Err(e) => {
                warn!(%asset_id, version, error = %e, "asset publish failed");
                ImageStep::Unpublished {
                    asset_id,
                    reason: format!("publish failed: {e}"),
                }
            }
        }
    }

    /// Poll until the asset has a delivery URL or the timeout passes.
    /// Returns the latest version seen, or `fallback` if none was.
    async fn wait_until_processed(&self, asset_id: &str, fallback: u64) -> u64 {
        let deadline = Instant::now() + self.processing.timeout();
        let mut interval = self.processing.poll_interval();
        let mut version = fallback;
        let mut polls = 0u32;

        loop {
            polls += 1;
            match self.client.asset(asset_id).await {
                Ok(asset) => {
                    if let Some(v) = asset.sys.version {
                        version = v;
                    }
                    if asset.is_processed(self.client.locale()) {
                        debug!(asset_id, version, polls, "asset processed");
                        return version;
                    }
                }
                Err(e) => debug!(asset_id, error = %e, "asset status poll failed"),
            }

            let now = Instant::now();
            if now >= deadline {
                warn!(asset_id, polls, "asset processing did not finish in time");
                return version;
            }

            sleep(interval.min(deadline - now)).await;
            interval = (interval * 2).min(self.processing.max_poll_interval());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_file_name() {
        assert_eq!(image_file_name(&ImportRecord::new("A", "my-post")), "my-post.png");
        assert_eq!(image_file_name(&ImportRecord::new("A", "")), "image.png");
    }

    #[test]
    fn test_display_title_default() {
        assert_eq!(display_title(&ImportRecord::new("", "x")), "Untitled");
        assert_eq!(display_title(&ImportRecord::new("Post", "x")), "Post");
    }

    #[test]
    fn test_image_step_links_and_warnings() {
        let published = ImageStep::Published {
            asset_id: "a1".to_string(),
        };
        assert_eq!(published.asset_id(), Some("a1"));
        assert!(published.warning().is_none());

        let unpublished = ImageStep::Unpublished {
            asset_id: "a2".to_string(),
            reason: "publish failed".to_string(),
        };
        assert_eq!(unpublished.asset_id(), Some("a2"));
        assert_eq!(
            unpublished.warning().as_deref(),
            Some("image not published: publish failed")
        );

        let failed = ImageStep::Failed {
            reason: "bad url".to_string(),
        };
        assert_eq!(failed.asset_id(), None);
        assert!(failed.warning().unwrap().starts_with("image not uploaded"));

        assert_eq!(ImageStep::Skipped.asset_id(), None);
        assert!(ImageStep::Skipped.warning().is_none());
    }
}
