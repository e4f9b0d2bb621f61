//! Batch import and export.
//!
//! [`Importer`] holds everything a batch needs: CMS connection settings and
//! pipeline tuning. Each call to [`Importer::run`] or [`Importer::export`]
//! connects afresh, verifies access, and then works sequentially.

use blogport_cms::{CmsClient, CmsError, Credentials};
use blogport_core::{CmsConfig, Config, ImportConfig, ImportRecord};
use tracing::{error, info, warn};

use crate::{
    assets::{AssetUploader, ImageStep},
    duplicates::{is_duplicate, load_existing_titles},
    entries::{EntryPublisher, EntryStep},
    error::{ImportError, Result},
    export::export_records,
    report::{ImportOutcome, ImportReport, OutcomeStatus, RecordError},
};

/// Runs import and export batches against one CMS space.
#[derive(Debug, Clone)]
pub struct Importer {
    cms: CmsConfig,
    import: ImportConfig,
}

impl Importer {
    pub fn new(cms: CmsConfig, import: ImportConfig) -> Self {
        Self { cms, import }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.cms.clone(), config.import.clone())
    }

    /// Build a client and prove the credentials can access the space.
    ///
    /// Nothing is sent when credentials are missing.
    pub async fn connect(&self) -> Result<CmsClient> {
        let Some(credentials) = Credentials::from_config(&self.cms) else {
            let missing = self.cms.missing_credentials();
            error!(?missing, "CMS credentials are not configured");
            return Err(ImportError::Configuration { missing });
        };

        let client = CmsClient::new(&self.cms, &credentials)?;

        match client.environment().await {
            Ok(env) => {
                info!(space = %client.space_id(), environment = %env.sys.id, "connected to CMS");
                Ok(client)
            }
            Err(CmsError::Api {
                status,
                error_id,
                message,
            }) => {
                error!(status, ?error_id, %message, "CMS rejected the management token");
                Err(ImportError::Authorization {
                    space_id: client.space_id().to_string(),
                    details: message,
                    error_id,
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Import `records` in order.
    ///
    /// Fatal errors happen before any record is touched. After that every
    /// record ends up in exactly one of the report's lists.
    pub async fn run(&self, records: &[ImportRecord]) -> Result<ImportReport> {
        info!(records = records.len(), "starting import");
        let client = self.connect().await?;

        let existing =
            load_existing_titles(&client, &self.cms.content_type, self.import.existing_limit).await;
        let uploader = AssetUploader::new(&client, &self.import.processing);
        let publisher = EntryPublisher::new(&client, &self.cms.content_type);

        let mut report = ImportReport::new();
        for record in records {
            if is_duplicate(record, &existing) {
                info!(title = %record.title, "skipping existing entry");
                report.push_outcome(ImportOutcome::skipped(&record.title));
                continue;
            }

            let image = uploader.upload(record).await;
            let entry = publisher.publish(record, image.asset_id()).await;

            match record_result(record, &image, entry) {
                Ok(outcome) => report.push_outcome(outcome),
                Err(err) => report.push_error(err),
            }
        }

        info!(
            created = report.created,
            skipped = report.skipped,
            failed = report.failed,
            "import finished"
        );
        Ok(report)
    }

    /// Read existing entries back as records.
    pub async fn export(&self) -> Result<Vec<ImportRecord>> {
        let client = self.connect().await?;
        let records =
            export_records(&client, &self.cms.content_type, self.import.existing_limit).await?;
        info!(count = records.len(), "export finished");
        Ok(records)
    }
}

/// Combine the sub-step results for one record.
///
/// Titles are reported as read from the input, blank ones included.
fn record_result(
    record: &ImportRecord,
    image: &ImageStep,
    entry: EntryStep,
) -> std::result::Result<ImportOutcome, RecordError> {
    let title = record.title.as_str();
    let warnings = image.warning().into_iter();

    match entry {
        EntryStep::Published { .. } => {
            Ok(ImportOutcome::new(title, OutcomeStatus::Created).with_warnings(warnings))
        }
        EntryStep::Draft { reason, .. } => {
            warn!(%title, "entry left as draft");
            Ok(ImportOutcome::new(title, OutcomeStatus::DraftOnly)
                .with_warnings(warnings.chain([format!("entry not published: {reason}")])))
        }
        EntryStep::Failed { message } => Err(RecordError::new(title, message)),
    }
}
