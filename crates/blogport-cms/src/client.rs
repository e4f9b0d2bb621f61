//! HTTP client for the content management API.
//!
//! All calls are scoped to one space environment and authenticated with a
//! bearer token. Process and publish calls carry the resource version the
//! caller last saw; the CMS rejects them with 409 when it has moved on.

use std::{fmt, time::Duration};

use blogport_core::CmsConfig;
use reqwest::{Client, RequestBuilder, header::CONTENT_TYPE};
use serde::{Serialize, de::DeserializeOwned};
use tracing::debug;

use crate::{
    error::{CmsError, Result},
    types::{Asset, Collection, Entry, EntryFields, EnvironmentInfo, NewAsset, NewEntry},
};

/// Media type for management API request bodies.
pub const MANAGEMENT_CONTENT_TYPE: &str = "application/vnd.contentful.management.v1+json";

/// Header carrying the expected resource version.
pub const VERSION_HEADER: &str = "X-Contentful-Version";

/// Header naming the content type of a new entry.
pub const CONTENT_TYPE_HEADER: &str = "X-Contentful-Content-Type";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Space id and management token.
#[derive(Clone)]
pub struct Credentials {
    pub space_id: String,
    pub management_token: String,
}

impl Credentials {
    /// Create credentials from explicit values.
    pub fn new(space_id: impl Into<String>, management_token: impl Into<String>) -> Self {
        Self {
            space_id: space_id.into(),
            management_token: management_token.into(),
        }
    }

    /// Credentials from configuration, or `None` if either value is blank.
    #[must_use]
    pub fn from_config(cms: &CmsConfig) -> Option<Self> {
        if !cms.missing_credentials().is_empty() {
            return None;
        }
        Some(Self::new(
            cms.space_id.as_deref()?.trim(),
            cms.management_token.as_deref()?.trim(),
        ))
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("space_id", &self.space_id)
            .field("management_token", &"<redacted>")
            .finish()
    }
}

/// Client for one space environment.
#[derive(Clone)]
pub struct CmsClient {
    http: Client,
    base_url: String,
    token: String,
    space_id: String,
    locale: String,
}

impl fmt::Debug for CmsClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CmsClient")
            .field("base_url", &self.base_url)
            .field("locale", &self.locale)
            .finish_non_exhaustive()
    }
}

impl CmsClient {
    /// Create a client for the space and environment in `cms`.
    pub fn new(cms: &CmsConfig, credentials: &Credentials) -> Result<Self> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("blogport/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let base_url = format!(
            "{}/spaces/{}/environments/{}",
            cms.api_url.trim_end_matches('/'),
            credentials.space_id,
            cms.environment
        );

        Ok(Self {
            http,
            base_url,
            token: credentials.management_token.clone(),
            space_id: credentials.space_id.clone(),
            locale: cms.locale.clone(),
        })
    }

    /// Space this client writes to.
    #[must_use]
    pub fn space_id(&self) -> &str {
        &self.space_id
    }

    /// Locale used for localized fields.
    #[must_use]
    pub fn locale(&self) -> &str {
        &self.locale
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.bearer_auth(&self.token)
    }

    fn with_body<B: Serialize>(&self, request: RequestBuilder, body: &B) -> Result<RequestBuilder> {
        Ok(request
            .header(CONTENT_TYPE, MANAGEMENT_CONTENT_TYPE)
            .body(serde_json::to_vec(body)?))
    }

    /// Send a request and decode a JSON success body.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let text = self.send_raw(request).await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Send a request, map non-success statuses to [`CmsError::Api`] and
    /// return the body text.
    async fn send_raw(&self, request: RequestBuilder) -> Result<String> {
        let response = self.authorized(request).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            debug!(status = status.as_u16(), body = %text, "CMS request failed");
            return Err(CmsError::from_response(status.as_u16(), &text));
        }

        Ok(text)
    }

    /// Read the environment. Succeeds only if the token can access the space.
    pub async fn environment(&self) -> Result<EnvironmentInfo> {
        debug!(space = %self.space_id, "checking environment access");
        self.send(self.http.get(&self.base_url)).await
    }

    /// List up to `limit` entries of `content_type`.
    pub async fn list_entries(&self, content_type: &str, limit: usize) -> Result<Vec<Entry>> {
        let request = self
            .http
            .get(self.url("/entries"))
            .query(&[("content_type", content_type.to_string()), ("limit", limit.to_string())]);

        let collection: Collection<Entry> = self.send(request).await?;
        debug!(
            count = collection.items.len(),
            total = ?collection.total,
            content_type,
            "listed entries"
        );
        Ok(collection.items)
    }

    /// Create a draft asset.
    pub async fn create_asset(&self, asset: &NewAsset) -> Result<Asset> {
        let request = self.with_body(self.http.post(self.url("/assets")), asset)?;
        self.send(request).await
    }

    /// Fetch an asset.
    pub async fn asset(&self, id: &str) -> Result<Asset> {
        self.send(self.http.get(self.url(&format!("/assets/{id}"))))
            .await
    }

    /// Ask the CMS to fetch and process the asset file for this client's
    /// locale. Processing completes asynchronously.
    pub async fn process_asset(&self, id: &str, version: u64) -> Result<()> {
        let request = self
            .http
            .put(self.url(&format!("/assets/{id}/files/{}/process", self.locale)))
            .header(VERSION_HEADER, version);
        self.send_raw(request).await.map(|_| ())
    }

    /// Publish an asset at `version`. Any success status counts, whatever
    /// the body holds.
    pub async fn publish_asset(&self, id: &str, version: u64) -> Result<()> {
        let request = self
            .http
            .put(self.url(&format!("/assets/{id}/published")))
            .header(VERSION_HEADER, version);
        self.send_raw(request).await.map(|_| ())
    }

    /// Create a draft entry of `content_type`.
    pub async fn create_entry(&self, content_type: &str, fields: &EntryFields) -> Result<Entry> {
        let request = self
            .http
            .post(self.url("/entries"))
            .header(CONTENT_TYPE_HEADER, content_type);
        let request = self.with_body(request, &NewEntry { fields })?;
        self.send(request).await
    }

    /// Publish an entry at `version`. Any success status counts, whatever
    /// the body holds.
    pub async fn publish_entry(&self, id: &str, version: u64) -> Result<()> {
        let request = self
            .http
            .put(self.url(&format!("/entries/{id}/published")))
            .header(VERSION_HEADER, version);
        self.send_raw(request).await.map(|_| ())
    }
}


#[cfg(test)]
mod integration_tests {
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::types::{Link, localized};

    const ENV_PATH: &str = "/spaces/space1/environments/master";

    fn create_mock_client(mock_server: &MockServer) -> CmsClient {
        let cms = CmsConfig {
            api_url: mock_server.uri(),
            ..CmsConfig::default()
        };
        CmsClient::new(&cms, &Credentials::new("space1", "test_token")).unwrap()
    }

    #[tokio::test]
    async fn test_environment_ok() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(ENV_PATH))
            .and(header("Authorization", "Bearer test_token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "sys": { "id": "master", "version": 1 },
                "name": "master"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_mock_client(&mock_server);
        let env = client.environment().await.unwrap();
        assert_eq!(env.sys.id, "master");
    }

    #[tokio::test]
    async fn test_environment_unauthorized() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(ENV_PATH))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "sys": { "type": "Error", "id": "AccessTokenInvalid" },
                "message": "The access token you sent could not be found or is invalid."
            })))
            .mount(&mock_server)
            .await;

        let client = create_mock_client(&mock_server);
        let err = client.environment().await.unwrap_err();

        assert_eq!(err.status(), Some(401));
        assert_eq!(err.error_id(), Some("AccessTokenInvalid"));
    }

    #[tokio::test]
    async fn test_list_entries() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(format!("{ENV_PATH}/entries")))
            .and(query_param("content_type", "title"))
            .and(query_param("limit", "1000"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "total": 2,
                "items": [
                    { "sys": { "id": "e1" }, "fields": { "title": { "en-US": "First" } } },
                    { "sys": { "id": "e2" }, "fields": { "title": { "en-US": "Second" } } }
                ]
            })))
            .mount(&mock_server)
            .await;

        let client = create_mock_client(&mock_server);
        let entries = client.list_entries("title", 1000).await.unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].text("title", "en-US"), Some("Second"));
    }

    #[tokio::test]
    async fn test_create_asset_sends_management_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(format!("{ENV_PATH}/assets")))
            .and(header("Content-Type", MANAGEMENT_CONTENT_TYPE))
            .and(body_partial_json(json!({
                "fields": { "file": { "en-US": { "upload": "https://img/a.png" } } }
            })))
            .respond_with(
                ResponseTemplate::new(201)
                    .set_body_json(json!({ "sys": { "id": "asset1", "version": 1 } })),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_mock_client(&mock_server);
        let asset = NewAsset::remote("en-US", "A", "a.png", "image/png", "https://img/a.png");
        let created = client.create_asset(&asset).await.unwrap();

        assert_eq!(created.sys.id, "asset1");
        assert_eq!(created.sys.version, Some(1));
    }

    #[tokio::test]
    async fn test_process_and_publish_asset_send_versions() {
        let mock_server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path(format!("{ENV_PATH}/assets/asset1/files/en-US/process")))
            .and(header(VERSION_HEADER, "1"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("PUT"))
            .and(path(format!("{ENV_PATH}/assets/asset1/published")))
            .and(header(VERSION_HEADER, "2"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "sys": { "id": "asset1", "version": 3 } })),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_mock_client(&mock_server);
        client.process_asset("asset1", 1).await.unwrap();
        client.publish_asset("asset1", 2).await.unwrap();
    }

    #[tokio::test]
    async fn test_create_entry_sets_content_type_header() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(format!("{ENV_PATH}/entries")))
            .and(header(CONTENT_TYPE_HEADER, "title"))
            .and(body_partial_json(json!({
                "fields": { "title": { "en-US": "Hello" }, "price": { "en-US": 2.5 } }
            })))
            .respond_with(
                ResponseTemplate::new(201)
                    .set_body_json(json!({ "sys": { "id": "entry1", "version": 1 } })),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_mock_client(&mock_server);
        let fields = EntryFields {
            title: localized("en-US", "Hello".to_string()),
            slug: localized("en-US", "hello".to_string()),
            author: localized("en-US", String::new()),
            price: localized("en-US", 2.5),
            description: None,
            categories: None,
            image: Some(localized("en-US", Link::asset("asset1"))),
        };

        let entry = client.create_entry("title", &fields).await.unwrap();
        assert_eq!(entry.sys.id, "entry1");
    }

    #[tokio::test]
    async fn test_publish_accepts_empty_success_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path(format!("{ENV_PATH}/entries/entry1/published")))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("PUT"))
            .and(path(format!("{ENV_PATH}/assets/asset1/published")))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_mock_client(&mock_server);
        client.publish_entry("entry1", 1).await.unwrap();
        client.publish_asset("asset1", 2).await.unwrap();
    }

    #[tokio::test]
    async fn test_publish_entry_conflict() {
        let mock_server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path(format!("{ENV_PATH}/entries/entry1/published")))
            .respond_with(ResponseTemplate::new(409).set_body_json(json!({
                "sys": { "type": "Error", "id": "VersionMismatch" },
                "message": "Version mismatch"
            })))
            .mount(&mock_server)
            .await;

        let client = create_mock_client(&mock_server);
        let err = client.publish_entry("entry1", 1).await.unwrap_err();

        assert_eq!(err.status(), Some(409));
        assert_eq!(err.api_message(), Some("Version mismatch"));
    }
}
