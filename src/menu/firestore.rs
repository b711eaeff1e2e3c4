//! Firestore Menu Adapter
//!
//! Lists the documents of one Firestore collection over the REST API and maps
//! them into [`MenuItem`]s. Each document contributes its own id, a string
//! `name` field and a numeric `price` field.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, instrument};

use super::models::{collect_menu, MenuItem, MenuRecord};
use super::repository::RestaurantRepository;
use crate::config::FirestoreConfig;
use crate::error::DataSourceError;

/// Body of a `documents.list` response. An empty collection omits `documents`;
/// the last page omits `nextPageToken`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListDocumentsResponse {
    #[serde(default)]
    documents: Vec<Document>,

    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Document {
    /// Full resource name, `projects/{p}/databases/{d}/documents/{collection}/{id}`
    name: String,

    #[serde(default)]
    fields: HashMap<String, Value>,
}

impl Document {
    fn id(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }

    fn string_field(&self, key: &str) -> Option<String> {
        self.fields
            .get(key)?
            .get("stringValue")?
            .as_str()
            .map(str::to_string)
    }

    /// Reads a `doubleValue` or `integerValue` field. Integers arrive as decimal strings;
    /// non-finite doubles arrive as strings such as `"NaN"`.
    fn number_field(&self, key: &str) -> Option<f64> {
        let field = self.fields.get(key)?;
        if let Some(value) = field.get("doubleValue") {
            return value
                .as_f64()
                .or_else(|| value.as_str().and_then(|s| s.parse().ok()));
        }
        field
            .get("integerValue")?
            .as_str()
            .and_then(|s| s.parse::<i64>().ok())
            .map(|n| n as f64)
    }

    fn into_record(self) -> MenuRecord {
        MenuRecord {
            id: self.id().to_string(),
            name: self.string_field("name"),
            price: self.number_field("price"),
        }
    }
}

/// Repository backed by a Firestore collection
pub struct FirestoreRestaurantRepository {
    client: reqwest::Client,
    config: FirestoreConfig,
}

impl FirestoreRestaurantRepository {
    pub fn new(config: FirestoreConfig, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self { client, config }
    }

    fn collection_url(&self) -> String {
        format!(
            "{}/projects/{}/databases/{}/documents/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.project_id,
            self.config.database,
            self.config.collection
        )
    }

    /// Fetches one `documents.list` page.
    async fn fetch_page(
        &self,
        page_token: Option<&str>,
    ) -> Result<ListDocumentsResponse, DataSourceError> {
        let mut request = self.client.get(self.collection_url());
        if let Some(key) = &self.config.api_key {
            request = request.query(&[("key", key)]);
        }
        if let Some(token) = page_token {
            request = request.query(&[("pageToken", token)]);
        }
        if let Some(token) = &self.config.bearer_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DataSourceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl RestaurantRepository for FirestoreRestaurantRepository {
    /// Reads every page of the collection; a failure on any page fails the load.
    #[instrument(name = "firestore_load_menu", skip(self), fields(collection = %self.config.collection))]
    async fn load_menu(&self) -> Result<Vec<MenuItem>, DataSourceError> {
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let page = self.fetch_page(page_token.as_deref()).await?;
            pages += 1;
            documents.extend(page.documents);

            match page.next_page_token.filter(|token| !token.is_empty()) {
                Some(next) => page_token = Some(next),
                None => break,
            }
        }

        let fetched = documents.len();
        let menu = collect_menu(documents.into_iter().map(Document::into_record));

        info!(pages, fetched, kept = menu.len(), "menu documents loaded");
        Ok(menu)
    }
}
