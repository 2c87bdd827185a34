//! # Firestore REST Client
//!
//! Reads the `categories` and `products` collections over the Firestore
//! REST API.
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  list_products()                                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  GET {base}/v1/projects/{p}/databases/{db}/documents/products          │
//! │      ?key=..&pageSize=300                                               │
//! │       │                                                                 │
//! │       ├── 200 → documents[] ──► unwrap typed values ──► Product        │
//! │       │         nextPageToken? ──► GET ...&pageToken=.. (repeat)        │
//! │       │                                                                 │
//! │       └── 4xx/5xx → CatalogError::Status (cache keeps old list)         │
//! │                                                                         │
//! │  get_product(id)                                                        │
//! │       GET .../documents/products/{id}                                   │
//! │       ├── 200 → Some(Product)                                           │
//! │       └── 404 → None                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The catalog is read-only from the storefront's point of view; no write
//! endpoints are used.

pub mod value;

use std::time::Duration;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};
use url::Url;

use boutique_core::{Category, Product, CATEGORIES_COLLECTION, PRODUCTS_COLLECTION};

use crate::config::FirestoreConfig;
use crate::error::{CatalogError, CatalogResult};
use crate::CatalogSource;

use self::value::{ListDocumentsPage, RawDocument};

/// Upper bound on pages fetched for one listing.
const MAX_PAGES: usize = 1_000;

/// Firestore REST catalog source.
#[derive(Debug, Clone)]
pub struct FirestoreClient {
    http: reqwest::Client,
    config: FirestoreConfig,
}

impl FirestoreClient {
    /// Creates a client from validated settings.
    pub fn new(config: FirestoreConfig) -> CatalogResult<Self> {
        config.validate()?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        info!(
            project = %config.project_id,
            database = %config.database,
            "Firestore catalog client ready"
        );

        Ok(FirestoreClient { http, config })
    }

    /// Returns the settings this client was built with.
    pub fn config(&self) -> &FirestoreConfig {
        &self.config
    }

    /// URL of a collection, or of one document when `document_id` is set.
    pub fn document_url(
        &self,
        collection: &str,
        document_id: Option<&str>,
        page_token: Option<&str>,
    ) -> CatalogResult<Url> {
        let mut url = Url::parse(&self.config.base_url)?;

        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                CatalogError::InvalidConfig(format!(
                    "firestore.base_url cannot hold a path: {}",
                    self.config.base_url
                ))
            })?;
            segments.pop_if_empty().extend([
                "v1",
                "projects",
                self.config.project_id.as_str(),
                "databases",
                self.config.database.as_str(),
                "documents",
                collection,
            ]);
            if let Some(id) = document_id {
                segments.push(id);
            }
        }

        {
            let mut query = url.query_pairs_mut();
            if let Some(key) = &self.config.api_key {
                query.append_pair("key", key);
            }
            if document_id.is_none() {
                query.append_pair("pageSize", &self.config.page_size.to_string());
            }
            if let Some(token) = page_token {
                query.append_pair("pageToken", token);
            }
        }

        // Drop a dangling "?" when no pair was added
        if url.query() == Some("") {
            url.set_query(None);
        }

        Ok(url)
    }

    /// GETs `url` and decodes the body. Any non-2xx status is an error,
    /// 404 included: a missing collection means a wrong project or
    /// database, not an empty catalog.
    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> CatalogResult<T> {
        let (status, body) = self.fetch(url).await?;
        decode_body(status, body)
    }

    /// Like [`get_json`](Self::get_json), but a 404 is `Ok(None)`.
    async fn get_json_or_missing<T: DeserializeOwned>(&self, url: Url) -> CatalogResult<Option<T>> {
        let (status, body) = self.fetch(url).await?;

        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        decode_body(status, body).map(Some)
    }

    async fn fetch(&self, url: Url) -> CatalogResult<(StatusCode, String)> {
        debug!(path = %url.path(), "Firestore GET");

        let response = self.http.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        Ok((status, body))
    }

    /// Lists every document of `collection`, following `nextPageToken`.
    ///
    /// Documents that don't decode into `T` are skipped with a warning so a
    /// single malformed record doesn't hide the rest of the catalog.
    async fn list_collection<T: DeserializeOwned>(&self, collection: &str) -> CatalogResult<Vec<T>> {
        let mut items = Vec::new();
        let mut page_token: Option<String> = None;

        for _ in 0..MAX_PAGES {
            let url = self.document_url(collection, None, page_token.as_deref())?;
            let page: ListDocumentsPage = self.get_json(url).await?;

            for document in page.documents {
                if let Some(item) = decode_document(collection, document) {
                    items.push(item);
                }
            }

            page_token = page.next_page_token.filter(|token| !token.is_empty());
            if page_token.is_none() {
                debug!(collection, count = items.len(), "Collection listed");
                return Ok(items);
            }
        }

        warn!(collection, pages = MAX_PAGES, "Stopped following page tokens");
        Ok(items)
    }
}

fn decode_body<T: DeserializeOwned>(status: StatusCode, body: String) -> CatalogResult<T> {
    if !status.is_success() {
        return Err(CatalogError::Status {
            status: status.as_u16(),
            body,
        });
    }

    Ok(serde_json::from_str(&body)?)
}

/// Decodes one raw document, logging and discarding it on failure.
fn decode_document<T: DeserializeOwned>(collection: &str, document: RawDocument) -> Option<T> {
    let name = document.name.clone();

    let decoded = document
        .into_plain()
        .and_then(|plain| serde_json::from_value::<T>(plain).map_err(CatalogError::from));

    match decoded {
        Ok(item) => Some(item),
        Err(e) => {
            warn!(collection, document = %name, error = %e, "Skipping undecodable document");
            None
        }
    }
}

impl CatalogSource for FirestoreClient {
    async fn list_categories(&self) -> CatalogResult<Vec<Category>> {
        self.list_collection(CATEGORIES_COLLECTION).await
    }

    async fn list_products(&self) -> CatalogResult<Vec<Product>> {
        self.list_collection(PRODUCTS_COLLECTION).await
    }

    async fn get_product(&self, product_id: &str) -> CatalogResult<Option<Product>> {
        let url = self.document_url(PRODUCTS_COLLECTION, Some(product_id), None)?;

        let Some(document) = self.get_json_or_missing::<RawDocument>(url).await? else {
            return Ok(None);
        };

        let plain = document.into_plain()?;
        let product = serde_json::from_value(plain)
            .map_err(|e| CatalogError::Decode(format!("product {product_id}: {e}")))?;

        Ok(Some(product))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
