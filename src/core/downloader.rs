use crate::adapters::archive::ArchiveClient;
use crate::domain::ports::Storage;
use crate::utils::error::Result;
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::time::Duration;

pub const COMBINED_FILE: &str = "metadata_all_collections.json";

pub fn collection_file(collection: &str) -> String {
    format!("metadata_{}.json", collection)
}

fn envelope(items: Vec<Value>) -> Value {
    json!({ "nyplAPI": { "response": { "capture": items } } })
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CollectionResult {
    pub collection: String,
    pub items: usize,
    pub pages: u32,
    /// Why pagination stopped early, if it did.
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DownloadSummary {
    pub collections: Vec<CollectionResult>,
    pub total_items: usize,
    pub files_written: Vec<String>,
}

impl DownloadSummary {
    pub fn collections_with_items(&self) -> usize {
        self.collections.iter().filter(|c| c.items > 0).count()
    }

    pub fn failed(&self) -> impl Iterator<Item = &CollectionResult> {
        self.collections.iter().filter(|c| c.error.is_some())
    }
}

/// Pages through each collection and writes one file per collection plus a
/// combined file.
pub struct MetadataDownloader<S: Storage> {
    client: ArchiveClient,
    storage: S,
    per_page: u32,
    page_delay: Duration,
}

impl<S: Storage> MetadataDownloader<S> {
    pub fn new(client: ArchiveClient, storage: S) -> Self {
        Self {
            client,
            storage,
            per_page: 50,
            page_delay: Duration::from_secs(1),
        }
    }

    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page;
        self
    }

    pub fn with_page_delay(mut self, page_delay: Duration) -> Self {
        self.page_delay = page_delay;
        self
    }

    /// A failing page ends pagination for this collection only; items
    /// gathered from earlier pages are kept.
    pub async fn fetch_collection(&self, collection: &str) -> (Vec<Value>, CollectionResult) {
        let mut items = Vec::new();
        let mut result = CollectionResult {
            collection: collection.to_string(),
            ..Default::default()
        };
        let mut page = 1;

        loop {
            tracing::info!("Fetching page {} of collection {}", page, collection);

            let fetched = match self.client.fetch_page(collection, page, self.per_page).await {
                Ok(fetched) => fetched,
                Err(e) => {
                    tracing::warn!("Request failed for collection {}: {}", collection, e);
                    result.error = Some(e.to_string());
                    break;
                }
            };

            if fetched.items.is_empty() {
                tracing::info!("No more items found");
                break;
            }

            result.pages += 1;
            tracing::debug!("Found {} items on page {}", fetched.items.len(), page);
            items.extend(fetched.items);

            if page >= fetched.total_pages {
                tracing::info!("Reached last page ({})", fetched.total_pages);
                break;
            }

            page += 1;
            tokio::time::sleep(self.page_delay).await;
        }

        result.items = items.len();
        (items, result)
    }

    pub async fn download_all(&self, collections: &[String]) -> Result<DownloadSummary> {
        let mut summary = DownloadSummary::default();
        let mut combined = Map::new();

        for collection in collections {
            tracing::info!("Processing collection: {}", collection);
            let (items, result) = self.fetch_collection(collection).await;

            if items.is_empty() {
                tracing::warn!("No items downloaded for collection {}", collection);
            } else {
                let path = collection_file(collection);
                let document = envelope(items);
                self.storage
                    .write_file(&path, &serde_json::to_vec_pretty(&document)?)
                    .await?;
                tracing::info!(
                    "Collection {}: {} items saved to {}",
                    collection,
                    result.items,
                    path
                );
                summary.files_written.push(path);
                combined.insert(collection.clone(), document);
            }

            summary.total_items += result.items;
            summary.collections.push(result);
        }

        if combined.is_empty() {
            tracing::warn!("No items were downloaded from any collection");
        } else {
            let document = Value::Object(combined);
            self.storage
                .write_file(COMBINED_FILE, &serde_json::to_vec_pretty(&document)?)
                .await?;
            summary.files_written.push(COMBINED_FILE.to_string());
            tracing::info!(
                "Download complete: {} items from {} collections, combined metadata saved to {}",
                summary.total_items,
                summary.collections_with_items(),
                COMBINED_FILE
            );
        }

        Ok(summary)
    }
}
