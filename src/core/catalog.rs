use crate::domain::model::CatalogRecord;
use crate::domain::ports::Storage;
use crate::utils::error::{BroadcastError, Result};
use serde_json::Value;
use std::collections::HashSet;

/// Card records loaded from a metadata file, read-only for the run.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    records: Vec<CatalogRecord>,
    skipped: usize,
}

impl Catalog {
    pub fn new(records: Vec<CatalogRecord>) -> Self {
        Self {
            records,
            skipped: 0,
        }
    }

    pub fn records(&self) -> &[CatalogRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Capture entries that could not be read as records, plus repeated ids.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub async fn load<S: Storage>(storage: &S, path: &str) -> Result<Self> {
        let bytes = storage.read_file(path).await.map_err(|e| {
            BroadcastError::catalog(format!("Could not read metadata file {}: {}", path, e))
        })?;
        let document: Value = serde_json::from_slice(&bytes)?;
        let catalog = Self::from_value(&document)?;

        tracing::info!(
            "Loaded {} cards from {} ({} entries skipped)",
            catalog.len(),
            path,
            catalog.skipped()
        );
        Ok(catalog)
    }

    /// Accepts a single-collection envelope, the combined per-collection map
    /// written by the downloader, or a bare array of records.
    pub fn from_value(document: &Value) -> Result<Self> {
        let mut catalog = Catalog::default();
        let mut seen = HashSet::new();

        match document {
            Value::Array(items) => catalog.extend(items, &mut seen),
            Value::Object(map) if map.contains_key("nyplAPI") => {
                catalog.extend(capture_of(document)?, &mut seen);
            }
            Value::Object(map) => {
                for (collection, envelope) in map {
                    match capture_of(envelope) {
                        Ok(items) => catalog.extend(items, &mut seen),
                        Err(e) => tracing::warn!("Skipping collection {}: {}", collection, e),
                    }
                }
            }
            _ => return Err(BroadcastError::catalog("Metadata must be a JSON object or array")),
        }

        if catalog.records.is_empty() {
            return Err(BroadcastError::catalog("Metadata invalid or 'capture' empty"));
        }
        Ok(catalog)
    }

    /// The first occurrence of an id wins; later copies would skew the draw.
    fn extend(&mut self, items: &[Value], seen: &mut HashSet<String>) {
        for item in items {
            if !item.is_object() {
                self.skipped += 1;
                continue;
            }
            match serde_json::from_value::<CatalogRecord>(item.clone()) {
                Ok(record) if !seen.insert(record.id.clone()) => {
                    tracing::debug!("Skipping repeated card id {}", record.id);
                    self.skipped += 1;
                }
                Ok(record) => self.records.push(record),
                Err(e) => {
                    tracing::debug!("Skipping unreadable capture entry: {}", e);
                    self.skipped += 1;
                }
            }
        }
    }
}

fn capture_of(envelope: &Value) -> Result<&[Value]> {
    envelope
        .get("nyplAPI")
        .and_then(|api| api.get("response"))
        .and_then(|response| response.get("capture"))
        .and_then(|capture| capture.as_array())
        .map(|items| items.as_slice())
        .ok_or_else(|| BroadcastError::catalog("Missing nyplAPI.response.capture list"))
}
