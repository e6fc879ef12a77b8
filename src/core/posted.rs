use crate::domain::ports::Storage;
use crate::utils::error::Result;
use std::collections::HashSet;

/// Ids of cards that have already been broadcast, in posting order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostedSet {
    ids: Vec<String>,
    seen: HashSet<String>,
}

impl PostedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps the first occurrence of every id.
    pub fn from_ids<I: IntoIterator<Item = String>>(ids: I) -> Self {
        let mut set = Self::new();
        for id in ids {
            set.insert(id);
        }
        set
    }

    pub fn contains(&self, id: &str) -> bool {
        self.seen.contains(id)
    }

    /// Returns false when the id was already present.
    pub fn insert(&mut self, id: impl Into<String>) -> bool {
        let id = id.into();
        if self.seen.contains(&id) {
            return false;
        }
        self.seen.insert(id.clone());
        self.ids.push(id);
        true
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// The posted list on disk: a JSON array of id strings.
#[derive(Debug, Clone)]
pub struct PostedStore<S: Storage> {
    storage: S,
    path: String,
}

impl<S: Storage> PostedStore<S> {
    pub fn new(storage: S, path: impl Into<String>) -> Self {
        Self {
            storage,
            path: path.into(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// A missing file is an empty set. A malformed one is an error: treating
    /// it as empty would re-send cards that were already posted.
    pub async fn load(&self) -> Result<PostedSet> {
        if !self.storage.exists(&self.path).await {
            tracing::warn!("Posted list {} not found, starting empty", self.path);
            return Ok(PostedSet::new());
        }

        let bytes = self.storage.read_file(&self.path).await?;
        let ids: Vec<String> = serde_json::from_slice(&bytes)?;
        let set = PostedSet::from_ids(ids);
        tracing::debug!("Loaded {} posted ids from {}", set.len(), self.path);
        Ok(set)
    }

    pub async fn save(&self, posted: &PostedSet) -> Result<()> {
        let json = serde_json::to_vec_pretty(posted.ids())?;
        self.storage.write_file(&self.path, &json).await?;
        tracing::debug!("Saved {} posted ids to {}", posted.len(), self.path);
        Ok(())
    }

    /// Load, add one id, persist. A repeated id leaves the file untouched.
    pub async fn append(&self, id: &str) -> Result<bool> {
        let mut posted = self.load().await?;
        if !posted.insert(id) {
            tracing::debug!("Card {} already in {}", id, self.path);
            return Ok(false);
        }
        self.save(&posted).await?;
        Ok(true)
    }
}
