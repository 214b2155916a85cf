use async_trait::async_trait;
use seasonwatch_models::{series_key, Series};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use super::{SeriesStore, StoreError};
use crate::events::{LogEvents, TrackerEvents};

/// Series store backed by a pretty-printed JSON array on disk
///
/// Saves go through a temp file followed by a rename so a concurrent `load`
/// never sees a half-written file.
pub struct JsonSeriesStore {
    path: PathBuf,
    entries: RwLock<HashMap<String, Series>>,
    /// Serialises saves so a later snapshot is never overwritten by an earlier one
    save_lock: Mutex<()>,
    events: Arc<dyn TrackerEvents>,
}

impl JsonSeriesStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: RwLock::new(HashMap::new()),
            save_lock: Mutex::new(()),
            events: Arc::new(LogEvents),
        }
    }

    pub fn with_events(mut self, events: Arc<dyn TrackerEvents>) -> Self {
        self.events = events;
        self
    }

    /// Create a store and load whatever is already on disk
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let store = Self::new(path);
        store.load().await?;
        Ok(store)
    }

    /// Like [`open`](Self::open), reporting through `events` from the first load on
    pub async fn open_with_events(
        path: impl Into<PathBuf>,
        events: Arc<dyn TrackerEvents>,
    ) -> Result<Self, StoreError> {
        let store = Self::new(path).with_events(events);
        store.load().await?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    fn temp_path(&self) -> PathBuf {
        self.path.with_extension("tmp")
    }

    fn io_error(&self, path: &Path, source: std::io::Error) -> StoreError {
        StoreError::Io { path: path.to_path_buf(), source }
    }
}

#[async_trait]
impl SeriesStore for JsonSeriesStore {
    async fn load(&self) -> Result<(), StoreError> {
        let data = match tokio::fs::read(&self.path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                self.events.store_loaded(&self.path, 0);
                return Ok(());
            }
            Err(e) => return Err(self.io_error(&self.path, e)),
        };

        if data.iter().all(u8::is_ascii_whitespace) {
            self.events.store_loaded(&self.path, 0);
            return Ok(());
        }

        let series: Vec<Series> = serde_json::from_slice(&data).map_err(|source| StoreError::Decode {
            path: self.path.clone(),
            source,
        })?;

        let loaded: HashMap<String, Series> = series.into_iter().map(|s| (s.key(), s)).collect();
        let count = loaded.len();
        *self.entries.write().await = loaded;

        self.events.store_loaded(&self.path, count);
        Ok(())
    }

    async fn save(&self) -> Result<(), StoreError> {
        let _saving = self.save_lock.lock().await;

        let mut snapshot: Vec<Series> = {
            let entries = self.entries.read().await;
            entries.values().cloned().collect()
        };
        snapshot.sort_by(|a, b| a.show_id.cmp(&b.show_id).then(a.season.cmp(&b.season)));

        let encoded = serde_json::to_vec_pretty(&snapshot).map_err(StoreError::Encode)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.io_error(parent, e))?;
        }

        let temp_path = self.temp_path();
        tokio::fs::write(&temp_path, &encoded)
            .await
            .map_err(|e| self.io_error(&temp_path, e))?;
        tokio::fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| self.io_error(&self.path, e))?;

        self.events.store_saved(&self.path, snapshot.len());
        Ok(())
    }

    async fn get_all(&self) -> Result<Vec<Series>, StoreError> {
        Ok(self.entries.read().await.values().cloned().collect())
    }

    async fn get(&self, show_id: &str, season: u32) -> Result<Series, StoreError> {
        let key = series_key(show_id, season);
        self.entries
            .read()
            .await
            .get(&key)
            .cloned()
            .ok_or(StoreError::NotFound { key })
    }

    async fn add(&self, series: Series) -> Result<(), StoreError> {
        let key = series.key();
        let mut entries = self.entries.write().await;
        if entries.contains_key(&key) {
            return Err(StoreError::AlreadyExists { key });
        }
        entries.insert(key, series);
        Ok(())
    }

    async fn update(&self, series: Series) -> Result<(), StoreError> {
        let key = series.key();
        let mut entries = self.entries.write().await;
        match entries.get_mut(&key) {
            Some(existing) => {
                *existing = series;
                Ok(())
            }
            None => Err(StoreError::NotFound { key }),
        }
    }

    async fn delete(&self, show_id: &str, season: u32) -> Result<(), StoreError> {
        let key = series_key(show_id, season);
        match self.entries.write().await.remove(&key) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound { key }),
        }
    }
}
