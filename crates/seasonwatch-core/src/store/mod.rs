mod error;
mod json;

pub use error::StoreError;
pub use json::JsonSeriesStore;

use async_trait::async_trait;
use seasonwatch_models::Series;

/// Keyed collection of tracked seasons with durable persistence
///
/// Reads may run concurrently; `add`, `update`, `delete` and the swap inside
/// `load` are exclusive. `save` works from a snapshot and never holds the
/// writer lock across file I/O.
#[async_trait]
pub trait SeriesStore: Send + Sync {
    /// Replace the in-memory index with the backing file's contents.
    /// A missing or empty file is not an error.
    async fn load(&self) -> Result<(), StoreError>;

    /// Persist every entry to the backing file
    async fn save(&self) -> Result<(), StoreError>;

    async fn get_all(&self) -> Result<Vec<Series>, StoreError>;

    async fn get(&self, show_id: &str, season: u32) -> Result<Series, StoreError>;

    async fn add(&self, series: Series) -> Result<(), StoreError>;

    async fn update(&self, series: Series) -> Result<(), StoreError>;

    async fn delete(&self, show_id: &str, season: u32) -> Result<(), StoreError>;
}
