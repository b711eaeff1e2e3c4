//! Menu Repository Contract
//!
//! The state manager obtains its menu through [`RestaurantRepository`]. The
//! remote adapter lives in [`super::firestore`]; [`StaticRestaurantRepository`]
//! serves a fixed list or a local JSON file.

use std::path::PathBuf;

use async_trait::async_trait;

use super::models::{collect_menu, MenuItem, MenuRecord};
use crate::error::DataSourceError;

/// Source of the current restaurant menu.
///
/// Implementations map provider records into [`MenuItem`]s and silently drop
/// records missing a name or price. A failed fetch is a [`DataSourceError`];
/// retries and caching are left to the caller.
#[async_trait]
pub trait RestaurantRepository: Send + Sync {
    async fn load_menu(&self) -> Result<Vec<MenuItem>, DataSourceError>;
}

enum StaticSource {
    Items(Vec<MenuItem>),
    File(PathBuf),
}

/// Repository over a menu that does not live in the remote store
pub struct StaticRestaurantRepository {
    source: StaticSource,
}

impl StaticRestaurantRepository {
    pub fn new(items: Vec<MenuItem>) -> Self {
        Self {
            source: StaticSource::Items(items),
        }
    }

    /// Reads a JSON array of menu records from `path` on every load.
    pub fn from_json_file(path: impl Into<PathBuf>) -> Self {
        Self {
            source: StaticSource::File(path.into()),
        }
    }
}

#[async_trait]
impl RestaurantRepository for StaticRestaurantRepository {
    async fn load_menu(&self) -> Result<Vec<MenuItem>, DataSourceError> {
        match &self.source {
            StaticSource::Items(items) => Ok(items.clone()),
            StaticSource::File(path) => {
                let raw = tokio::fs::read_to_string(path).await?;
                let records: Vec<MenuRecord> = serde_json::from_str(&raw)
                    .map_err(|e| DataSourceError::Decode(format!("{}: {e}", path.display())))?;
                Ok(collect_menu(records))
            }
        }
    }
}
