use crate::error::CatalogError;
use crate::error::Result;
use crate::index_cache::DEFAULT_INDEX_CAPACITY;
use crate::strategy::DEFAULT_DIMENSION_TOLERANCE_MM;
use serde::Deserialize;
use serde::Serialize;
use std::path::Path;
use std::time::Duration;

/// Order of the product list the store keeps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// As supplied by the catalog.
    #[default]
    Catalog,
    /// By the first number in each product's first alternate reference.
    ReferenceNumber,
}

/// Tunables for the filter engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Quiet period before typed input is committed to the store.
    #[serde(default = "default_commit_debounce_ms")]
    pub commit_debounce_ms: u64,

    /// Quiet period before a settled search is written to history.
    #[serde(default = "default_history_debounce_ms")]
    pub history_debounce_ms: u64,

    /// Accepted deviation for width/height filters, in millimetres.
    #[serde(default = "default_dimension_tolerance_mm")]
    pub dimension_tolerance_mm: f64,

    #[serde(default)]
    pub sort_order: SortOrder,

    /// Upper bound on memoized searchable-index entries.
    #[serde(default = "default_index_cache_capacity")]
    pub index_cache_capacity: usize,
}

fn default_commit_debounce_ms() -> u64 {
    300
}

fn default_history_debounce_ms() -> u64 {
    1500
}

fn default_dimension_tolerance_mm() -> f64 {
    DEFAULT_DIMENSION_TOLERANCE_MM
}

fn default_index_cache_capacity() -> usize {
    DEFAULT_INDEX_CAPACITY
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            commit_debounce_ms: default_commit_debounce_ms(),
            history_debounce_ms: default_history_debounce_ms(),
            dimension_tolerance_mm: default_dimension_tolerance_mm(),
            sort_order: SortOrder::default(),
            index_cache_capacity: default_index_cache_capacity(),
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.dimension_tolerance_mm.is_finite() || self.dimension_tolerance_mm < 0.0 {
            return Err(CatalogError::InvalidSetting(format!(
                "dimension_tolerance_mm must be a non-negative number, got {}",
                self.dimension_tolerance_mm
            )));
        }
        if self.index_cache_capacity == 0 {
            return Err(CatalogError::InvalidSetting(
                "index_cache_capacity must be > 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn commit_debounce(&self) -> Duration {
        Duration::from_millis(self.commit_debounce_ms)
    }

    pub fn history_debounce(&self) -> Duration {
        Duration::from_millis(self.history_debounce_ms)
    }
}
