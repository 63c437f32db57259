//! Core types for vindex.
//!
//! ## Records
//! - [`Data`]: One embeddable record (id, vector, metadata)
//! - [`Metadata`]: Free-form key/value map attached to a record
//!
//! ## Index Creation
//! - [`CreateIndexOptions`]: Dimension and distance metric, fixed at creation
//! - [`Distance`]: Vector distance metric
//!
//! ## Search
//! - [`SearchOptions`]: Per-call search parameters
//! - [`SearchResult`]: A matching record with its backend score
//! - [`SearchResults`]: Results in backend ranking order

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::error::IndexError;
use crate::filter::Filter;

/// Record metadata.
pub type Metadata = HashMap<String, Value>;

// ============================================================================
// Records
// ============================================================================

/// One embeddable record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Data {
    /// Backend-unique identifier; generated on insert when empty
    #[serde(default)]
    pub id: String,
    /// Embedding vector
    #[serde(default)]
    pub values: Vec<f64>,
    /// Additional key-value metadata
    #[serde(default)]
    pub metadata: Metadata,
}

impl Data {
    /// Create a record with no id and no metadata.
    #[must_use]
    pub fn new(values: Vec<f64>) -> Self {
        Self {
            id: String::new(),
            values,
            metadata: Metadata::new(),
        }
    }

    /// Set the record id.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Add a metadata entry.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

// ============================================================================
// Index Creation
// ============================================================================

/// Distance metric for vector search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Distance {
    #[default]
    Cosine,
    Euclidean,
    Dot,
}

/// Options used when the backend has to create the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateIndexOptions {
    /// Vector width; every inserted vector must match
    pub dimension: usize,
    /// Distance metric
    #[serde(default)]
    pub distance: Distance,
}

impl CreateIndexOptions {
    #[must_use]
    pub fn new(dimension: usize, distance: Distance) -> Self {
        Self {
            dimension,
            distance,
        }
    }

    /// Reject options no backend can honor.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::Config`] if the dimension is zero.
    pub fn validate(&self) -> Result<(), IndexError> {
        if self.dimension == 0 {
            return Err(IndexError::Config(
                "index dimension must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Search
// ============================================================================

/// Default number of neighbors requested.
pub const DEFAULT_TOP_K: usize = 4;

/// Per-call search configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchOptions {
    /// Number of neighbors requested
    pub top_k: usize,
    /// Backend-native filter
    #[serde(default)]
    pub filter: Option<Filter>,
}

impl SearchOptions {
    #[must_use]
    pub fn new(top_k: usize) -> Self {
        Self { top_k, filter: None }
    }

    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<Filter>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// # Errors
    ///
    /// Returns [`IndexError::Config`] if `top_k` is zero.
    pub fn validate(&self) -> Result<(), IndexError> {
        if self.top_k == 0 {
            return Err(IndexError::Config("top_k must be positive".to_string()));
        }
        Ok(())
    }
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self::new(DEFAULT_TOP_K)
    }
}

/// A search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Reconstructed record, reserved fields stripped
    pub data: Data,
    /// Backend-native score; meaning depends on [`Distance`]
    pub score: f64,
}

/// Results in the order the backend ranked them.
pub type SearchResults = Vec<SearchResult>;
