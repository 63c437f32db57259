//! In-memory index for testing without Redis.
//!
//! This module provides a [`MemoryIndex`] that keeps records in process.
//! It's useful for:
//! - Testing pipelines without a Redis server
//! - Small corpora where brute force is fast enough
//! - Unit tests that don't need persistence

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;
use vindex_core::{
    codec, metadata, BackendError, CreateIndexOptions, Data, Distance, Filter, Index, IndexError,
    Metadata, MetadataFilter, SearchOptions, SearchResult, SearchResults,
};

/// A stored record, vector narrowed to single precision.
#[derive(Debug, Clone)]
struct StoredRecord {
    values: Vec<f32>,
    metadata: Metadata,
}

/// In-memory vector index.
///
/// Search is brute force. Scores follow RediSearch's distance convention so
/// results from either backend read the same way: lower is closer, results
/// come back in ascending score order.
///
/// # Example
///
/// ```rust
/// use vindex_store::MemoryIndex;
/// use vindex_core::{CreateIndexOptions, Data, Distance, Index, SearchOptions};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let index = MemoryIndex::new(CreateIndexOptions::new(3, Distance::Cosine))?;
/// assert!(index.is_empty().await?);
///
/// index.insert(&[Data::new(vec![1.0, 0.0, 0.0]).with_id("x")]).await?;
/// let results = index.search(&[1.0, 0.0, 0.0], &SearchOptions::new(1)).await?;
/// assert_eq!(results[0].data.id, "x");
/// # Ok(())
/// # }
/// ```
pub struct MemoryIndex {
    options: CreateIndexOptions,
    include_content: bool,
    include_values: bool,
    records: Arc<RwLock<HashMap<String, StoredRecord>>>,
}

impl MemoryIndex {
    /// Create an empty index.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::Config`] if the dimension is zero.
    pub fn new(options: CreateIndexOptions) -> Result<Self, IndexError> {
        options.validate()?;
        Ok(Self {
            options,
            include_content: false,
            include_values: false,
            records: Arc::new(RwLock::new(HashMap::new())),
        })
    }

    /// Keep the `content` metadata key in results.
    #[must_use]
    pub fn with_content(mut self, include: bool) -> Self {
        self.include_content = include;
        self
    }

    /// Return stored vectors in results.
    #[must_use]
    pub fn with_values(mut self, include: bool) -> Self {
        self.include_values = include;
        self
    }

    /// Number of stored records.
    pub async fn record_count(&self) -> usize {
        self.records.read().await.len()
    }

    fn check_dimension(&self, values: &[f64]) -> Result<(), BackendError> {
        if values.len() != self.options.dimension {
            return Err(BackendError::Command(format!(
                "vector width {} does not match index dimension {}",
                values.len(),
                self.options.dimension
            )));
        }
        Ok(())
    }

    fn distance(&self, a: &[f32], b: &[f32]) -> f32 {
        match self.options.distance {
            Distance::Cosine => 1.0 - cosine_similarity(a, b),
            Distance::Euclidean => a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum(),
            Distance::Dot => 1.0 - a.iter().zip(b).map(|(x, y)| x * y).sum::<f32>(),
        }
    }
}

/// Compute cosine similarity between two vectors.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}

fn metadata_filter(options: &SearchOptions) -> Result<Option<&MetadataFilter>, IndexError> {
    match &options.filter {
        None => Ok(None),
        Some(Filter::Metadata(filter)) => Ok(Some(filter)),
        Some(other) => Err(IndexError::Config(format!(
            "memory index cannot apply a {} filter",
            other.kind()
        ))),
    }
}

#[async_trait]
impl Index for MemoryIndex {
    async fn is_empty(&self) -> Result<bool, IndexError> {
        Ok(self.records.read().await.is_empty())
    }

    async fn insert(&self, data: &[Data]) -> Result<Vec<String>, IndexError> {
        // Validate the whole batch before touching the map.
        for record in data {
            self.check_dimension(&record.values)?;
        }

        let mut records = self.records.write().await;
        let mut ids = Vec::with_capacity(data.len());
        for record in data {
            let id = if record.id.is_empty() {
                Uuid::new_v4().to_string()
            } else {
                record.id.clone()
            };
            records.insert(
                id.clone(),
                StoredRecord {
                    values: codec::narrow(&record.values),
                    metadata: record.metadata.clone(),
                },
            );
            ids.push(id);
        }

        debug!("Inserted {} records", ids.len());
        Ok(ids)
    }

    async fn search(
        &self,
        values: &[f64],
        options: &SearchOptions,
    ) -> Result<SearchResults, IndexError> {
        options.validate()?;
        let filter = metadata_filter(options)?;
        self.check_dimension(values)?;

        let query = codec::narrow(values);
        let records = self.records.read().await;

        let mut scored: Vec<(f32, &String, &StoredRecord)> = records
            .iter()
            .filter(|(_, record)| filter.map_or(true, |f| f.matches(&record.metadata)))
            .map(|(id, record)| (self.distance(&query, &record.values), id, record))
            .collect();

        // Ascending distance, NaN last, ties broken by id for a stable order
        scored.sort_by(|a, b| {
            a.0.is_nan()
                .cmp(&b.0.is_nan())
                .then_with(|| a.0.total_cmp(&b.0))
                .then_with(|| a.1.cmp(b.1))
        });

        let results: SearchResults = scored
            .into_iter()
            .take(options.top_k)
            .map(|(score, id, record)| SearchResult {
                data: Data {
                    id: id.clone(),
                    values: if self.include_values {
                        codec::widen(&record.values)
                    } else {
                        Vec::new()
                    },
                    metadata: metadata::for_caller(&record.metadata, self.include_content),
                },
                score: f64::from(score),
            })
            .collect();

        debug!("Found {} results", results.len());
        Ok(results)
    }
}
