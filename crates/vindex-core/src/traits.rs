//! Core traits for vindex components.
//!
//! - [`Index`]: Store vectors and run nearest-neighbor search
//! - [`Embedder`]: Turn text into vectors (implemented outside this workspace)
//!
//! Both are object safe so pipelines can hold `Arc<dyn Index>` and
//! `Arc<dyn Embedder>` and swap implementations freely.

use async_trait::async_trait;

use crate::error::{EmbedError, IndexError};
use crate::types::{Data, SearchOptions, SearchResults};

// ============================================================================
// Index
// ============================================================================

/// Trait for vector storage and search.
///
/// Implementations must be safe to call concurrently through a shared
/// reference. Each implementation manages its own index lifecycle: the first
/// call on an empty backend may create the index.
#[async_trait]
pub trait Index: Send + Sync {
    /// Returns true if the index holds no records.
    async fn is_empty(&self) -> Result<bool, IndexError>;

    /// Store records, returning their ids in input order.
    ///
    /// Records with an empty id get a freshly generated one.
    async fn insert(&self, data: &[Data]) -> Result<Vec<String>, IndexError>;

    /// Find the `options.top_k` records nearest to `values`.
    async fn search(
        &self,
        values: &[f64],
        options: &SearchOptions,
    ) -> Result<SearchResults, IndexError>;
}

// ============================================================================
// Embedding
// ============================================================================

/// Trait for generating embeddings.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Model name/identifier.
    fn model_name(&self) -> &str;

    /// Embedding dimension.
    fn dimension(&self) -> usize;

    /// Embed a batch of texts, one vector per input.
    async fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f64>>, EmbedError>;

    /// Embed a query (may use different instruction).
    async fn embed_query(&self, query: &str) -> Result<Vec<f64>, EmbedError> {
        let results = self.embed(&[query]).await?;
        let count = results.len();
        results
            .into_iter()
            .next()
            .ok_or(EmbedError::CountMismatch {
                expected: 1,
                actual: count,
            })
    }
}
