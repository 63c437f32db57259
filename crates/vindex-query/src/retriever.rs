//! Text retrieval over an [`Index`].

use serde_json::Value;
use std::sync::Arc;
use tracing::debug;
use vindex_core::{
    Data, EmbedError, Embedder, Error, Index, Metadata, SearchOptions, SearchResults, CONTENT_KEY,
    DEFAULT_TOP_K,
};

/// Embeds text and runs it against an index.
pub struct Retriever {
    /// Vector index
    index: Arc<dyn Index>,
    /// Embedder for documents and queries
    embedder: Arc<dyn Embedder>,
    /// Result count for [`Retriever::retrieve`]
    top_k: usize,
}

impl Retriever {
    /// Create a new retriever returning [`DEFAULT_TOP_K`] results.
    pub fn new(index: Arc<dyn Index>, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            index,
            embedder,
            top_k: DEFAULT_TOP_K,
        }
    }

    /// Set the default result count.
    #[must_use]
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// The underlying index.
    pub fn index(&self) -> &Arc<dyn Index> {
        &self.index
    }

    /// Retrieve the records nearest to `text`.
    pub async fn retrieve(&self, text: &str) -> Result<SearchResults, Error> {
        self.retrieve_with(text, &SearchOptions::new(self.top_k))
            .await
    }

    /// Retrieve with explicit search options.
    pub async fn retrieve_with(
        &self,
        text: &str,
        options: &SearchOptions,
    ) -> Result<SearchResults, Error> {
        debug!("Retrieving: {}", text);

        let embedding = self.embedder.embed_query(text).await?;
        let results = self.index.search(&embedding, options).await?;

        debug!("Retrieved {} results", results.len());
        Ok(results)
    }

    /// Embed and store texts, returning the assigned ids.
    ///
    /// Each text is stored under the `content` metadata key alongside the
    /// matching entry of `metadata`, if given.
    pub async fn add_texts(
        &self,
        texts: &[&str],
        metadata: Option<&[Metadata]>,
    ) -> Result<Vec<String>, Error> {
        if let Some(metadata) = metadata {
            if metadata.len() != texts.len() {
                return Err(Error::Config(format!(
                    "got {} metadata entries for {} texts",
                    metadata.len(),
                    texts.len()
                )));
            }
        }
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let embeddings = self.embedder.embed(texts).await?;
        if embeddings.len() != texts.len() {
            return Err(EmbedError::CountMismatch {
                expected: texts.len(),
                actual: embeddings.len(),
            }
            .into());
        }

        let records: Vec<Data> = texts
            .iter()
            .zip(embeddings)
            .enumerate()
            .map(|(i, (text, values))| {
                let mut fields = metadata.map(|m| m[i].clone()).unwrap_or_default();
                fields.insert(CONTENT_KEY.to_string(), Value::String((*text).to_string()));
                Data {
                    id: String::new(),
                    values,
                    metadata: fields,
                }
            })
            .collect();

        debug!(
            "Adding {} texts embedded with {}",
            records.len(),
            self.embedder.model_name()
        );
        Ok(self.index.insert(&records).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use vindex_core::{CreateIndexOptions, Distance, IndexError, MetadataFilter};
    use vindex_store::MemoryIndex;

    const TEST_DIM: usize = 3;

    // ==================== Mock Embedder ====================

    /// Maps a handful of words onto axes; everything else lands on the last.
    struct MockEmbedder;

    fn embed_word(text: &str) -> Vec<f64> {
        match text {
            t if t.contains("rust") => vec![1.0, 0.0, 0.0],
            t if t.contains("redis") => vec![0.0, 1.0, 0.0],
            _ => vec![0.0, 0.0, 1.0],
        }
    }

    #[async_trait]
    impl Embedder for MockEmbedder {
        fn model_name(&self) -> &str {
            "mock-embedder"
        }

        fn dimension(&self) -> usize {
            TEST_DIM
        }

        async fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f64>>, EmbedError> {
            Ok(texts.iter().map(|t| embed_word(t)).collect())
        }
    }

    /// Always drops the last embedding.
    struct ShortEmbedder;

    #[async_trait]
    impl Embedder for ShortEmbedder {
        fn model_name(&self) -> &str {
            "short"
        }

        fn dimension(&self) -> usize {
            TEST_DIM
        }

        async fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f64>>, EmbedError> {
            Ok(texts.iter().skip(1).map(|t| embed_word(t)).collect())
        }
    }

    struct FailingEmbedder;

    #[async_trait]
    impl Embedder for FailingEmbedder {
        fn model_name(&self) -> &str {
            "failing"
        }

        fn dimension(&self) -> usize {
            TEST_DIM
        }

        async fn embed(&self, _texts: &[&str]) -> Result<Vec<Vec<f64>>, EmbedError> {
            Err(EmbedError::Inference("model not loaded".to_string()))
        }
    }

    fn memory_index() -> Arc<MemoryIndex> {
        Arc::new(
            MemoryIndex::new(CreateIndexOptions::new(TEST_DIM, Distance::Cosine))
                .unwrap()
                .with_content(true),
        )
    }

    // ==================== Tests ====================

    #[tokio::test]
    async fn test_add_texts_sets_content() {
        let index = memory_index();
        let retriever = Retriever::new(index.clone(), Arc::new(MockEmbedder));

        let ids = retriever
            .add_texts(&["rust is fast", "redis is a server"], None)
            .await
            .unwrap();

        assert_eq!(ids.len(), 2);
        assert!(ids.iter().all(|id| !id.is_empty()));
        assert_eq!(index.record_count().await, 2);

        let results = retriever.retrieve("rust").await.unwrap();
        assert_eq!(results[0].data.id, ids[0]);
        assert_eq!(
            results[0].data.metadata.get(CONTENT_KEY),
            Some(&json!("rust is fast"))
        );
    }

    #[tokio::test]
    async fn test_add_texts_merges_metadata() {
        let index = memory_index();
        let retriever = Retriever::new(index, Arc::new(MockEmbedder));

        let mut first = Metadata::new();
        first.insert("lang".to_string(), json!("en"));
        // caller-supplied content is replaced by the text
        first.insert(CONTENT_KEY.to_string(), json!("stale"));
        let metadata = vec![first, Metadata::new()];

        retriever
            .add_texts(&["rust guide", "redis guide"], Some(&metadata))
            .await
            .unwrap();

        let results = retriever.retrieve("rust").await.unwrap();
        let top = &results[0].data.metadata;
        assert_eq!(top.get("lang"), Some(&json!("en")));
        assert_eq!(top.get(CONTENT_KEY), Some(&json!("rust guide")));
    }

    #[tokio::test]
    async fn test_add_texts_metadata_length_mismatch() {
        let retriever = Retriever::new(memory_index(), Arc::new(MockEmbedder));

        let err = retriever
            .add_texts(&["a", "b"], Some(&[Metadata::new()]))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Config(_)));
    }

    #[tokio::test]
    async fn test_add_texts_empty() {
        let index = memory_index();
        let retriever = Retriever::new(index.clone(), Arc::new(FailingEmbedder));

        let ids = retriever.add_texts(&[], None).await.unwrap();

        assert!(ids.is_empty());
        assert_eq!(index.record_count().await, 0);
    }

    #[tokio::test]
    async fn test_embedding_count_mismatch() {
        let retriever = Retriever::new(memory_index(), Arc::new(ShortEmbedder));

        let err = retriever.add_texts(&["a", "b"], None).await.unwrap_err();

        assert!(matches!(
            err,
            Error::Embedding(EmbedError::CountMismatch {
                expected: 2,
                actual: 1
            })
        ));
    }

    #[tokio::test]
    async fn test_embedder_failure_maps_to_embedding_error() {
        let retriever = Retriever::new(memory_index(), Arc::new(FailingEmbedder));

        let err = retriever.retrieve("anything").await.unwrap_err();

        assert!(matches!(err, Error::Embedding(EmbedError::Inference(_))));
    }

    #[tokio::test]
    async fn test_retrieve_respects_top_k() {
        let retriever = Retriever::new(memory_index(), Arc::new(MockEmbedder)).with_top_k(1);
        retriever
            .add_texts(&["rust", "redis", "other"], None)
            .await
            .unwrap();

        let results = retriever.retrieve("redis").await.unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].data.metadata.get(CONTENT_KEY), Some(&json!("redis")));
    }

    #[tokio::test]
    async fn test_retrieve_with_filter() {
        let retriever = Retriever::new(memory_index(), Arc::new(MockEmbedder));
        let tags = vec![
            Metadata::from([("tag".to_string(), json!("a"))]),
            Metadata::from([("tag".to_string(), json!("b"))]),
        ];
        retriever
            .add_texts(&["rust one", "rust two"], Some(&tags))
            .await
            .unwrap();

        let options = SearchOptions::new(4).with_filter(MetadataFilter::new().with_eq("tag", "b"));
        let results = retriever.retrieve_with("rust", &options).await.unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(
            results[0].data.metadata.get(CONTENT_KEY),
            Some(&json!("rust two"))
        );
    }

    #[tokio::test]
    async fn test_index_error_maps_to_index_error() {
        let retriever = Retriever::new(memory_index(), Arc::new(MockEmbedder));

        let err = retriever
            .retrieve_with("rust", &SearchOptions::new(0))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Index(IndexError::Config(_))));
    }
}
