//! [`RedisIndex`], the RediSearch-backed [`Index`].

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;
use vindex_core::{
    codec, BackendError, CreateIndexOptions, Data, Filter, Index, IndexError, RedisFilter,
    SearchOptions, SearchResults,
};

use super::client::SearchClient;
use super::document::{to_document, ResultShape};
use super::lifecycle::ensure_index;
use super::query::KnnQuery;
use super::schema::IndexSchema;

/// Construction options for [`RedisIndex`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RedisIndexOptions {
    /// Keep the `content` metadata key in results
    pub include_content: bool,
    /// Decode stored vectors into results
    pub include_values: bool,
    /// Prepended to record ids to form hash keys
    pub key_prefix: String,
    /// Create the index on first use when absent
    pub create_index: Option<CreateIndexOptions>,
}

/// RediSearch vector index.
///
/// Generic over the client so tests can run without a server.
pub struct RedisIndex<C> {
    client: C,
    schema: Option<IndexSchema>,
    shape: ResultShape,
}

impl<C: SearchClient> RedisIndex<C> {
    /// Create a new `RedisIndex`.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::Config`] if the creation options are invalid.
    pub fn new(client: C, options: RedisIndexOptions) -> Result<Self, IndexError> {
        let schema = match &options.create_index {
            Some(create) => {
                create.validate()?;
                Some(
                    IndexSchema::new(client.index_name(), create)
                        .with_key_prefix(options.key_prefix.clone()),
                )
            }
            None => None,
        };

        Ok(Self {
            client,
            schema,
            shape: ResultShape {
                include_content: options.include_content,
                include_values: options.include_values,
                key_prefix: options.key_prefix,
            },
        })
    }

    /// The underlying client.
    #[must_use]
    pub fn client(&self) -> &C {
        &self.client
    }

    async fn ensure_index(&self) -> Result<(), IndexError> {
        let outcome = ensure_index(&self.client, self.schema.as_ref()).await?;
        debug!("Lifecycle check for {}: {:?}", self.client.index_name(), outcome);
        Ok(())
    }

    fn key_for(&self, id: &str) -> String {
        format!("{}{id}", self.shape.key_prefix)
    }
}

/// Pull the RediSearch filter out of the options, rejecting other variants.
fn redis_filter(options: &SearchOptions) -> Result<RedisFilter, IndexError> {
    match &options.filter {
        None => Ok(RedisFilter::default()),
        Some(Filter::Redis(filter)) => Ok(filter.clone()),
        Some(other) => Err(IndexError::Config(format!(
            "redis index cannot apply a {} filter",
            other.kind()
        ))),
    }
}

#[async_trait]
impl<C: SearchClient> Index for RedisIndex<C> {
    async fn is_empty(&self) -> Result<bool, IndexError> {
        self.ensure_index().await?;

        let info = self.client.info().await.map_err(BackendError::from)?;
        Ok(info.num_docs == 0)
    }

    async fn insert(&self, data: &[Data]) -> Result<Vec<String>, IndexError> {
        if data.is_empty() {
            return Ok(Vec::new());
        }

        self.ensure_index().await?;

        let mut ids = Vec::with_capacity(data.len());
        let mut documents = Vec::with_capacity(data.len());
        for record in data {
            let id = if record.id.is_empty() {
                Uuid::new_v4().to_string()
            } else {
                record.id.clone()
            };
            documents.push(to_document(self.key_for(&id), record));
            ids.push(id);
        }

        debug!("Inserting {} documents", documents.len());
        self.client
            .add_documents(&documents)
            .await
            .map_err(BackendError::from)?;

        Ok(ids)
    }

    async fn search(
        &self,
        values: &[f64],
        options: &SearchOptions,
    ) -> Result<SearchResults, IndexError> {
        options.validate()?;
        let filter = redis_filter(options)?;

        self.ensure_index().await?;

        let query = KnnQuery::new(options.top_k, codec::encode(values)).with_filter(filter);
        debug!("Searching: {}", query.query_string());

        let documents = self
            .client
            .search(&query)
            .await
            .map_err(BackendError::from)?;

        let results = documents
            .iter()
            .map(|document| self.shape.build(document))
            .collect::<Result<SearchResults, _>>()?;

        debug!("Found {} results", results.len());
        Ok(results)
    }
}
