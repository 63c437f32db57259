//! RediSearch client seam.
//!
//! [`SearchClient`] is the narrow set of commands the backend needs, bound to
//! one index name. [`RedisSearchClient`] implements it over a multiplexed
//! `redis` connection; tests substitute an in-memory double.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{RedisError, Value};
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use vindex_core::BackendError;

use super::document::{Document, FieldValue};
use super::query::KnnQuery;
use super::schema::IndexSchema;

/// Default per-command timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Transport-level client errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClientError {
    /// The server replied with an error
    #[error("server error: {0}")]
    Server(String),

    /// Connection could not be used
    #[error("transport error: {0}")]
    Transport(String),

    #[error("command timed out after {0:?}")]
    Timeout(Duration),

    /// The reply did not have the expected shape
    #[error("unexpected reply: {0}")]
    Protocol(String),
}

impl ClientError {
    /// True for the server's "index does not exist" reply.
    ///
    /// RediSearch has used both `Unknown Index name` and `no such index`
    /// across versions, with and without an `ERR` prefix.
    #[must_use]
    pub fn is_unknown_index(&self) -> bool {
        match self {
            Self::Server(message) => {
                let message = message.to_lowercase();
                message.contains("unknown index name") || message.contains("no such index")
            }
            _ => false,
        }
    }

    /// True for the server's reply to creating an index that already exists.
    #[must_use]
    pub fn is_index_exists(&self) -> bool {
        match self {
            Self::Server(message) => message.to_lowercase().contains("index already exists"),
            _ => false,
        }
    }

    /// True if the backend could not be reached.
    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Timeout(_))
    }
}

impl From<RedisError> for ClientError {
    fn from(err: RedisError) -> Self {
        if err.is_io_error()
            || err.is_connection_dropped()
            || err.is_connection_refusal()
            || err.is_timeout()
        {
            return Self::Transport(err.to_string());
        }

        // Rebuild the raw reply text; Display inserts ": " after the code.
        match (err.code(), err.detail()) {
            (Some(code), Some(detail)) => Self::Server(format!("{code} {detail}")),
            (None, Some(detail)) => Self::Server(detail.to_string()),
            _ => Self::Server(err.to_string()),
        }
    }
}

impl From<ClientError> for BackendError {
    fn from(err: ClientError) -> Self {
        if err.is_unavailable() {
            Self::Unavailable(err.to_string())
        } else if err.is_unknown_index() {
            Self::NotFound(err.to_string())
        } else {
            Self::Command(err.to_string())
        }
    }
}

/// Subset of `FT.INFO` the backend relies on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexInfo {
    pub name: String,
    pub num_docs: u64,
}

/// Commands against a single RediSearch index.
#[async_trait]
pub trait SearchClient: Send + Sync {
    /// Name of the index this client is bound to.
    fn index_name(&self) -> &str;

    /// `FT.INFO`
    async fn info(&self) -> Result<IndexInfo, ClientError>;

    /// `FT._LIST`
    async fn list(&self) -> Result<Vec<String>, ClientError>;

    /// `FT.CREATE`
    async fn create_index(&self, schema: &IndexSchema) -> Result<(), ClientError>;

    /// Store documents as hashes in one pipelined batch.
    async fn add_documents(&self, documents: &[Document]) -> Result<(), ClientError>;

    /// `FT.SEARCH`
    async fn search(&self, query: &KnnQuery) -> Result<Vec<Document>, ClientError>;
}

/// [`SearchClient`] over a `redis` connection manager.
///
/// The connection manager is multiplexed and reconnects on its own, so one
/// client can serve concurrent callers.
#[derive(Clone)]
pub struct RedisSearchClient {
    connection: ConnectionManager,
    index_name: String,
    timeout: Duration,
}

impl RedisSearchClient {
    /// Connect to `url` and bind to `index_name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the server cannot be
    /// reached.
    pub async fn connect(url: &str, index_name: impl Into<String>) -> Result<Self, ClientError> {
        let client = redis::Client::open(url)?;
        let connection = client.get_connection_manager().await?;
        Ok(Self::from_connection(connection, index_name))
    }

    /// Wrap an existing connection manager.
    #[must_use]
    pub fn from_connection(connection: ConnectionManager, index_name: impl Into<String>) -> Self {
        Self {
            connection,
            index_name: index_name.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the per-command timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn run(&self, cmd: &redis::Cmd) -> Result<Value, ClientError> {
        let mut connection = self.connection.clone();
        let reply = tokio::time::timeout(self.timeout, cmd.query_async(&mut connection))
            .await
            .map_err(|_| ClientError::Timeout(self.timeout))?;
        Ok(reply?)
    }
}

#[async_trait]
impl SearchClient for RedisSearchClient {
    fn index_name(&self) -> &str {
        &self.index_name
    }

    async fn info(&self) -> Result<IndexInfo, ClientError> {
        let mut cmd = redis::cmd("FT.INFO");
        cmd.arg(&self.index_name);
        parse_info(self.run(&cmd).await?)
    }

    async fn list(&self) -> Result<Vec<String>, ClientError> {
        let reply = self.run(&redis::cmd("FT._LIST")).await?;
        match reply {
            Value::Array(items) | Value::Set(items) => items.iter().map(value_to_string).collect(),
            other => Err(ClientError::Protocol(format!("FT._LIST returned {other:?}"))),
        }
    }

    async fn create_index(&self, schema: &IndexSchema) -> Result<(), ClientError> {
        let mut cmd = redis::cmd("FT.CREATE");
        for arg in schema.args() {
            cmd.arg(arg);
        }
        debug!("Creating index {}", schema.index_name);
        self.run(&cmd).await?;
        Ok(())
    }

    async fn add_documents(&self, documents: &[Document]) -> Result<(), ClientError> {
        let mut pipe = redis::pipe();
        for document in documents {
            pipe.cmd("HSET").arg(&document.id);
            for (name, value) in &document.fields {
                pipe.arg(name).arg(value.as_bytes());
            }
            pipe.ignore();
        }

        let mut connection = self.connection.clone();
        let reply: redis::RedisResult<()> =
            tokio::time::timeout(self.timeout, pipe.query_async(&mut connection))
                .await
                .map_err(|_| ClientError::Timeout(self.timeout))?;
        Ok(reply?)
    }

    async fn search(&self, query: &KnnQuery) -> Result<Vec<Document>, ClientError> {
        let mut cmd = redis::cmd("FT.SEARCH");
        cmd.arg(&self.index_name);
        for arg in query.args() {
            cmd.arg(arg);
        }
        parse_search(self.run(&cmd).await?, query.with_payloads)
    }
}

// ============================================================================
// Reply parsing
// ============================================================================

fn value_to_bytes(value: &Value) -> Result<Vec<u8>, ClientError> {
    match value {
        Value::BulkString(bytes) => Ok(bytes.clone()),
        Value::SimpleString(text) => Ok(text.clone().into_bytes()),
        Value::Int(n) => Ok(n.to_string().into_bytes()),
        Value::Double(n) => Ok(n.to_string().into_bytes()),
        Value::Okay => Ok(b"OK".to_vec()),
        other => Err(ClientError::Protocol(format!("expected a string, got {other:?}"))),
    }
}

fn value_to_string(value: &Value) -> Result<String, ClientError> {
    let bytes = value_to_bytes(value)?;
    String::from_utf8(bytes).map_err(|e| ClientError::Protocol(e.to_string()))
}

/// Flatten a RESP2 key/value array or a RESP3 map into pairs.
fn reply_pairs(value: Value) -> Result<Vec<(String, Value)>, ClientError> {
    match value {
        Value::Map(pairs) => pairs
            .into_iter()
            .map(|(k, v)| Ok((value_to_string(&k)?, v)))
            .collect(),
        Value::Array(items) => {
            if items.len() % 2 != 0 {
                return Err(ClientError::Protocol(
                    "odd number of elements in key/value reply".to_string(),
                ));
            }
            let mut pairs = Vec::with_capacity(items.len() / 2);
            let mut iter = items.into_iter();
            while let (Some(k), Some(v)) = (iter.next(), iter.next()) {
                pairs.push((value_to_string(&k)?, v));
            }
            Ok(pairs)
        }
        other => Err(ClientError::Protocol(format!(
            "expected key/value reply, got {other:?}"
        ))),
    }
}

pub(crate) fn parse_info(value: Value) -> Result<IndexInfo, ClientError> {
    let mut info = IndexInfo::default();
    for (key, value) in reply_pairs(value)? {
        match key.as_str() {
            "index_name" => info.name = value_to_string(&value)?,
            "num_docs" => {
                let raw = value_to_string(&value)?;
                // Some versions report num_docs as a float string.
                info.num_docs = raw
                    .parse::<u64>()
                    .or_else(|_| raw.parse::<f64>().map(|n| n as u64))
                    .map_err(|_| ClientError::Protocol(format!("invalid num_docs: {raw}")))?;
            }
            _ => {}
        }
    }
    Ok(info)
}

pub(crate) fn parse_search(value: Value, with_payloads: bool) -> Result<Vec<Document>, ClientError> {
    let items = match value {
        Value::Array(items) => items,
        Value::Map(pairs) => return parse_search_resp3(Value::Map(pairs)),
        other => {
            return Err(ClientError::Protocol(format!(
                "FT.SEARCH returned {other:?}"
            )))
        }
    };

    // [total, id, (payload,) fields, id, (payload,) fields, ...]
    let stride = if with_payloads { 3 } else { 2 };
    let mut iter = items.into_iter().skip(1);
    let mut documents = Vec::new();

    while let Some(id) = iter.next() {
        let id = value_to_string(&id)?;
        if with_payloads {
            iter.next();
        }
        let fields = match iter.next() {
            Some(value) => parse_fields(value)?,
            None => {
                return Err(ClientError::Protocol(format!(
                    "truncated search reply (stride {stride}) at document {id}"
                )))
            }
        };
        documents.push(Document { id, fields });
    }

    Ok(documents)
}

/// RESP3 replies: `{total_results, results: [{id, extra_attributes, ...}]}`.
fn parse_search_resp3(value: Value) -> Result<Vec<Document>, ClientError> {
    let results = reply_pairs(value)?
        .into_iter()
        .find(|(key, _)| key == "results")
        .map(|(_, results)| results);

    let entries = match results {
        Some(Value::Array(entries) | Value::Set(entries)) => entries,
        Some(other) => {
            return Err(ClientError::Protocol(format!(
                "FT.SEARCH results field is {other:?}"
            )))
        }
        None => return Ok(Vec::new()),
    };

    entries
        .into_iter()
        .map(|entry| {
            let mut id = None;
            let mut fields = HashMap::new();
            for (key, value) in reply_pairs(entry)? {
                match key.as_str() {
                    "id" => id = Some(value_to_string(&value)?),
                    "extra_attributes" => fields = parse_fields(value)?,
                    _ => {}
                }
            }
            let id = id.ok_or_else(|| {
                ClientError::Protocol("search result without an id".to_string())
            })?;
            Ok(Document { id, fields })
        })
        .collect()
}

fn parse_fields(value: Value) -> Result<HashMap<String, FieldValue>, ClientError> {
    if matches!(value, Value::Nil) {
        return Ok(HashMap::new());
    }
    reply_pairs(value)?
        .into_iter()
        .map(|(name, value)| Ok((name, FieldValue::from_bytes(value_to_bytes(&value)?))))
        .collect()
}
