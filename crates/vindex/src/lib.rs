//! Library half of the `vindex` binary: configuration and index wiring.

pub mod config;

use vindex_core::IndexError;
use vindex_store::{RedisIndex, RedisSearchClient};

pub use config::Config;

/// Connect to Redis and build the configured index.
///
/// # Errors
///
/// Returns an error if the server cannot be reached or the configured
/// index options are invalid.
pub async fn open_index(config: &Config) -> Result<RedisIndex<RedisSearchClient>, IndexError> {
    let client = RedisSearchClient::connect(&config.redis.url, config.redis.index_name.clone())
        .await
        .map_err(|e| IndexError::Internal(e.into()))?
        .with_timeout(config.timeout());

    RedisIndex::new(client, config.index_options())
}
