//! Vector index backends for vindex.
//!
//! This crate provides the storage backends, implementing the
//! [`Index`](vindex_core::Index) trait.
//!
//! # Backends
//!
//! - [`RedisIndex`]: RediSearch KNN search over Redis hashes, with
//!   idempotent create-if-absent index lifecycle
//! - [`MemoryIndex`]: Brute-force in-process index
//!
//! # Example
//!
//! ```rust,ignore
//! use vindex_store::{RedisIndex, RedisIndexOptions, RedisSearchClient};
//! use vindex_core::{CreateIndexOptions, Distance, Index, SearchOptions};
//!
//! let client = RedisSearchClient::connect("redis://127.0.0.1/", "docs").await?;
//! let index = RedisIndex::new(
//!     client,
//!     RedisIndexOptions {
//!         create_index: Some(CreateIndexOptions::new(384, Distance::Cosine)),
//!         ..Default::default()
//!     },
//! )?;
//!
//! index.insert(&records).await?;
//! let results = index.search(&query_vector, &SearchOptions::new(4)).await?;
//! ```

pub mod memory;
pub mod redisearch;

pub use memory::MemoryIndex;
pub use redisearch::{RedisIndex, RedisIndexOptions, RedisSearchClient};
