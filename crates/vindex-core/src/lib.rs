//! # vindex-core
//!
//! Core types and traits for vindex, a pluggable vector index layer.
//!
//! This crate holds everything that is storage agnostic:
//!
//! - **Index contract**: [`Index`] trait for inserting and searching vectors
//! - **Embedding contract**: [`Embedder`] trait for the external model that produces vectors
//! - **Data model**: [`Data`], [`SearchResult`], [`SearchOptions`], [`CreateIndexOptions`]
//! - **Filters**: [`Filter`], a union of backend-native filter expressions
//! - **Vector codec**: [`codec`], the `f64` to packed `f32` wire format
//! - **Errors**: [`IndexError`] separating caller mistakes from backend failures
//!
//! ## Architecture
//!
//! ```text
//! text → Embedder → Data → Index::insert
//!                             ↓
//! query vector → Index::search → SearchResults
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use vindex_core::{Data, Index, SearchOptions};
//!
//! async fn roundtrip(index: &impl Index) -> Result<(), vindex_core::IndexError> {
//!     let ids = index
//!         .insert(&[Data::new(vec![0.1, 0.2, 0.3]).with_metadata("tag", "x")])
//!         .await?;
//!
//!     let results = index.search(&[0.1, 0.2, 0.3], &SearchOptions::new(1)).await?;
//!     assert_eq!(results[0].data.id, ids[0]);
//!     Ok(())
//! }
//! ```
//!
//! ## Related Crates
//!
//! - `vindex-store`: RediSearch and in-memory [`Index`] implementations
//! - `vindex-query`: Embedding-backed retrieval

pub mod codec;
pub mod error;
pub mod filter;
pub mod metadata;
pub mod traits;
pub mod types;

pub use error::{BackendError, CodecError, EmbedError, Error, IndexError, Result};
pub use filter::{FieldFilter, Filter, GeoUnit, MetadataFilter, NumericBound, RedisFilter};
pub use metadata::CONTENT_KEY;
pub use traits::*;
pub use types::*;
