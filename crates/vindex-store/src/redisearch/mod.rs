//! RediSearch implementation of [`Index`](vindex_core::Index).
//!
//! Records are stored as Redis hashes. Metadata becomes hash fields and the
//! vector is packed under [`VECTOR_FIELD`]. Search runs a KNN `FT.SEARCH` and
//! reads the distance back from [`SCORE_FIELD`].

pub mod client;
pub mod document;
pub mod index;
pub mod lifecycle;
pub mod query;
pub mod schema;

pub use client::{ClientError, IndexInfo, RedisSearchClient, SearchClient};
pub use document::{Document, FieldValue};
pub use index::{RedisIndex, RedisIndexOptions};
pub use lifecycle::{ensure_index, LifecycleOutcome};
pub use query::KnnQuery;
pub use schema::IndexSchema;

/// Hash field holding the packed vector.
pub const VECTOR_FIELD: &str = "vec";

/// Field RediSearch fills with the KNN distance.
pub const SCORE_FIELD: &str = "__vec_score";
