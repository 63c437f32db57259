//! Embedding-backed retrieval for vindex.

pub mod retriever;

pub use retriever::Retriever;
