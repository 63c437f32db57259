//! Idempotent index creation.
//!
//! ```text
//! Unchecked --FT.INFO ok--------------------------------> Present
//!     |
//!     +--"unknown index"--> Absent --listed by FT._LIST--> Present
//!                             |
//!                             +--FT.CREATE ok / "already exists"--> Present
//! ```
//!
//! Nothing is cached between calls and no lock is taken: a concurrent
//! creator is tolerated through the list check and by swallowing the
//! server's "already exists" reply.

use tracing::{debug, info, warn};
use vindex_core::BackendError;

use super::client::{ClientError, SearchClient};
use super::schema::IndexSchema;

/// Which transition the lifecycle check took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleOutcome {
    /// No creation options configured; nothing checked
    Skipped,
    /// `FT.INFO` found the index
    Existing,
    /// `FT.INFO` missed it but `FT._LIST` has it
    Listed,
    /// This call created the index
    Created,
    /// `FT.CREATE` lost a race against another creator
    CreatedConcurrently,
}

/// Make sure the index described by `schema` exists.
///
/// # Errors
///
/// Returns [`BackendError::Unavailable`] when the backend cannot be reached
/// and [`BackendError::IndexState`] for any other unexpected failure while
/// checking or creating the index.
pub async fn ensure_index<C>(
    client: &C,
    schema: Option<&IndexSchema>,
) -> Result<LifecycleOutcome, BackendError>
where
    C: SearchClient + ?Sized,
{
    let Some(schema) = schema else {
        return Ok(LifecycleOutcome::Skipped);
    };

    match client.info().await {
        Ok(_) => return Ok(LifecycleOutcome::Existing),
        Err(err) if err.is_unknown_index() => {
            debug!("Index {} not found, checking index list", schema.index_name);
        }
        Err(err) => return Err(state_error(err)),
    }

    let indexes = client.list().await.map_err(state_error)?;
    if indexes.iter().any(|name| *name == schema.index_name) {
        return Ok(LifecycleOutcome::Listed);
    }

    match client.create_index(schema).await {
        Ok(()) => {
            info!(
                "Created index {} (dim {}, {:?})",
                schema.index_name, schema.dimension, schema.distance
            );
            Ok(LifecycleOutcome::Created)
        }
        Err(err) if err.is_index_exists() => {
            warn!("Index {} was created concurrently", schema.index_name);
            Ok(LifecycleOutcome::CreatedConcurrently)
        }
        Err(err) => Err(state_error(err)),
    }
}

fn state_error(err: ClientError) -> BackendError {
    if err.is_unavailable() {
        BackendError::Unavailable(err.to_string())
    } else {
        BackendError::IndexState(err.to_string())
    }
}
