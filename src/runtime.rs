//! Blocking bridge for the async drivers.

use tokio::runtime::{Builder, Runtime};

use crate::error::BackendError;

/// A single-threaded runtime owned by one link. Driver futures, including the background
/// connection task, only make progress inside `block_on` calls on it.
///
/// Links built on it must not be used from inside another tokio runtime.
pub(crate) fn current_thread_runtime() -> Result<Runtime, BackendError> {
    Ok(Builder::new_current_thread().enable_all().build()?)
}
