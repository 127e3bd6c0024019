// =============================================================================
// error.rs - EVERYTHING THAT CAN GO WRONG WHILE ASKING FOR A SCHEDULE
// =============================================================================
//
// One enum for every way a single loader attempt can fail. None of these are
// fatal: the engine reports them to the receiver and moves on to the next
// loader in the chain.
//
// Programmer errors (asking a loader for a platform it does not serve, or a
// loader answering for the wrong platform) are NOT in here. Those panic.
// =============================================================================

use std::sync::Arc;

use crate::models::LoaderType;

/// A failed loader attempt.
#[derive(Debug, thiserror::Error)]
pub enum LoaderError {
    /// The request never made it, or the body could not be read.
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered, but not with a 2xx.
    #[error("unexpected HTTP status {status} from {url}")]
    Status { status: u16, url: String },

    /// The body was not the JSON we were promised.
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The backend told us, in its own words, that it failed.
    #[error("backend reported failure: {0}")]
    Backend(String),

    /// The loader needs an account and none was configured.
    #[error("no credentials configured for {0}")]
    MissingCredentials(LoaderType),

    /// The setup names a loader type nobody registered an implementation for.
    #[error("no loader registered for {0}")]
    NotRegistered(LoaderType),
}

/// Failures are shared between every platform that awaited the same batched
/// call, hence the `Arc`.
pub type SharedLoaderError = Arc<LoaderError>;
