// =============================================================================
// receiver.rs - THE OTHER END OF THE PIPE
// =============================================================================
//
// The engine does not keep results. It streams them: for every platform it
// says "starting", then one result per loader attempt, then "finished".
// Whoever implements ContestsReceiver decides what that means. The calls of
// one platform arrive in order; calls of different platforms interleave
// freely, from whatever worker thread the platform's task happens to run on.
//
// A receiver must not fail the pass. Anything it cannot handle, it logs.
// =============================================================================

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error, warn};

use crate::error::SharedLoaderError;
use crate::models::{Contest, LoaderType, Platform};
use crate::storage::ContestsStorage;

#[async_trait]
pub trait ContestsReceiver: Send + Sync {
    async fn on_start_loading(&self, platform: Platform);

    /// Called once per loader attempt, successful or not.
    async fn on_result(
        &self,
        platform: Platform,
        loader_type: LoaderType,
        result: Result<Vec<Contest>, SharedLoaderError>,
    );

    /// Called last. A platform that saw no `Ok` result before this failed on
    /// every loader of its chain.
    async fn on_finish(&self, platform: Platform);
}

#[async_trait]
impl<R: ContestsReceiver + ?Sized> ContestsReceiver for Arc<R> {
    async fn on_start_loading(&self, platform: Platform) {
        (**self).on_start_loading(platform).await
    }

    async fn on_result(
        &self,
        platform: Platform,
        loader_type: LoaderType,
        result: Result<Vec<Contest>, SharedLoaderError>,
    ) {
        (**self).on_result(platform, loader_type, result).await
    }

    async fn on_finish(&self, platform: Platform) {
        (**self).on_finish(platform).await
    }
}

/// Reference adapter: every successful result replaces the platform's
/// contests in storage.
pub struct StorageReceiver<S> {
    storage: S,
}

impl<S: ContestsStorage> StorageReceiver<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }
}

#[async_trait]
impl<S: ContestsStorage> ContestsReceiver for StorageReceiver<S> {
    async fn on_start_loading(&self, platform: Platform) {
        debug!(platform = %platform, "Loading started");
    }

    async fn on_result(
        &self,
        platform: Platform,
        loader_type: LoaderType,
        result: Result<Vec<Contest>, SharedLoaderError>,
    ) {
        match result {
            Ok(contests) => {
                if let Err(e) = self.storage.replace(platform, contests).await {
                    error!(
                        platform = %platform,
                        loader = %loader_type,
                        error = %e,
                        "Failed to store contests"
                    );
                }
            }
            Err(e) => {
                warn!(platform = %platform, loader = %loader_type, error = %e, "Loader attempt failed");
            }
        }
    }

    async fn on_finish(&self, platform: Platform) {
        debug!(platform = %platform, "Loading finished");
    }
}
