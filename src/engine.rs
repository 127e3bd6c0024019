// =============================================================================
// engine.rs - THE WAR ROOM
// =============================================================================
//
// One pass, start to finish:
//
//   1. Spawn one tokio task per platform in the Setup. Nobody waits for
//      anybody. A platform whose every backend is on fire finishes whenever
//      it finishes, and the others do not care.
//   2. Each task walks its fallback chain, strictly one loader at a time:
//      single-platform loaders are called directly, batched loaders go
//      through the pass's memoizer and get sliced per platform.
//   3. Every attempt is reported to the receiver, success or failure. The
//      first success ends the walk.
//   4. The receiver hears on_finish, always.
//
// The engine keeps no results and no state between passes. Retry means
// running another pass. Cancellation means dropping the future returned by
// `run`: the JoinSet aborts every platform task, and with them any shared
// batched load nobody is waiting for anymore.
// =============================================================================

use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::constraints::DateConstraints;
use crate::error::{LoaderError, SharedLoaderError};
use crate::loaders::{get_contests, Loader, LoaderRegistry};
use crate::memoizer::MultipleLoadersMemoizer;
use crate::models::{Contest, LoaderType, Platform};
use crate::receiver::ContestsReceiver;
use crate::setup::Setup;
use crate::titles::fix_titles;

/// How one platform's chain ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainOutcome {
    Succeeded { loader_type: LoaderType, contests: usize },
    /// Every loader was tried and every one failed. Also the outcome of an
    /// empty chain.
    Exhausted { attempts: usize },
}

pub struct ContestsLoadingEngine {
    registry: Arc<LoaderRegistry>,
}

impl ContestsLoadingEngine {
    pub fn new(registry: Arc<LoaderRegistry>) -> Self {
        Self { registry }
    }

    /// Run one pass over every platform of `setup`.
    ///
    /// # Panics
    /// Re-raises the panic of any platform task, i.e. a loader contract
    /// violation.
    pub async fn run(
        &self,
        setup: &Setup,
        constraints: DateConstraints,
        receiver: Arc<dyn ContestsReceiver>,
    ) {
        let memoizer = Arc::new(MultipleLoadersMemoizer::new(
            Arc::clone(&self.registry),
            setup,
            constraints,
        ));

        info!(platforms = setup.len(), "🚀 Contest loading pass started");

        let mut tasks = JoinSet::new();
        for (platform, chain) in setup.iter() {
            let task = PlatformTask {
                platform,
                chain: chain.to_vec(),
                constraints,
                registry: Arc::clone(&self.registry),
                memoizer: Arc::clone(&memoizer),
                receiver: Arc::clone(&receiver),
            };
            tasks.spawn(task.run());
        }

        let mut succeeded = 0usize;
        let mut exhausted = 0usize;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(ChainOutcome::Succeeded { .. }) => succeeded += 1,
                Ok(ChainOutcome::Exhausted { .. }) => exhausted += 1,
                Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
                Err(e) => warn!(error = %e, "Platform task was cancelled"),
            }
        }

        info!(succeeded, exhausted, "🏁 Contest loading pass finished");
    }
}

/// Everything one platform's task owns.
struct PlatformTask {
    platform: Platform,
    chain: Vec<LoaderType>,
    constraints: DateConstraints,
    registry: Arc<LoaderRegistry>,
    memoizer: Arc<MultipleLoadersMemoizer>,
    receiver: Arc<dyn ContestsReceiver>,
}

impl PlatformTask {
    async fn run(self) -> ChainOutcome {
        let platform = self.platform;
        self.receiver.on_start_loading(platform).await;

        let mut outcome = ChainOutcome::Exhausted { attempts: 0 };
        for (attempt, loader_type) in self.chain.iter().copied().enumerate() {
            debug!(platform = %platform, loader = %loader_type, attempt, "Trying loader");

            let result = self.attempt(loader_type).await.map(|c| fix_titles(platform, c));
            let loaded = result.as_ref().map(Vec::len).ok();
            self.receiver.on_result(platform, loader_type, result).await;

            match loaded {
                Some(contests) => {
                    outcome = ChainOutcome::Succeeded { loader_type, contests };
                    break;
                }
                None => outcome = ChainOutcome::Exhausted { attempts: attempt + 1 },
            }
        }

        self.receiver.on_finish(platform).await;
        debug!(platform = %platform, outcome = ?outcome, "Platform done");
        outcome
    }

    async fn attempt(&self, loader_type: LoaderType) -> Result<Vec<Contest>, SharedLoaderError> {
        match self.registry.get(loader_type) {
            None => Err(Arc::new(LoaderError::NotRegistered(loader_type))),
            Some(Loader::Single(loader)) => get_contests(loader.as_ref(), self.platform, &self.constraints)
                .await
                .map_err(Arc::new),
            // A platform missing from a successful batched response simply had
            // nothing in it: an empty success, not a failure.
            Some(Loader::Multiple(_)) => self
                .memoizer
                .get_contests_result(loader_type)
                .await
                .map(|grouped| grouped.get(&self.platform).cloned().unwrap_or_default()),
        }
    }
}
