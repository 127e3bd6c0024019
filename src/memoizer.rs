// =============================================================================
// memoizer.rs - ONE BATCHED CALL PER LOADER PER PASS. ONE.
// =============================================================================
//
// Several platforms can fall back to the same batched loader (clist.by
// answers for all of them). Without this module each platform task would fire
// its own identical request. With it, the first task to ask registers a
// shared, lazily started computation; every other task awaits the very same
// future and sees the very same outcome, success or failure.
//
// The computation is always over the FULL platform set the Setup assigns to
// that loader type, not just the platform of whoever asked first, so every
// later caller finds its slice in the map.
//
// Locking discipline: the parking_lot mutex guards a check-and-insert on a
// HashMap and nothing else. The guard is gone before anyone awaits.
//
// Scope: one memoizer per pass. It is not a cache. A new pass builds a new
// memoizer and asks again.
// =============================================================================

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::constraints::DateConstraints;
use crate::error::{LoaderError, SharedLoaderError};
use crate::loaders::{get_contests_multiple, ContestsLoaderMultiple, LoaderRegistry};
use crate::models::{Contest, LoaderType, Platform};
use crate::setup::Setup;

pub type ContestsByPlatform = HashMap<Platform, Vec<Contest>>;

pub type MultipleLoadResult = Result<Arc<ContestsByPlatform>, SharedLoaderError>;

type SharedLoad = Shared<BoxFuture<'static, MultipleLoadResult>>;

pub struct MultipleLoadersMemoizer {
    registry: Arc<LoaderRegistry>,
    platforms: HashMap<LoaderType, Vec<Platform>>,
    constraints: DateConstraints,
    in_flight: Mutex<HashMap<LoaderType, SharedLoad>>,
}

impl MultipleLoadersMemoizer {
    pub fn new(registry: Arc<LoaderRegistry>, setup: &Setup, constraints: DateConstraints) -> Self {
        let mut platforms: HashMap<LoaderType, Vec<Platform>> = HashMap::new();
        for (platform, chain) in setup.iter() {
            for loader_type in chain.iter().filter(|t| t.is_multiple()) {
                platforms.entry(*loader_type).or_default().push(platform);
            }
        }

        Self {
            registry,
            platforms,
            constraints,
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Contests of every platform configured for `loader_type`, grouped by
    /// platform. Platforms the backend had nothing for are absent from the map.
    pub async fn get_contests_result(&self, loader_type: LoaderType) -> MultipleLoadResult {
        let load = {
            let mut in_flight = self.in_flight.lock();
            in_flight
                .entry(loader_type)
                .or_insert_with(|| {
                    debug!(loader = %loader_type, "Registering shared load");
                    self.start(loader_type)
                })
                .clone()
        };
        load.await
    }

    /// Builds the computation without polling it; it starts when the first
    /// caller awaits.
    fn start(&self, loader_type: LoaderType) -> SharedLoad {
        let platforms = self.platforms.get(&loader_type).cloned().unwrap_or_default();
        load_grouped(
            loader_type,
            self.registry.multiple(loader_type),
            platforms,
            self.constraints,
        )
        .boxed()
        .shared()
    }
}

async fn load_grouped(
    loader_type: LoaderType,
    loader: Option<Arc<dyn ContestsLoaderMultiple>>,
    platforms: Vec<Platform>,
    constraints: DateConstraints,
) -> MultipleLoadResult {
    let loader = loader.ok_or_else(|| Arc::new(LoaderError::NotRegistered(loader_type)))?;

    info!(loader = %loader_type, platforms = ?platforms, "🔄 Batched load started");
    let contests = get_contests_multiple(loader.as_ref(), &platforms, &constraints)
        .await
        .map_err(Arc::new)?;

    let mut grouped = ContestsByPlatform::new();
    for contest in contests {
        grouped.entry(contest.platform).or_default().push(contest);
    }
    info!(loader = %loader_type, platforms_with_contests = grouped.len(), "🔄 Batched load finished");
    Ok(Arc::new(grouped))
}
