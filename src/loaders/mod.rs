// =============================================================================
// loaders/mod.rs - THE TWO SHAPES OF ASKING
// =============================================================================
//
// There are exactly two kinds of backend:
//
// * `ContestsLoader` answers for one platform per call. Codeforces' own API
//   knows about Codeforces and nothing else.
// * `ContestsLoaderMultiple` answers for a whole set of platforms in one
//   batched call. clist.by knows about everybody.
//
// They are kept as two traits on purpose. The engine calls the first kind
// directly and routes the second through the per-pass memoizer, and the
// `Loader` enum is the tag that tells them apart.
//
// The free functions `get_contests` / `get_contests_multiple` are the only
// way the engine talks to a loader. They enforce the contract: asking for an
// unsupported platform, or getting back contests for a platform nobody asked
// for, is a bug, and bugs panic.
// =============================================================================

pub mod clist;
pub mod codechef;
pub mod codeforces;
pub mod dmoj;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::config::Config;
use crate::constraints::DateConstraints;
use crate::error::LoaderError;
use crate::models::{Contest, LoaderType, Platform};

/// Loads one platform from one backend.
#[async_trait]
pub trait ContestsLoader: Send + Sync {
    fn loader_type(&self) -> LoaderType;

    async fn load_contests(
        &self,
        platform: Platform,
        constraints: &DateConstraints,
    ) -> Result<Vec<Contest>, LoaderError>;
}

/// Loads a set of platforms from one shared backend in a single call.
#[async_trait]
pub trait ContestsLoaderMultiple: Send + Sync {
    fn loader_type(&self) -> LoaderType;

    async fn load_contests(
        &self,
        platforms: &[Platform],
        constraints: &DateConstraints,
    ) -> Result<Vec<Contest>, LoaderError>;
}

/// A backend that cannot filter by date on its side. Wrap it in
/// `DateFilteredLoader` to get a `ContestsLoader`.
#[async_trait]
pub trait UnfilteredContestsLoader: Send + Sync {
    fn loader_type(&self) -> LoaderType;

    async fn load_all_contests(&self, platform: Platform) -> Result<Vec<Contest>, LoaderError>;
}

/// Applies the date constraints client-side over an unfiltered fetch.
pub struct DateFilteredLoader<L>(pub L);

#[async_trait]
impl<L: UnfilteredContestsLoader> ContestsLoader for DateFilteredLoader<L> {
    fn loader_type(&self) -> LoaderType {
        self.0.loader_type()
    }

    async fn load_contests(
        &self,
        platform: Platform,
        constraints: &DateConstraints,
    ) -> Result<Vec<Contest>, LoaderError> {
        let all = self.0.load_all_contests(platform).await?;
        let total = all.len();
        let kept: Vec<Contest> = all.into_iter().filter(|c| constraints.check_contest(c)).collect();
        debug!(
            loader = %self.0.loader_type(),
            platform = %platform,
            total,
            kept = kept.len(),
            "Applied date constraints client-side"
        );
        Ok(kept)
    }
}

/// Checked single-platform call.
///
/// # Panics
/// If the loader does not support `platform`, or returns a contest for any
/// other platform.
pub async fn get_contests(
    loader: &dyn ContestsLoader,
    platform: Platform,
    constraints: &DateConstraints,
) -> Result<Vec<Contest>, LoaderError> {
    let loader_type = loader.loader_type();
    assert!(
        loader_type.supports(platform),
        "loader {loader_type} does not support platform {platform}"
    );

    let contests = loader.load_contests(platform, constraints).await?;
    for contest in &contests {
        assert_eq!(
            contest.platform, platform,
            "loader {loader_type} returned a {} contest when asked for {platform}",
            contest.platform
        );
    }
    Ok(contests)
}

/// Checked batched call. An empty platform list never reaches the backend.
///
/// # Panics
/// If any requested platform is unsupported, or a returned contest belongs to
/// a platform that was not requested.
pub async fn get_contests_multiple(
    loader: &dyn ContestsLoaderMultiple,
    platforms: &[Platform],
    constraints: &DateConstraints,
) -> Result<Vec<Contest>, LoaderError> {
    if platforms.is_empty() {
        return Ok(Vec::new());
    }

    let loader_type = loader.loader_type();
    for platform in platforms {
        assert!(
            loader_type.supports(*platform),
            "loader {loader_type} does not support platform {platform}"
        );
    }

    let contests = loader.load_contests(platforms, constraints).await?;
    for contest in &contests {
        assert!(
            platforms.contains(&contest.platform),
            "loader {loader_type} returned a {} contest that was not requested",
            contest.platform
        );
    }
    Ok(contests)
}

/// The tag that separates the two loader shapes.
#[derive(Clone)]
pub enum Loader {
    Single(Arc<dyn ContestsLoader>),
    Multiple(Arc<dyn ContestsLoaderMultiple>),
}

impl Loader {
    pub fn loader_type(&self) -> LoaderType {
        match self {
            Loader::Single(loader) => loader.loader_type(),
            Loader::Multiple(loader) => loader.loader_type(),
        }
    }
}

/// Loader implementations by type. Built once and shared by every pass.
#[derive(Clone, Default)]
pub struct LoaderRegistry {
    loaders: HashMap<LoaderType, Loader>,
}

impl LoaderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// # Panics
    /// If a batched loader type is registered as single or the other way round.
    pub fn register_single(&mut self, loader: Arc<dyn ContestsLoader>) -> &mut Self {
        let loader_type = loader.loader_type();
        assert!(!loader_type.is_multiple(), "{loader_type} is a batched loader type");
        self.loaders.insert(loader_type, Loader::Single(loader));
        self
    }

    /// # Panics
    /// See `register_single`.
    pub fn register_multiple(&mut self, loader: Arc<dyn ContestsLoaderMultiple>) -> &mut Self {
        let loader_type = loader.loader_type();
        assert!(loader_type.is_multiple(), "{loader_type} is a single-platform loader type");
        self.loaders.insert(loader_type, Loader::Multiple(loader));
        self
    }

    pub fn get(&self, loader_type: LoaderType) -> Option<&Loader> {
        self.loaders.get(&loader_type)
    }

    pub fn multiple(&self, loader_type: LoaderType) -> Option<Arc<dyn ContestsLoaderMultiple>> {
        match self.loaders.get(&loader_type) {
            Some(Loader::Multiple(loader)) => Some(Arc::clone(loader)),
            _ => None,
        }
    }

    pub fn contains(&self, loader_type: LoaderType) -> bool {
        self.loaders.contains_key(&loader_type)
    }

    /// Registry of every real backend, configured from `config`. The CLIST
    /// loader is only registered when credentials are present.
    pub fn from_config(config: &Config) -> Result<Self, LoaderError> {
        let mut registry = Self::new();
        registry
            .register_single(Arc::new(DateFilteredLoader(codeforces::CodeforcesLoader::new(
                &config.codeforces_base_url,
                config.http_timeout,
            )?)))
            .register_single(Arc::new(DateFilteredLoader(dmoj::DmojLoader::new(
                &config.dmoj_base_url,
                config.http_timeout,
            )?)))
            .register_single(Arc::new(DateFilteredLoader(codechef::CodechefLoader::new(
                &config.codechef_base_url,
                config.http_timeout,
            )?)));

        if let Some(credentials) = config.clist_credentials() {
            registry.register_multiple(Arc::new(clist::ClistLoader::new(
                &config.clist_base_url,
                credentials,
                config.clist_additional_resources.clone(),
                config.http_timeout,
            )?));
        }
        Ok(registry)
    }
}

/// Shared GET-and-decode path for the JSON backends.
pub(crate) async fn fetch_text(request: reqwest::RequestBuilder) -> Result<String, LoaderError> {
    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(LoaderError::Status {
            status: status.as_u16(),
            url: response.url().to_string(),
        });
    }
    Ok(response.text().await?)
}

pub(crate) fn http_client(timeout: std::time::Duration) -> Result<reqwest::Client, LoaderError> {
    Ok(reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("contest-radar-engine/", env!("CARGO_PKG_VERSION")))
        .build()?)
}
