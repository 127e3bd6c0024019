// =============================================================================
// setup.rs - WHO ASKS WHOM, AND IN WHAT ORDER
// =============================================================================
//
// A Setup maps each tracked platform to its fallback chain: the loader types
// to try, best first. It is built outside the engine (see `Config::setup`)
// and handed to a pass as plain data.
// =============================================================================

use std::collections::{BTreeMap, BTreeSet};

use crate::models::{LoaderType, Platform};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Setup {
    chains: BTreeMap<Platform, Vec<LoaderType>>,
}

impl Setup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style `insert`.
    pub fn with_chain(mut self, platform: Platform, chain: impl IntoIterator<Item = LoaderType>) -> Self {
        self.insert(platform, chain);
        self
    }

    /// Replaces any chain already configured for `platform`. Repeated loader
    /// types keep their first position.
    pub fn insert(&mut self, platform: Platform, chain: impl IntoIterator<Item = LoaderType>) {
        let mut seen = BTreeSet::new();
        let chain = chain.into_iter().filter(|t| seen.insert(*t)).collect();
        self.chains.insert(platform, chain);
    }

    pub fn chain(&self, platform: Platform) -> Option<&[LoaderType]> {
        self.chains.get(&platform).map(Vec::as_slice)
    }

    /// Platforms in ascending order, each with its chain.
    pub fn iter(&self) -> impl Iterator<Item = (Platform, &[LoaderType])> {
        self.chains.iter().map(|(p, chain)| (*p, chain.as_slice()))
    }

    pub fn platforms(&self) -> impl Iterator<Item = Platform> + '_ {
        self.chains.keys().copied()
    }

    /// Every platform whose chain mentions `loader_type`. This is the full set
    /// a batched loader is asked for, whichever platform asks first.
    pub fn platforms_for(&self, loader_type: LoaderType) -> BTreeSet<Platform> {
        self.chains
            .iter()
            .filter(|(_, chain)| chain.contains(&loader_type))
            .map(|(p, _)| *p)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.chains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }
}
