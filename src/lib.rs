//! Contest schedule aggregation engine.
//!
//! One pass fans out a task per tracked platform, walks each platform's
//! fallback chain of backend loaders, shares batched backend calls between
//! platforms through a per-pass memoizer, and streams every outcome to a
//! [`receiver::ContestsReceiver`].

pub mod config;
pub mod constraints;
pub mod engine;
pub mod error;
pub mod loaders;
pub mod memoizer;
pub mod metrics;
pub mod models;
pub mod receiver;
pub mod setup;
pub mod storage;
pub mod titles;

#[cfg(test)]
mod testing;

pub use constraints::DateConstraints;
pub use engine::{ChainOutcome, ContestsLoadingEngine};
pub use error::LoaderError;
pub use loaders::{ContestsLoader, ContestsLoaderMultiple, LoaderRegistry};
pub use memoizer::MultipleLoadersMemoizer;
pub use models::{Contest, ContestPhase, LoaderType, Platform};
pub use receiver::ContestsReceiver;
pub use setup::Setup;
