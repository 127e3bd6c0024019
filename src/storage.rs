// =============================================================================
// storage.rs - WHERE CONTESTS GO TO WAIT FOR THEIR START TIME
// =============================================================================
//
// The storage contract is replace-by-platform: after a successful load, the
// stored contests of that platform become exactly the loaded set. Upsert what
// came back (keyed by platform + id), delete whatever of that platform did not.
// Other platforms are untouched.
//
// The in-memory store is the reference implementation and what the binary
// uses. Anything durable implements the same trait.
// =============================================================================

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::debug;

use crate::models::{Contest, Platform};

#[async_trait]
pub trait ContestsStorage: Send + Sync {
    /// Make `contests` the complete set stored for `platform`.
    async fn replace(&self, platform: Platform, contests: Vec<Contest>) -> anyhow::Result<()>;
}

#[async_trait]
impl<S: ContestsStorage + ?Sized> ContestsStorage for Arc<S> {
    async fn replace(&self, platform: Platform, contests: Vec<Contest>) -> anyhow::Result<()> {
        (**self).replace(platform, contests).await
    }
}

#[derive(Default)]
pub struct InMemoryContestsStorage {
    contests: RwLock<BTreeMap<(Platform, String), Contest>>,
}

impl InMemoryContestsStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything stored, ordered by (platform, id).
    pub fn contests(&self) -> Vec<Contest> {
        self.contests.read().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.contests.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.contests.read().is_empty()
    }
}

#[async_trait]
impl ContestsStorage for InMemoryContestsStorage {
    async fn replace(&self, platform: Platform, contests: Vec<Contest>) -> anyhow::Result<()> {
        if let Some(stray) = contests.iter().find(|c| c.platform != platform) {
            anyhow::bail!("refusing to store a {} contest under {platform}", stray.platform);
        }

        let keep: HashSet<String> = contests.iter().map(|c| c.id.clone()).collect();
        let mut stored = self.contests.write();
        let before = stored.len();
        stored.retain(|(p, id), _| *p != platform || keep.contains(id));
        let removed = before - stored.len();
        let upserted = contests.len();
        for contest in contests {
            stored.insert((platform, contest.id.clone()), contest);
        }

        debug!(platform = %platform, upserted, removed, "Replaced stored contests");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::contest;

    #[tokio::test]
    async fn test_replace_upserts_and_deletes_only_within_platform() {
        let storage = InMemoryContestsStorage::new();
        storage
            .replace(Platform::Codeforces, vec![contest(Platform::Codeforces, "1"), contest(Platform::Codeforces, "2")])
            .await
            .unwrap();
        storage.replace(Platform::Dmoj, vec![contest(Platform::Dmoj, "1")]).await.unwrap();

        let mut renamed = contest(Platform::Codeforces, "2");
        renamed.title = "Renamed".to_string();
        storage
            .replace(Platform::Codeforces, vec![renamed, contest(Platform::Codeforces, "3")])
            .await
            .unwrap();

        let keys: Vec<(Platform, String, String)> = storage
            .contests()
            .into_iter()
            .map(|c| (c.platform, c.id, c.title))
            .collect();
        assert_eq!(
            keys,
            vec![
                (Platform::Codeforces, "2".to_string(), "Renamed".to_string()),
                (Platform::Codeforces, "3".to_string(), "Contest 3".to_string()),
                (Platform::Dmoj, "1".to_string(), "Contest 1".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_replace_with_empty_set_clears_platform() {
        let storage = InMemoryContestsStorage::new();
        storage.replace(Platform::AtCoder, vec![contest(Platform::AtCoder, "abc1")]).await.unwrap();
        storage.replace(Platform::AtCoder, Vec::new()).await.unwrap();
        assert!(storage.is_empty());
    }

    #[tokio::test]
    async fn test_replace_refuses_foreign_contests() {
        let storage = InMemoryContestsStorage::new();
        let err = storage
            .replace(Platform::AtCoder, vec![contest(Platform::Dmoj, "x")])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("refusing"));
        assert!(storage.is_empty());
    }
}
