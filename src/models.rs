// =============================================================================
// models.rs - CONTESTS, PLATFORMS, AND THE LOADERS THAT FIND THEM
// =============================================================================
//
// The data model is deliberately small. A contest is a start time, a
// duration, a title, and maybe a link. Everything else (phase, end time,
// display order) is derived on demand and never stored, because a contest
// that was "upcoming" when we fetched it is "running" a few hours later and
// we would rather not lie about it.
// =============================================================================

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// A contest-hosting provider.
///
/// Declaration order is the tie-breaker in contest display order, so new
/// platforms go at the end.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    /// Anything the aggregator knows about that we do not track by name.
    /// Such contests carry their `host`.
    Unknown,
    Codeforces,
    AtCoder,
    CodeChef,
    Topcoder,
    Dmoj,
    Acmp,
    Timus,
}

impl Platform {
    pub const ALL: &'static [Platform] = &[
        Platform::Unknown,
        Platform::Codeforces,
        Platform::AtCoder,
        Platform::CodeChef,
        Platform::Topcoder,
        Platform::Dmoj,
        Platform::Acmp,
        Platform::Timus,
    ];

    /// Canonical host of the platform, as the aggregator spells it.
    pub fn host(self) -> Option<&'static str> {
        match self {
            Platform::Unknown => None,
            Platform::Codeforces => Some("codeforces.com"),
            Platform::AtCoder => Some("atcoder.jp"),
            Platform::CodeChef => Some("codechef.com"),
            Platform::Topcoder => Some("topcoder.com"),
            Platform::Dmoj => Some("dmoj.ca"),
            Platform::Acmp => Some("acmp.ru"),
            Platform::Timus => Some("acm.timus.ru"),
        }
    }

    /// Map an aggregator resource host back to a tracked platform.
    pub fn from_host(host: &str) -> Option<Platform> {
        let host = host.trim().trim_start_matches("www.");
        Platform::ALL
            .iter()
            .copied()
            .find(|p| p.host().is_some_and(|h| h.eq_ignore_ascii_case(host)))
    }

    pub fn name(self) -> &'static str {
        match self {
            Platform::Unknown => "unknown",
            Platform::Codeforces => "codeforces",
            Platform::AtCoder => "atcoder",
            Platform::CodeChef => "codechef",
            Platform::Topcoder => "topcoder",
            Platform::Dmoj => "dmoj",
            Platform::Acmp => "acmp",
            Platform::Timus => "timus",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown platform name: {0}")]
pub struct UnknownPlatform(pub String);

impl FromStr for Platform {
    type Err = UnknownPlatform;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Platform::ALL
            .iter()
            .copied()
            .find(|p| p.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownPlatform(wanted.to_string()))
    }
}

/// One backend integration. Knows which platforms it can answer for.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum LoaderType {
    CodeforcesApi,
    DmojApi,
    CodechefApi,
    /// clist.by: one call, every platform. The shared/batched loader.
    ClistApi,
}

impl LoaderType {
    pub fn supported_platforms(self) -> &'static [Platform] {
        match self {
            LoaderType::CodeforcesApi => &[Platform::Codeforces],
            LoaderType::DmojApi => &[Platform::Dmoj],
            LoaderType::CodechefApi => &[Platform::CodeChef],
            LoaderType::ClistApi => Platform::ALL,
        }
    }

    pub fn supports(self, platform: Platform) -> bool {
        self.supported_platforms().contains(&platform)
    }

    /// Batched loaders are routed through the memoizer.
    pub fn is_multiple(self) -> bool {
        matches!(self, LoaderType::ClistApi)
    }

    pub fn name(self) -> &'static str {
        match self {
            LoaderType::CodeforcesApi => "codeforces_api",
            LoaderType::DmojApi => "dmoj_api",
            LoaderType::CodechefApi => "codechef_api",
            LoaderType::ClistApi => "clist_api",
        }
    }
}

impl fmt::Display for LoaderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Where a contest is relative to some instant.
///
/// Variant order is display priority: running first, then upcoming, then
/// finished.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum ContestPhase {
    Running,
    Before,
    Finished,
}

impl fmt::Display for ContestPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContestPhase::Running => write!(f, "RUNNING"),
            ContestPhase::Before => write!(f, "BEFORE"),
            ContestPhase::Finished => write!(f, "FINISHED"),
        }
    }
}

/// A scheduled contest. Recreated from scratch every pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contest {
    pub platform: Platform,

    /// Unique within `platform`.
    pub id: String,

    pub title: String,

    pub start_time: DateTime<Utc>,

    /// Never negative.
    #[serde(with = "duration_secs")]
    pub duration: Duration,

    pub link: Option<String>,

    /// Set for `Platform::Unknown` contests, which are otherwise anonymous.
    pub host: Option<String>,
}

impl Contest {
    pub fn new(
        platform: Platform,
        id: impl Into<String>,
        title: impl Into<String>,
        start_time: DateTime<Utc>,
        duration: Duration,
    ) -> Self {
        debug_assert!(duration >= Duration::zero(), "contest duration must not be negative");
        Self {
            platform,
            id: id.into(),
            title: title.into(),
            start_time,
            duration,
            link: None,
            host: None,
        }
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn end_time(&self) -> DateTime<Utc> {
        self.start_time + self.duration
    }

    /// Boundaries are exact: a contest is running at its start instant and
    /// finished at its end instant.
    pub fn phase_at(&self, now: DateTime<Utc>) -> ContestPhase {
        if now < self.start_time {
            ContestPhase::Before
        } else if now < self.end_time() {
            ContestPhase::Running
        } else {
            ContestPhase::Finished
        }
    }

    /// Display order at instant `now`.
    ///
    /// Running contests ending soonest come first, then upcoming ones starting
    /// soonest, then finished ones most recent first. Remaining ties are
    /// broken by duration, platform and id so the order never depends on
    /// which loader answered first.
    pub fn cmp_at(&self, other: &Contest, now: DateTime<Utc>) -> Ordering {
        let phase = self.phase_at(now);
        phase
            .cmp(&other.phase_at(now))
            .then_with(|| match phase {
                ContestPhase::Running => self.end_time().cmp(&other.end_time()),
                ContestPhase::Before => self.start_time.cmp(&other.start_time),
                ContestPhase::Finished => other.end_time().cmp(&self.end_time()),
            })
            .then_with(|| self.duration.cmp(&other.duration))
            .then_with(|| self.platform.cmp(&other.platform))
            .then_with(|| self.id.cmp(&other.id))
    }
}

impl fmt::Display for Contest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let source = match (&self.platform, &self.host) {
            (Platform::Unknown, Some(host)) => host.as_str(),
            (platform, _) => platform.name(),
        };
        write!(
            f,
            "[{}] {} @ {} ({}h{:02}m)",
            source,
            self.title,
            self.start_time.format("%Y-%m-%d %H:%M UTC"),
            self.duration.num_hours(),
            self.duration.num_minutes() % 60,
        )
    }
}

/// Sort contests for display at instant `now`.
pub fn sort_contests(contests: &mut [Contest], now: DateTime<Utc>) {
    contests.sort_by(|a, b| a.cmp_at(b, now));
}

/// Serde helper: durations travel as whole seconds.
mod duration_secs {
    use chrono::Duration;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(duration.num_seconds())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = i64::deserialize(deserializer)?;
        if secs < 0 {
            return Err(serde::de::Error::custom("negative contest duration"));
        }
        Ok(Duration::seconds(secs))
    }
}
