// =============================================================================
// config.rs - KNOBS
// =============================================================================
//
// Everything tunable lives here, loaded from the environment (and a .env file
// if one is lying around). Every variable is prefixed with CONTEST_RADAR_ and
// every one has a default, so the binary runs with nothing set at all. It
// just will not have CLIST without credentials.
//
// The engine never reads this. `Config::setup` and
// `Config::date_constraints` turn it into the plain values a pass takes.
// =============================================================================

use std::env;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use tracing::warn;

use crate::constraints::DateConstraints;
use crate::loaders::clist::ClistCredentials;
use crate::models::{LoaderType, Platform};
use crate::setup::Setup;

#[derive(Debug, Clone)]
pub struct Config {
    // =========================================================================
    // WHAT TO LOAD
    // =========================================================================

    /// Platforms to track. Default: all of them.
    pub enabled_platforms: Vec<Platform>,

    // =========================================================================
    // CLIST
    // =========================================================================

    pub clist_username: Option<String>,
    pub clist_api_key: Option<String>,

    /// Extra aggregator hosts reported as `Platform::Unknown`.
    pub clist_additional_resources: Vec<String>,

    // =========================================================================
    // API ENDPOINTS
    // =========================================================================

    pub codeforces_base_url: String,
    pub dmoj_base_url: String,
    pub codechef_base_url: String,
    pub clist_base_url: String,

    /// Per-request timeout for every backend. The engine has none of its own.
    pub http_timeout: StdDuration,

    // =========================================================================
    // DATE WINDOW
    // =========================================================================

    /// How far ahead a contest may start. Default: 120 days.
    pub max_start_ahead: Duration,

    /// How long ago a contest may have ended. Default: 7 days.
    pub min_end_behind: Duration,

    /// Longest contest worth showing. Default: 30 days.
    pub max_duration: Duration,

    // =========================================================================
    // LOGGING
    // =========================================================================

    /// JSON log lines instead of human ones.
    pub log_json: bool,
}

impl Config {
    pub fn from_env() -> Self {
        // a missing .env is fine
        let _ = dotenvy::dotenv();

        Config {
            enabled_platforms: parse_platforms(&env_or_default("CONTEST_RADAR_PLATFORMS", "all")),

            clist_username: env_opt("CONTEST_RADAR_CLIST_USERNAME"),
            clist_api_key: env_opt("CONTEST_RADAR_CLIST_API_KEY"),
            clist_additional_resources: parse_list(&env_or_default("CONTEST_RADAR_CLIST_RESOURCES", "")),

            codeforces_base_url: env_or_default("CONTEST_RADAR_CODEFORCES_URL", "https://codeforces.com"),
            dmoj_base_url: env_or_default("CONTEST_RADAR_DMOJ_URL", "https://dmoj.ca"),
            codechef_base_url: env_or_default("CONTEST_RADAR_CODECHEF_URL", "https://www.codechef.com"),
            clist_base_url: env_or_default("CONTEST_RADAR_CLIST_URL", "https://clist.by"),

            http_timeout: StdDuration::from_secs(
                env_or_default("CONTEST_RADAR_HTTP_TIMEOUT_SECS", "30").parse().unwrap_or(30),
            ),

            max_start_ahead: Duration::days(
                env_or_default("CONTEST_RADAR_MAX_START_DAYS", "120").parse().unwrap_or(120),
            ),
            min_end_behind: Duration::days(
                env_or_default("CONTEST_RADAR_MIN_END_DAYS_AGO", "7").parse().unwrap_or(7),
            ),
            max_duration: Duration::days(
                env_or_default("CONTEST_RADAR_MAX_DURATION_DAYS", "30").parse().unwrap_or(30),
            ),

            log_json: env_or_default("CONTEST_RADAR_LOG_JSON", "false")
                .parse()
                .unwrap_or(false),
        }
    }

    pub fn clist_credentials(&self) -> Option<ClistCredentials> {
        match (&self.clist_username, &self.clist_api_key) {
            (Some(username), Some(api_key)) => Some(ClistCredentials {
                username: username.clone(),
                api_key: api_key.clone(),
            }),
            _ => None,
        }
    }

    /// Default fallback chains: the platform's own API first where one exists,
    /// CLIST after it (when configured) for everybody.
    pub fn setup(&self) -> Setup {
        let clist = self.clist_credentials().is_some();
        let mut setup = Setup::new();
        for platform in &self.enabled_platforms {
            let mut chain = match platform {
                Platform::Codeforces => vec![LoaderType::CodeforcesApi],
                Platform::Dmoj => vec![LoaderType::DmojApi],
                Platform::CodeChef => vec![LoaderType::CodechefApi],
                _ => Vec::new(),
            };
            if clist {
                chain.push(LoaderType::ClistApi);
            }
            if chain.is_empty() {
                warn!(platform = %platform, "No loader available without CLIST credentials");
            }
            setup.insert(*platform, chain);
        }
        setup
    }

    pub fn date_constraints(&self, now: DateTime<Utc>) -> DateConstraints {
        DateConstraints::around(now, self.max_start_ahead, self.min_end_behind, self.max_duration)
    }
}

fn env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Comma-separated platform names, or `all`. Unknown names are skipped with a
/// warning rather than failing startup.
fn parse_platforms(raw: &str) -> Vec<Platform> {
    if raw.trim().eq_ignore_ascii_case("all") {
        return Platform::ALL.to_vec();
    }
    parse_list(raw)
        .iter()
        .filter_map(|name| match name.parse::<Platform>() {
            Ok(p) => Some(p),
            Err(e) => {
                warn!(error = %e, "Ignoring platform in CONTEST_RADAR_PLATFORMS");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(platforms: &[Platform], clist: bool) -> Config {
        Config {
            enabled_platforms: platforms.to_vec(),
            clist_username: clist.then(|| "radar".to_string()),
            clist_api_key: clist.then(|| "secret".to_string()),
            clist_additional_resources: Vec::new(),
            codeforces_base_url: "https://codeforces.com".into(),
            dmoj_base_url: "https://dmoj.ca".into(),
            codechef_base_url: "https://www.codechef.com".into(),
            clist_base_url: "https://clist.by".into(),
            http_timeout: StdDuration::from_secs(5),
            max_start_ahead: Duration::days(120),
            min_end_behind: Duration::days(7),
            max_duration: Duration::days(30),
            log_json: false,
        }
    }

    #[test]
    fn test_parse_platforms() {
        assert_eq!(parse_platforms("all"), Platform::ALL.to_vec());
        assert_eq!(
            parse_platforms("codeforces, AtCoder,,leetcode"),
            vec![Platform::Codeforces, Platform::AtCoder]
        );
    }

    #[test]
    fn test_setup_with_clist() {
        let setup = config(&[Platform::Codeforces, Platform::AtCoder], true).setup();
        assert_eq!(
            setup.chain(Platform::Codeforces).unwrap(),
            &[LoaderType::CodeforcesApi, LoaderType::ClistApi]
        );
        assert_eq!(setup.chain(Platform::AtCoder).unwrap(), &[LoaderType::ClistApi]);
    }

    #[test]
    fn test_setup_without_clist_leaves_aggregator_only_platforms_empty() {
        let setup = config(&[Platform::Dmoj, Platform::Timus], false).setup();
        assert_eq!(setup.chain(Platform::Dmoj).unwrap(), &[LoaderType::DmojApi]);
        assert_eq!(setup.chain(Platform::Timus).unwrap(), &[] as &[LoaderType]);
    }

    #[test]
    fn test_date_constraints_follow_the_window() {
        let now = Utc::now();
        let c = config(&[], false).date_constraints(now);
        assert_eq!(c.max_start_time, now + Duration::days(120));
        assert_eq!(c.min_end_time, now - Duration::days(7));
        assert_eq!(c.max_duration, Duration::days(30));
    }
}
