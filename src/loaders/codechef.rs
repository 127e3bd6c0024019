// =============================================================================
// codechef.rs - PRESENT, FUTURE, AND (UNFORTUNATELY) PAST
// =============================================================================
//
//   GET https://www.codechef.com/api/list/contests/all
//
// Three arrays in one response. Dates come with an offset (IST, mostly), so
// we read the `_iso` fields and convert to UTC. The past list is long and
// mostly irrelevant; the date filter wrapped around this loader deals with it.
// =============================================================================

use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, warn};

use super::{fetch_text, http_client, UnfilteredContestsLoader};
use crate::error::LoaderError;
use crate::models::{Contest, LoaderType, Platform};

#[derive(Debug, Deserialize)]
struct ApiResponse {
    status: String,
    message: Option<String>,
    #[serde(default)]
    present_contests: Vec<ApiContest>,
    #[serde(default)]
    future_contests: Vec<ApiContest>,
    #[serde(default)]
    past_contests: Vec<ApiContest>,
}

#[derive(Debug, Deserialize)]
struct ApiContest {
    contest_code: String,
    contest_name: String,
    contest_start_date_iso: String,
    contest_end_date_iso: String,
}

pub struct CodechefLoader {
    client: reqwest::Client,
    base_url: String,
}

impl CodechefLoader {
    pub fn new(base_url: &str, timeout: StdDuration) -> Result<Self, LoaderError> {
        Ok(Self {
            client: http_client(timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl UnfilteredContestsLoader for CodechefLoader {
    fn loader_type(&self) -> LoaderType {
        LoaderType::CodechefApi
    }

    async fn load_all_contests(&self, _platform: Platform) -> Result<Vec<Contest>, LoaderError> {
        let url = format!("{}/api/list/contests/all", self.base_url);
        debug!(url = url.as_str(), "CodeChef: requesting contests");
        let body = fetch_text(self.client.get(&url)).await?;
        parse_contests(&body, &self.base_url)
    }
}

pub(crate) fn parse_contests(body: &str, base_url: &str) -> Result<Vec<Contest>, LoaderError> {
    let response: ApiResponse = serde_json::from_str(body)?;
    if response.status != "success" {
        return Err(LoaderError::Backend(
            response.message.unwrap_or_else(|| format!("status {}", response.status)),
        ));
    }

    let contests = response
        .present_contests
        .into_iter()
        .chain(response.future_contests)
        .chain(response.past_contests)
        .filter_map(|c| {
            let start = parse_iso(&c.contest_start_date_iso)?;
            let end = parse_iso(&c.contest_end_date_iso)?;
            if end < start {
                warn!(code = c.contest_code.as_str(), "CodeChef: contest ends before it starts, skipping");
                return None;
            }
            let link = format!("{base_url}/{}", c.contest_code);
            Some(Contest::new(Platform::CodeChef, c.contest_code, c.contest_name, start, end - start).with_link(link))
        })
        .collect();
    Ok(contests)
}

fn parse_iso(value: &str) -> Option<DateTime<Utc>> {
    match DateTime::parse_from_rfc3339(value) {
        Ok(t) => Some(t.with_timezone(&Utc)),
        Err(e) => {
            warn!(value, error = %e, "CodeChef: unparseable date");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_parse_all_three_lists() {
        let body = r#"{
            "status": "success",
            "message": "All contests list",
            "present_contests": [
                {"contest_code": "LIVE1", "contest_name": "Live One",
                 "contest_start_date_iso": "2024-06-01T20:00:00+05:30",
                 "contest_end_date_iso": "2024-06-01T22:00:00+05:30", "contest_duration": "120"}
            ],
            "future_contests": [
                {"contest_code": "START140", "contest_name": "Starters 140",
                 "contest_start_date_iso": "2024-06-05T20:00:00+05:30",
                 "contest_end_date_iso": "2024-06-05T22:00:00+05:30", "contest_duration": "120"}
            ],
            "past_contests": [
                {"contest_code": "BAD", "contest_name": "Bad Date",
                 "contest_start_date_iso": "yesterday-ish",
                 "contest_end_date_iso": "2024-06-05T22:00:00+05:30", "contest_duration": "120"}
            ]
        }"#;
        let contests = parse_contests(body, "https://www.codechef.com").unwrap();
        let codes: Vec<&str> = contests.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(codes, vec!["LIVE1", "START140"]);
        assert_eq!(contests[1].start_time, Utc.with_ymd_and_hms(2024, 6, 5, 14, 30, 0).unwrap());
        assert_eq!(contests[1].duration, Duration::hours(2));
        assert_eq!(contests[1].link.as_deref(), Some("https://www.codechef.com/START140"));
    }

    #[test]
    fn test_parse_failure_status() {
        let body = r#"{"status": "error", "message": "Rate limited"}"#;
        let err = parse_contests(body, "https://www.codechef.com").unwrap_err();
        assert!(matches!(err, LoaderError::Backend(ref m) if m == "Rate limited"));
    }
}
