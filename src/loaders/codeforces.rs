// =============================================================================
// codeforces.rs - STRAIGHT FROM THE SOURCE
// =============================================================================
//
// Codeforces has a real JSON API:
//   GET https://codeforces.com/api/contest.list?gym=false
//
// It returns every contest the site has ever run (thousands), with no way to
// ask for a date window. So this loader is "unfiltered" and gets wrapped in a
// DateFilteredLoader, which throws away the history client-side.
//
// Response shape:
//   { "status": "OK", "result": [ { "id", "name", "phase",
//     "durationSeconds", "startTimeSeconds"? } ] }
//   { "status": "FAILED", "comment": "..." }
// =============================================================================

use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::{DateTime, Duration};
use serde::Deserialize;
use tracing::{debug, warn};

use super::{fetch_text, http_client, UnfilteredContestsLoader};
use crate::error::LoaderError;
use crate::models::{Contest, LoaderType, Platform};

#[derive(Debug, Deserialize)]
struct ApiResponse {
    status: String,
    comment: Option<String>,
    result: Option<Vec<ApiContest>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiContest {
    id: i64,
    name: String,
    duration_seconds: i64,
    start_time_seconds: Option<i64>,
}

pub struct CodeforcesLoader {
    client: reqwest::Client,
    base_url: String,
}

impl CodeforcesLoader {
    pub fn new(base_url: &str, timeout: StdDuration) -> Result<Self, LoaderError> {
        Ok(Self {
            client: http_client(timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl UnfilteredContestsLoader for CodeforcesLoader {
    fn loader_type(&self) -> LoaderType {
        LoaderType::CodeforcesApi
    }

    async fn load_all_contests(&self, _platform: Platform) -> Result<Vec<Contest>, LoaderError> {
        let url = format!("{}/api/contest.list", self.base_url);
        debug!(url = url.as_str(), "Codeforces: requesting contest list");
        let body = fetch_text(self.client.get(&url).query(&[("gym", "false")])).await?;
        parse_contest_list(&body, &self.base_url)
    }
}

pub(crate) fn parse_contest_list(body: &str, base_url: &str) -> Result<Vec<Contest>, LoaderError> {
    let response: ApiResponse = serde_json::from_str(body)?;
    if response.status != "OK" {
        return Err(LoaderError::Backend(
            response.comment.unwrap_or_else(|| format!("status {}", response.status)),
        ));
    }

    let contests = response
        .result
        .unwrap_or_default()
        .into_iter()
        .filter_map(|c| {
            // not scheduled yet
            let start = c.start_time_seconds?;
            let start_time = DateTime::from_timestamp(start, 0)?;
            if c.duration_seconds < 0 {
                warn!(id = c.id, "Codeforces: negative duration, skipping");
                return None;
            }
            Some(
                Contest::new(
                    Platform::Codeforces,
                    c.id.to_string(),
                    c.name,
                    start_time,
                    Duration::seconds(c.duration_seconds),
                )
                .with_link(format!("{base_url}/contests/{}", c.id)),
            )
        })
        .collect();
    Ok(contests)
}
