// =============================================================================
// dmoj.rs - THE DON MILLS ONLINE JUDGE
// =============================================================================
//
//   GET https://dmoj.ca/api/v2/contests
//
// Every contest, RFC 3339 start and end times, no date filter. Unfiltered
// loader, wrapped in DateFilteredLoader at registration.
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
    data: Option<ApiData>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiData {
    objects: Vec<ApiContest>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct ApiContest {
    key: String,
    name: String,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
}

pub struct DmojLoader {
    client: reqwest::Client,
    base_url: String,
}

impl DmojLoader {
    pub fn new(base_url: &str, timeout: StdDuration) -> Result<Self, LoaderError> {
        Ok(Self {
            client: http_client(timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl UnfilteredContestsLoader for DmojLoader {
    fn loader_type(&self) -> LoaderType {
        LoaderType::DmojApi
    }

    async fn load_all_contests(&self, _platform: Platform) -> Result<Vec<Contest>, LoaderError> {
        let url = format!("{}/api/v2/contests", self.base_url);
        debug!(url = url.as_str(), "DMOJ: requesting contests");
        let body = fetch_text(self.client.get(&url)).await?;
        parse_contests(&body, &self.base_url)
    }
}

pub(crate) fn parse_contests(body: &str, base_url: &str) -> Result<Vec<Contest>, LoaderError> {
    let response: ApiResponse = serde_json::from_str(body)?;
    if let Some(error) = response.error {
        return Err(LoaderError::Backend(error.message));
    }
    let data = response
        .data
        .ok_or_else(|| LoaderError::Backend("response has neither data nor error".into()))?;

    let contests = data
        .objects
        .into_iter()
        .filter_map(|c| {
            let duration = c.end_time - c.start_time;
            if duration < chrono::Duration::zero() {
                warn!(key = c.key.as_str(), "DMOJ: contest ends before it starts, skipping");
                return None;
            }
            let link = format!("{base_url}/contest/{}", c.key);
            Some(Contest::new(Platform::Dmoj, c.key, c.name, c.start_time, duration).with_link(link))
        })
        .collect();
    Ok(contests)
}
