// =============================================================================
// clist.rs - ONE CALL TO RULE THEM ALL
// =============================================================================
//
// clist.by aggregates practically every judge on the internet, which makes it
// the universal fallback and the one batched loader we have:
//
//   GET https://clist.by/api/v4/contest/
//       ?username=..&api_key=..
//       &resource__in=atcoder.jp,dmoj.ca,..
//       &start__lte=..&end__gte=..&duration__lte=..
//       &order_by=start&limit=..&offset=..
//
// Resources and the date window are filtered server-side. We still re-check
// every contest client-side because the API filters on its own notion of
// "end", and we would rather be sure.
//
// Results are paged. We walk `offset` until `meta.next` is null. A partial
// answer is an error, never a short Ok: a short Ok would make storage drop
// every contest that happened to sit on the missing pages.
//
// Every object carries a `resource` host. Hosts we track by name map to their
// platform; hosts listed in `additional_resources` are kept as
// Platform::Unknown with the host attached; everything else is dropped, as is
// anything for a platform nobody asked for.
//
// Times come back as naive UTC ("2024-06-01T12:00:00").
// =============================================================================

use std::collections::{BTreeSet, HashSet};
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::{Duration, NaiveDateTime};
use serde::Deserialize;
use tracing::{debug, warn};

use super::{fetch_text, http_client, ContestsLoaderMultiple};
use crate::constraints::DateConstraints;
use crate::error::LoaderError;
use crate::models::{Contest, LoaderType, Platform};

const PAGE_LIMIT: usize = 1000;
const MAX_PAGES: usize = 50;
const CLIST_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClistCredentials {
    pub username: String,
    pub api_key: String,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    meta: Option<ApiMeta>,
    objects: Vec<ApiContest>,
}

#[derive(Debug, Deserialize)]
struct ApiMeta {
    next: Option<String>,
    total_count: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct ApiContest {
    id: i64,
    resource: String,
    event: String,
    start: NaiveDateTime,
    duration: i64,
    href: Option<String>,
}

/// One decoded page.
#[derive(Debug)]
pub(crate) struct Page {
    pub contests: Vec<Contest>,
    /// Objects on the page before platform filtering.
    pub objects: usize,
    pub has_next: bool,
    pub total_count: Option<usize>,
}

pub struct ClistLoader {
    client: reqwest::Client,
    base_url: String,
    credentials: ClistCredentials,
    additional_resources: Vec<String>,
}

impl ClistLoader {
    pub fn new(
        base_url: &str,
        credentials: ClistCredentials,
        additional_resources: Vec<String>,
        timeout: StdDuration,
    ) -> Result<Self, LoaderError> {
        if credentials.username.trim().is_empty() || credentials.api_key.trim().is_empty() {
            return Err(LoaderError::MissingCredentials(LoaderType::ClistApi));
        }
        Ok(Self {
            client: http_client(timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
            additional_resources,
        })
    }

    /// Resource hosts to ask for: each requested platform's own host, plus the
    /// extra resources when `Platform::Unknown` is requested.
    fn resources_for(&self, platforms: &[Platform]) -> BTreeSet<String> {
        let mut resources: BTreeSet<String> =
            platforms.iter().filter_map(|p| p.host()).map(str::to_string).collect();
        if platforms.contains(&Platform::Unknown) {
            resources.extend(self.additional_resources.iter().map(|r| r.to_ascii_lowercase()));
        }
        resources
    }
}

#[async_trait]
impl ContestsLoaderMultiple for ClistLoader {
    fn loader_type(&self) -> LoaderType {
        LoaderType::ClistApi
    }

    async fn load_contests(
        &self,
        platforms: &[Platform],
        constraints: &DateConstraints,
    ) -> Result<Vec<Contest>, LoaderError> {
        let resources = self.resources_for(platforms);
        if resources.is_empty() {
            debug!(platforms = ?platforms, "CLIST: no resources to ask for");
            return Ok(Vec::new());
        }
        let resources = resources.into_iter().collect::<Vec<_>>().join(",");

        let url = format!("{}/api/v4/contest/", self.base_url);
        let mut contests = Vec::new();
        let mut fetched = 0usize;
        let mut total_count = None;

        for page_number in 0..MAX_PAGES {
            let query = [
                ("username", self.credentials.username.clone()),
                ("api_key", self.credentials.api_key.clone()),
                ("resource__in", resources.clone()),
                ("start__lte", constraints.max_start_time.format(CLIST_TIME_FORMAT).to_string()),
                ("end__gte", constraints.min_end_time.format(CLIST_TIME_FORMAT).to_string()),
                ("duration__lte", constraints.max_duration.num_seconds().to_string()),
                ("order_by", "start".to_string()),
                ("limit", PAGE_LIMIT.to_string()),
                ("offset", fetched.to_string()),
            ];
            debug!(url = url.as_str(), page = page_number, offset = fetched, "CLIST: requesting contests");

            let body = fetch_text(self.client.get(&url).query(&query)).await?;
            let page = parse_page(&body, platforms, &self.additional_resources)?;

            fetched += page.objects;
            total_count = page.total_count.or(total_count);
            contests.extend(page.contests);

            if !page.has_next {
                if let Some(total) = total_count.filter(|total| fetched < *total) {
                    return Err(LoaderError::Backend(format!(
                        "CLIST returned {fetched} of {total} contests"
                    )));
                }
                return Ok(contests.into_iter().filter(|c| constraints.check_contest(c)).collect());
            }
            if page.objects == 0 {
                return Err(LoaderError::Backend("CLIST announced a next page after an empty one".into()));
            }
        }

        Err(LoaderError::Backend(format!("CLIST result exceeds {MAX_PAGES} pages")))
    }
}

pub(crate) fn parse_page(
    body: &str,
    platforms: &[Platform],
    additional_resources: &[String],
) -> Result<Page, LoaderError> {
    let response: ApiResponse = serde_json::from_str(body)?;
    let wanted: HashSet<Platform> = platforms.iter().copied().collect();
    let objects = response.objects.len();
    let (has_next, total_count) = match response.meta {
        Some(meta) => (meta.next.is_some(), meta.total_count),
        None => (false, None),
    };

    let contests = response
        .objects
        .into_iter()
        .filter_map(|c| {
            let platform = match Platform::from_host(&c.resource) {
                Some(p) => p,
                None if additional_resources.iter().any(|r| r.eq_ignore_ascii_case(&c.resource)) => {
                    Platform::Unknown
                }
                None => return None,
            };
            if !wanted.contains(&platform) {
                return None;
            }
            if c.duration < 0 {
                warn!(id = c.id, resource = c.resource.as_str(), "CLIST: negative duration, skipping");
                return None;
            }

            let mut contest = Contest::new(
                platform,
                c.id.to_string(),
                c.event,
                c.start.and_utc(),
                Duration::seconds(c.duration),
            );
            if let Some(href) = c.href {
                contest = contest.with_link(href);
            }
            if platform == Platform::Unknown {
                contest = contest.with_host(c.resource);
            }
            Some(contest)
        })
        .collect();

    Ok(Page { contests, objects, has_next, total_count })
}
