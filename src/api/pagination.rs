use serde::{Deserialize, Serialize};
use url::Url;

/// Raw list query string. Values are parsed leniently: a malformed `limit`
/// disables pagination and a malformed `offset` reads as zero.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    pub limit: Option<String>,
    pub offset: Option<String>,
    pub search: Option<String>,
}

/// Largest offset the store can bind
const MAX_OFFSET: u64 = i64::MAX as u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: u64,
    pub offset: u64,
}

impl PageRequest {
    /// Pagination is requested only by a positive integer `limit`
    pub fn from_query(query: &ListQuery, max_limit: Option<u64>) -> Option<Self> {
        let limit = query
            .limit
            .as_deref()
            .and_then(|s| s.trim().parse::<u64>().ok())
            .filter(|&l| l > 0)?;
        let limit = max_limit.map_or(limit, |max| limit.min(max));

        let offset = query
            .offset
            .as_deref()
            .and_then(|s| s.trim().parse::<u64>().ok())
            .unwrap_or(0)
            .min(MAX_OFFSET);

        Some(Self { limit, offset })
    }
}

/// Per-operation list options handed to a resource service
#[derive(Debug, Clone, Default)]
pub struct ListParams {
    pub page: Option<PageRequest>,
    pub search: Option<String>,
}

/// What a service fetched: the whole ordered set, or one window of it
#[derive(Debug)]
pub enum Fetched<T> {
    All(Vec<T>),
    Window {
        page: PageRequest,
        count: u64,
        results: Vec<T>,
    },
}

#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

/// Response body of a list operation: bare array, or envelope when paginated
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Listing<T> {
    Plain(Vec<T>),
    Paginated(Page<T>),
}

impl<T> Fetched<T> {
    /// Shape into the response body, building next/previous links off the request URL
    pub fn shape(self, request_url: &Url) -> Listing<T> {
        match self {
            Fetched::All(items) => Listing::Plain(items),
            Fetched::Window { page, count, results } => Listing::Paginated(Page {
                count,
                next: next_link(request_url, page, count),
                previous: previous_link(request_url, page),
                results,
            }),
        }
    }
}

fn next_link(url: &Url, page: PageRequest, count: u64) -> Option<String> {
    let next_offset = page.offset.saturating_add(page.limit);
    if next_offset >= count {
        return None;
    }
    let mut url = replace_query_param(url, "limit", Some(page.limit));
    url = replace_query_param(&url, "offset", Some(next_offset));
    Some(url.to_string())
}

fn previous_link(url: &Url, page: PageRequest) -> Option<String> {
    if page.offset == 0 {
        return None;
    }
    let url = replace_query_param(url, "limit", Some(page.limit));
    let offset = page.offset.checked_sub(page.limit).filter(|&o| o > 0);
    Some(replace_query_param(&url, "offset", offset).to_string())
}

/// Set (or with `None`, drop) one query parameter, keeping the rest in order
fn replace_query_param(url: &Url, key: &str, value: Option<u64>) -> Url {
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != key)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    let mut out = url.clone();
    out.set_query(None);
    let mut pairs: Vec<(String, String)> = kept;
    if let Some(v) = value {
        pairs.push((key.to_string(), v.to_string()));
    }
    if !pairs.is_empty() {
        out.query_pairs_mut().extend_pairs(pairs);
    }
    out
}
