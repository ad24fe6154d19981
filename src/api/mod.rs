use std::time::Duration;

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use reqwest::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT};
use serde::Deserialize;

use crate::internal::models::{Idea, IdeaPage};
use crate::internal::query::ListQuery;

const IDEAS_PATH: &str = "/api/ideas";

/// Image variants requested with every page; fixed, not configurable.
const APPEND_FIELDS: [&str; 2] = ["small_image", "medium_image"];

/// Floor applied once per invocation before the request goes out, so
/// skeleton rows don't flash on near-instantaneous responses.
const MIN_FETCH_DELAY: Duration = Duration::from_millis(300);

// The upstream rejects requests that don't look like a browser's XHR.
static DEFAULT_HEADERS: Lazy<HeaderMap> = Lazy::new(|| {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(
        "X-Requested-With",
        HeaderValue::from_static("XMLHttpRequest"),
    );
    headers.insert(
        USER_AGENT,
        HeaderValue::from_static(
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
             (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36",
        ),
    );
    headers
});

/// Raw response envelope. Both halves are optional on the wire: a missing
/// `data` maps to an empty page and a missing `meta.total` to 0.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    data: Vec<Idea>,
    #[serde(default)]
    meta: Option<Meta>,
}

#[derive(Debug, Deserialize, Default)]
struct Meta {
    #[serde(default)]
    total: u64,
}

/// HTTP API service for fetching pages of ideas.
///
/// Translates the front end's query triple into the upstream's parameter
/// form (`page[number]`, `page[size]`, `sort`, `append[]`) and returns
/// `anyhow::Result` with contextualized errors. A non-2xx status fails with
/// a generic error carrying the status code; callers don't distinguish
/// further.
#[derive(Clone)]
pub struct IdeasService {
    client: Client,
    base_url: String,
    min_delay: Duration,
}

impl IdeasService {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .default_headers(DEFAULT_HEADERS.clone())
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            min_delay: MIN_FETCH_DELAY,
        })
    }

    /// Override the latency floor; tests set this to zero.
    pub fn with_min_delay(mut self, min_delay: Duration) -> Self {
        self.min_delay = min_delay;
        self
    }

    pub fn ideas_url(&self) -> String {
        format!("{}{}", self.base_url, IDEAS_PATH)
    }

    /// Fetch one page of ideas for the given query.
    pub async fn fetch_page(&self, query: &ListQuery) -> Result<IdeaPage> {
        tokio::time::sleep(self.min_delay).await;

        let url = self.ideas_url();
        let mut params: Vec<(&str, String)> = vec![
            ("page[number]", query.page.to_string()),
            ("page[size]", query.page_size.to_string()),
            ("sort", query.sort.as_query_str().to_string()),
        ];
        for field in APPEND_FIELDS {
            params.push(("append[]", field.to_string()));
        }

        let resp = self
            .client
            .get(&url)
            .query(&params)
            .send()
            .await
            .with_context(|| format!("failed to send GET request to {}", url))?;

        let status = resp.status();
        if !status.is_success() {
            anyhow::bail!("HTTP error! status: {}", status.as_u16());
        }

        let envelope: Envelope = resp
            .json()
            .await
            .with_context(|| format!("failed to parse JSON response from {}", url))?;

        Ok(IdeaPage {
            items: envelope.data,
            total: envelope.meta.unwrap_or_default().total,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::internal::query::SortOrder;
    use mockito::Matcher;

    fn service(base_url: &str) -> IdeasService {
        IdeasService::new(base_url, Duration::from_secs(5))
            .unwrap()
            .with_min_delay(Duration::ZERO)
    }

    fn query(page: u32, page_size: u32, sort: SortOrder) -> ListQuery {
        ListQuery {
            page,
            page_size,
            sort,
        }
    }

    #[test]
    fn test_ideas_url() {
        let svc = service("http://localhost:3001");
        assert_eq!(svc.ideas_url(), "http://localhost:3001/api/ideas");
    }

    #[tokio::test]
    async fn test_fetch_page_translates_parameters() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/ideas")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("page[number]".into(), "3".into()),
                Matcher::UrlEncoded("page[size]".into(), "20".into()),
                Matcher::UrlEncoded("sort".into(), "published_at".into()),
                // The repeated key only survives in the raw query string
                Matcher::Regex(
                    "append%5B%5D=small_image&append%5B%5D=medium_image".to_string(),
                ),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"data": [], "meta": {"total": 0}}"#)
            .create_async()
            .await;

        let svc = service(&server.url());
        let result = svc
            .fetch_page(&query(3, 20, SortOrder::OldestFirst))
            .await;

        mock.assert_async().await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_fetch_page_maps_envelope() {
        let mut server = mockito::Server::new_async().await;
        let body = r#"{
            "data": [
                {
                    "id": "101",
                    "title": "First idea",
                    "published_at": "2023-01-05 10:00:00",
                    "small_image": {"url": "https://cdn.example/101-s.jpg"},
                    "medium_image": {"url": "https://cdn.example/101-m.jpg"}
                },
                {
                    "id": "102",
                    "title": "Second idea",
                    "published_at": "2023-01-04 09:00:00"
                }
            ],
            "meta": {"total": 42}
        }"#;
        let mock = server
            .mock("GET", "/api/ideas")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await;

        let svc = service(&server.url());
        let page = svc
            .fetch_page(&query(1, 10, SortOrder::NewestFirst))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(page.total, 42);
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].id, "101");
        assert_eq!(
            page.items[0].image_url(),
            Some("https://cdn.example/101-s.jpg")
        );
        assert_eq!(page.items[1].image_url(), None);
    }

    #[tokio::test]
    async fn test_missing_data_and_meta_default() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/ideas")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("{}")
            .create_async()
            .await;

        let svc = service(&server.url());
        let page = svc
            .fetch_page(&query(1, 10, SortOrder::NewestFirst))
            .await
            .unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total, 0);
    }

    #[tokio::test]
    async fn test_http_error_carries_status_code() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/ideas")
            .match_query(Matcher::Any)
            .with_status(503)
            .create_async()
            .await;

        let svc = service(&server.url());
        let err = svc
            .fetch_page(&query(1, 10, SortOrder::NewestFirst))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "HTTP error! status: 503");
    }

    #[tokio::test]
    async fn test_network_error_is_contextualized() {
        let svc = service("http://localhost:1");
        let err = svc
            .fetch_page(&query(1, 10, SortOrder::NewestFirst))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("failed to send GET request"));
    }

    #[tokio::test]
    async fn test_latency_floor_applies_once_per_call() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/ideas")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"data": [], "meta": {"total": 0}}"#)
            .create_async()
            .await;

        let svc = IdeasService::new(server.url(), Duration::from_secs(5)).unwrap();
        let start = std::time::Instant::now();
        let _ = svc.fetch_page(&query(1, 10, SortOrder::NewestFirst)).await;
        assert!(start.elapsed() >= MIN_FETCH_DELAY);
    }
}
