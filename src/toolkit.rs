use serde::Serialize;

use crate::certification::{ normalize_certifications, CertificationRecord };
use crate::config::FeedLocator;
use crate::curated::CuratedCatalog;
use crate::feed::{ normalize_feed, FeedEntry };
use crate::fetcher::{ CertificationEndpoint, Fetcher };
use crate::outcome::ListOutcome;

/// Result of a certification search request.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// The keyword was blank; nothing was fetched.
    KeywordMissing,
    Outcome(ListOutcome<CertificationRecord>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedPage {
    pub name: String,
    pub title: String,
    pub outcome: ListOutcome<FeedEntry>,
}

/// Both query flows, wired to one fetcher and one feed catalog.
#[derive(Debug)]
pub struct Toolkit {
    fetcher: Fetcher,
    endpoint: CertificationEndpoint,
    feeds: Vec<FeedLocator>,
    curated: CuratedCatalog,
}

impl Toolkit {
    pub fn new(fetcher: Fetcher, endpoint: CertificationEndpoint, feeds: Vec<FeedLocator>) -> Self {
        Self {
            fetcher,
            endpoint,
            feeds,
            curated: CuratedCatalog::default(),
        }
    }

    /// Search results matching an entry in `curated` carry its details.
    pub fn with_curated(mut self, curated: CuratedCatalog) -> Self {
        self.curated = curated;
        self
    }

    /// Selectable feed names, in configuration order.
    pub fn catalog(&self) -> Vec<&str> {
        self.feeds
            .iter()
            .map(|feed| feed.name.as_str())
            .collect()
    }

    pub async fn search_certifications(&self, keyword: &str) -> SearchOutcome {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return SearchOutcome::KeywordMissing;
        }

        let mut outcome = match self.fetcher.fetch_certifications(&self.endpoint, keyword).await {
            Ok(payload) => normalize_certifications(Some(&payload)),
            Err(e) => {
                tracing::error!("certification search for '{}' failed during {}: {}", keyword, e.stage(), e);
                e.into()
            }
        };

        match &mut outcome {
            ListOutcome::Records(records) => {
                self.curated.enrich(records);
                tracing::info!("certification search for '{}' returned {} records", keyword, records.len());
            }
            ListOutcome::MalformedResponse(reason) => {
                tracing::error!("certification search for '{}': {}", keyword, reason);
            }
            _ => {}
        }
        SearchOutcome::Outcome(outcome)
    }

    /// Fetches and normalizes the named feed. `None` if the name is not in the catalog.
    pub async fn feed_page(&self, name: &str) -> Option<FeedPage> {
        let locator = self.feeds.iter().find(|feed| feed.name == name)?;

        let page = match self.fetcher.fetch_feed(&locator.url).await {
            Ok(document) =>
                FeedPage {
                    name: locator.name.clone(),
                    title: document.title().to_string(),
                    outcome: normalize_feed(&document, locator.limit),
                },
            Err(e) => {
                tracing::error!("feed '{}' failed during {}: {}", locator.name, e.stage(), e);
                FeedPage {
                    name: locator.name.clone(),
                    title: locator.name.clone(),
                    outcome: e.into(),
                }
            }
        };
        Some(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ ApiToken, Credentials };
    use std::time::Duration;
    use wiremock::matchers::{ method, path };
    use wiremock::{ Mock, MockServer, ResponseTemplate };

    fn toolkit(server: &MockServer, limit: Option<usize>) -> Toolkit {
        let credentials = Credentials {
            user_id: "user-123".to_string(),
            api_key: ApiToken::new("secret-token"),
        };
        let endpoint = CertificationEndpoint::new(&server.uri(), &credentials).unwrap();
        let feeds = vec![
            FeedLocator {
                name: "Computer Engineering Technology 1".to_string(),
                url: format!("{}/cet1.rss", server.uri()),
                limit,
            },
            FeedLocator {
                name: "Mechanical Engineering Technology 1".to_string(),
                url: format!("{}/met1.rss", server.uri()),
                limit: None,
            }
        ];
        Toolkit::new(Fetcher::new(reqwest::Client::new(), Duration::ZERO), endpoint, feeds)
    }

    #[tokio::test]
    async fn test_blank_keyword_skips_fetch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server).await;

        let toolkit = toolkit(&server, None);
        assert_eq!(toolkit.search_certifications("   ").await, SearchOutcome::KeywordMissing);
    }

    #[tokio::test]
    async fn test_missing_cert_list_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "Message": "none" })))
            .mount(&server).await;

        match toolkit(&server, None).search_certifications("welding").await {
            SearchOutcome::Outcome(ListOutcome::MalformedResponse(_)) => {}
            other => panic!("expected malformed response, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_transport_failure_becomes_fetch_failed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server).await;

        match toolkit(&server, None).search_certifications("welding").await {
            SearchOutcome::Outcome(ListOutcome::FetchFailed(reason)) => {
                assert!(reason.contains("401"));
                assert!(!reason.contains("secret-token"));
            }
            other => panic!("expected fetch failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_records_carry_curated_details() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(
                    serde_json::json!({ "CertList": [{ "Name": "CompTIA A+ Certification" }, { "Name": "Certified Welder" }] })
                )
            )
            .mount(&server).await;

        let toolkit = toolkit(&server, None).with_curated(CuratedCatalog::builtin().unwrap());
        let records = match toolkit.search_certifications("technician").await {
            SearchOutcome::Outcome(ListOutcome::Records(records)) => records,
            other => panic!("expected records, got {:?}", other),
        };
        assert_eq!(
            records[0].curated.as_ref().unwrap().certifying_organization,
            "Computing Technology Industry Association (CompTIA)"
        );
        assert!(records[1].curated.is_none());
    }

    #[tokio::test]
    async fn test_feed_page_applies_limit() {
        let server = MockServer::start().await;
        let body =
            "<rss><channel><title>CET Jobs</title>\
            <item><title>One</title></item><item><title>Two</title></item><item><title>Three</title></item>\
            </channel></rss>";
        Mock::given(method("GET"))
            .and(path("/cet1.rss"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&server).await;

        let toolkit = toolkit(&server, Some(2));
        assert_eq!(toolkit.catalog()[0], "Computer Engineering Technology 1");

        let page = toolkit.feed_page("Computer Engineering Technology 1").await.unwrap();
        assert_eq!(page.title, "CET Jobs");
        let titles: Vec<String> = page.outcome
            .records()
            .unwrap()
            .iter()
            .map(|e| e.title.clone())
            .collect();
        assert_eq!(titles, vec!["One", "Two"]);
    }

    #[tokio::test]
    async fn test_feed_page_failures() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/met1.rss"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server).await;

        let toolkit = toolkit(&server, None);
        assert!(toolkit.feed_page("Unknown Major").await.is_none());

        let page = toolkit.feed_page("Mechanical Engineering Technology 1").await.unwrap();
        assert_eq!(page.title, "Mechanical Engineering Technology 1");
        assert!(matches!(page.outcome, ListOutcome::FetchFailed(_)));
    }
}
