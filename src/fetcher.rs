use anyhow::{ anyhow, Context };
use reqwest::header::{ HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION };
use reqwest::Url;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use crate::cache::ResponseCache;
use crate::config::Credentials;
use crate::error::FetchError;
use crate::feed::FeedDocument;

const FINDER_SEGMENT: &str = "certificationfinder";
/// Unused positional filter slots between the keyword and the result limit.
const FILTER_PLACEHOLDERS: usize = 9;
const RESULT_LIMIT: &str = "20";

/// Builds the shared HTTP client.
pub fn build_client(timeout: Option<Duration>) -> Result<reqwest::Client, FetchError> {
    let mut builder = reqwest::Client
        ::builder()
        .brotli(true)
        .gzip(true)
        .use_rustls_tls();
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    Ok(builder.build()?)
}

/// The certification finder endpoint, bound to one user id and token.
#[derive(Debug, Clone)]
pub struct CertificationEndpoint {
    base_url: Url,
    user_id: String,
    headers: HeaderMap,
}

impl CertificationEndpoint {
    /// Fails on a misconfigured base URL or token; these are startup errors, not fetch failures.
    pub fn new(base_url: &str, credentials: &Credentials) -> anyhow::Result<Self> {
        let base_url = Url::parse(base_url).with_context(|| format!("invalid API base URL {}", base_url))?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("API base URL {} cannot take a path", base_url);
        }

        let mut authorization = HeaderValue::from_str(
            &format!("Bearer {}", credentials.api_key.expose())
        ).map_err(|_| anyhow!("{} is not a valid header value", crate::config::API_KEY_ENV))?;
        authorization.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, authorization);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        Ok(Self {
            base_url,
            user_id: credentials.user_id.clone(),
            headers,
        })
    }

    /// `{base}/certificationfinder/{user}/{keyword}/0/0/0/0/0/0/0/0/0/20`
    pub fn url(&self, keyword: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .push(FINDER_SEGMENT)
                .push(&self.user_id)
                .push(keyword)
                .extend(std::iter::repeat("0").take(FILTER_PLACEHOLDERS))
                .push(RESULT_LIMIT);
        }
        url
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }
}

/// Performs outbound reads, consulting the raw response cache first.
#[derive(Debug)]
pub struct Fetcher {
    client: reqwest::Client,
    cache: ResponseCache,
}

impl Fetcher {
    pub fn new(client: reqwest::Client, cache_ttl: Duration) -> Self {
        Self {
            client,
            cache: ResponseCache::new(cache_ttl),
        }
    }

    /// GETs `url` and returns the body of a 2xx response.
    pub async fn get(
        &self,
        url: &str,
        headers: Option<&HeaderMap>,
        params: Option<&[(&str, &str)]>
    ) -> Result<Arc<str>, FetchError> {
        let url = match params {
            Some(params) => Url::parse_with_params(url, params),
            None => Url::parse(url),
        }.map_err(|e| FetchError::Transport(format!("invalid URL {}: {}", url, e)))?;

        if let Some(body) = self.cache.get(url.as_str()) {
            tracing::trace!("cache hit for {}", url);
            return Ok(body);
        }

        tracing::debug!("GET {}", url);
        let mut request = self.client.get(url.clone());
        if let Some(headers) = headers {
            request = request.headers(headers.clone());
        }

        let body: Arc<str> = match request.send().await.and_then(|r| r.error_for_status()) {
            Ok(response) =>
                match response.text().await {
                    Ok(text) => Arc::from(text),
                    Err(e) => {
                        tracing::warn!("failed to read body from {}: {}", url, e);
                        return Err(e.into());
                    }
                }
            Err(e) => {
                tracing::warn!("request to {} failed: {}", url, e);
                return Err(e.into());
            }
        };

        self.cache.insert(url.to_string(), Arc::clone(&body));
        Ok(body)
    }

    pub async fn fetch_json(
        &self,
        url: &str,
        headers: Option<&HeaderMap>,
        params: Option<&[(&str, &str)]>
    ) -> Result<Value, FetchError> {
        let body = self.get(url, headers, params).await?;
        match serde_json::from_str::<Value>(&body) {
            Ok(value) => Ok(value),
            Err(e) => {
                tracing::warn!("response from {} is not JSON: {}", url, e);
                Err(e.into())
            }
        }
    }

    /// Searches the certification finder for `keyword`.
    pub async fn fetch_certifications(&self, endpoint: &CertificationEndpoint, keyword: &str) -> Result<Value, FetchError> {
        let url = endpoint.url(keyword);
        self.fetch_json(url.as_str(), Some(endpoint.headers()), None).await
    }

    /// Fetches a feed. Parse failures are reported inside the document, not as errors.
    pub async fn fetch_feed(&self, url: &str) -> Result<FeedDocument, FetchError> {
        let body = self.get(url, None, None).await?;
        let document = FeedDocument::parse(&body);
        if let FeedDocument::Malformed(diagnostic) = &document {
            tracing::warn!("feed {} could not be parsed: {}", url, diagnostic);
        }
        Ok(document)
    }
}
