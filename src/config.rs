use anyhow::{ anyhow, Context };
use serde::{ Deserialize, Serialize };
use std::fmt;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::curated::CuratedCatalog;

pub const CONFIG_PATH_ENV: &str = "TC2_HUB_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";
pub const API_KEY_ENV: &str = "COS_API_KEY";
pub const USER_ID_ENV: &str = "COS_USER_ID";

const DEFAULT_BASE_URL: &str = "https://api.careeronestop.org/v1";
const DEFAULT_LISTEN: &str = "127.0.0.1:8501";
const DEFAULT_CACHE_TTL_SECS: u64 = 300;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub log_level: Option<String>,
    pub listen: Option<String>,
    #[serde(default)]
    pub api: Api,
    pub cache_ttl_secs: Option<u64>,
    pub feed_entry_limit: Option<usize>,
    #[serde(default)]
    pub feeds: Vec<FeedSource>,
    /// YAML file replacing the built-in curated certification table.
    pub curated_certifications: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Api {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    pub timeout_secs: Option<u64>,
}

impl Default for Api {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: None,
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

/// One selectable feed. The URL is given inline or through an environment variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedSource {
    pub name: String,
    pub url: Option<String>,
    pub url_env: Option<String>,
    pub limit: Option<usize>,
}

/// A catalog entry with its URL resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedLocator {
    pub name: String,
    pub url: String,
    pub limit: Option<usize>,
}

/// Bearer token for the certification API. Never printed.
#[derive(Clone, PartialEq)]
pub struct ApiToken(String);

impl ApiToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiToken(***)")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Credentials {
    pub user_id: String,
    pub api_key: ApiToken,
}

impl Credentials {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self> where F: Fn(&str) -> Option<String> {
        let user_id = required(&lookup, USER_ID_ENV)?;
        let api_key = required(&lookup, API_KEY_ENV)?;
        Ok(Self {
            user_id,
            api_key: ApiToken::new(api_key),
        })
    }
}

fn required<F>(lookup: &F, key: &str) -> anyhow::Result<String> where F: Fn(&str) -> Option<String> {
    match lookup(key) {
        Some(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(anyhow!("{} is not set", key)),
    }
}

impl Config {
    /// Reads the file named by `TC2_HUB_CONFIG`, or `config.yaml`.
    pub fn load_default() -> anyhow::Result<Self> {
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load(Path::new(&path))
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let data = fs
            ::read_to_string(path)
            .with_context(|| format!("unable to read configuration from {}", path.display()))?;
        Self::from_yaml(&data).with_context(|| format!("invalid configuration in {}", path.display()))
    }

    pub fn from_yaml(data: &str) -> anyhow::Result<Self> {
        let config: Config = serde_yaml::from_str(data)?;
        Ok(config)
    }

    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or("INFO")
    }

    pub fn listen(&self) -> &str {
        self.listen.as_deref().unwrap_or(DEFAULT_LISTEN)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs.unwrap_or(DEFAULT_CACHE_TTL_SECS))
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.api.timeout_secs.map(Duration::from_secs)
    }

    pub fn curated_catalog(&self) -> anyhow::Result<CuratedCatalog> {
        match &self.curated_certifications {
            Some(path) => CuratedCatalog::load(Path::new(path)),
            None => CuratedCatalog::builtin(),
        }
    }

    /// Resolves every feed URL, in configuration order.
    ///
    /// A per-feed `limit` overrides `feed_entry_limit`.
    pub fn resolve_feeds<F>(&self, lookup: F) -> anyhow::Result<Vec<FeedLocator>>
        where F: Fn(&str) -> Option<String>
    {
        let mut locators = Vec::with_capacity(self.feeds.len());
        for feed in &self.feeds {
            if locators.iter().any(|l: &FeedLocator| l.name == feed.name) {
                return Err(anyhow!("feed '{}' is configured more than once", feed.name));
            }

            let url = match (&feed.url, &feed.url_env) {
                (Some(url), _) if !url.trim().is_empty() => url.trim().to_string(),
                (_, Some(var)) =>
                    required(&lookup, var).with_context(||
                        format!("feed '{}' has no URL", feed.name)
                    )?,
                _ => {
                    return Err(anyhow!("feed '{}' needs either url or url_env", feed.name));
                }
            };

            locators.push(FeedLocator {
                name: feed.name.clone(),
                url,
                limit: feed.limit.or(self.feed_entry_limit),
            });
        }
        Ok(locators)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const YAML: &str =
        r#"
log_level: DEBUG
listen: 0.0.0.0:9000
cache_ttl_secs: 0
feed_entry_limit: 5
feeds:
  - name: Computer Engineering Technology 1
    url_env: RSS_CET_1
  - name: Mechanical Engineering Technology 1
    url: https://example.org/met1.rss
    limit: 10
"#;

    fn lookup(key: &str) -> Option<String> {
        match key {
            "RSS_CET_1" => Some("https://example.org/cet1.rss".to_string()),
            "COS_USER_ID" => Some("user-123".to_string()),
            "COS_API_KEY" => Some("secret-token".to_string()),
            _ => None,
        }
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_yaml("feeds: []").unwrap();
        assert_eq!(config.log_level(), "INFO");
        assert_eq!(config.listen(), "127.0.0.1:8501");
        assert_eq!(config.api.base_url, "https://api.careeronestop.org/v1");
        assert_eq!(config.cache_ttl(), Duration::from_secs(300));
        assert_eq!(config.timeout(), None);
    }

    #[test]
    fn test_curated_catalog_source() {
        let config = Config::from_yaml("feeds: []").unwrap();
        assert_eq!(config.curated_catalog().unwrap().len(), 2);

        let config = Config::from_yaml("curated_certifications: /nonexistent/curated.yaml").unwrap();
        let err = config.curated_catalog().unwrap_err();
        assert!(err.to_string().contains("/nonexistent/curated.yaml"));
    }

    #[test]
    fn test_resolve_feeds() {
        let config = Config::from_yaml(YAML).unwrap();
        assert_eq!(config.log_level(), "DEBUG");
        assert_eq!(config.cache_ttl(), Duration::ZERO);

        let feeds = config.resolve_feeds(lookup).unwrap();
        assert_eq!(feeds.len(), 2);
        assert_eq!(feeds[0].url, "https://example.org/cet1.rss");
        assert_eq!(feeds[0].limit, Some(5));
        assert_eq!(feeds[1].name, "Mechanical Engineering Technology 1");
        assert_eq!(feeds[1].limit, Some(10));
    }

    #[test]
    fn test_unresolvable_feed_is_an_error() {
        let config = Config::from_yaml("feeds:\n  - name: CET 2\n    url_env: RSS_CET_2\n").unwrap();
        let err = config.resolve_feeds(lookup).unwrap_err();
        assert!(format!("{:#}", err).contains("RSS_CET_2"));

        let config = Config::from_yaml("feeds:\n  - name: Orphan\n").unwrap();
        assert!(config.resolve_feeds(lookup).is_err());
    }

    #[test]
    fn test_duplicate_feed_names_rejected() {
        let yaml = "feeds:\n  - name: A\n    url: https://a\n  - name: A\n    url: https://b\n";
        let config = Config::from_yaml(yaml).unwrap();
        assert!(config.resolve_feeds(lookup).is_err());
    }

    #[test]
    fn test_credentials_are_redacted() {
        let credentials = Credentials::from_lookup(lookup).unwrap();
        assert_eq!(credentials.user_id, "user-123");
        assert_eq!(credentials.api_key.expose(), "secret-token");
        assert!(!format!("{:?}", credentials).contains("secret-token"));
    }

    #[test]
    fn test_missing_credentials() {
        let err = Credentials::from_lookup(|_| None).unwrap_err();
        assert!(err.to_string().contains(USER_ID_ENV));
    }
}
