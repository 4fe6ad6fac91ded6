//! Site configuration (_config.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Environment variable overriding `cms.endpoint`
pub const ENDPOINT_ENV: &str = "PRISMIC_API_ENDPOINT";

/// Environment variable overriding `cms.access_token`
pub const ACCESS_TOKEN_ENV: &str = "PRISMIC_ACCESS_TOKEN";

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub language: String,
    pub logo: String,

    // URL
    pub root: String,

    // Directory
    pub public_dir: String,

    // Date format (strftime, localized month names)
    pub date_format: String,

    // Listing
    pub max_pages: usize,

    // Detail pages are re-fetched once they are older than this
    pub revalidate_secs: u64,

    // Unknown or failed identifiers are retried once they are older than this
    pub miss_ttl_secs: u64,

    #[serde(default)]
    pub labels: Labels,

    #[serde(default)]
    pub cms: CmsConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "SpaceTraveling".to_string(),
            language: "en_US".to_string(),
            logo: "/spacetraveling.svg".to_string(),

            root: "/".to_string(),

            public_dir: "public".to_string(),

            date_format: "%d %b %Y".to_string(),

            max_pages: 25,

            revalidate_secs: 60 * 60 * 24,
            miss_ttl_secs: 10,

            labels: Labels::default(),
            cms: CmsConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Apply `PRISMIC_API_ENDPOINT` / `PRISMIC_ACCESS_TOKEN` overrides
    pub fn apply_env(&mut self) {
        self.apply_overrides(
            std::env::var(ENDPOINT_ENV).ok(),
            std::env::var(ACCESS_TOKEN_ENV).ok(),
        );
    }

    fn apply_overrides(&mut self, endpoint: Option<String>, access_token: Option<String>) {
        if let Some(endpoint) = endpoint.filter(|e| !e.trim().is_empty()) {
            tracing::debug!("CMS endpoint overridden from environment");
            self.cms.endpoint = endpoint;
        }
        if let Some(token) = access_token.filter(|t| !t.trim().is_empty()) {
            self.cms.access_token = Some(token);
        }
    }

    /// How long a rendered detail page stays fresh
    pub fn revalidate_after(&self) -> Duration {
        Duration::from_secs(self.revalidate_secs)
    }

    /// How long a not-found or failed lookup is remembered
    pub fn miss_ttl(&self) -> Duration {
        Duration::from_secs(self.miss_ttl_secs)
    }
}

/// Headless CMS connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CmsConfig {
    /// Prismic API v2 entry point, e.g. `https://repo.cdn.prismic.io/api/v2`
    pub endpoint: String,
    pub access_token: Option<String>,
    pub document_type: String,
    pub page_size: usize,
    pub timeout_secs: u64,
}

impl Default for CmsConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://spacetraveling.cdn.prismic.io/api/v2".to_string(),
            access_token: None,
            document_type: "post".to_string(),
            page_size: 4,
            timeout_secs: 10,
        }
    }
}

/// User-visible strings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Labels {
    pub load_more: String,
    pub loading: String,
    pub load_more_failed: String,
    pub retry: String,
    pub not_found: String,
    pub server_error: String,
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            load_more: "Load more posts".to_string(),
            loading: "Loading...".to_string(),
            load_more_failed: "Could not load more posts.".to_string(),
            retry: "Try again".to_string(),
            not_found: "Post not found".to_string(),
            server_error: "Something went wrong while talking to the CMS".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SiteConfig::default();
        assert_eq!(config.title, "SpaceTraveling");
        assert_eq!(config.cms.page_size, 4);
        assert_eq!(config.cms.document_type, "post");
        assert_eq!(config.revalidate_after(), Duration::from_secs(86_400));
        assert_eq!(config.miss_ttl(), Duration::from_secs(10));
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
title: Space Blog
language: pt_BR
labels:
  load_more: Carregar mais posts
cms:
  endpoint: https://example.cdn.prismic.io/api/v2
  page_size: 10
"#;
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.title, "Space Blog");
        assert_eq!(config.language, "pt_BR");
        assert_eq!(config.labels.load_more, "Carregar mais posts");
        assert_eq!(config.labels.loading, "Loading...");
        assert_eq!(config.cms.endpoint, "https://example.cdn.prismic.io/api/v2");
        assert_eq!(config.cms.page_size, 10);
        assert_eq!(config.cms.document_type, "post");
    }

    #[test]
    fn test_env_overrides() {
        let mut config = SiteConfig::default();
        config.apply_overrides(Some("http://localhost:9000/api/v2".into()), Some(" ".into()));
        assert_eq!(config.cms.endpoint, "http://localhost:9000/api/v2");
        assert_eq!(config.cms.access_token, None);

        config.apply_overrides(None, Some("secret".into()));
        assert_eq!(config.cms.access_token.as_deref(), Some("secret"));
    }
}
