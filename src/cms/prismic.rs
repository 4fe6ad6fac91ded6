//! Prismic REST API v2 client

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{RequestBuilder, Url};
use serde::de::DeserializeOwned;

use super::document::{ApiInfo, SearchResponse};
use super::{CmsError, ContentApi, Result};
use crate::config::CmsConfig;
use crate::content::{PostDetail, PostPage, PostSummary};

/// Largest page size the API accepts
const MAX_PAGE_SIZE: usize = 100;

/// Fields projected for the listing
const SUMMARY_FIELDS: [&str; 3] = ["title", "subtitle", "author"];

/// Client for a Prismic repository
///
/// Every search is pinned to the master ref, looked up from the API entry
/// point before each query.
#[derive(Clone)]
pub struct PrismicClient {
    http: reqwest::Client,
    endpoint: String,
    access_token: Option<String>,
    document_type: String,
    page_size: usize,
}

/// Build an `at` predicate
///
/// # Examples
/// ```ignore
/// predicate_at("document.type", "post") // -> [at(document.type, "post")]
/// ```
pub fn predicate_at(path: &str, value: &str) -> String {
    format!(
        r#"[at({}, "{}")]"#,
        path,
        value.replace('\\', "\\\\").replace('"', "\\\"")
    )
}

impl PrismicClient {
    /// Create a client from the `cms` section of the site config
    pub fn new(config: &CmsConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()?;

        Ok(Self {
            http,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            access_token: config.access_token.clone(),
            document_type: config.document_type.clone(),
            page_size: config.page_size.clamp(1, MAX_PAGE_SIZE),
        })
    }

    fn with_token(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.access_token {
            Some(token) => request.query(&[("access_token", token)]),
            None => request,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request.send().await?.error_for_status()?;
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Look up the master ref of the repository
    pub async fn master_ref(&self) -> Result<String> {
        let request = self.with_token(self.http.get(&self.endpoint));
        let info: ApiInfo = self.get_json(request).await?;
        info.master_ref()
            .map(str::to_string)
            .ok_or(CmsError::NoMasterRef)
    }

    /// Run a `documents/search` query
    pub async fn search(
        &self,
        predicates: &[String],
        page: u32,
        page_size: usize,
        fetch: &[String],
    ) -> Result<SearchResponse> {
        let master = self.master_ref().await?;
        let q = format!("[{}]", predicates.concat());

        tracing::debug!("Prismic search q={} page={} pageSize={}", q, page, page_size);

        let mut request = self
            .http
            .get(format!("{}/documents/search", self.endpoint))
            .query(&[
                ("ref", master),
                ("q", q),
                ("page", page.to_string()),
                ("pageSize", page_size.to_string()),
            ]);
        if !fetch.is_empty() {
            request = request.query(&[("fetch", fetch.join(","))]);
        }

        self.get_json(self.with_token(request)).await
    }

    fn type_predicate(&self) -> String {
        predicate_at("document.type", &self.document_type)
    }

    fn summary_fields(&self) -> Vec<String> {
        SUMMARY_FIELDS
            .iter()
            .map(|field| format!("{}.{}", self.document_type, field))
            .collect()
    }
}

#[async_trait]
impl ContentApi for PrismicClient {
    async fn first_page(&self) -> Result<PostPage<PostSummary>> {
        let response = self
            .search(&[self.type_predicate()], 1, self.page_size, &self.summary_fields())
            .await?;
        Ok(response.into_summaries())
    }

    async fn next_page(&self, cursor: &str) -> Result<PostPage<PostSummary>> {
        let url = Url::parse(cursor).map_err(|_| CmsError::InvalidCursor(cursor.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(CmsError::InvalidCursor(cursor.to_string()));
        }

        tracing::debug!("Following next_page {}", url);
        let response: SearchResponse = self.get_json(self.http.get(url)).await?;
        Ok(response.into_summaries())
    }

    async fn post(&self, uid: &str) -> Result<PostDetail> {
        let predicates = [
            self.type_predicate(),
            predicate_at(&format!("my.{}.uid", self.document_type), uid),
        ];
        let response = self.search(&predicates, 1, 1, &[]).await?;

        response
            .results
            .into_iter()
            .next()
            .and_then(|doc| doc.into_detail())
            .ok_or_else(|| CmsError::NotFound(uid.to_string()))
    }

    async fn post_uids(&self) -> Result<Vec<String>> {
        let response = self
            .search(
                &[self.type_predicate()],
                1,
                MAX_PAGE_SIZE,
                &[format!("{}.title", self.document_type)],
            )
            .await?;
        tracing::debug!("Enumerating post uids over {} result pages", response.total_pages);
        let first = response.into_summaries();

        let mut uids: Vec<String> = first.results.into_iter().map(|p| p.uid).collect();
        let mut cursor = first.next_page;

        while let Some(next) = cursor {
            let page = self.next_page(&next).await?;
            uids.extend(page.results.into_iter().map(|p| p.uid));
            cursor = page.next_page;
        }

        tracing::debug!("Enumerated {} post uids", uids.len());
        Ok(uids)
    }
}
