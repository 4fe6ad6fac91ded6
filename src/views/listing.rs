//! Listing view: paginated post summaries with "load more"

use anyhow::Result;

use crate::cms::{self, CmsError, ContentApi};
use crate::config::SiteConfig;
use crate::content::{PostPage, PostSummary};
use crate::helpers::{date_xml, format_publication_date, listing_url, post_url};
use crate::templates::{ListingData, PostCardData, TemplateRenderer};

/// Why a "load more" did not happen
#[derive(Debug, thiserror::Error)]
pub enum LoadMoreError {
    #[error("there are no further pages to load")]
    Exhausted,

    #[error(transparent)]
    Cms(#[from] CmsError),
}

/// State of one listing view: the posts shown so far and the cursor to the next page
///
/// Pages are appended in fetch order without de-duplication; if the CMS
/// returns an item twice it is shown twice.
#[derive(Debug, Clone)]
pub struct ListingState {
    posts: Vec<PostSummary>,
    next_page: Option<String>,
    pages_loaded: usize,
    error: Option<String>,
}

impl ListingState {
    /// Start from an already fetched first page
    pub fn new(first: PostPage<PostSummary>) -> Self {
        Self {
            posts: first.results,
            next_page: first.next_page,
            pages_loaded: 1,
            error: None,
        }
    }

    /// Fetch the first page and start from it
    pub async fn load(api: &dyn ContentApi) -> cms::Result<Self> {
        Ok(Self::new(api.first_page().await?))
    }

    pub fn posts(&self) -> &[PostSummary] {
        &self.posts
    }

    /// Cursor of the next page, if any
    pub fn next_page(&self) -> Option<&str> {
        self.next_page.as_deref()
    }

    /// Number of pages fetched successfully, including the first
    pub fn pages_loaded(&self) -> usize {
        self.pages_loaded
    }

    pub fn can_load_more(&self) -> bool {
        self.next_page.is_some()
    }

    /// Message of the last failed "load more", cleared by the next success
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Fetch the next page and append its results
    ///
    /// Returns the number of posts appended. On failure the posts and the
    /// cursor are left as they were and the error is remembered for display.
    pub async fn load_more(&mut self, api: &dyn ContentApi) -> Result<usize, LoadMoreError> {
        let cursor = self.next_page.as_deref().ok_or(LoadMoreError::Exhausted)?;

        match api.next_page(cursor).await {
            Ok(page) => {
                let appended = page.results.len();
                self.posts.extend(page.results);
                self.next_page = page.next_page;
                self.pages_loaded += 1;
                self.error = None;
                tracing::debug!(
                    "Loaded page {} ({} posts, more: {})",
                    self.pages_loaded,
                    appended,
                    self.next_page.is_some()
                );
                Ok(appended)
            }
            Err(e) => {
                tracing::warn!("Loading more posts failed: {}", e);
                self.error = Some(e.to_string());
                Err(e.into())
            }
        }
    }

    /// Keep loading until `pages` pages are shown, the cursor runs out or a fetch fails
    pub async fn load_until(&mut self, api: &dyn ContentApi, pages: usize) {
        while self.pages_loaded < pages && self.can_load_more() {
            if self.load_more(api).await.is_err() {
                break;
            }
        }
    }

    /// Template data for this state
    pub fn to_data(&self, config: &SiteConfig) -> ListingData {
        let posts = self
            .posts
            .iter()
            .map(|post| PostCardData {
                uid: post.uid.clone(),
                href: post_url(config, &post.uid),
                title: post.title.clone(),
                subtitle: post.subtitle.clone(),
                author: post.author.clone(),
                date: format_publication_date(
                    post.first_publication_date.as_ref(),
                    &config.date_format,
                    &config.language,
                ),
                datetime: post.first_publication_date.as_ref().map(date_xml),
            })
            .collect();

        let next = self.pages_loaded + 1;
        let more_allowed = self.can_load_more() && self.pages_loaded < config.max_pages;

        ListingData {
            posts,
            load_more_href: more_allowed.then(|| listing_url(config, next)),
            load_more_label: config.labels.load_more.clone(),
            error: self
                .error
                .as_ref()
                .map(|_| config.labels.load_more_failed.clone()),
            retry_href: (self.error.is_some() && more_allowed).then(|| listing_url(config, next)),
            retry_label: config.labels.retry.clone(),
        }
    }

    /// Render the home page
    pub fn render(&self, renderer: &TemplateRenderer, config: &SiteConfig) -> Result<String> {
        let mut context = renderer.base_context(config, &format!("Home | {}", config.title));
        context.insert("listing", &self.to_data(config));
        renderer.render("index.html", &context)
    }
}
