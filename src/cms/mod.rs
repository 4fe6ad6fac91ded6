//! Headless CMS access
//!
//! [`ContentApi`] is the seam between the views and the content source. The
//! production implementation is [`PrismicClient`]; tests plug in their own.

pub mod document;
mod prismic;

use async_trait::async_trait;

use crate::content::{PostDetail, PostPage, PostSummary};

pub use prismic::{predicate_at, PrismicClient};

/// Errors raised while talking to the CMS
#[derive(Debug, thiserror::Error)]
pub enum CmsError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("malformed CMS response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("the CMS did not advertise a master ref")]
    NoMasterRef,

    #[error("document not found: {0}")]
    NotFound(String),

    #[error("invalid pagination cursor: {0}")]
    InvalidCursor(String),
}

impl CmsError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, CmsError::NotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, CmsError>;

/// Read-only queries the blog needs from the CMS
#[async_trait]
pub trait ContentApi: Send + Sync {
    /// First page of post summaries, projected to title, subtitle and author
    async fn first_page(&self) -> Result<PostPage<PostSummary>>;

    /// Follow an opaque `next_page` cursor
    async fn next_page(&self, cursor: &str) -> Result<PostPage<PostSummary>>;

    /// Fetch a complete post by uid
    async fn post(&self, uid: &str) -> Result<PostDetail>;

    /// Every post uid currently published, in API order
    async fn post_uids(&self) -> Result<Vec<String>>;
}
