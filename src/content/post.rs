//! Post models

use chrono::{DateTime, FixedOffset};

use super::richtext::RichText;

/// A post as shown in the listing
#[derive(Debug, Clone, PartialEq)]
pub struct PostSummary {
    /// Document uid (URL slug)
    pub uid: String,

    /// First publication date, `None` when the CMS has none or it is malformed
    pub first_publication_date: Option<DateTime<FixedOffset>>,

    pub title: String,
    pub subtitle: String,
    pub author: String,
}

/// A fully fetched post
#[derive(Debug, Clone, PartialEq)]
pub struct PostDetail {
    /// Document uid (URL slug)
    pub uid: String,

    /// First publication date, `None` when the CMS has none or it is malformed
    pub first_publication_date: Option<DateTime<FixedOffset>>,

    pub title: String,
    pub subtitle: String,

    /// Banner image URL
    pub banner: Option<String>,

    pub author: String,

    /// Content sections in document order
    pub content: Vec<ContentBlock>,
}

/// One section of a post: a heading and a rich-text body
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentBlock {
    pub heading: String,
    pub body: RichText,
}

impl ContentBlock {
    pub fn new(heading: impl Into<String>, body: RichText) -> Self {
        Self {
            heading: heading.into(),
            body,
        }
    }
}

/// One page of query results plus the cursor to the next one
#[derive(Debug, Clone, PartialEq)]
pub struct PostPage<T> {
    pub results: Vec<T>,

    /// URL of the next page; `None` when this is the last one
    pub next_page: Option<String>,
}

impl<T> PostPage<T> {
    pub fn new(results: Vec<T>, next_page: Option<String>) -> Self {
        Self {
            results,
            next_page: next_page.filter(|n| !n.trim().is_empty()),
        }
    }
}
