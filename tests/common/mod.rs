#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::Value;

use spacetraveling::cms::{self, CmsError, ContentApi};
use spacetraveling::content::richtext::RichTextBlock;
use spacetraveling::content::{ContentBlock, PostDetail, PostPage, PostSummary};
use spacetraveling::helpers::parse_publication_date;

/// In-memory CMS paging through a fixed list of posts
pub struct MemoryCms {
    posts: Vec<PostDetail>,
    /// Resolvable by uid but not listed, like a post published after startup
    unlisted: Vec<PostDetail>,
    page_size: usize,
    broken_pages: Vec<usize>,
    broken_posts: Vec<String>,
    post_calls: AtomicUsize,
}

impl MemoryCms {
    pub fn with_posts(count: usize) -> Self {
        Self {
            posts: (1..=count).map(|n| post(&format!("post-{n}"), &format!("Post {n}"))).collect(),
            unlisted: Vec::new(),
            page_size: 4,
            broken_pages: Vec::new(),
            broken_posts: Vec::new(),
            post_calls: AtomicUsize::new(0),
        }
    }

    pub fn unlisted(mut self, post: PostDetail) -> Self {
        self.unlisted.push(post);
        self
    }

    /// Make fetching page `n` fail
    pub fn broken_page(mut self, n: usize) -> Self {
        self.broken_pages.push(n);
        self
    }

    /// Make fetching post `uid` fail
    pub fn broken_post(mut self, uid: &str) -> Self {
        self.broken_posts.push(uid.to_string());
        self
    }

    /// Number of `post` lookups so far
    pub fn post_calls(&self) -> usize {
        self.post_calls.load(Ordering::SeqCst)
    }

    fn page(&self, n: usize) -> cms::Result<PostPage<PostSummary>> {
        if self.broken_pages.contains(&n) {
            return Err(decode_error());
        }

        let start = (n - 1) * self.page_size;
        let end = (start + self.page_size).min(self.posts.len());
        let results = self.posts[start.min(end)..end]
            .iter()
            .map(summary)
            .collect();
        let next = (end < self.posts.len()).then(|| format!("memory://posts?page={}", n + 1));

        Ok(PostPage::new(results, next))
    }
}

#[async_trait]
impl ContentApi for MemoryCms {
    async fn first_page(&self) -> cms::Result<PostPage<PostSummary>> {
        self.page(1)
    }

    async fn next_page(&self, cursor: &str) -> cms::Result<PostPage<PostSummary>> {
        let n = cursor
            .strip_prefix("memory://posts?page=")
            .and_then(|n| n.parse().ok())
            .ok_or_else(|| CmsError::InvalidCursor(cursor.to_string()))?;
        self.page(n)
    }

    async fn post(&self, uid: &str) -> cms::Result<PostDetail> {
        self.post_calls.fetch_add(1, Ordering::SeqCst);
        if self.broken_posts.iter().any(|b| b == uid) {
            return Err(decode_error());
        }

        self.posts
            .iter()
            .chain(&self.unlisted)
            .find(|p| p.uid == uid)
            .cloned()
            .ok_or_else(|| CmsError::NotFound(uid.to_string()))
    }

    async fn post_uids(&self) -> cms::Result<Vec<String>> {
        Ok(self.posts.iter().map(|p| p.uid.clone()).collect())
    }
}

fn decode_error() -> CmsError {
    CmsError::Decode(serde_json::from_str::<Value>("{").unwrap_err())
}

pub fn post(uid: &str, title: &str) -> PostDetail {
    PostDetail {
        uid: uid.to_string(),
        first_publication_date: parse_publication_date("2021-03-15T19:25:28+0000"),
        title: title.to_string(),
        subtitle: format!("About {title}"),
        banner: Some("https://images.prismic.io/spacetraveling/banner.png".to_string()),
        author: "Danilo Vieira".to_string(),
        content: vec![ContentBlock::new(
            "Intro",
            vec![RichTextBlock::paragraph("word ".repeat(199))],
        )],
    }
}

pub fn summary(post: &PostDetail) -> PostSummary {
    PostSummary {
        uid: post.uid.clone(),
        first_publication_date: post.first_publication_date,
        title: post.title.clone(),
        subtitle: post.subtitle.clone(),
        author: post.author.clone(),
    }
}
