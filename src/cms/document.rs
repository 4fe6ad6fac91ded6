//! Raw Prismic documents and their normalization into post models
//!
//! Document `data` is free-form JSON whose shape depends on the custom type
//! configured in the CMS. Missing or malformed fields fall back to defaults, so the views
//! only ever see typed, fully populated structures.

use serde::Deserialize;
use serde_json::Value;

use crate::content::{richtext, ContentBlock, PostDetail, PostPage, PostSummary, RichText};
use crate::helpers::parse_publication_date;

/// `GET {endpoint}` response
#[derive(Debug, Deserialize)]
pub struct ApiInfo {
    #[serde(default)]
    pub refs: Vec<ApiRef>,
}

#[derive(Debug, Deserialize)]
pub struct ApiRef {
    #[serde(rename = "ref")]
    pub reference: String,
    #[serde(rename = "isMasterRef", default)]
    pub is_master_ref: bool,
}

impl ApiInfo {
    pub fn master_ref(&self) -> Option<&str> {
        self.refs
            .iter()
            .find(|r| r.is_master_ref)
            .map(|r| r.reference.as_str())
    }
}

/// Pagination envelope of `documents/search`
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub next_page: Option<String>,
    #[serde(default)]
    pub results: Vec<RawDocument>,
}

/// A document as returned by the API, before normalization
#[derive(Debug, Clone, Deserialize)]
pub struct RawDocument {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub uid: Option<String>,
    #[serde(default)]
    pub first_publication_date: Option<String>,
    #[serde(default)]
    pub data: Value,
}

impl SearchResponse {
    /// Normalize into listing summaries; documents without a uid are dropped
    pub fn into_summaries(self) -> PostPage<PostSummary> {
        let results = self
            .results
            .into_iter()
            .filter_map(RawDocument::into_summary)
            .collect();
        PostPage::new(results, self.next_page)
    }
}

impl RawDocument {
    fn uid_or_warn(&self) -> Option<String> {
        match self.uid.as_deref().map(str::trim) {
            Some(uid) if !uid.is_empty() => Some(uid.to_string()),
            _ => {
                tracing::warn!("Skipping document {} without uid", self.id);
                None
            }
        }
    }

    fn publication_date(&self) -> Option<chrono::DateTime<chrono::FixedOffset>> {
        let raw = self.first_publication_date.as_deref()?;
        let parsed = parse_publication_date(raw);
        if parsed.is_none() {
            tracing::warn!("Unparseable publication date {:?} on {}", raw, self.id);
        }
        parsed
    }

    pub fn into_summary(self) -> Option<PostSummary> {
        let uid = self.uid_or_warn()?;
        Some(PostSummary {
            first_publication_date: self.publication_date(),
            title: text_field(&self.data, "title"),
            subtitle: text_field(&self.data, "subtitle"),
            author: text_field(&self.data, "author"),
            uid,
        })
    }

    pub fn into_detail(self) -> Option<PostDetail> {
        let uid = self.uid_or_warn()?;
        let content = match self.data.get("content") {
            Some(Value::Array(items)) => items.iter().map(|item| content_block(item, &uid)).collect(),
            _ => Vec::new(),
        };

        Some(PostDetail {
            first_publication_date: self.publication_date(),
            title: text_field(&self.data, "title"),
            subtitle: text_field(&self.data, "subtitle"),
            banner: self
                .data
                .get("banner")
                .and_then(|b| b.get("url"))
                .and_then(Value::as_str)
                .filter(|u| !u.is_empty())
                .map(str::to_string),
            author: text_field(&self.data, "author"),
            content,
            uid,
        })
    }
}

/// Read a text field that may be a key-text string or a rich-text array
fn text_field(data: &Value, key: &str) -> String {
    match data.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(value @ Value::Array(_)) => rich_text(value).map(|rt| richtext::as_text(&rt)).unwrap_or_default(),
        _ => String::new(),
    }
}

fn rich_text(value: &Value) -> Option<RichText> {
    serde_json::from_value(value.clone()).ok()
}

fn content_block(item: &Value, uid: &str) -> ContentBlock {
    let body = match item.get("body") {
        Some(value) => rich_text(value).unwrap_or_else(|| {
            tracing::warn!("Malformed rich text body in {}", uid);
            RichText::new()
        }),
        None => RichText::new(),
    };

    ContentBlock {
        heading: text_field(item, "heading"),
        body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document(value: Value) -> RawDocument {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_master_ref() {
        let info: ApiInfo = serde_json::from_value(json!({
            "refs": [
                {"id": "preview", "ref": "abc", "label": "Preview", "isMasterRef": false},
                {"id": "master", "ref": "YGx1", "label": "Master", "isMasterRef": true}
            ],
            "types": {"post": "Post"}
        }))
        .unwrap();
        assert_eq!(info.master_ref(), Some("YGx1"));
    }

    #[test]
    fn test_summary_normalization() {
        let doc = document(json!({
            "id": "YGx1",
            "uid": "como-utilizar-hooks",
            "type": "post",
            "first_publication_date": "2021-03-15T19:25:28+0000",
            "data": {"title": "Como utilizar Hooks", "subtitle": "Pensando em sincronização", "author": "Joseph Oliveira"}
        }));

        let summary = doc.into_summary().unwrap();
        assert_eq!(summary.uid, "como-utilizar-hooks");
        assert_eq!(summary.title, "Como utilizar Hooks");
        assert_eq!(summary.author, "Joseph Oliveira");
        assert!(summary.first_publication_date.is_some());
    }

    #[test]
    fn test_partial_documents_degrade() {
        let doc = document(json!({
            "id": "1",
            "uid": "x",
            "first_publication_date": null,
            "data": {"title": [{"type": "heading1", "text": "Rich title", "spans": []}], "author": 42}
        }));

        let summary = doc.into_summary().unwrap();
        assert_eq!(summary.title, "Rich title");
        assert_eq!(summary.subtitle, "");
        assert_eq!(summary.author, "");
        assert_eq!(summary.first_publication_date, None);

        let bad_date = document(json!({"id": "2", "uid": "y", "first_publication_date": "soon", "data": {}}));
        assert_eq!(bad_date.into_summary().unwrap().first_publication_date, None);
    }

    #[test]
    fn test_documents_without_uid_are_dropped() {
        let response: SearchResponse = serde_json::from_value(json!({
            "page": 1,
            "next_page": null,
            "results": [
                {"id": "1", "uid": null, "data": {}},
                {"id": "2", "uid": "kept", "data": {}}
            ]
        }))
        .unwrap();

        let page = response.into_summaries();
        assert_eq!(page.results.len(), 1);
        assert_eq!(page.results[0].uid, "kept");
        assert_eq!(page.next_page, None);
    }

    #[test]
    fn test_detail_normalization() {
        let doc = document(json!({
            "id": "1",
            "uid": "criando-um-app",
            "type": "post",
            "first_publication_date": "2021-03-25T19:27:35+0000",
            "data": {
                "title": "Criando um app CRA do zero",
                "subtitle": "Tudo sobre como criar",
                "banner": {"url": "https://images.prismic.io/banner.png", "alt": null},
                "author": "Danilo Vieira",
                "content": [
                    {"heading": "Proin et varius", "body": [{"type": "paragraph", "text": "Lorem ipsum", "spans": []}]},
                    {"heading": "Cras laoreet", "body": "not rich text"}
                ]
            }
        }));

        let post = doc.into_detail().unwrap();
        assert_eq!(post.banner.as_deref(), Some("https://images.prismic.io/banner.png"));
        assert_eq!(post.content.len(), 2);
        assert_eq!(post.content[0].heading, "Proin et varius");
        assert_eq!(post.content[0].body.len(), 1);
        assert!(post.content[1].body.is_empty());
    }

    #[test]
    fn test_empty_banner_is_none() {
        let doc = document(json!({"id": "1", "uid": "x", "data": {"banner": {}}}));
        let post = doc.into_detail().unwrap();
        assert_eq!(post.banner, None);
        assert!(post.content.is_empty());
    }
}
