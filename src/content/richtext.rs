//! Prismic structured text
//!
//! Rich text arrives from the CMS as an array of blocks, each carrying its
//! plain text plus a list of character-offset spans (`strong`, `em`,
//! `hyperlink`, `label`). This module turns that representation into HTML or
//! plain text.

use serde::{Deserialize, Serialize};

use crate::helpers::html_escape;

/// A whole rich-text field
pub type RichText = Vec<RichTextBlock>;

/// One block of a rich-text field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RichTextBlock {
    #[serde(rename = "type")]
    pub kind: BlockKind,

    #[serde(default)]
    pub text: String,

    #[serde(default)]
    pub spans: Vec<Span>,

    /// Image blocks only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Image blocks only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,

    /// Embed blocks only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oembed: Option<Embed>,
}

impl RichTextBlock {
    /// A block of the given kind with no spans
    pub fn new(kind: BlockKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            spans: Vec::new(),
            url: None,
            alt: None,
            oembed: None,
        }
    }

    /// Shorthand for a plain paragraph
    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::new(BlockKind::Paragraph, text)
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.spans.push(span);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlockKind {
    Heading1,
    Heading2,
    Heading3,
    Heading4,
    Heading5,
    Heading6,
    Paragraph,
    Preformatted,
    ListItem,
    OListItem,
    Image,
    Embed,
    #[serde(other)]
    Unknown,
}

impl BlockKind {
    fn heading_level(self) -> Option<u8> {
        match self {
            BlockKind::Heading1 => Some(1),
            BlockKind::Heading2 => Some(2),
            BlockKind::Heading3 => Some(3),
            BlockKind::Heading4 => Some(4),
            BlockKind::Heading5 => Some(5),
            BlockKind::Heading6 => Some(6),
            _ => None,
        }
    }
}

/// Inline formatting over `[start, end)` character offsets of a block's text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,

    /// `strong`, `em`, `hyperlink` or `label`
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default)]
    pub data: SpanData,
}

impl Span {
    pub fn new(kind: &str, start: usize, end: usize) -> Self {
        Self {
            start,
            end,
            kind: kind.to_string(),
            data: SpanData::default(),
        }
    }

    pub fn hyperlink(start: usize, end: usize, url: &str) -> Self {
        let mut span = Self::new("hyperlink", start, end);
        span.data.url = Some(url.to_string());
        span
    }

    fn open_tag(&self) -> Option<String> {
        match self.kind.as_str() {
            "strong" => Some("<strong>".to_string()),
            "em" => Some("<em>".to_string()),
            "hyperlink" => {
                let href = html_escape(self.data.url.as_deref().unwrap_or("#"));
                Some(match self.data.target.as_deref() {
                    Some(target) => format!(
                        r#"<a href="{}" target="{}" rel="noopener">"#,
                        href,
                        html_escape(target)
                    ),
                    None => format!(r#"<a href="{}">"#, href),
                })
            }
            "label" => Some(format!(
                r#"<span class="{}">"#,
                html_escape(self.data.label.as_deref().unwrap_or_default())
            )),
            _ => None,
        }
    }

    fn close_tag(&self) -> &'static str {
        match self.kind.as_str() {
            "strong" => "</strong>",
            "em" => "</em>",
            "hyperlink" => "</a>",
            _ => "</span>",
        }
    }
}

/// Payload of `hyperlink` and `label` spans
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpanData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// oEmbed payload of an embed block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Embed {
    #[serde(default)]
    pub html: Option<String>,
    #[serde(default)]
    pub embed_url: Option<String>,
}

/// Render rich text to plain text, joining blocks with a single space
pub fn as_text(blocks: &[RichTextBlock]) -> String {
    blocks
        .iter()
        .filter(|b| !matches!(b.kind, BlockKind::Image | BlockKind::Embed))
        .map(|b| b.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Render rich text to HTML
///
/// Text is escaped; embed HTML comes from the CMS and is trusted as-is.
/// Consecutive list items are grouped into a single `<ul>` / `<ol>`.
pub fn as_html(blocks: &[RichTextBlock]) -> String {
    let mut html = String::new();
    let mut open_list: Option<BlockKind> = None;

    for block in blocks {
        let list = match block.kind {
            BlockKind::ListItem | BlockKind::OListItem => Some(block.kind),
            _ => None,
        };

        if open_list != list {
            if let Some(kind) = open_list {
                html.push_str(list_close(kind));
            }
            if let Some(kind) = list {
                html.push_str(list_open(kind));
            }
            open_list = list;
        }

        html.push_str(&block_html(block));
    }

    if let Some(kind) = open_list {
        html.push_str(list_close(kind));
    }

    html
}

fn list_open(kind: BlockKind) -> &'static str {
    if kind == BlockKind::OListItem {
        "<ol>"
    } else {
        "<ul>"
    }
}

fn list_close(kind: BlockKind) -> &'static str {
    if kind == BlockKind::OListItem {
        "</ol>"
    } else {
        "</ul>"
    }
}

fn block_html(block: &RichTextBlock) -> String {
    if let Some(level) = block.kind.heading_level() {
        return format!("<h{level}>{}</h{level}>", spans_html(block));
    }

    match block.kind {
        BlockKind::Paragraph => format!("<p>{}</p>", spans_html(block)),
        BlockKind::Preformatted => format!("<pre>{}</pre>", spans_html(block)),
        BlockKind::ListItem | BlockKind::OListItem => format!("<li>{}</li>", spans_html(block)),
        BlockKind::Image => match block.url.as_deref() {
            Some(url) => format!(
                r#"<p class="block-img"><img src="{}" alt="{}" /></p>"#,
                html_escape(url),
                html_escape(block.alt.as_deref().unwrap_or_default())
            ),
            None => String::new(),
        },
        BlockKind::Embed => match block.oembed.as_ref().and_then(|e| e.html.as_deref()) {
            Some(embed) => format!(
                r#"<div data-oembed="{}">{}</div>"#,
                html_escape(
                    block
                        .oembed
                        .as_ref()
                        .and_then(|e| e.embed_url.as_deref())
                        .unwrap_or_default()
                ),
                embed
            ),
            None => String::new(),
        },
        _ => {
            tracing::debug!("Skipping unsupported rich text block");
            String::new()
        }
    }
}

/// Apply a block's spans to its text, producing well-nested markup
///
/// Overlapping spans are split: when a span closes while a span opened after
/// it is still running, the inner one is closed and reopened around it.
fn spans_html(block: &RichTextBlock) -> String {
    let chars: Vec<char> = block.text.chars().collect();
    let len = chars.len();

    let spans: Vec<&Span> = block
        .spans
        .iter()
        .filter(|s| s.start < s.end && s.start < len && s.open_tag().is_some())
        .collect();

    let mut bounds: Vec<usize> = vec![0, len];
    for span in &spans {
        bounds.push(span.start);
        bounds.push(span.end.min(len));
    }
    bounds.sort_unstable();
    bounds.dedup();

    let mut out = String::new();
    let mut stack: Vec<&Span> = Vec::new();

    for window in bounds.windows(2) {
        let (pos, next) = (window[0], window[1]);

        // close spans ending here, reopening anything nested inside them
        if let Some(first_done) = stack.iter().position(|s| s.end.min(len) <= pos) {
            let mut reopen = Vec::new();
            while stack.len() > first_done {
                if let Some(span) = stack.pop() {
                    out.push_str(span.close_tag());
                    if span.end.min(len) > pos {
                        reopen.push(span);
                    }
                }
            }
            for span in reopen.into_iter().rev() {
                push_open(&mut out, span);
                stack.push(span);
            }
        }

        // longest spans first so they wrap shorter ones starting at the same offset
        let mut starting: Vec<&Span> = spans.iter().copied().filter(|s| s.start == pos).collect();
        starting.sort_by(|a, b| b.end.cmp(&a.end));
        for span in starting {
            push_open(&mut out, span);
            stack.push(span);
        }

        let segment: String = chars[pos..next].iter().collect();
        out.push_str(&escape_text(&segment));
    }

    while let Some(span) = stack.pop() {
        out.push_str(span.close_tag());
    }

    out
}

fn push_open(out: &mut String, span: &Span) {
    if let Some(tag) = span.open_tag() {
        out.push_str(&tag);
    }
}

fn escape_text(text: &str) -> String {
    html_escape(text).replace('\n', "<br />")
}
