//! Built-in templates using Tera template engine
//!
//! Templates and static assets are embedded directly in the binary.

use anyhow::Result;
use serde::Serialize;
use tera::{Context, Tera};

use crate::config::SiteConfig;
use crate::helpers::{html_escape, url_for};

/// Site stylesheet, served at `/styles.css`
pub const STYLESHEET: &str = include_str!("spacetraveling/styles.css");

/// Site logo, served at `/spacetraveling.svg`
pub const LOGO_SVG: &str = include_str!("spacetraveling/spacetraveling.svg");

/// Template renderer with the embedded templates loaded
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("spacetraveling/layout.html")),
            ("index.html", include_str!("spacetraveling/index.html")),
            ("post.html", include_str!("spacetraveling/post.html")),
            ("loading.html", include_str!("spacetraveling/loading.html")),
            ("error.html", include_str!("spacetraveling/error.html")),
            // Partials
            (
                "partials/header.html",
                include_str!("spacetraveling/partials/header.html"),
            ),
            (
                "partials/post_info.html",
                include_str!("spacetraveling/partials/post_info.html"),
            ),
        ])?;

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }

    /// Context shared by every page
    pub fn base_context(&self, config: &SiteConfig, page_title: &str) -> Context {
        let mut context = Context::new();
        context.insert("site", &SiteData::from(config));
        context.insert("page_title", page_title);
        context
    }
}

// Data structures for template context

/// Site-wide values; URL fields are pre-escaped and emitted with `| safe`
#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub title: String,
    pub language: String,
    pub home: String,
    pub logo: String,
    pub stylesheet: String,
}

impl From<&SiteConfig> for SiteData {
    fn from(config: &SiteConfig) -> Self {
        Self {
            title: config.title.clone(),
            language: config.language.replace('_', "-"),
            home: html_escape(&url_for(config, "/")),
            logo: if config.logo.starts_with("http://") || config.logo.starts_with("https://") {
                html_escape(&config.logo)
            } else {
                html_escape(&url_for(config, &config.logo))
            },
            stylesheet: html_escape(&url_for(config, "/styles.css")),
        }
    }
}

/// A post in the listing
#[derive(Debug, Clone, Serialize)]
pub struct PostCardData {
    pub uid: String,
    pub href: String,
    pub title: String,
    pub subtitle: String,
    pub author: String,
    pub date: Option<String>,
    pub datetime: Option<String>,
}

/// Listing pagination state
#[derive(Debug, Clone, Serialize)]
pub struct ListingData {
    pub posts: Vec<PostCardData>,
    /// Link revealing one more page; absent when there is none
    pub load_more_href: Option<String>,
    pub load_more_label: String,
    /// Inline error shown when fetching a further page failed
    pub error: Option<String>,
    pub retry_href: Option<String>,
    pub retry_label: String,
}

/// A post detail page
#[derive(Debug, Clone, Serialize)]
pub struct PostData {
    pub uid: String,
    pub title: String,
    pub banner: Option<String>,
    pub author: String,
    pub date: Option<String>,
    pub datetime: Option<String>,
    pub reading_time: usize,
    pub sections: Vec<SectionData>,
}

/// A content section with its body already rendered to HTML
#[derive(Debug, Clone, Serialize)]
pub struct SectionData {
    pub heading: String,
    pub html: String,
}
