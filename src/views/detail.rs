//! Detail view: a single post, or a placeholder while it is being resolved

use anyhow::Result;

use crate::config::SiteConfig;
use crate::content::{reading_time, richtext, PostDetail};
use crate::helpers::{date_xml, format_publication_date, html_escape};
use crate::templates::{PostData, SectionData, TemplateRenderer};

/// Render state of a detail page
///
/// `Loading` is shown while a not yet generated identifier is resolved. It
/// carries no post, so nothing about the post can be rendered from it.
#[derive(Debug, Clone)]
pub enum DetailView {
    Loading,
    Loaded(Box<PostDetail>),
}

impl From<PostDetail> for DetailView {
    fn from(post: PostDetail) -> Self {
        DetailView::Loaded(Box::new(post))
    }
}

impl DetailView {
    pub fn is_loading(&self) -> bool {
        matches!(self, DetailView::Loading)
    }

    /// Render the page for this state
    pub fn render(&self, renderer: &TemplateRenderer, config: &SiteConfig) -> Result<String> {
        match self {
            DetailView::Loading => render_loading(renderer, config, None),
            DetailView::Loaded(post) => render_post(renderer, config, post),
        }
    }
}

/// Loading placeholder, optionally asking the browser to reload after `refresh_after` seconds
pub fn render_loading(
    renderer: &TemplateRenderer,
    config: &SiteConfig,
    refresh_after: Option<u32>,
) -> Result<String> {
    let mut context = renderer.base_context(config, &config.title);
    context.insert("loading_label", &config.labels.loading);
    context.insert("refresh_after", &refresh_after);
    renderer.render("loading.html", &context)
}

/// Template data for a post
pub fn post_data(post: &PostDetail, config: &SiteConfig) -> PostData {
    PostData {
        uid: post.uid.clone(),
        title: post.title.clone(),
        banner: post.banner.as_deref().map(html_escape),
        author: post.author.clone(),
        date: format_publication_date(
            post.first_publication_date.as_ref(),
            &config.date_format,
            &config.language,
        ),
        datetime: post.first_publication_date.as_ref().map(date_xml),
        reading_time: reading_time(&post.content),
        sections: post
            .content
            .iter()
            .map(|block| SectionData {
                heading: block.heading.clone(),
                html: richtext::as_html(&block.body),
            })
            .collect(),
    }
}

fn render_post(
    renderer: &TemplateRenderer,
    config: &SiteConfig,
    post: &PostDetail,
) -> Result<String> {
    let mut context = renderer.base_context(config, &format!("{} | {}", post.title, config.title));
    context.insert("post", &post_data(post, config));
    renderer.render("post.html", &context)
}
