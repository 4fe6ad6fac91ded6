//! Generator module - pre-renders the site into static HTML files

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};

use crate::cms::ContentApi;
use crate::templates::{TemplateRenderer, LOGO_SVG, STYLESHEET};
use crate::views::{DetailView, ListingState};
use crate::Blog;

/// Counts of what a generation run wrote
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GenerateStats {
    pub listing_pages: usize,
    pub posts: usize,
    pub skipped: usize,
}

/// Static site generator
pub struct Generator<'a> {
    blog: &'a Blog,
    api: &'a dyn ContentApi,
    renderer: TemplateRenderer,
}

impl<'a> Generator<'a> {
    /// Create a new generator
    pub fn new(blog: &'a Blog, api: &'a dyn ContentApi) -> Result<Self> {
        Ok(Self {
            blog,
            api,
            renderer: TemplateRenderer::new()?,
        })
    }

    /// Generate the entire site
    pub async fn generate(&self) -> Result<GenerateStats> {
        // Ensure public directory exists
        fs::create_dir_all(&self.blog.public_dir)?;

        self.write_assets()?;

        let listing_pages = self.generate_listing_pages().await?;
        let (posts, skipped) = self.generate_post_pages().await?;

        Ok(GenerateStats {
            listing_pages,
            posts,
            skipped,
        })
    }

    fn write_assets(&self) -> Result<()> {
        write_file(&self.blog.public_dir.join("styles.css"), STYLESHEET)?;
        write_file(&self.blog.public_dir.join("spacetraveling.svg"), LOGO_SVG)?;
        Ok(())
    }

    /// Generate `index.html` and `page/N/index.html`, each showing pages 1..=N
    ///
    /// A single listing state is grown with "load more" and snapshotted after
    /// every page, the same sequence a visitor clicking through would see.
    async fn generate_listing_pages(&self) -> Result<usize> {
        let config = &self.blog.config;
        let mut listing = ListingState::load(self.api).await?;

        loop {
            let pages = listing.pages_loaded();
            let html = listing.render(&self.renderer, config)?;

            let output_path = if pages == 1 {
                self.blog.public_dir.join("index.html")
            } else {
                self.blog
                    .public_dir
                    .join(format!("page/{}/index.html", pages))
            };
            write_file(&output_path, &html)?;
            tracing::debug!("Generated: {:?}", output_path);

            if !listing.can_load_more() || pages >= config.max_pages {
                return Ok(pages);
            }
            listing.load_more(self.api).await?;
        }
    }

    /// Generate `post/<uid>/index.html` for every enumerated post
    async fn generate_post_pages(&self) -> Result<(usize, usize)> {
        let uids = self.api.post_uids().await?;
        let mut generated = 0;
        let mut skipped = 0;

        for uid in uids {
            let Some(output_path) = self.post_output_path(&uid) else {
                tracing::warn!("Skipping post with unsafe uid {:?}", uid);
                skipped += 1;
                continue;
            };

            let post = self.api.post(&uid).await?;
            let html = DetailView::from(post).render(&self.renderer, &self.blog.config)?;
            write_file(&output_path, &html)?;
            tracing::debug!("Generated post: {:?}", output_path);
            generated += 1;
        }

        Ok((generated, skipped))
    }

    /// Output file of a post, `None` if the uid cannot be a single directory name
    fn post_output_path(&self, uid: &str) -> Option<PathBuf> {
        let safe = !uid.is_empty()
            && !uid.starts_with('.')
            && !uid.contains(['/', '\\'])
            && !uid.chars().any(char::is_control);
        safe.then(|| self.blog.public_dir.join("post").join(uid).join("index.html"))
    }
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| anyhow::anyhow!("Failed to create dir {:?}: {}", parent, e))?;
    }
    fs::write(path, content).map_err(|e| anyhow::anyhow!("Failed to write {:?}: {}", path, e))?;
    Ok(())
}
