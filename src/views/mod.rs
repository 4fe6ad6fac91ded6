//! Page views
//!
//! Each view owns the state it renders from and turns it into template data.
//! The header is a template partial shared by the detail, loading and error
//! pages.

pub mod detail;
pub mod listing;

use anyhow::Result;

use crate::config::SiteConfig;
use crate::templates::TemplateRenderer;

pub use detail::{render_loading, DetailView};
pub use listing::{ListingState, LoadMoreError};

/// Render the error page for an HTTP status
pub fn render_error(
    renderer: &TemplateRenderer,
    config: &SiteConfig,
    status: u16,
    message: &str,
) -> Result<String> {
    let mut context = renderer.base_context(config, &format!("{} | {}", status, config.title));
    context.insert("status", &status);
    context.insert("message", message);
    renderer.render("error.html", &context)
}
