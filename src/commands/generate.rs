//! Generate static files

use anyhow::Result;

use crate::cms::ContentApi;
use crate::generator::Generator;
use crate::Blog;

/// Pre-render the site from the configured CMS
pub async fn run(blog: &Blog) -> Result<()> {
    let client = blog.client()?;
    run_with_api(blog, &client).await
}

/// Pre-render the site from any content source
pub async fn run_with_api(blog: &Blog, api: &dyn ContentApi) -> Result<()> {
    let start = std::time::Instant::now();

    let generator = Generator::new(blog, api)?;
    let stats = generator.generate().await?;

    tracing::info!(
        "Generated {} listing pages and {} posts ({} skipped)",
        stats.listing_pages,
        stats.posts,
        stats.skipped
    );

    let duration = start.elapsed();
    tracing::info!("Generated in {:.2}s", duration.as_secs_f64());

    Ok(())
}
