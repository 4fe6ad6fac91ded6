//! List posts published in the CMS

use anyhow::Result;

use crate::cms::ContentApi;
use crate::helpers::format_publication_date;
use crate::views::ListingState;
use crate::Blog;

/// Print every post, walking the listing one page at a time
pub async fn run(blog: &Blog) -> Result<()> {
    let client = blog.client()?;
    let lines = collect(blog, &client).await?;

    println!("Posts ({}):", lines.len());
    for line in lines {
        println!("  {}", line);
    }

    Ok(())
}

/// One `date - title [uid]` line per post
pub async fn collect(blog: &Blog, api: &dyn ContentApi) -> Result<Vec<String>> {
    let mut listing = ListingState::load(api).await?;
    while listing.can_load_more() {
        listing.load_more(api).await?;
    }

    Ok(listing
        .posts()
        .iter()
        .map(|post| {
            let date = format_publication_date(
                post.first_publication_date.as_ref(),
                "%Y-%m-%d",
                &blog.config.language,
            )
            .unwrap_or_else(|| "----------".to_string());
            format!("{} - {} [{}]", date, post.title, post.uid)
        })
        .collect())
}
