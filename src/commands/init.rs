//! Initialize a new site

use anyhow::Result;
use std::fs;
use std::path::Path;

/// Default `_config.yml` written by `init`
pub const DEFAULT_CONFIG: &str = r#"# spacetraveling configuration

# Site
title: SpaceTraveling
language: en_US
logo: /spacetraveling.svg

# URL
root: /

# Directory
public_dir: public

# Date format (strftime, month names follow `language`)
date_format: "%d %b %Y"

# Listing: highest page count reachable through "load more"
max_pages: 25

# Detail pages are fetched again once older than this many seconds
revalidate_secs: 86400

# Unknown or failing post ids are looked up again after this many seconds
miss_ttl_secs: 10

labels:
  load_more: Load more posts
  loading: Loading...
  load_more_failed: Could not load more posts.
  retry: Try again
  not_found: Post not found
  server_error: Something went wrong while talking to the CMS

# Headless CMS
# PRISMIC_API_ENDPOINT and PRISMIC_ACCESS_TOKEN override endpoint and access_token
cms:
  endpoint: https://spacetraveling.cdn.prismic.io/api/v2
  access_token:
  document_type: post
  page_size: 4
  timeout_secs: 10
"#;

/// Initialize a new site in the given directory
///
/// An existing `_config.yml` is left untouched.
pub fn init_site(target_dir: &Path) -> Result<()> {
    fs::create_dir_all(target_dir)?;

    let config_path = target_dir.join("_config.yml");
    if config_path.exists() {
        anyhow::bail!("{:?} already exists", config_path);
    }

    fs::write(&config_path, DEFAULT_CONFIG)?;
    tracing::debug!("Wrote {:?}", config_path);

    Ok(())
}
