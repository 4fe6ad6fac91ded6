//! HTTP server
//!
//! Serves the listing, the detail pages and the embedded assets. Known posts
//! are pre-rendered at startup; any other identifier is resolved on first
//! request while the visitor sees a loading placeholder that refreshes itself.
//! A resolution that fails is answered with an error page until the miss
//! expires and the identifier is tried again.

use anyhow::Result;
use axum::{
    extract::{Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::cache::{CachedPage, Lookup, PageCache};
use crate::cms::ContentApi;
use crate::config::SiteConfig;
use crate::templates::{TemplateRenderer, LOGO_SVG, STYLESHEET};
use crate::views::{render_error, render_loading, DetailView, ListingState};
use crate::Blog;

/// Seconds before the loading placeholder reloads itself
const FALLBACK_REFRESH_SECS: u32 = 2;

/// Shared server state
#[derive(Clone)]
pub struct AppState {
    api: Arc<dyn ContentApi>,
    renderer: Arc<TemplateRenderer>,
    config: Arc<SiteConfig>,
    cache: Arc<PageCache>,
}

impl AppState {
    pub fn new(api: Arc<dyn ContentApi>, config: SiteConfig) -> Result<Self> {
        Ok(Self {
            api,
            renderer: Arc::new(TemplateRenderer::new()?),
            cache: Arc::new(PageCache::new(config.revalidate_after(), config.miss_ttl())),
            config: Arc::new(config),
        })
    }

    pub fn cache(&self) -> &PageCache {
        &self.cache
    }

    /// Render every post the CMS currently lists
    ///
    /// Any failure aborts, the same way a failed build would.
    pub async fn prerender(&self) -> Result<usize> {
        let uids = self.api.post_uids().await?;
        let mut rendered = 0;

        for uid in &uids {
            if let CachedPage::Page(_) = self.resolve_post(uid).await? {
                rendered += 1;
            }
        }

        Ok(rendered)
    }

    /// Fetch and render one post, storing the outcome in the cache
    ///
    /// A missing document is cached as not found. Other CMS failures are
    /// recorded as failed unless a rendered page is already cached, which
    /// is kept, and then returned.
    pub async fn resolve_post(&self, uid: &str) -> Result<CachedPage> {
        let page = match self.api.post(uid).await {
            Ok(post) => {
                let html = DetailView::from(post).render(&self.renderer, &self.config)?;
                CachedPage::Page(Arc::from(html))
            }
            Err(e) if e.is_not_found() => {
                tracing::debug!("Post {} does not exist", uid);
                CachedPage::NotFound
            }
            Err(e) => {
                if !self.cache.record_failure(uid).await {
                    tracing::warn!("Refreshing post {} failed, keeping the cached page", uid);
                }
                return Err(e.into());
            }
        };

        self.cache.insert(uid, page.clone()).await;
        tracing::debug!("Rendered post {}", uid);
        Ok(page)
    }

    /// Resolve a post in the background unless another task already is
    fn spawn_resolve(&self, uid: String) {
        let state = self.clone();
        tokio::spawn(async move {
            if !state.cache.begin(&uid).await {
                return;
            }
            // Another task may have finished between the lookup and the claim
            if let Lookup::Fresh(_) = state.cache.lookup(&uid).await {
                state.cache.finish(&uid).await;
                return;
            }
            if let Err(e) = state.resolve_post(&uid).await {
                tracing::error!("Resolving post {} failed: {:#}", uid, e);
            }
            state.cache.finish(&uid).await;
        });
    }

    async fn listing(&self, pages: usize) -> Response {
        let mut listing = match ListingState::load(self.api.as_ref()).await {
            Ok(listing) => listing,
            Err(e) => {
                tracing::error!("Fetching the post listing failed: {}", e);
                return self.error_page(StatusCode::BAD_GATEWAY, &self.config.labels.server_error);
            }
        };

        listing.load_until(self.api.as_ref(), pages).await;

        match listing.render(&self.renderer, &self.config) {
            Ok(html) => Html(html).into_response(),
            Err(e) => self.render_failure(e),
        }
    }

    fn cached(&self, page: CachedPage) -> Response {
        match page {
            CachedPage::Page(html) => {
                let mut response = Html(html.to_string()).into_response();
                if let Ok(value) = HeaderValue::from_str(&format!(
                    "public, s-maxage={}, stale-while-revalidate",
                    self.config.revalidate_secs
                )) {
                    response.headers_mut().insert(header::CACHE_CONTROL, value);
                }
                response
            }
            CachedPage::NotFound => {
                self.error_page(StatusCode::NOT_FOUND, &self.config.labels.not_found)
            }
            CachedPage::Failed => {
                self.error_page(StatusCode::BAD_GATEWAY, &self.config.labels.server_error)
            }
        }
    }

    fn loading(&self) -> Response {
        match render_loading(&self.renderer, &self.config, Some(FALLBACK_REFRESH_SECS)) {
            Ok(html) => {
                let mut response = Html(html).into_response();
                response
                    .headers_mut()
                    .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
                response
            }
            Err(e) => self.render_failure(e),
        }
    }

    fn error_page(&self, status: StatusCode, message: &str) -> Response {
        match render_error(&self.renderer, &self.config, status.as_u16(), message) {
            Ok(html) => (status, Html(html)).into_response(),
            Err(e) => {
                tracing::error!("Rendering error page failed: {:#}", e);
                (status, message.to_string()).into_response()
            }
        }
    }

    fn render_failure(&self, e: anyhow::Error) -> Response {
        tracing::error!("Rendering failed: {:#}", e);
        self.error_page(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
    }
}

/// Build the router, mounted under the configured root
pub fn router(state: AppState) -> Router {
    let root = state.config.root.trim_end_matches('/').to_string();

    let routes = Router::new()
        .route("/", get(home_handler))
        .route("/page/:pages", get(listing_handler))
        .route("/page/:pages/", get(listing_handler))
        .route("/post/:uid", get(post_handler))
        .route("/styles.css", get(stylesheet_handler))
        .route("/spacetraveling.svg", get(logo_handler))
        .fallback(not_found_handler)
        .with_state(state);

    if root.is_empty() {
        routes
    } else {
        Router::new().nest(&root, routes)
    }
}

/// Start the server
pub async fn start(blog: &Blog, ip: &str, port: u16) -> Result<()> {
    let api: Arc<dyn ContentApi> = Arc::new(blog.client()?);
    let state = AppState::new(api, blog.config.clone())?;

    tracing::info!("Pre-rendering posts...");
    let rendered = state.prerender().await?;
    tracing::info!("Pre-rendered {} posts", rendered);
    if state.cache().is_empty().await {
        tracing::warn!("The CMS listed no posts, detail pages will be resolved on request");
    }

    let app = add_middlewares(router(state));

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    println!("Server running at http://{}:{}", ip, port);
    println!("Press Ctrl+C to stop.");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Trace requests and log failed ones
fn add_middlewares(router: Router) -> Router {
    fn log_failure(
        err: tower_http::classify::ServerErrorsFailureClass,
        _latency: std::time::Duration,
        _span: &tracing::Span,
    ) {
        tracing::error!(error = %err, "request failed");
    }

    router.layer(TraceLayer::new_for_http().on_failure(log_failure))
}

async fn home_handler(State(state): State<AppState>) -> Response {
    state.listing(1).await
}

async fn listing_handler(State(state): State<AppState>, Path(pages): Path<usize>) -> Response {
    if pages == 0 || pages > state.config.max_pages {
        return state.error_page(StatusCode::NOT_FOUND, &state.config.labels.not_found);
    }
    state.listing(pages).await
}

async fn post_handler(State(state): State<AppState>, Path(uid): Path<String>) -> Response {
    match state.cache.lookup(&uid).await {
        Lookup::Fresh(page) => state.cached(page),
        Lookup::Stale(page) => {
            tracing::debug!("Revalidating post {}", uid);
            state.spawn_resolve(uid);
            state.cached(page)
        }
        Lookup::Missing => {
            tracing::debug!("Post {} not rendered yet, serving fallback", uid);
            state.spawn_resolve(uid);
            state.loading()
        }
    }
}

async fn stylesheet_handler() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/css; charset=utf-8")], STYLESHEET)
}

async fn logo_handler() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "image/svg+xml")], LOGO_SVG)
}

async fn not_found_handler(State(state): State<AppState>) -> Response {
    state.error_page(StatusCode::NOT_FOUND, &state.config.labels.not_found)
}
