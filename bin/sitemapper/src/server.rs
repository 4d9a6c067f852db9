//! Embedded development server with sitemap preview

use std::{path::Path, sync::Arc};

use axum::{
    Router,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use sitemapper_core::{Config, SitemapEntry};
use sitemapper_generator::{EntryPipeline, SitemapWriter, UrlCollector};
use tower_http::services::ServeDir;

const XML_CONTENT_TYPE: &str = "application/xml; charset=utf-8";

/// Server state shared by the sitemap handlers.
pub struct DevState {
    pub config: Config,
    pub collector: UrlCollector,
    pub pipeline: EntryPipeline,
    /// URLs collected when the server started.
    pub startup_urls: Vec<SitemapEntry>,
}

impl DevState {
    /// Render the sitemap for a URL list.
    fn render(&self, urls: Vec<SitemapEntry>) -> Response {
        let urls = self.pipeline.apply(urls);
        match SitemapWriter::from_config(&self.config).write(&urls) {
            Ok(xml) => ([(header::CONTENT_TYPE, XML_CONTENT_TYPE)], xml).into_response(),
            Err(e) => {
                tracing::error!("Failed to render sitemap: {e}");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

/// Route the preview is served from, next to the sitemap itself.
pub fn preview_route(sitemap_route: &str) -> String {
    match sitemap_route.strip_suffix(".xml") {
        Some(stem) => format!("{stem}.preview.xml"),
        None => format!("{sitemap_route}.preview"),
    }
}

/// Create the development server router.
///
/// Sitemap routes are only mounted when `sitemap.dev_preview` is on; everything
/// else is served from `public_dir`.
pub fn create_router(state: Arc<DevState>, public_dir: &Path) -> Router {
    let mut router = Router::new();

    if state.config.sitemap.dev_preview {
        let route = state.config.sitemap_route();
        router = router
            .route(&preview_route(&route), get(preview_handler))
            .route(&route, get(sitemap_handler));
    }

    router
        .fallback_service(ServeDir::new(public_dir))
        .with_state(state)
}

/// Sitemap built from the startup URL list.
async fn sitemap_handler(State(state): State<Arc<DevState>>) -> Response {
    state.render(state.startup_urls.clone())
}

/// Sitemap rebuilt from a fresh collection on every request.
async fn preview_handler(State(state): State<Arc<DevState>>) -> Response {
    let urls = match state.collector.collect().await {
        Ok(urls) => urls,
        Err(e) => {
            tracing::error!("Failed to collect sitemap URLs: {e}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let mut response = state.render(urls);
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, header::HeaderValue::from_static("no-store"));
    response
}

#[cfg(test)]
mod tests {
    use std::fs;

    use axum::{body::Body, http::Request};
    use sitemapper_core::UrlInput;
    use sitemapper_generator::UrlSource;
    use tempfile::TempDir;
    use tower::ServiceExt;

    use super::*;

    fn test_state(dev_preview: bool) -> Arc<DevState> {
        let mut config = Config::default();
        config.sitemap.hostname = Some("https://example.com".to_string());
        config.sitemap.dev_preview = dev_preview;
        config.sitemap.exclude = vec!["/admin/**".to_string()];

        let collector = UrlCollector::new(&config)
            .unwrap()
            .without_inference()
            .with_source(UrlSource::Literal(vec![
                UrlInput::from("/fresh"),
                UrlInput::from("/admin/panel"),
            ]));
        let pipeline = EntryPipeline::new(&config).unwrap();

        Arc::new(DevState {
            config,
            collector,
            pipeline,
            startup_urls: vec![SitemapEntry::new("/"), SitemapEntry::new("/about")],
        })
    }

    async fn get_path(router: Router, path: &str) -> Response {
        router
            .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn body_string(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_preview_route() {
        assert_eq!(preview_route("/sitemap.xml"), "/sitemap.preview.xml");
        assert_eq!(preview_route("/maps/site.xml"), "/maps/site.preview.xml");
        assert_eq!(preview_route("/sitemap"), "/sitemap.preview");
    }

    #[tokio::test]
    async fn test_sitemap_endpoint_uses_startup_urls() {
        let public = TempDir::new().unwrap();
        let router = create_router(test_state(true), public.path());

        let response = get_path(router, "/sitemap.xml").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], XML_CONTENT_TYPE);
        assert!(response.headers().get(header::CACHE_CONTROL).is_none());

        let body = body_string(response).await;
        assert!(body.contains("<loc>https://example.com/about</loc>"));
        assert!(!body.contains("/fresh"));
    }

    #[tokio::test]
    async fn test_preview_endpoint_recollects() {
        let public = TempDir::new().unwrap();
        let router = create_router(test_state(true), public.path());

        let response = get_path(router, "/sitemap.preview.xml").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CACHE_CONTROL], "no-store");

        let body = body_string(response).await;
        assert!(body.contains("<loc>https://example.com/fresh</loc>"));
        assert!(!body.contains("admin"));
    }

    #[tokio::test]
    async fn test_disabled_preview_returns_404() {
        let public = TempDir::new().unwrap();
        let router = create_router(test_state(false), public.path());

        let response = get_path(router, "/sitemap.preview.xml").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_static_files_are_served() {
        let public = TempDir::new().unwrap();
        fs::write(public.path().join("robots.txt"), "User-agent: *").unwrap();
        let router = create_router(test_state(true), public.path());

        let response = get_path(router, "/robots.txt").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "User-agent: *");
    }
}
