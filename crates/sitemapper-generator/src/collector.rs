//! URL collection.
//!
//! Gathers the configured URLs and the static application routes into one
//! list, unique by URL and ordered shortest first.

use std::{collections::HashSet, fmt, future::Future, path::Path, sync::Arc};

use async_trait::async_trait;
use sitemapper_core::{Config, EntryMeta, SitemapEntry, UrlInput};
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    filter::{FilterError, UrlFilter},
    pages::{InferenceError, PagesDir, RouteInference, is_static_route},
    paths::fix_slashes,
};

/// Error returned by user URL producers.
pub type SourceError = Box<dyn std::error::Error + Send + Sync>;

/// Content collection errors.
#[derive(Debug, Error)]
pub enum CollectorError {
    /// The URL source failed.
    #[error("URL source failed: {0}")]
    Source(#[source] SourceError),

    /// Static route inference failed.
    #[error("route inference failed: {0}")]
    Inference(#[from] InferenceError),

    /// Filter patterns are invalid.
    #[error(transparent)]
    Filter(#[from] FilterError),
}

/// Result type for collector operations.
pub type Result<T> = std::result::Result<T, CollectorError>;

/// Produces URLs on demand.
///
/// Implemented for any `Fn() -> impl Future<Output = Result<Vec<UrlInput>, SourceError>>`.
#[async_trait]
pub trait UrlProducer: Send + Sync {
    async fn produce(&self) -> std::result::Result<Vec<UrlInput>, SourceError>;
}

#[async_trait]
impl<F, Fut> UrlProducer for F
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = std::result::Result<Vec<UrlInput>, SourceError>> + Send + 'static,
{
    async fn produce(&self) -> std::result::Result<Vec<UrlInput>, SourceError> {
        (self)().await
    }
}

/// Where the explicit URLs come from.
#[derive(Clone)]
pub enum UrlSource {
    /// A fixed list.
    Literal(Vec<UrlInput>),
    /// A producer awaited at collection time.
    Deferred(Arc<dyn UrlProducer>),
}

impl UrlSource {
    /// Wrap a producer.
    pub fn deferred(producer: impl UrlProducer + 'static) -> Self {
        Self::Deferred(Arc::new(producer))
    }

    /// Resolve to a concrete list, preserving order.
    pub async fn resolve(&self) -> Result<Vec<UrlInput>> {
        match self {
            Self::Literal(urls) => Ok(urls.clone()),
            Self::Deferred(producer) => producer.produce().await.map_err(CollectorError::Source),
        }
    }
}

impl Default for UrlSource {
    fn default() -> Self {
        Self::Literal(Vec::new())
    }
}

impl fmt::Debug for UrlSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(urls) => f.debug_tuple("Literal").field(urls).finish(),
            Self::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}

/// Keep the first entry for every URL.
pub(crate) fn unique_by_url(entries: Vec<SitemapEntry>) -> Vec<SitemapEntry> {
    let mut seen = HashSet::new();
    entries
        .into_iter()
        .filter(|entry| seen.insert(entry.url.clone()))
        .collect()
}

/// Shorter URLs first; equal lengths keep their order.
pub(crate) fn sort_by_url_len(entries: &mut [SitemapEntry]) {
    entries.sort_by_key(|entry| entry.url.len());
}

/// Collects the base URL list of a site.
pub struct UrlCollector {
    source: UrlSource,
    defaults: EntryMeta,
    filter: UrlFilter,
    inference: Option<Box<dyn RouteInference>>,
    infer_static_pages: bool,
    trailing_slash: bool,
}

impl UrlCollector {
    /// Create a collector from configuration.
    ///
    /// Routes are inferred from `build.pages_dir`.
    pub fn new(config: &Config) -> Result<Self> {
        let sitemap = &config.sitemap;
        let pages = PagesDir::new(
            Path::new(&config.build.pages_dir),
            &config.build.page_extensions,
        );

        Ok(Self {
            source: UrlSource::Literal(sitemap.urls.clone()),
            defaults: sitemap.defaults.clone(),
            filter: UrlFilter::new(&sitemap.include, &sitemap.exclude)?,
            inference: Some(Box::new(pages)),
            infer_static_pages: sitemap.infer_static_pages_as_routes,
            trailing_slash: sitemap.trailing_slash,
        })
    }

    /// Replace the explicit URL source.
    #[must_use]
    pub fn with_source(mut self, source: UrlSource) -> Self {
        self.source = source;
        self
    }

    /// Replace the route inference.
    #[must_use]
    pub fn with_inference(mut self, inference: impl RouteInference + 'static) -> Self {
        self.inference = Some(Box::new(inference));
        self
    }

    /// Disable route inference entirely.
    #[must_use]
    pub fn without_inference(mut self) -> Self {
        self.inference = None;
        self
    }

    /// Collect the base URL list.
    pub async fn collect(&self) -> Result<Vec<SitemapEntry>> {
        let explicit = self.explicit_entries().await?;

        if !self.infer_static_pages {
            debug!(count = explicit.len(), "static route inference disabled");
            return Ok(finish(explicit));
        }

        let mut entries = explicit;
        entries.extend(self.static_route_entries()?);

        let entries = finish(entries);
        info!(count = entries.len(), "collected URLs");
        Ok(entries)
    }

    async fn explicit_entries(&self) -> Result<Vec<SitemapEntry>> {
        let urls = self.source.resolve().await?;

        Ok(urls
            .into_iter()
            .map(SitemapEntry::from)
            .map(|entry| SitemapEntry {
                meta: self.defaults.merge(&entry.meta),
                url: entry.url,
            })
            .collect())
    }

    fn static_route_entries(&self) -> Result<Vec<SitemapEntry>> {
        let Some(inference) = &self.inference else {
            return Ok(Vec::new());
        };

        Ok(inference
            .routes()?
            .into_iter()
            .filter(|route| is_static_route(route) && self.filter.should_include(route))
            .map(|route| SitemapEntry::new(fix_slashes(&route, self.trailing_slash)))
            .collect())
    }
}

impl fmt::Debug for UrlCollector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UrlCollector")
            .field("source", &self.source)
            .field("defaults", &self.defaults)
            .field("infer_static_pages", &self.infer_static_pages)
            .field("trailing_slash", &self.trailing_slash)
            .finish_non_exhaustive()
    }
}

fn finish(entries: Vec<SitemapEntry>) -> Vec<SitemapEntry> {
    let mut entries = unique_by_url(entries);
    sort_by_url_len(&mut entries);
    entries
}
