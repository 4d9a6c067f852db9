//! Build session.
//!
//! One `BuildSession` spans one site build. It holds the base URL list, the
//! routes observed while prerendering and the emission guard, and writes
//! the sitemap at most once.

use std::{
    fmt,
    path::{Path, PathBuf},
    time::Instant,
};

use async_trait::async_trait;
use sitemapper_core::{Config, SitemapEntry};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    collector::{CollectorError, UrlCollector},
    filter::FilterError,
    pipeline::EntryPipeline,
    sitemap::{SitemapError, SitemapWriter},
};

/// Error returned by extension hooks.
pub type HookError = Box<dyn std::error::Error + Send + Sync>;

/// Build errors.
#[derive(Debug, Error)]
pub enum BuildError {
    /// Writing the sitemap file failed.
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Collector error.
    #[error("collector error: {0}")]
    Collector(#[from] CollectorError),

    /// Invalid filter or route rule pattern.
    #[error("pattern error: {0}")]
    Pattern(#[from] FilterError),

    /// Sitemap serialization error.
    #[error("sitemap error: {0}")]
    Sitemap(#[from] SitemapError),

    /// An extension hook failed.
    #[error("sitemap hook failed: {0}")]
    Hook(#[source] HookError),
}

/// Result type for build operations.
pub type Result<T> = std::result::Result<T, BuildError>;

/// Host lifecycle points that may trigger emission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// Server bundle finished (server-rendered builds).
    ServerBuilt,
    /// Build is closing (static generation).
    Close,
}

/// Why an emission wrote nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    MissingHostname,
    Disabled,
    /// Hooks left no URLs.
    NoUrls,
}

/// Result of an emission attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmitOutcome {
    Written {
        path: PathBuf,
        urls: usize,
        duration_ms: u64,
    },
    Skipped(SkipReason),
    /// A previous attempt already wrote the sitemap.
    AlreadyEmitted,
}

/// Mutable state handed to extension hooks.
#[derive(Debug)]
pub struct GenerateContext {
    /// Entries about to be written.
    pub urls: Vec<SitemapEntry>,

    /// Writer used to serialize `urls`.
    pub writer: SitemapWriter,
}

/// Extension point run before the sitemap is serialized.
///
/// Implemented for any `Fn(&mut GenerateContext)` closure.
#[async_trait]
pub trait SitemapHook: Send + Sync {
    async fn on_generate(&self, ctx: &mut GenerateContext) -> std::result::Result<(), HookError>;
}

#[async_trait]
impl<F> SitemapHook for F
where
    F: Fn(&mut GenerateContext) + Send + Sync,
{
    async fn on_generate(&self, ctx: &mut GenerateContext) -> std::result::Result<(), HookError> {
        self(ctx);
        Ok(())
    }
}

/// Sitemap state for a single build.
pub struct BuildSession {
    config: Config,
    pipeline: EntryPipeline,
    output_path: PathBuf,
    base_urls: Vec<SitemapEntry>,
    prerendered: Vec<SitemapEntry>,
    hooks: Vec<Box<dyn SitemapHook>>,
    emitted: bool,
    skipped: Option<SkipReason>,
}

impl BuildSession {
    /// Create a session. Pattern errors surface here, before any work.
    pub fn new(config: Config) -> Result<Self> {
        let pipeline = EntryPipeline::new(&config)?;
        let output_path = config.output_path();

        Ok(Self {
            config,
            pipeline,
            output_path,
            base_urls: Vec::new(),
            prerendered: Vec::new(),
            hooks: Vec::new(),
            emitted: false,
            skipped: None,
        })
    }

    /// Write the sitemap somewhere other than `build.public_dir`.
    #[must_use]
    pub fn with_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = path.into();
        self
    }

    /// Use `urls` as the base list.
    #[must_use]
    pub fn with_base_urls(mut self, urls: Vec<SitemapEntry>) -> Self {
        self.base_urls = urls;
        self
    }

    /// Collect the base list with `collector`.
    pub async fn collect(&mut self, collector: &UrlCollector) -> Result<usize> {
        self.base_urls = collector.collect().await?;
        Ok(self.base_urls.len())
    }

    /// Register a hook. Hooks run in registration order.
    pub fn add_hook(&mut self, hook: impl SitemapHook + 'static) {
        self.hooks.push(Box::new(hook));
    }

    /// Record a route rendered during prerendering.
    ///
    /// Routes for files (containing a `.`) are ignored.
    pub fn record_prerendered(&mut self, route: &str) {
        self.record_prerendered_entry(SitemapEntry::new(route));
    }

    /// Record a prerendered route with metadata.
    pub fn record_prerendered_entry(&mut self, entry: SitemapEntry) {
        if entry.url.contains('.') {
            debug!(route = %entry.url, "ignoring file route");
            return;
        }
        self.prerendered.push(entry);
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub fn base_urls(&self) -> &[SitemapEntry] {
        &self.base_urls
    }

    #[must_use]
    pub fn prerendered(&self) -> &[SitemapEntry] {
        &self.prerendered
    }

    #[must_use]
    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Whether the sitemap has been written.
    #[must_use]
    pub fn is_emitted(&self) -> bool {
        self.emitted
    }

    /// React to a host lifecycle event.
    pub async fn on_lifecycle(&mut self, event: LifecycleEvent) -> Result<EmitOutcome> {
        debug!(?event, "lifecycle event");
        match event {
            LifecycleEvent::ServerBuilt | LifecycleEvent::Close => self.emit().await,
        }
    }

    /// Generate and write the sitemap unless it was already written.
    ///
    /// A missing hostname or disabled generation is reported once; later
    /// triggers return the same skip quietly. Failures leave the guard unset,
    /// so a later trigger can try again.
    pub async fn emit(&mut self) -> Result<EmitOutcome> {
        if self.emitted {
            debug!("sitemap already emitted");
            return Ok(EmitOutcome::AlreadyEmitted);
        }

        if let Some(reason) = self.skipped {
            debug!(?reason, "sitemap generation already skipped");
            return Ok(EmitOutcome::Skipped(reason));
        }
        if self.config.hostname().is_none() {
            warn!("set `sitemap.hostname` to generate a sitemap");
            self.skipped = Some(SkipReason::MissingHostname);
            return Ok(EmitOutcome::Skipped(SkipReason::MissingHostname));
        }
        if !self.config.sitemap.enabled {
            warn!("sitemap generation is disabled, set `sitemap.enabled = true` to enable it");
            self.skipped = Some(SkipReason::Disabled);
            return Ok(EmitOutcome::Skipped(SkipReason::Disabled));
        }

        let start = Instant::now();

        let mut entries = self.base_urls.clone();
        entries.extend(self.prerendered.iter().cloned());

        let mut ctx = GenerateContext {
            urls: self.pipeline.apply(entries),
            writer: SitemapWriter::from_config(&self.config),
        };

        for hook in &self.hooks {
            hook.on_generate(&mut ctx).await.map_err(BuildError::Hook)?;
        }
        if ctx.urls.is_empty() {
            debug!("no URLs left after hooks");
            return Ok(EmitOutcome::Skipped(SkipReason::NoUrls));
        }

        let xml = ctx.writer.write(&ctx.urls)?;
        self.write_file(&xml).await?;

        let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        info!(
            path = %self.output_path.display(),
            urls = ctx.urls.len(),
            duration_ms,
            "generated sitemap"
        );
        self.emitted = true;

        Ok(EmitOutcome::Written {
            path: self.output_path.clone(),
            urls: ctx.urls.len(),
            duration_ms,
        })
    }

    async fn write_file(&self, xml: &str) -> Result<()> {
        let write_err = |source| BuildError::Write {
            path: self.output_path.clone(),
            source,
        };

        if let Some(parent) = self.output_path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
        }
        tokio::fs::write(&self.output_path, xml)
            .await
            .map_err(write_err)
    }
}

impl fmt::Debug for BuildSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuildSession")
            .field("output_path", &self.output_path)
            .field("base_urls", &self.base_urls.len())
            .field("prerendered", &self.prerendered.len())
            .field("hooks", &self.hooks.len())
            .field("emitted", &self.emitted)
            .field("skipped", &self.skipped)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn session(dir: &TempDir) -> BuildSession {
        let mut config = Config::default();
        config.sitemap.hostname = Some("https://example.com".to_string());
        config.build.public_dir = dir.path().to_string_lossy().to_string();
        BuildSession::new(config).unwrap()
    }

    #[test]
    fn test_file_routes_not_recorded() {
        let dir = TempDir::new().unwrap();
        let mut session = session(&dir);

        session.record_prerendered("/about");
        session.record_prerendered("/feed.xml");
        session.record_prerendered("/_payload.json");

        assert_eq!(session.prerendered(), &[SitemapEntry::new("/about")]);
    }

    #[tokio::test]
    async fn test_emit_writes_once() {
        let dir = TempDir::new().unwrap();
        let mut session = session(&dir).with_base_urls(vec![SitemapEntry::new("/")]);

        let first = session.on_lifecycle(LifecycleEvent::ServerBuilt).await.unwrap();
        let second = session.on_lifecycle(LifecycleEvent::Close).await.unwrap();

        assert!(matches!(first, EmitOutcome::Written { urls: 1, .. }));
        assert_eq!(second, EmitOutcome::AlreadyEmitted);
        assert!(session.is_emitted());
        assert!(dir.path().join("sitemap.xml").exists());
    }

    #[tokio::test]
    async fn test_empty_list_skips_without_guard() {
        let dir = TempDir::new().unwrap();
        let mut session = session(&dir);

        let outcome = session.emit().await.unwrap();

        assert_eq!(outcome, EmitOutcome::Skipped(SkipReason::NoUrls));
        assert!(!session.is_emitted());
        assert!(!dir.path().join("sitemap.xml").exists());
    }

    #[tokio::test]
    async fn test_disabled_skips() {
        let dir = TempDir::new().unwrap();
        let mut config = session(&dir).config().clone();
        config.sitemap.enabled = false;
        let mut session = BuildSession::new(config)
            .unwrap()
            .with_base_urls(vec![SitemapEntry::new("/")]);

        let outcome = session.emit().await.unwrap();

        assert_eq!(outcome, EmitOutcome::Skipped(SkipReason::Disabled));
        assert_eq!(
            session.on_lifecycle(LifecycleEvent::Close).await.unwrap(),
            EmitOutcome::Skipped(SkipReason::Disabled)
        );
        assert!(!dir.path().join("sitemap.xml").exists());
    }

    #[test]
    fn test_bad_rule_pattern_fails_at_setup() {
        let mut config = Config::default();
        config.route_rules = vec![sitemapper_core::RouteRule {
            pattern: "/[oops".to_string(),
            index: Some(false),
            sitemap: None,
        }];

        let err = BuildSession::new(config).unwrap_err();
        assert!(matches!(err, BuildError::Pattern(_)));
    }
}
