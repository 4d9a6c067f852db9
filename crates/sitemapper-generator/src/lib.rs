//! sitemapper Generator Library
//!
//! URL collection and sitemap emission for sitemapper.
//!
//! # Modules
//!
//! - [`filter`] - Include/exclude glob filtering
//! - [`route_rules`] - Per-route sitemap overrides
//! - [`pages`] - Static route inference from a pages directory
//! - [`collector`] - Base URL collection
//! - [`pipeline`] - Filtering, overrides and dedup before writing
//! - [`sitemap`] - XML sitemap serialization
//! - [`build`] - Build session and emission

pub mod build;
pub mod collector;
pub mod filter;
pub mod pages;
pub mod paths;
pub mod pipeline;
pub mod route_rules;
pub mod sitemap;

pub use build::{
    BuildError, BuildSession, EmitOutcome, GenerateContext, HookError, LifecycleEvent,
    SitemapHook, SkipReason,
};
pub use collector::{CollectorError, SourceError, UrlCollector, UrlProducer, UrlSource};
pub use filter::{FilterError, UrlFilter};
pub use pages::{PagesDir, RouteInference};
pub use pipeline::EntryPipeline;
pub use route_rules::{Resolution, RouteRules};
pub use sitemap::{SitemapError, SitemapWriter};
