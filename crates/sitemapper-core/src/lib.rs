//! sitemapper Core Library
//!
//! Core types, configuration, and error handling for the sitemapper sitemap generator.

pub mod config;
pub mod entry;
pub mod error;

pub use config::{BuildConfig, Config, RouteRule, SitemapConfig, XmlOptions};
pub use entry::{AlternateLink, ChangeFreq, EntryMeta, ImageEntry, SitemapEntry, UrlInput};
pub use error::{CoreError, Result};
