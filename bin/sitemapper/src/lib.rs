//! sitemapper CLI Library
//!
//! This library provides the command implementations for the sitemapper CLI.
//! It is used by the binary entry point while also exposing the dev server
//! router for integration purposes.
//!
//! # Modules
//!
//! - [`cmd`] - Command implementations (build, dev, check)
//! - [`server`] - Development server with sitemap preview endpoints
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use sitemapper::cmd;
//!
//! # async fn run() -> color_eyre::eyre::Result<()> {
//! cmd::build::run(Path::new("sitemapper.toml"), None, None).await?;
//! # Ok(())
//! # }
//! ```

pub mod cmd;
pub mod server;

// Re-export core types for convenience
pub use sitemapper_core::{Config, SitemapEntry};
pub use sitemapper_generator::{BuildSession, EmitOutcome, UrlCollector};

/// Initialize tracing with the specified verbosity level.
///
/// # Arguments
///
/// * `verbose` - Verbosity level (0 = WARN, 1 = INFO, 2 = DEBUG, 3+ = TRACE)
pub fn init_tracing(verbose: u8) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();
}
