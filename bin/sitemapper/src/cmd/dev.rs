//! Dev command - development server with sitemap preview

use std::{path::Path, sync::Arc};

use color_eyre::eyre::{Result, WrapErr};
use sitemapper_core::Config;
use sitemapper_generator::{EntryPipeline, UrlCollector};
use tokio::net::TcpListener;

use super::check::quick_validate;
use crate::server::{DevState, create_router, preview_route};

/// Run the dev command.
///
/// Collects URLs once, then serves the public directory along with the
/// sitemap endpoints.
pub async fn run(config_path: &Path, port: u16, open_browser: bool) -> Result<()> {
    tracing::info!(?config_path, port, "Starting dev server");

    // Load configuration
    let config = Config::load_with_env(config_path).wrap_err("Failed to load configuration")?;

    let warnings = quick_validate(&config);
    if !warnings.is_empty() {
        println!();
        println!("  Warnings:");
        for warn in &warnings {
            println!("  ⚠ {warn}");
        }
        println!();
    }

    let collector = UrlCollector::new(&config).wrap_err("Invalid sitemap patterns")?;
    let pipeline = EntryPipeline::new(&config).wrap_err("Invalid sitemap patterns")?;

    tracing::info!("Collecting sitemap URLs...");
    let startup_urls = collector.collect().await.wrap_err("Failed to collect URLs")?;
    tracing::debug!(count = startup_urls.len(), "collected startup URLs");

    let public_dir = Path::new(&config.build.public_dir).to_path_buf();
    let sitemap_route = config.sitemap_route();
    let dev_preview = config.sitemap.dev_preview;

    let state = Arc::new(DevState {
        config,
        collector,
        pipeline,
        startup_urls,
    });

    // Start server
    let app = create_router(state, &public_dir);
    let addr = format!("127.0.0.1:{port}");

    let listener = TcpListener::bind(&addr)
        .await
        .wrap_err_with(|| format!("Failed to bind to {addr}"))?;

    println!();
    println!("  Dev server running at http://{addr}");
    if dev_preview {
        println!("  Sitemap:  http://{addr}{sitemap_route}");
        println!("  Preview:  http://{addr}{}", preview_route(&sitemap_route));
    } else {
        println!("  Sitemap preview disabled");
    }
    println!("  Press Ctrl+C to stop");
    println!();

    if open_browser {
        let target = if dev_preview {
            format!("http://{addr}{}", preview_route(&sitemap_route))
        } else {
            format!("http://{addr}")
        };
        if let Err(e) = open::that(&target) {
            tracing::warn!("Failed to open browser: {e}");
        }
    }

    axum::serve(listener, app).await.wrap_err("Server error")?;

    Ok(())
}
