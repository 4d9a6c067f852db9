//! Build command - generates sitemap.xml for a built site

use std::{
    path::{Component, Path},
    time::Instant,
};

use chrono::{DateTime, Utc};
use color_eyre::eyre::{Result, WrapErr};
use sitemapper_core::{Config, SitemapEntry};
use sitemapper_generator::{BuildSession, EmitOutcome, LifecycleEvent, UrlCollector};

/// Pages that are served as fallbacks rather than as routes.
const FALLBACK_PAGES: [&str; 2] = ["200", "404"];

/// Run the build command.
///
/// Collects the base URLs, records every prerendered HTML page found in the
/// public directory, then fires the end-of-build lifecycle events.
pub async fn run(config_path: &Path, public_dir: Option<&Path>, hostname: Option<&str>) -> Result<()> {
    let start = Instant::now();
    tracing::info!(?config_path, ?public_dir, ?hostname, "Starting build");

    // Load configuration
    let mut config = Config::load_with_env(config_path).wrap_err("Failed to load configuration")?;

    // Override public directory if specified
    if let Some(dir) = public_dir {
        config.build.public_dir = dir.to_string_lossy().to_string();
    }

    // Override hostname if specified via CLI
    if let Some(h) = hostname {
        tracing::info!(hostname = h, "Overriding sitemap hostname from CLI");
        config.sitemap.hostname = Some(h.to_string());
        config.validate().wrap_err("Invalid hostname")?;
    }

    tracing::debug!(?config, "Loaded configuration");

    let collector = UrlCollector::new(&config).wrap_err("Invalid sitemap patterns")?;
    let mut session = BuildSession::new(config).wrap_err("Invalid sitemap patterns")?;

    let base = session
        .collect(&collector)
        .await
        .wrap_err("Failed to collect URLs")?;
    let public_dir = Path::new(&session.config().build.public_dir).to_path_buf();
    let prerendered = record_prerendered_pages(&mut session, &public_dir)?;

    let mut outcome = EmitOutcome::AlreadyEmitted;
    for event in [LifecycleEvent::ServerBuilt, LifecycleEvent::Close] {
        match session
            .on_lifecycle(event)
            .await
            .wrap_err("Sitemap generation failed")?
        {
            EmitOutcome::AlreadyEmitted => {}
            other => outcome = other,
        }
    }

    let duration = start.elapsed();

    // Print build statistics
    println!();
    match &outcome {
        EmitOutcome::Written { path, urls, .. } => {
            println!("  Sitemap generated successfully!");
            println!();
            println!("  Base URLs:   {base}");
            println!("  Prerendered: {prerendered}");
            println!("  Written:     {urls}");
            println!("  Output:      {}", path.display());
        }
        EmitOutcome::Skipped(reason) => {
            println!("  Sitemap skipped: {reason:?}");
        }
        EmitOutcome::AlreadyEmitted => {}
    }
    println!();
    println!("  Duration:    {:.2}s", duration.as_secs_f64());
    println!();

    tracing::info!(?outcome, ?duration, "Build finished");

    Ok(())
}

/// Record the HTML pages under `public_dir` as prerendered routes.
fn record_prerendered_pages(session: &mut BuildSession, public_dir: &Path) -> Result<usize> {
    if !public_dir.is_dir() {
        tracing::debug!(dir = %public_dir.display(), "public directory not found");
        return Ok(0);
    }

    let mut count = 0;
    for entry in walkdir::WalkDir::new(public_dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "html"))
    {
        let Ok(relative) = entry.path().strip_prefix(public_dir) else {
            continue;
        };
        let Some(route) = html_to_route(relative) else {
            continue;
        };

        let mut page = SitemapEntry::new(route);
        if let Ok(modified) = entry.metadata().map_err(std::io::Error::from).and_then(|m| m.modified()) {
            page = page.with_lastmod(DateTime::<Utc>::from(modified));
        }
        session.record_prerendered_entry(page);
        count += 1;
    }

    tracing::info!(count, "recorded prerendered pages");
    Ok(count)
}

/// Map a prerendered HTML file to its route.
fn html_to_route(relative: &Path) -> Option<String> {
    let mut segments = Vec::new();
    for component in relative.components() {
        let Component::Normal(name) = component else {
            return None;
        };
        segments.push(name.to_str()?);
    }

    let file = segments.pop()?.strip_suffix(".html")?;
    if segments.is_empty() && FALLBACK_PAGES.contains(&file) {
        return None;
    }
    if file != "index" {
        segments.push(file);
    }

    Some(format!("/{}", segments.join("/")))
}
