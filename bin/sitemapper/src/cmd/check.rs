//! Check command - validate configuration and inferred routes

use std::path::Path;

use color_eyre::eyre::{Result, bail};
use sitemapper_core::Config;
use sitemapper_generator::{EntryPipeline, PagesDir, RouteInference, pages::is_static_route};

/// Validation result.
#[derive(Debug, Default)]
struct ValidationResult {
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl ValidationResult {
    fn add_error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Run the check command.
///
/// Validates configuration, compiles every pattern and reports the routes
/// that would be inferred from the pages directory.
pub async fn run(config_path: &Path, strict: bool) -> Result<()> {
    tracing::info!(?config_path, strict, "Checking configuration");

    let mut result = ValidationResult::default();

    println!("Checking configuration...");
    let config = match Config::load_with_env(config_path) {
        Ok(c) => {
            println!("  ✓ Configuration valid");
            Some(c)
        }
        Err(e) => {
            result.add_error(format!("Configuration error: {e}"));
            println!("  ✗ Configuration invalid: {e}");
            None
        }
    };

    if let Some(ref cfg) = config {
        println!("\nChecking patterns...");
        let pipeline = check_patterns(cfg, &mut result);

        println!("\nChecking configuration values...");
        for warning in quick_validate(cfg) {
            result.add_warning(warning);
        }
        check_public_dir(cfg, &mut result);
        println!("  ✓ Configuration values checked");

        if cfg.sitemap.infer_static_pages_as_routes {
            println!("\nInferring routes...");
            report_routes(cfg, pipeline.as_ref(), &mut result);
        }
    }

    // Print summary
    println!();
    println!("Summary:");
    println!("  Errors:   {}", result.errors.len());
    println!("  Warnings: {}", result.warnings.len());

    if result.has_errors() {
        println!();
        println!("Errors:");
        for err in &result.errors {
            println!("  ✗ {err}");
        }
    }

    if result.has_warnings() {
        println!();
        println!("Warnings:");
        for warn in &result.warnings {
            println!("  ⚠ {warn}");
        }
    }

    // Determine exit status
    if result.has_errors() {
        bail!("Validation failed with {} error(s)", result.errors.len());
    }

    if strict && result.has_warnings() {
        bail!(
            "Validation failed with {} warning(s) (strict mode)",
            result.warnings.len()
        );
    }

    println!();
    println!("✓ All checks passed");

    Ok(())
}

/// Quick validation for the build and dev commands.
///
/// Returns the non-fatal issues that would make the sitemap empty or absent.
pub fn quick_validate(config: &Config) -> Vec<String> {
    let mut warnings = Vec::new();

    if !config.sitemap.enabled {
        warnings.push("sitemap.enabled is false - no sitemap will be written".to_string());
    }

    if config.hostname().is_none() {
        warnings.push(
            "sitemap.hostname is not set (or SITE_URL) - no sitemap will be written".to_string(),
        );
    }

    if config.sitemap.infer_static_pages_as_routes && !Path::new(&config.build.pages_dir).is_dir()
    {
        warnings.push(format!(
            "Pages directory {}/ not found - no routes will be inferred",
            config.build.pages_dir
        ));
    }

    warnings
}

/// Compile include, exclude and route rule patterns.
fn check_patterns(config: &Config, result: &mut ValidationResult) -> Option<EntryPipeline> {
    match EntryPipeline::new(config) {
        Ok(pipeline) => {
            println!(
                "  ✓ {} include, {} exclude, {} route rule pattern(s) compiled",
                config.sitemap.include.len(),
                config.sitemap.exclude.len(),
                pipeline.rules().len()
            );
            Some(pipeline)
        }
        Err(e) => {
            result.add_error(format!("Pattern error: {e}"));
            println!("  ✗ {e}");
            None
        }
    }
}

/// Check the public directory is usable as an output location.
fn check_public_dir(config: &Config, result: &mut ValidationResult) {
    let public_dir = Path::new(&config.build.public_dir);
    if public_dir.exists() && !public_dir.is_dir() {
        result.add_error(format!(
            "Public path exists but is not a directory: {}",
            config.build.public_dir
        ));
    }
}

/// Print the routes inferred from the pages directory and what happens to them.
fn report_routes(config: &Config, pipeline: Option<&EntryPipeline>, result: &mut ValidationResult) {
    let pages = PagesDir::new(&config.build.pages_dir, &config.build.page_extensions);
    let routes = match pages.routes() {
        Ok(routes) => routes,
        Err(e) => {
            result.add_error(format!("Failed to read pages directory: {e}"));
            println!("  ✗ {e}");
            return;
        }
    };

    let mut listed = 0;
    for route in &routes {
        let status = route_status(route, pipeline);
        if status.is_empty() {
            listed += 1;
            println!("  ✓ {route}");
        } else {
            println!("  - {route} ({status})");
        }
    }

    println!("  ℹ {} route(s) found, {listed} listed", routes.len());
}

/// Why a route would be left out of the sitemap, empty when it is listed.
fn route_status(route: &str, pipeline: Option<&EntryPipeline>) -> &'static str {
    if !is_static_route(route) {
        return "dynamic";
    }
    let Some(pipeline) = pipeline else {
        return "";
    };
    if !pipeline.filter().should_include(route) {
        "filtered"
    } else if pipeline.rules().resolve(route).suppressed {
        "suppressed by route rule"
    } else {
        ""
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use sitemapper_core::RouteRule;
    use tempfile::TempDir;

    use super::*;
    use crate::test_env::without_site_url;

    #[test]
    fn test_quick_validate_missing_hostname() {
        let mut config = Config::default();
        config.build.pages_dir = "/nonexistent/pages".to_string();

        let warnings = quick_validate(&config);

        assert!(warnings.iter().any(|w| w.contains("hostname")));
        assert!(warnings.iter().any(|w| w.contains("/nonexistent/pages")));
    }

    #[test]
    fn test_quick_validate_clean() {
        let mut config = Config::default();
        config.sitemap.hostname = Some("https://example.com".to_string());
        config.sitemap.infer_static_pages_as_routes = false;

        assert!(quick_validate(&config).is_empty());
    }

    #[test]
    fn test_route_status() {
        let mut config = Config::default();
        config.sitemap.exclude = vec!["/admin/**".to_string()];
        config.route_rules = vec![RouteRule {
            pattern: "/private/**".to_string(),
            index: Some(false),
            sitemap: None,
        }];
        let pipeline = EntryPipeline::new(&config).unwrap();

        assert_eq!(route_status("/about", Some(&pipeline)), "");
        assert_eq!(route_status("/blog/:slug", Some(&pipeline)), "dynamic");
        assert_eq!(route_status("/admin/users", Some(&pipeline)), "filtered");
        assert_eq!(
            route_status("/private/notes", Some(&pipeline)),
            "suppressed by route rule"
        );
    }

    #[tokio::test]
    async fn test_check_valid_config() {
        let _env = without_site_url();
        let site = TempDir::new().unwrap();
        let config_path = site.path().join("sitemapper.toml");
        fs::write(
            &config_path,
            r#"
[sitemap]
hostname = "https://example.com"
infer_static_pages_as_routes = false
"#,
        )
        .unwrap();

        assert!(run(&config_path, true).await.is_ok());
    }

    #[tokio::test]
    async fn test_check_strict_fails_on_warnings() {
        let _env = without_site_url();
        let site = TempDir::new().unwrap();
        let config_path = site.path().join("sitemapper.toml");
        fs::write(&config_path, "[sitemap]\ninfer_static_pages_as_routes = false\n").unwrap();

        assert!(run(&config_path, false).await.is_ok());
        assert!(run(&config_path, true).await.is_err());
    }

    #[tokio::test]
    async fn test_check_invalid_pattern_fails() {
        let _env = without_site_url();
        let site = TempDir::new().unwrap();
        let config_path = site.path().join("sitemapper.toml");
        fs::write(
            &config_path,
            r#"
[sitemap]
hostname = "https://example.com"
infer_static_pages_as_routes = false
exclude = ["/a[b"]
"#,
        )
        .unwrap();

        assert!(run(&config_path, false).await.is_err());
    }
}
