//! Sitemap configuration management.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{
    entry::{EntryMeta, UrlInput},
    error::{CoreError, Result},
};

/// Environment variable used when `sitemap.hostname` is not configured.
pub const SITE_URL_ENV: &str = "SITE_URL";

/// Main configuration structure for sitemapper.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Sitemap generation settings.
    #[serde(default)]
    pub sitemap: SitemapConfig,

    /// Build layout settings.
    #[serde(default)]
    pub build: BuildConfig,

    /// Per-route overrides, in registration order.
    #[serde(default)]
    pub route_rules: Vec<RouteRule>,
}

/// Sitemap generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SitemapConfig {
    /// Whether the sitemap should be generated.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Site origin (e.g., "https://example.com"). Required for emission.
    #[serde(default)]
    pub hostname: Option<String>,

    /// Append (true) or strip (false) the trailing slash of every URL.
    #[serde(default)]
    pub trailing_slash: bool,

    /// Fields merged into every entry.
    #[serde(default)]
    pub defaults: EntryMeta,

    /// Extra URLs to include.
    #[serde(default)]
    pub urls: Vec<UrlInput>,

    /// Serve the sitemap endpoints from the dev server.
    #[serde(default = "default_true")]
    pub dev_preview: bool,

    /// Add the static routes found in the pages directory.
    #[serde(default = "default_true")]
    pub infer_static_pages_as_routes: bool,

    /// Glob patterns a path must match.
    #[serde(default = "default_include")]
    pub include: Vec<String>,

    /// Glob patterns that drop a path.
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Output file, relative to the public directory.
    #[serde(default = "default_output")]
    pub output: String,

    /// Serializer options.
    #[serde(default)]
    pub xml: XmlOptions,
}

/// Options passed to the XML writer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct XmlOptions {
    /// Stylesheet referenced with `<?xml-stylesheet?>`.
    #[serde(default)]
    pub xsl_url: Option<String>,

    /// Always declare the `xhtml` namespace.
    #[serde(default)]
    pub xhtml: bool,

    /// Always declare the `image` namespace.
    #[serde(default)]
    pub image: bool,
}

/// Build layout configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Directory holding the built site; the sitemap is written here.
    #[serde(default = "default_public_dir")]
    pub public_dir: String,

    /// File-routed pages directory used for static route inference.
    #[serde(default = "default_pages_dir")]
    pub pages_dir: String,

    /// Extensions that count as pages.
    #[serde(default = "default_page_extensions")]
    pub page_extensions: Vec<String>,
}

/// A route rule carrying sitemap overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteRule {
    /// Path pattern, `*` for one segment and `**` for any number.
    pub pattern: String,

    /// `false` removes matching URLs from the sitemap.
    #[serde(default)]
    pub index: Option<bool>,

    /// Fields merged into matching entries.
    #[serde(default)]
    pub sitemap: Option<EntryMeta>,
}

// Default value functions
fn default_true() -> bool {
    true
}

fn default_include() -> Vec<String> {
    vec!["/**".to_string()]
}

fn default_output() -> String {
    "sitemap.xml".to_string()
}

fn default_public_dir() -> String {
    ".output/public".to_string()
}

fn default_pages_dir() -> String {
    "pages".to_string()
}

fn default_page_extensions() -> Vec<String> {
    ["vue", "html", "md", "tsx", "jsx"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl Default for SitemapConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            hostname: None,
            trailing_slash: false,
            defaults: EntryMeta::default(),
            urls: Vec::new(),
            dev_preview: true,
            infer_static_pages_as_routes: true,
            include: default_include(),
            exclude: Vec::new(),
            output: default_output(),
            xml: XmlOptions::default(),
        }
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            public_dir: default_public_dir(),
            pages_dir: default_pages_dir(),
            page_extensions: default_page_extensions(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CoreError::NotFound(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content).map_err(|e| match e {
            CoreError::Toml(source) => CoreError::config_with_source(
                format!("Failed to parse config file: {}", path.display()),
                source,
            ),
            other => other,
        })
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with `SITEMAPPER__*` environment overrides.
    ///
    /// `SITE_URL` fills in a missing hostname.
    pub fn load_with_env(path: &Path) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(config::Environment::with_prefix("SITEMAPPER").separator("__"))
            .build()?;

        let mut config: Config = settings.try_deserialize()?;
        if config.sitemap.hostname.is_none() {
            config.sitemap.hostname = std::env::var(SITE_URL_ENV)
                .ok()
                .filter(|url| !url.is_empty());
        }
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if let Some(hostname) = &self.sitemap.hostname {
            if !hostname.starts_with("http://") && !hostname.starts_with("https://") {
                return Err(CoreError::invalid(
                    "sitemap.hostname",
                    "must start with http:// or https://",
                ));
            }

            if hostname.ends_with('/') {
                tracing::warn!("sitemap.hostname should not have a trailing slash");
            }
        }

        if self.sitemap.output.is_empty() {
            return Err(CoreError::invalid("sitemap.output", "cannot be empty"));
        }
        if Path::new(&self.sitemap.output).is_absolute() {
            return Err(CoreError::invalid(
                "sitemap.output",
                "must be relative to build.public_dir",
            ));
        }

        for rule in &self.route_rules {
            if !rule.pattern.starts_with('/') {
                return Err(CoreError::invalid(
                    "route_rules.pattern",
                    format!("`{}` must start with `/`", rule.pattern),
                ));
            }
        }

        Ok(())
    }

    /// Hostname without a trailing slash, if configured.
    #[must_use]
    pub fn hostname(&self) -> Option<&str> {
        self.sitemap
            .hostname
            .as_deref()
            .map(|host| host.trim_end_matches('/'))
            .filter(|host| !host.is_empty())
    }

    /// Where the sitemap file is written.
    #[must_use]
    pub fn output_path(&self) -> PathBuf {
        Path::new(&self.build.public_dir).join(&self.sitemap.output)
    }

    /// Site-relative URL the sitemap is served from.
    #[must_use]
    pub fn sitemap_route(&self) -> String {
        format!("/{}", self.sitemap.output.trim_start_matches('/'))
    }
}
