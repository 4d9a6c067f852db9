//! Sitemap serialization.
//!
//! Writes entries as a `<urlset>` document following the sitemaps.org protocol.

use std::io::Write;

use sitemapper_core::{Config, SitemapEntry, XmlOptions};
use thiserror::Error;
use tracing::debug;

const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";
const XHTML_NS: &str = "http://www.w3.org/1999/xhtml";
const IMAGE_NS: &str = "http://www.google.com/schemas/sitemap-image/1.1";

/// Sitemap generation errors.
#[derive(Debug, Error)]
pub enum SitemapError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// XML encoding error.
    #[error("XML encoding error: {0}")]
    Xml(String),
}

/// Result type for sitemap operations.
pub type Result<T> = std::result::Result<T, SitemapError>;

/// Serializes sitemap entries to XML.
#[derive(Debug, Clone)]
pub struct SitemapWriter {
    hostname: Option<String>,
    options: XmlOptions,
}

impl SitemapWriter {
    /// Create a new writer. Relative URLs are resolved against `hostname`.
    #[must_use]
    pub fn new(hostname: Option<&str>, options: XmlOptions) -> Self {
        Self {
            hostname: hostname.map(|host| host.trim_end_matches('/').to_string()),
            options,
        }
    }

    /// Create a writer from the `sitemap` config section.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.hostname(), config.sitemap.xml.clone())
    }

    #[must_use]
    pub fn options(&self) -> &XmlOptions {
        &self.options
    }

    /// Serializer options, open for hooks to adjust before writing.
    pub fn options_mut(&mut self) -> &mut XmlOptions {
        &mut self.options
    }

    /// Generate sitemap XML from entries.
    pub fn write(&self, urls: &[SitemapEntry]) -> Result<String> {
        debug!(count = urls.len(), "serializing sitemap");

        let xhtml = self.options.xhtml
            || urls
                .iter()
                .any(|u| u.meta.links.as_ref().is_some_and(|l| !l.is_empty()));
        let image = self.options.image
            || urls
                .iter()
                .any(|u| u.meta.images.as_ref().is_some_and(|i| !i.is_empty()));

        let mut xml = String::from(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        xml.push('\n');
        if let Some(xsl) = &self.options.xsl_url {
            xml.push_str(&format!(
                r#"<?xml-stylesheet type="text/xsl" href="{}"?>"#,
                escape_xml(xsl)
            ));
            xml.push('\n');
        }

        xml.push_str(&format!(r#"<urlset xmlns="{SITEMAP_NS}""#));
        if xhtml {
            xml.push_str(&format!(r#" xmlns:xhtml="{XHTML_NS}""#));
        }
        if image {
            xml.push_str(&format!(r#" xmlns:image="{IMAGE_NS}""#));
        }
        xml.push_str(">\n");

        for url in urls {
            xml.push_str(&self.url_to_xml(url)?);
        }

        xml.push_str("</urlset>\n");

        Ok(xml)
    }

    /// Write sitemap to a writer.
    pub fn write_to<W: Write>(&self, urls: &[SitemapEntry], writer: &mut W) -> Result<()> {
        let xml = self.write(urls)?;
        writer.write_all(xml.as_bytes())?;
        Ok(())
    }

    /// Absolute location of a URL.
    fn loc(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            return url.to_string();
        }
        match &self.hostname {
            Some(host) if url.starts_with('/') => format!("{host}{url}"),
            Some(host) => format!("{host}/{url}"),
            None => url.to_string(),
        }
    }

    /// Convert a URL entry to XML.
    fn url_to_xml(&self, entry: &SitemapEntry) -> Result<String> {
        if entry.url.is_empty() {
            return Err(SitemapError::Xml("entry has an empty url".to_string()));
        }

        let meta = &entry.meta;
        let mut xml = String::from("  <url>\n");

        xml.push_str(&format!(
            "    <loc>{}</loc>\n",
            escape_xml(&self.loc(&entry.url))
        ));

        if let Some(lastmod) = &meta.lastmod {
            xml.push_str(&format!("    <lastmod>{}</lastmod>\n", escape_xml(lastmod)));
        }

        if let Some(changefreq) = &meta.changefreq {
            xml.push_str(&format!(
                "    <changefreq>{}</changefreq>\n",
                changefreq.as_str()
            ));
        }

        if let Some(priority) = &meta.priority {
            xml.push_str(&format!("    <priority>{priority:.1}</priority>\n"));
        }

        for link in meta.links.iter().flatten() {
            xml.push_str(&format!(
                r#"    <xhtml:link rel="alternate" hreflang="{}" href="{}" />"#,
                escape_xml(&link.lang),
                escape_xml(&self.loc(&link.url))
            ));
            xml.push('\n');
        }

        for image in meta.images.iter().flatten() {
            xml.push_str("    <image:image>\n");
            xml.push_str(&format!(
                "      <image:loc>{}</image:loc>\n",
                escape_xml(&self.loc(&image.loc))
            ));
            if let Some(title) = &image.title {
                xml.push_str(&format!(
                    "      <image:title>{}</image:title>\n",
                    escape_xml(title)
                ));
            }
            if let Some(caption) = &image.caption {
                xml.push_str(&format!(
                    "      <image:caption>{}</image:caption>\n",
                    escape_xml(caption)
                ));
            }
            xml.push_str("    </image:image>\n");
        }

        xml.push_str("  </url>\n");
        Ok(xml)
    }
}

/// Escape special XML characters.
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
