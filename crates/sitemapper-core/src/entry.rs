//! Sitemap URL entries and their metadata.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Change frequency for sitemap entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeFreq {
    Always,
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
    Never,
}

impl ChangeFreq {
    /// Protocol name of the frequency.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Always => "always",
            Self::Hourly => "hourly",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
            Self::Never => "never",
        }
    }
}

/// Alternate language link for a URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlternateLink {
    /// Language code (e.g., "en", "zh").
    pub lang: String,

    /// URL for this language version.
    pub url: String,
}

/// Image attached to a URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageEntry {
    /// Image location.
    pub loc: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

/// Optional sitemap fields of an entry.
///
/// Doubles as the partial entry used for defaults and route overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntryMeta {
    /// Last modification, as a W3C datetime.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lastmod: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changefreq: Option<ChangeFreq>,

    /// Priority (0.0 to 1.0).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<f32>,

    /// Alternate language versions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Vec<AlternateLink>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<ImageEntry>>,
}

impl EntryMeta {
    /// Shallow merge: every field set in `over` wins.
    #[must_use]
    pub fn merge(&self, over: &EntryMeta) -> EntryMeta {
        EntryMeta {
            lastmod: over.lastmod.clone().or_else(|| self.lastmod.clone()),
            changefreq: over.changefreq.or(self.changefreq),
            priority: over.priority.or(self.priority),
            links: over.links.clone().or_else(|| self.links.clone()),
            images: over.images.clone().or_else(|| self.images.clone()),
        }
    }

    /// Whether no field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == EntryMeta::default()
    }
}

/// A sitemap URL entry. Identity is the `url`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SitemapEntry {
    /// Site-relative path or absolute URL.
    pub url: String,

    #[serde(flatten)]
    pub meta: EntryMeta,
}

impl SitemapEntry {
    /// Create a bare entry.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            meta: EntryMeta::default(),
        }
    }

    /// Set the last modification time.
    #[must_use]
    pub fn with_lastmod(mut self, at: DateTime<Utc>) -> Self {
        self.meta.lastmod = Some(at.to_rfc3339_opts(SecondsFormat::Secs, true));
        self
    }

    #[must_use]
    pub fn with_changefreq(mut self, changefreq: ChangeFreq) -> Self {
        self.meta.changefreq = Some(changefreq);
        self
    }

    #[must_use]
    pub fn with_priority(mut self, priority: f32) -> Self {
        self.meta.priority = Some(priority);
        self
    }
}

/// A configured URL: either a bare path or a full entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UrlInput {
    Path(String),
    Entry(SitemapEntry),
}

impl From<UrlInput> for SitemapEntry {
    fn from(input: UrlInput) -> Self {
        match input {
            UrlInput::Path(url) => SitemapEntry::new(url),
            UrlInput::Entry(entry) => entry,
        }
    }
}

impl From<&str> for UrlInput {
    fn from(path: &str) -> Self {
        UrlInput::Path(path.to_string())
    }
}

impl From<SitemapEntry> for UrlInput {
    fn from(entry: SitemapEntry) -> Self {
        UrlInput::Entry(entry)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_merge_later_fields_win() {
        let base = EntryMeta {
            changefreq: Some(ChangeFreq::Daily),
            priority: Some(0.5),
            ..Default::default()
        };
        let over = EntryMeta {
            priority: Some(0.9),
            ..Default::default()
        };

        let merged = base.merge(&over);

        assert_eq!(merged.changefreq, Some(ChangeFreq::Daily));
        assert_eq!(merged.priority, Some(0.9));
    }

    #[test]
    fn test_url_input_untagged() {
        #[derive(Deserialize)]
        struct Wrapper {
            urls: Vec<UrlInput>,
        }

        let parsed: Wrapper = toml::from_str(
            r#"urls = ["/a", { url = "/b", priority = 0.9, changefreq = "weekly" }]"#,
        )
        .expect("parse urls");

        let entries: Vec<SitemapEntry> = parsed.urls.into_iter().map(Into::into).collect();
        assert_eq!(entries[0], SitemapEntry::new("/a"));
        assert_eq!(entries[1].url, "/b");
        assert_eq!(entries[1].meta.priority, Some(0.9));
        assert_eq!(entries[1].meta.changefreq, Some(ChangeFreq::Weekly));
    }

    #[test]
    fn test_with_lastmod_formats_w3c() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
        let entry = SitemapEntry::new("/").with_lastmod(at);
        assert_eq!(entry.meta.lastmod.as_deref(), Some("2024-03-01T12:30:00Z"));
    }

    #[test]
    fn test_is_empty() {
        assert!(EntryMeta::default().is_empty());
        assert!(!SitemapEntry::new("/").with_priority(0.1).meta.is_empty());
    }
}
