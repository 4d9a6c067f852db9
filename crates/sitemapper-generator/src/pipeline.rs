//! Final entry processing shared by emission and the dev preview.

use sitemapper_core::{Config, EntryMeta, SitemapEntry};
use tracing::debug;

use crate::{
    collector::{sort_by_url_len, unique_by_url},
    filter::{Result, UrlFilter},
    paths::fix_slashes,
    route_rules::RouteRules,
};

/// Filters, orders, applies route rules and dedups entries.
#[derive(Debug)]
pub struct EntryPipeline {
    filter: UrlFilter,
    rules: RouteRules,
    defaults: EntryMeta,
    trailing_slash: bool,
}

impl EntryPipeline {
    /// Compile filter and route rule patterns from configuration.
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            filter: UrlFilter::new(&config.sitemap.include, &config.sitemap.exclude)?,
            rules: RouteRules::new(&config.route_rules)?,
            defaults: config.sitemap.defaults.clone(),
            trailing_slash: config.sitemap.trailing_slash,
        })
    }

    #[must_use]
    pub fn filter(&self) -> &UrlFilter {
        &self.filter
    }

    #[must_use]
    pub fn rules(&self) -> &RouteRules {
        &self.rules
    }

    /// Produce the final list.
    ///
    /// Entry fields lose to the configured defaults, which lose to route rule
    /// overrides. Entries suppressed by a rule are dropped.
    #[must_use]
    pub fn apply(&self, entries: Vec<SitemapEntry>) -> Vec<SitemapEntry> {
        let total = entries.len();

        let mut entries: Vec<SitemapEntry> = entries
            .into_iter()
            .filter(|entry| self.filter.should_include(&entry.url))
            .collect();
        sort_by_url_len(&mut entries);

        let resolved: Vec<SitemapEntry> = entries
            .into_iter()
            .filter_map(|entry| {
                let resolution = self.rules.resolve(&entry.url);
                if resolution.suppressed {
                    debug!(url = %entry.url, "suppressed by route rule");
                    return None;
                }

                Some(SitemapEntry {
                    url: fix_slashes(&entry.url, self.trailing_slash),
                    meta: entry
                        .meta
                        .merge(&self.defaults)
                        .merge(&resolution.overrides),
                })
            })
            .collect();

        let resolved = unique_by_url(resolved);
        debug!(total, kept = resolved.len(), "processed entries");
        resolved
    }
}
