//! Route rule resolution.
//!
//! Every rule whose pattern matches a path contributes its fields. Rules are
//! applied from least to most specific, so the most specific rule wins a
//! conflict; equally specific rules apply in registration order.

use globset::GlobMatcher;
use sitemapper_core::{EntryMeta, RouteRule};
use tracing::trace;

use crate::{
    filter::{Result, compile_matcher},
    paths::without_trailing_slash,
};

/// Effective override for one path.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    /// The path must be left out of the sitemap.
    pub suppressed: bool,

    /// Fields to merge onto the entry.
    pub overrides: EntryMeta,
}

#[derive(Debug)]
struct CompiledRule {
    matchers: Vec<GlobMatcher>,
    specificity: (usize, usize),
    index: Option<bool>,
    sitemap: Option<EntryMeta>,
}

impl CompiledRule {
    fn new(rule: &RouteRule) -> Result<Self> {
        let mut matchers = vec![compile_matcher(&rule.pattern)?];
        // `/section/**` also covers `/section` itself.
        if let Some(base) = rule.pattern.strip_suffix("/**") {
            if !base.is_empty() {
                matchers.push(compile_matcher(base)?);
            }
        }

        Ok(Self {
            matchers,
            specificity: specificity(&rule.pattern),
            index: rule.index,
            sitemap: rule.sitemap.clone(),
        })
    }

    fn is_match(&self, path: &str) -> bool {
        self.matchers.iter().any(|m| m.is_match(path))
    }
}

/// Literal segment count, then pattern length.
fn specificity(pattern: &str) -> (usize, usize) {
    let literal_segments = pattern
        .split('/')
        .filter(|segment| !segment.is_empty() && !segment.contains(['*', '?', '[', '{']))
        .count();
    (literal_segments, pattern.len())
}

/// Compiled route rule table.
#[derive(Debug, Default)]
pub struct RouteRules {
    rules: Vec<CompiledRule>,
}

impl RouteRules {
    /// Compile the rule patterns. Fails on the first malformed pattern.
    pub fn new(rules: &[RouteRule]) -> Result<Self> {
        let rules = rules.iter().map(CompiledRule::new).collect::<Result<_>>()?;
        Ok(Self { rules })
    }

    /// Number of rules in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Combine all rules matching `path`.
    #[must_use]
    pub fn resolve(&self, path: &str) -> Resolution {
        let path = without_trailing_slash(path);

        let mut matched: Vec<&CompiledRule> =
            self.rules.iter().filter(|rule| rule.is_match(&path)).collect();
        // Stable: registration order breaks ties.
        matched.sort_by_key(|rule| rule.specificity);

        let mut index = None;
        let mut overrides = EntryMeta::default();
        for rule in matched {
            if rule.index.is_some() {
                index = rule.index;
            }
            if let Some(sitemap) = &rule.sitemap {
                overrides = overrides.merge(sitemap);
            }
        }

        trace!(path = %path, ?index, "resolved route rules");

        Resolution {
            suppressed: index == Some(false),
            overrides,
        }
    }
}

#[cfg(test)]
mod tests {
    use sitemapper_core::ChangeFreq;

    use super::*;

    fn rule(pattern: &str, index: Option<bool>, sitemap: Option<EntryMeta>) -> RouteRule {
        RouteRule {
            pattern: pattern.to_string(),
            index,
            sitemap,
        }
    }

    fn priority(value: f32) -> EntryMeta {
        EntryMeta {
            priority: Some(value),
            ..Default::default()
        }
    }

    #[test]
    fn test_index_false_suppresses() {
        let rules = RouteRules::new(&[rule("/private/**", Some(false), None)]).unwrap();

        assert!(rules.resolve("/private/secret").suppressed);
        assert!(rules.resolve("/private").suppressed);
        assert!(!rules.resolve("/public").suppressed);
    }

    #[test]
    fn test_trailing_slash_ignored_for_matching() {
        let rules = RouteRules::new(&[rule("/about", Some(false), None)]).unwrap();
        assert!(rules.resolve("/about/").suppressed);
    }

    #[test]
    fn test_most_specific_rule_wins() {
        let rules = RouteRules::new(&[
            rule("/blog/featured", None, Some(priority(1.0))),
            rule("/blog/**", None, Some(priority(0.6))),
        ])
        .unwrap();

        assert_eq!(rules.resolve("/blog/featured").overrides.priority, Some(1.0));
        assert_eq!(rules.resolve("/blog/other").overrides.priority, Some(0.6));
    }

    #[test]
    fn test_fields_combine_across_rules() {
        let rules = RouteRules::new(&[
            rule(
                "/**",
                None,
                Some(EntryMeta {
                    changefreq: Some(ChangeFreq::Monthly),
                    ..Default::default()
                }),
            ),
            rule("/docs/**", None, Some(priority(0.7))),
        ])
        .unwrap();

        let resolved = rules.resolve("/docs/intro");
        assert_eq!(resolved.overrides.changefreq, Some(ChangeFreq::Monthly));
        assert_eq!(resolved.overrides.priority, Some(0.7));
    }

    #[test]
    fn test_later_registration_wins_tie() {
        let rules = RouteRules::new(&[
            rule("/shop/*", None, Some(priority(0.2))),
            rule("/shop/*", None, Some(priority(0.4))),
        ])
        .unwrap();

        assert_eq!(rules.resolve("/shop/item").overrides.priority, Some(0.4));
    }

    #[test]
    fn test_specific_index_true_overrides_wildcard_false() {
        let rules = RouteRules::new(&[
            rule("/private/**", Some(false), None),
            rule("/private/press-kit", Some(true), None),
        ])
        .unwrap();

        assert!(!rules.resolve("/private/press-kit").suppressed);
        assert!(rules.resolve("/private/other").suppressed);
    }

    #[test]
    fn test_no_match_is_empty() {
        let rules = RouteRules::new(&[rule("/a", Some(false), None)]).unwrap();
        assert_eq!(rules.resolve("/b"), Resolution::default());
    }
}
