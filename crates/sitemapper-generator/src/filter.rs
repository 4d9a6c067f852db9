//! URL filtering with include/exclude glob patterns.
//!
//! `*` matches inside a single path segment and `**` matches any number of
//! segments, including none.

use globset::{GlobBuilder, GlobMatcher, GlobSet, GlobSetBuilder};
use thiserror::Error;

/// Pattern compilation errors.
#[derive(Debug, Error)]
pub enum FilterError {
    /// A glob pattern could not be compiled.
    #[error("invalid pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },
}

/// Result type for filter operations.
pub type Result<T> = std::result::Result<T, FilterError>;

/// Compile a path glob where `*` does not cross `/`.
pub(crate) fn compile_glob(pattern: &str) -> Result<globset::Glob> {
    GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map_err(|source| FilterError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })
}

/// Compile a single path glob into a matcher.
pub(crate) fn compile_matcher(pattern: &str) -> Result<GlobMatcher> {
    Ok(compile_glob(pattern)?.compile_matcher())
}

fn build_set(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(compile_glob(pattern)?);
    }
    builder.build().map_err(|source| FilterError::InvalidPattern {
        pattern: patterns.join(", "),
        source,
    })
}

/// Decides which paths belong in the sitemap.
#[derive(Debug, Clone)]
pub struct UrlFilter {
    include: GlobSet,
    exclude: GlobSet,
}

impl UrlFilter {
    /// Compile the include and exclude patterns.
    ///
    /// An empty include list includes every path.
    pub fn new(include: &[String], exclude: &[String]) -> Result<Self> {
        Ok(Self {
            include: build_set(include)?,
            exclude: build_set(exclude)?,
        })
    }

    /// Whether `path` matches an include pattern and no exclude pattern.
    #[must_use]
    pub fn should_include(&self, path: &str) -> bool {
        let included = self.include.is_empty() || self.include.is_match(path);
        included && !self.exclude.is_match(path)
    }
}

impl Default for UrlFilter {
    fn default() -> Self {
        Self {
            include: GlobSet::empty(),
            exclude: GlobSet::empty(),
        }
    }
}
