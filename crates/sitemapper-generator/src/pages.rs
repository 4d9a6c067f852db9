//! Static route inference from a file-routed pages directory.
//!
//! `pages/index.vue` is `/`, `pages/blog/index.vue` is `/blog`, and
//! `pages/blog/[slug].vue` is the dynamic route `/blog/:slug`.

use std::path::{Component, Path, PathBuf};

use thiserror::Error;
use tracing::debug;

/// Marker that identifies a dynamic route segment.
pub const DYNAMIC_SEGMENT_MARKER: char = ':';

/// Route inference errors.
#[derive(Debug, Error)]
pub enum InferenceError {
    /// Directory walk failed.
    #[error("failed to read pages directory: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Result type for route inference.
pub type Result<T> = std::result::Result<T, InferenceError>;

/// Source of the application's routes.
pub trait RouteInference: Send + Sync {
    /// All known route paths, static and dynamic.
    fn routes(&self) -> Result<Vec<String>>;
}

impl RouteInference for Vec<String> {
    fn routes(&self) -> Result<Vec<String>> {
        Ok(self.clone())
    }
}

/// Whether a route can be listed without parameter values.
#[must_use]
pub fn is_static_route(path: &str) -> bool {
    !path.contains(DYNAMIC_SEGMENT_MARKER)
}

/// Routes derived from the files of a pages directory.
#[derive(Debug, Clone)]
pub struct PagesDir {
    dir: PathBuf,
    extensions: Vec<String>,
}

impl PagesDir {
    pub fn new(dir: impl Into<PathBuf>, extensions: &[String]) -> Self {
        Self {
            dir: dir.into(),
            extensions: extensions.to_vec(),
        }
    }

    fn is_page(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|e| e == ext))
    }
}

impl RouteInference for PagesDir {
    fn routes(&self) -> Result<Vec<String>> {
        if !self.dir.is_dir() {
            debug!(dir = %self.dir.display(), "pages directory not found");
            return Ok(Vec::new());
        }

        let mut routes = Vec::new();
        for entry in walkdir::WalkDir::new(&self.dir) {
            let entry = entry?;
            if !entry.file_type().is_file() || !self.is_page(entry.path()) {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(&self.dir) else {
                continue;
            };
            if let Some(route) = file_to_route(relative) {
                routes.push(route);
            }
        }

        routes.sort();
        routes.dedup();
        debug!(dir = %self.dir.display(), count = routes.len(), "inferred routes");
        Ok(routes)
    }
}

/// Map a page file, relative to the pages directory, to its route.
fn file_to_route(relative: &Path) -> Option<String> {
    let mut segments = Vec::new();
    let components: Vec<_> = relative.components().collect();

    for (i, component) in components.iter().enumerate() {
        let Component::Normal(name) = component else {
            return None;
        };
        let name = name.to_str()?;
        if name.starts_with('_') || name.starts_with('.') {
            return None;
        }

        let is_file = i + 1 == components.len();
        let name = if is_file {
            Path::new(name).file_stem()?.to_str()?
        } else {
            name
        };
        if is_file && name == "index" {
            continue;
        }

        segments.push(segment_to_route(name));
    }

    Some(format!("/{}", segments.join("/")))
}

fn segment_to_route(name: &str) -> String {
    if let Some(inner) = name.strip_prefix("[[").and_then(|s| s.strip_suffix("]]")) {
        return format!(":{inner}?");
    }
    if let Some(inner) = name.strip_prefix("[...").and_then(|s| s.strip_suffix(']')) {
        return format!(":{inner}(.*)*");
    }
    if let Some(inner) = name.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
        return format!(":{inner}");
    }
    name.to_string()
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    #[test]
    fn test_file_to_route() {
        assert_eq!(file_to_route(Path::new("index.vue")).unwrap(), "/");
        assert_eq!(file_to_route(Path::new("about.vue")).unwrap(), "/about");
        assert_eq!(file_to_route(Path::new("blog/index.vue")).unwrap(), "/blog");
        assert_eq!(
            file_to_route(Path::new("blog/[slug].vue")).unwrap(),
            "/blog/:slug"
        );
        assert_eq!(
            file_to_route(Path::new("docs/[...path].vue")).unwrap(),
            "/docs/:path(.*)*"
        );
        assert!(file_to_route(Path::new("_partials/header.vue")).is_none());
    }

    #[test]
    fn test_pages_dir_routes() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "index.vue");
        touch(dir.path(), "about.vue");
        touch(dir.path(), "blog/index.vue");
        touch(dir.path(), "blog/[slug].vue");
        touch(dir.path(), "notes.txt");

        let pages = PagesDir::new(dir.path(), &["vue".to_string()]);
        let routes = pages.routes().unwrap();

        assert_eq!(routes, vec!["/", "/about", "/blog", "/blog/:slug"]);
    }

    #[test]
    fn test_missing_dir_has_no_routes() {
        let pages = PagesDir::new("/nonexistent/pages", &["vue".to_string()]);
        assert!(pages.routes().unwrap().is_empty());
    }

    #[test]
    fn test_is_static_route() {
        assert!(is_static_route("/about"));
        assert!(!is_static_route("/post/:id"));
    }
}
