//! Trailing-slash normalization.

/// Split a URL into its path and the `?query#fragment` suffix.
fn split_suffix(url: &str) -> (&str, &str) {
    match url.find(['?', '#']) {
        Some(idx) => url.split_at(idx),
        None => (url, ""),
    }
}

/// Add a trailing slash to the path part of `url`.
#[must_use]
pub fn with_trailing_slash(url: &str) -> String {
    let (path, suffix) = split_suffix(url);
    if path.ends_with('/') {
        url.to_string()
    } else {
        format!("{path}/{suffix}")
    }
}

/// Strip the trailing slash from the path part of `url`. The root stays `/`.
#[must_use]
pub fn without_trailing_slash(url: &str) -> String {
    let (path, suffix) = split_suffix(url);
    match path.strip_suffix('/') {
        Some(stripped) if !stripped.is_empty() => format!("{stripped}{suffix}"),
        _ if path.is_empty() => format!("/{suffix}"),
        _ => url.to_string(),
    }
}

/// Apply the configured trailing-slash policy.
#[must_use]
pub fn fix_slashes(url: &str, trailing_slash: bool) -> String {
    if trailing_slash {
        with_trailing_slash(url)
    } else {
        without_trailing_slash(url)
    }
}
