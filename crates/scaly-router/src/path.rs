//! Route path normalisation.
//!
//! Route keys are compared case-insensitively. Every key stored in a
//! [`RoutingTable`](crate::RoutingTable) is the output of [`normalize`]:
//! the path component only, ASCII lower-cased, with a leading `/` and no
//! trailing `/` (except for the root itself).

/// Reduces a URI or path to its routing key.
///
/// # Example
///
/// ```rust
/// use scaly_router::path::normalize;
///
/// assert_eq!(normalize("/Blog/Posts/"), "/blog/posts");
/// assert_eq!(normalize("https://example.com/Shop?page=2"), "/shop");
/// assert_eq!(normalize(""), "/");
/// ```
#[must_use]
pub fn normalize(uri_or_path: &str) -> String {
    let path = request_path(uri_or_path);
    let trimmed = path.trim_end_matches('/');

    let mut key = String::with_capacity(trimmed.len() + 1);
    if !trimmed.starts_with('/') {
        key.push('/');
    }
    key.push_str(trimmed);
    key.make_ascii_lowercase();
    key
}

/// Returns the path component of `uri_or_path` with case and trailing
/// slashes preserved.
///
/// Scheme, authority, query and fragment are dropped. The result always
/// starts with `/`.
#[must_use]
pub fn request_path(uri_or_path: &str) -> String {
    let path = strip_authority(uri_or_path);
    let path = path.split(['?', '#']).next().unwrap_or_default();

    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}

/// Splits what follows the first `prefix_len` bytes of `path` into
/// positional arguments, skipping empty segments.
pub(crate) fn residual_arguments(path: &str, prefix_len: usize) -> Vec<String> {
    path.get(prefix_len..)
        .unwrap_or_default()
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}

fn strip_authority(uri: &str) -> &str {
    match uri.find("://") {
        Some(scheme_end) => {
            let rest = &uri[scheme_end + 3..];
            rest.find(['/', '?', '#'])
                .map_or("/", |start| &rest[start..])
        }
        None => uri,
    }
}
