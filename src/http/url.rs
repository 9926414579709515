//! Downstream URL rewriting.
//!
//! # Responsibilities
//! - Swap the incoming scheme and authority for the downstream's
//! - Map the incoming path and join it onto the downstream base path
//! - Carry the query string through untouched
//!
//! # Design Decisions
//! - Paths are handled in their raw (percent-encoded) form
//! - Exactly one slash separates base and mapped path
//! - A trailing slash on the mapped path survives the join

use axum::http::Uri;

/// The part of a downstream URL that mapped paths are appended to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BaseUrl {
    pub protocol: String,
    pub host: String,
    pub port: u16,
    pub path: String,
}

/// Rewrite a request URI onto `base`, mapping its path with `map`.
pub fn rewrite_uri(uri: &Uri, base: &BaseUrl, map: impl Fn(&str) -> String) -> String {
    rewrite(uri.path(), uri.query(), base, map)
}

/// Rewrite a path and query onto `base`, mapping the path with `map`.
///
/// A missing protocol renders a scheme-relative URL (`//host:port/...`).
pub fn rewrite(
    path: &str,
    query: Option<&str>,
    base: &BaseUrl,
    map: impl Fn(&str) -> String,
) -> String {
    let mapped = map(path);
    let full_path = assemble_full_path(&base.path, &mapped);

    let mut url = String::new();
    if !base.protocol.is_empty() {
        url.push_str(&base.protocol);
        url.push(':');
    }
    url.push_str("//");
    url.push_str(&base.host);
    url.push(':');
    url.push_str(&base.port.to_string());
    url.push_str(&full_path);
    if let Some(q) = query.filter(|q| !q.is_empty()) {
        url.push('?');
        url.push_str(q);
    }
    url
}

/// Join base and suffix into a path with exactly one leading slash,
/// or the empty string when both are empty.
fn assemble_full_path(base: &str, suffix: &str) -> String {
    let joined = join_preserving_trailing_slash(base, suffix);
    if joined.is_empty() {
        return joined;
    }
    format!("/{}", joined.trim_start_matches('/'))
}

fn join_preserving_trailing_slash(base: &str, suffix: &str) -> String {
    let mut joined = join(base, suffix.trim_start_matches('/'));
    if suffix.ends_with('/') {
        joined.push('/');
    }
    joined
}

/// Slash-join the non-empty elements and clean the result.
/// Returns the empty string when both elements are empty.
fn join(a: &str, b: &str) -> String {
    match (a.is_empty(), b.is_empty()) {
        (true, true) => String::new(),
        (false, true) => clean(a),
        (true, false) => clean(b),
        (false, false) => clean(&format!("{}/{}", a, b)),
    }
}

/// Lexically normalise a slash-separated path: collapse repeated slashes,
/// drop `.` segments, resolve `..` against earlier segments and strip any
/// trailing slash.
fn clean(path: &str) -> String {
    let rooted = path.starts_with('/');
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(&last) if last != ".." => {
                    segments.pop();
                }
                _ if rooted => {}
                _ => segments.push(".."),
            },
            s => segments.push(s),
        }
    }

    let body = segments.join("/");
    match (rooted, body.is_empty()) {
        (true, _) => format!("/{}", body),
        (false, true) => ".".to_string(),
        (false, false) => body,
    }
}
