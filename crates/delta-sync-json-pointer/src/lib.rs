//! Slash-delimited pointers addressing leaves inside a JSON document.
//!
//! These are the `path` / `from` strings carried by object patch operations.
//! The syntax follows [JSON Pointer (RFC 6901)](https://tools.ietf.org/html/rfc6901):
//! components are joined with `/`, and inside a component `~` is written as
//! `~0` and `/` as `~1`.
//!
//! # Example
//!
//! ```
//! use delta_sync_json_pointer::{format_json_pointer, get, parse_json_pointer};
//!
//! let path = parse_json_pointer("/user/name");
//! assert_eq!(path, vec!["user".to_string(), "name".to_string()]);
//! assert_eq!(format_json_pointer(&path), "/user/name");
//!
//! let doc = serde_json::json!({"user": {"name": "Ada"}});
//! assert_eq!(get(&doc, &path), Some(&serde_json::json!("Ada")));
//! ```

mod get;

pub use get::{get, get_mut};

/// A single step of a [`Path`]: an object key or a decimal array index.
pub type PathStep = String;

/// A parsed pointer. The empty path addresses the whole document.
pub type Path = Vec<PathStep>;

/// Unescapes a pointer component.
///
/// `~1` is replaced with `/` first, then `~0` with `~`, so that `~01`
/// decodes to `~1` rather than `/`.
///
/// # Example
///
/// ```
/// use delta_sync_json_pointer::unescape_component;
///
/// assert_eq!(unescape_component("a~0b"), "a~b");
/// assert_eq!(unescape_component("c~1d"), "c/d");
/// assert_eq!(unescape_component("~01"), "~1");
/// ```
pub fn unescape_component(component: &str) -> String {
    if !component.contains('~') {
        return component.to_string();
    }
    component.replace("~1", "/").replace("~0", "~")
}

/// Escapes a pointer component. Inverse of [`unescape_component`].
///
/// ```
/// use delta_sync_json_pointer::escape_component;
///
/// assert_eq!(escape_component("a~b"), "a~0b");
/// assert_eq!(escape_component("c/d"), "c~1d");
/// ```
pub fn escape_component(component: &str) -> String {
    if !component.contains('/') && !component.contains('~') {
        return component.to_string();
    }
    component.replace('~', "~0").replace('/', "~1")
}

/// Parses a pointer string into its components.
///
/// The leading slash is stripped and the remainder split on `/`. A pointer
/// without a leading slash is accepted and read as if it had one.
///
/// ```
/// use delta_sync_json_pointer::parse_json_pointer;
///
/// assert_eq!(parse_json_pointer(""), Vec::<String>::new());
/// assert_eq!(parse_json_pointer("/"), vec![""]);
/// assert_eq!(parse_json_pointer("/a~0b/c~1d"), vec!["a~b", "c/d"]);
/// assert_eq!(parse_json_pointer("a/b"), vec!["a", "b"]);
/// ```
pub fn parse_json_pointer(pointer: &str) -> Path {
    if pointer.is_empty() {
        return Vec::new();
    }
    let rest = pointer.strip_prefix('/').unwrap_or(pointer);
    rest.split('/').map(unescape_component).collect()
}

/// Formats path components as a pointer string. The root path formats as `""`.
pub fn format_json_pointer(path: &[String]) -> String {
    let mut out = String::with_capacity(path.len() * 8);
    for component in path {
        out.push('/');
        out.push_str(&escape_component(component));
    }
    out
}

/// Returns `base` extended by one `key`.
pub fn child_path(base: &[String], key: &str) -> Path {
    let mut path = Vec::with_capacity(base.len() + 1);
    path.extend_from_slice(base);
    path.push(key.to_string());
    path
}

/// Parses an array index step. Leading zeros and signs are rejected.
///
/// ```
/// use delta_sync_json_pointer::parse_index;
///
/// assert_eq!(parse_index("0"), Some(0));
/// assert_eq!(parse_index("12"), Some(12));
/// assert_eq!(parse_index("012"), None);
/// assert_eq!(parse_index("-"), None);
/// ```
pub fn parse_index(step: &str) -> Option<usize> {
    let bytes = step.as_bytes();
    if bytes.is_empty() || !bytes.iter().all(u8::is_ascii_digit) {
        return None;
    }
    if bytes.len() > 1 && bytes[0] == b'0' {
        return None;
    }
    step.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(steps: &[&str]) -> Path {
        steps.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parse_unescapes_tilde_one_before_tilde_zero() {
        assert_eq!(parse_json_pointer("/~01"), p(&["~1"]));
        assert_eq!(parse_json_pointer("/~10"), p(&["/0"]));
    }

    #[test]
    fn format_escapes_components() {
        assert_eq!(format_json_pointer(&p(&["a/b", "c~d"])), "/a~1b/c~0d");
        assert_eq!(format_json_pointer(&[]), "");
    }

    #[test]
    fn format_then_parse_preserves_awkward_keys() {
        let path = p(&["", "~", "/", "~1", "x/y~z"]);
        assert_eq!(parse_json_pointer(&format_json_pointer(&path)), path);
    }

    #[test]
    fn child_path_appends() {
        assert_eq!(child_path(&p(&["a"]), "b"), p(&["a", "b"]));
        assert_eq!(child_path(&[], "a"), p(&["a"]));
    }

    #[test]
    fn empty_key_path() {
        assert_eq!(parse_json_pointer("/"), p(&[""]));
        assert_eq!(format_json_pointer(&p(&[""])), "/");
    }
}
