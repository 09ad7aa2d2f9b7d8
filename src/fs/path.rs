//! Path utilities
//!
//! Pure string transforms over virtual paths. Nothing here looks at the tree:
//! a normalized path may or may not exist.

use regex_lite::Regex;

lazy_static::lazy_static! {
    /// Characters a node name may not contain.
    static ref FORBIDDEN_NAME_CHARS: Regex = Regex::new(r#"[\\/:*?"<>|']"#).unwrap();
}

/// Turn `path` into a canonical absolute path, resolving relative references against `cwd`.
///
/// `cwd` must itself be normalized. The result never has a trailing slash except for `/`.
/// Climbing above the root with `..` stays at the root.
pub fn normalize(path: &str, cwd: &str) -> String {
    let path = path.trim();
    if path.is_empty() {
        return cwd.to_string();
    }

    // "./x", "../x" and "x" are all relative to cwd; the segment pass below
    // collapses separators and resolves the dot segments.
    let absolute = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("{}/{}", cwd, path)
    };

    let mut resolved: Vec<&str> = Vec::new();
    for segment in absolute.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                resolved.pop();
            }
            name => resolved.push(name),
        }
    }

    if resolved.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", resolved.join("/"))
    }
}

/// Last segment of a normalized path. The root's base name is `/`.
pub fn basename(normalized: &str) -> &str {
    if normalized == "/" {
        return "/";
    }
    match normalized.rfind('/') {
        Some(pos) => &normalized[pos + 1..],
        None => normalized,
    }
}

/// Containing directory of a normalized path. The root is its own parent.
pub fn dirname(normalized: &str) -> &str {
    match normalized.rfind('/') {
        Some(0) | None => "/",
        Some(pos) => &normalized[..pos],
    }
}

/// Join a normalized directory path and a child name.
pub fn join(dir: &str, name: &str) -> String {
    if dir == "/" {
        format!("/{}", name)
    } else {
        format!("{}/{}", dir, name)
    }
}

/// Whether `path` is `ancestor` itself or lies below it. Both must be normalized.
pub fn is_within(path: &str, ancestor: &str) -> bool {
    if ancestor == "/" {
        return true;
    }
    path == ancestor
        || (path.starts_with(ancestor) && path.as_bytes().get(ancestor.len()) == Some(&b'/'))
}

/// Names must have visible characters, cannot be `.` or `..`,
/// and cannot contain any of `\ / : * ? " < > | '`.
pub fn is_valid_name(name: &str) -> bool {
    let name = name.trim();
    !name.is_empty() && name != "." && name != ".." && !FORBIDDEN_NAME_CHARS.is_match(name)
}

// ============================================================================
// Tests
// ============================================================================
