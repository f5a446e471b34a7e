//! Module-id and path helpers shared by the loader.

/// File extensions recognized as markdown documents.
pub const MARKDOWN_EXTENSIONS: &[&str] = &["md", "markdown", "mdown", "mkdn", "mkd", "mdwn"];

/// Drops a `?query` suffix from a module id.
pub fn strip_query(id: &str) -> &str {
    id.split_once('?').map_or(id, |(path, _)| path)
}

/// Returns true when `id` names a markdown file.
///
/// # Examples
///
/// ```
/// use mdmod_core::paths::is_markdown_file;
///
/// assert!(is_markdown_file("/src/pages/index.md"));
/// assert!(is_markdown_file("/src/pages/post.markdown?raw"));
/// assert!(!is_markdown_file("/src/pages/post.mdx"));
/// ```
pub fn is_markdown_file(id: &str) -> bool {
    let path = strip_query(id);
    match path.rsplit_once('.') {
        Some((stem, ext)) => {
            !stem.is_empty() && !ext.contains('/') && MARKDOWN_EXTENSIONS.contains(&ext)
        }
        None => false,
    }
}

/// Returns true for image sources that point at files next to the document
/// rather than at URLs, data URIs, fragments or the public directory.
pub fn is_local_image_path(src: &str) -> bool {
    if src.is_empty() || src.starts_with('/') || src.starts_with('#') {
        return false;
    }
    !has_url_scheme(src)
}

fn has_url_scheme(src: &str) -> bool {
    let Some((scheme, _)) = src.split_once(':') else {
        return false;
    };
    let mut chars = scheme.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// Parent directory of a `/`-separated path (`.` when there is none).
pub fn dirname(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) => "/",
        Some(idx) => &path[..idx],
        None => ".",
    }
}

/// Joins `specifier` onto the directory of `importer` and normalizes `.` and
/// `..` segments lexically. Never touches the filesystem.
pub fn join_relative(importer: &str, specifier: &str) -> String {
    let dir = dirname(strip_query(importer));
    normalize(&format!("{}/{}", dir, specifier))
}

/// Lexically normalizes a `/`-separated path.
pub fn normalize(path: &str) -> String {
    let absolute = path.starts_with('/');
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(&last) if last != ".." => {
                    segments.pop();
                }
                _ if absolute => {}
                _ => segments.push(".."),
            },
            other => segments.push(other),
        }
    }

    let joined = segments.join("/");
    match (absolute, joined.is_empty()) {
        (true, _) => format!("/{}", joined),
        (false, true) => ".".to_string(),
        (false, false) => joined,
    }
}
