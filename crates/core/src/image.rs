//! Image reference resolution.
//!
//! Spreadsheet editors paste either a plain image URL or a Google Drive
//! share link. Share links point at an HTML viewer, not at the image, so
//! they are rewritten to the Drive thumbnail service.

use std::sync::LazyLock;

use regex::Regex;

/// Substring that marks a Google Drive link.
const DRIVE_MARKER: &str = "drive.google.com";

/// Width requested from the thumbnail service.
const THUMBNAIL_WIDTH: u32 = 1000;

/// `/file/d/<id>/view` style share links.
static DRIVE_PATH_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/file/d/([a-zA-Z0-9_-]+)").expect("Invalid regex"));

/// `open?id=<id>` / `uc?export=view&id=<id>` style links.
static DRIVE_QUERY_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[?&]id=([a-zA-Z0-9_-]+)").expect("Invalid regex"));

/// Resolve a raw image reference to a URL an `<img>` tag can load.
///
/// Returns `None` when there is nothing usable: an empty cell, a Drive link
/// without a file id, or anything that is not an `http(s)` URL. Callers
/// render a placeholder in that case.
#[must_use]
pub fn resolve_image_url(raw: &str) -> Option<String> {
    if raw.is_empty() {
        return None;
    }

    if raw.contains(DRIVE_MARKER) {
        return drive_file_id(raw).map(|id| {
            format!("https://drive.google.com/thumbnail?id={id}&sz=w{THUMBNAIL_WIDTH}")
        });
    }

    if raw.starts_with("http://") || raw.starts_with("https://") {
        return Some(raw.to_string());
    }

    None
}

fn drive_file_id(url: &str) -> Option<&str> {
    DRIVE_PATH_ID_RE
        .captures(url)
        .or_else(|| DRIVE_QUERY_ID_RE.captures(url))
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drive_path_link() {
        let url = resolve_image_url("https://drive.google.com/file/d/ABC123/view?usp=sharing");
        assert_eq!(
            url.as_deref(),
            Some("https://drive.google.com/thumbnail?id=ABC123&sz=w1000")
        );
    }

    #[test]
    fn test_drive_query_link() {
        let url = resolve_image_url("https://drive.google.com/open?id=x_Y-9");
        assert!(url.is_some_and(|u| u.contains("id=x_Y-9")));

        let url = resolve_image_url("https://drive.google.com/uc?export=view&id=QQ1");
        assert!(url.is_some_and(|u| u.contains("QQ1")));
    }

    #[test]
    fn test_drive_link_without_id() {
        assert_eq!(resolve_image_url("https://drive.google.com/drive/my-drive"), None);
    }

    #[test]
    fn test_plain_http_links_pass_through() {
        assert_eq!(
            resolve_image_url("http://example.com/x.png").as_deref(),
            Some("http://example.com/x.png")
        );
        assert_eq!(
            resolve_image_url("https://cdn.example.com/urso.jpg").as_deref(),
            Some("https://cdn.example.com/urso.jpg")
        );
    }

    #[test]
    fn test_unusable_references() {
        assert_eq!(resolve_image_url(""), None);
        assert_eq!(resolve_image_url("ftp://x.com/y.png"), None);
        assert_eq!(resolve_image_url("imagens/urso.png"), None);
    }
}
