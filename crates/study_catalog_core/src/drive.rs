//! crates/study_catalog_core/src/drive.rs
//!
//! Google Drive link handling: which hosts the PDF proxy may reach and how a
//! stored resource link is turned into download, preview and viewer URLs.

use regex::Regex;
use std::sync::OnceLock;
use url::Url;

/// Hosts the PDF proxy is allowed to fetch from.
pub const ALLOWED_HOSTS: [&str; 3] = [
    "drive.google.com",
    "docs.google.com",
    "lh3.googleusercontent.com",
];

pub const PROXY_PATH: &str = "/api/pdf-proxy";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProxyTargetError {
    #[error("Invalid URL")]
    InvalidUrl,
    #[error("Only Google Drive URLs are allowed")]
    HostNotAllowed,
}

/// Parses a proxy target and checks its host against [`ALLOWED_HOSTS`].
pub fn check_proxy_target(raw: &str) -> Result<Url, ProxyTargetError> {
    let url = Url::parse(raw).map_err(|_| ProxyTargetError::InvalidUrl)?;
    match url.host_str() {
        Some(host) if ALLOWED_HOSTS.contains(&host) => Ok(url),
        _ => Err(ProxyTargetError::HostNotAllowed),
    }
}

fn file_path_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"/file/d/([^/]+)").expect("valid file path pattern"))
}

fn bare_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9_-]{10,}$").expect("valid bare id pattern"))
}

/// Extracts the Drive file id from a sharing link, an `?id=` link or a bare id.
pub fn file_id(link: &str) -> Option<String> {
    let link = link.trim();
    if let Ok(url) = Url::parse(link) {
        if let Some(captures) = file_path_pattern().captures(url.path()) {
            return Some(captures[1].to_string());
        }
        return url
            .query_pairs()
            .find(|(key, _)| key == "id")
            .map(|(_, value)| value.into_owned())
            .filter(|id| !id.is_empty());
    }
    bare_id_pattern()
        .is_match(link)
        .then(|| link.to_string())
}

pub fn download_url(link: &str) -> Option<String> {
    file_id(link).map(|id| format!("https://drive.google.com/uc?export=download&id={id}"))
}

pub fn embed_url(link: &str) -> Option<String> {
    file_id(link).map(|id| format!("https://drive.google.com/file/d/{id}/preview"))
}

/// Same-origin path that streams the document through the PDF proxy. Links
/// that are not Drive links are proxied as they are.
pub fn viewer_path(link: &str) -> String {
    let target = download_url(link).unwrap_or_else(|| link.trim().to_string());
    let encoded: String = url::form_urlencoded::byte_serialize(target.as_bytes()).collect();
    format!("{PROXY_PATH}?file={encoded}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use claims::{assert_none, assert_ok};
    use pretty_assertions::assert_eq;

    #[test]
    fn proxy_targets_must_be_drive_hosts() {
        assert_ok!(check_proxy_target("https://drive.google.com/uc?export=download&id=abc"));
        assert_ok!(check_proxy_target("https://lh3.googleusercontent.com/d/abc"));
        assert_eq!(
            check_proxy_target("https://evil.example.com/file.pdf"),
            Err(ProxyTargetError::HostNotAllowed)
        );
        assert_eq!(
            check_proxy_target("https://drive.google.com.evil.example/x"),
            Err(ProxyTargetError::HostNotAllowed)
        );
        assert_eq!(check_proxy_target("not a url"), Err(ProxyTargetError::InvalidUrl));
    }

    #[test]
    fn extracts_ids_from_every_link_shape() {
        assert_eq!(
            file_id("https://drive.google.com/file/d/13MhaFv9kT4kKdJXzuBwqpU8k5yPUKjVs/view?usp=sharing"),
            Some("13MhaFv9kT4kKdJXzuBwqpU8k5yPUKjVs".to_string())
        );
        assert_eq!(
            file_id("https://drive.google.com/open?id=1otywgJTLT_q_5QFmxKzCsvofDwZC0g68"),
            Some("1otywgJTLT_q_5QFmxKzCsvofDwZC0g68".to_string())
        );
        assert_eq!(
            file_id("1GkyaRvVxTNLjBmhucho7ryWgUF7JeO7D"),
            Some("1GkyaRvVxTNLjBmhucho7ryWgUF7JeO7D".to_string())
        );
        assert_none!(file_id("https://example.com/book.pdf"));
        assert_none!(file_id("short"));
    }

    #[test]
    fn viewer_path_goes_through_the_proxy() {
        let path = viewer_path("1GkyaRvVxTNLjBmhucho7ryWgUF7JeO7D");
        assert_eq!(
            path,
            "/api/pdf-proxy?file=https%3A%2F%2Fdrive.google.com%2Fuc%3Fexport%3Ddownload%26id%3D1GkyaRvVxTNLjBmhucho7ryWgUF7JeO7D"
        );
        assert_eq!(
            embed_url("1GkyaRvVxTNLjBmhucho7ryWgUF7JeO7D").as_deref(),
            Some("https://drive.google.com/file/d/1GkyaRvVxTNLjBmhucho7ryWgUF7JeO7D/preview")
        );
    }
}
