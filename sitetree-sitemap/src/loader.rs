use crate::error::{Result, SitemapError};
use crate::extract::extract_with_kind;
use crate::sitemap::Sitemap;
use std::path::Path;
use tracing::{debug, info};

/// Read and parse a sitemap file.
///
/// The file must either carry a `.xml` extension or look like XML (start with
/// a declaration or an element). A document without any `<loc>` is rejected.
pub async fn load_sitemap(path: impl AsRef<Path>) -> Result<Sitemap> {
    let path = path.as_ref();
    debug!("Reading sitemap {}", path.display());

    let bytes = tokio::fs::read(path).await.map_err(|source| SitemapError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let content = String::from_utf8(bytes).map_err(|e| SitemapError::NotXml {
        path: path.to_path_buf(),
        reason: format!("not valid UTF-8 ({})", e.utf8_error()),
    })?;

    parse_sitemap(path, &content)
}

/// Parse sitemap text that was already read from `path`.
pub fn parse_sitemap(path: impl AsRef<Path>, content: &str) -> Result<Sitemap> {
    let path = path.as_ref();
    if !has_xml_extension(path) && !looks_like_xml(content) {
        return Err(SitemapError::NotXml {
            path: path.to_path_buf(),
            reason: "expected a .xml file or XML content".to_string(),
        });
    }

    let (kind, urls) = extract_with_kind(strip_bom(content))?;
    if urls.is_empty() {
        return Err(SitemapError::NoUrls);
    }

    info!("Loaded {} URLs from {} ({})", urls.len(), path.display(), kind);
    Ok(Sitemap {
        path: path.to_path_buf(),
        kind,
        urls,
    })
}

fn has_xml_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("xml"))
}

fn strip_bom(content: &str) -> &str {
    content.strip_prefix('\u{feff}').unwrap_or(content)
}

fn looks_like_xml(content: &str) -> bool {
    strip_bom(content).trim_start().starts_with('<')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_check() {
        assert!(has_xml_extension(Path::new("sitemap.xml")));
        assert!(has_xml_extension(Path::new("SITEMAP.XML")));
        assert!(!has_xml_extension(Path::new("sitemap.txt")));
        assert!(!has_xml_extension(Path::new("sitemap")));
    }

    #[test]
    fn test_content_sniffing() {
        assert!(looks_like_xml("<?xml version=\"1.0\"?><urlset/>"));
        assert!(looks_like_xml("\u{feff}\n  <urlset/>"));
        assert!(!looks_like_xml("https://ex.com/a\nhttps://ex.com/b"));
    }
}
