use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// What the document's root element says it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SitemapKind {
    /// `<urlset>`: a list of pages.
    UrlSet,
    /// `<sitemapindex>`: a list of further sitemaps. Its `<loc>`s are
    /// listed like pages and never fetched.
    Index,
    Unknown,
}

impl SitemapKind {
    pub fn from_root_name(name: &str) -> Self {
        match name {
            "urlset" => SitemapKind::UrlSet,
            "sitemapindex" => SitemapKind::Index,
            _ => SitemapKind::Unknown,
        }
    }
}

impl fmt::Display for SitemapKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SitemapKind::UrlSet => write!(f, "urlset"),
            SitemapKind::Index => write!(f, "sitemap index"),
            SitemapKind::Unknown => write!(f, "unknown"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Sitemap {
    pub path: PathBuf,
    pub kind: SitemapKind,
    /// `<loc>` values in document order, trimmed, empties dropped.
    pub urls: Vec<String>,
}

impl Sitemap {
    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}
