use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SitemapError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is not an XML file: {reason}", path.display())]
    NotXml { path: PathBuf, reason: String },

    #[error("XML parse error: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("No <loc> URLs found")]
    NoUrls,
}

pub type Result<T> = std::result::Result<T, SitemapError>;
