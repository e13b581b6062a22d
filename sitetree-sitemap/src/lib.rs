pub mod error;
pub mod extract;
pub mod loader;
pub mod sitemap;

pub use error::SitemapError;
pub use extract::extract_loc_urls;
pub use loader::{load_sitemap, parse_sitemap};
pub use sitemap::{Sitemap, SitemapKind};
