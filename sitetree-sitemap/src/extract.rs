use crate::error::Result;
use crate::sitemap::SitemapKind;
use roxmltree::{Document, ParsingOptions};

fn parse(xml: &str) -> Result<Document<'_>> {
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    Ok(Document::parse_with_options(xml, options)?)
}

fn loc_values(doc: &Document<'_>) -> Vec<String> {
    doc.descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == "loc")
        .filter_map(|n| {
            let text: String = n
                .children()
                .filter(|c| c.is_text())
                .filter_map(|c| c.text())
                .collect();
            let text = text.trim();
            (!text.is_empty()).then(|| text.to_string())
        })
        .collect()
}

/// Text of every `<loc>` element in document order, whatever its namespace.
/// Surrounding whitespace is trimmed and empty elements are skipped.
pub fn extract_loc_urls(xml: &str) -> Result<Vec<String>> {
    let doc = parse(xml)?;
    Ok(loc_values(&doc))
}

pub(crate) fn extract_with_kind(xml: &str) -> Result<(SitemapKind, Vec<String>)> {
    let doc = parse(xml)?;
    let kind = SitemapKind::from_root_name(doc.root_element().tag_name().name());
    Ok((kind, loc_values(&doc)))
}
