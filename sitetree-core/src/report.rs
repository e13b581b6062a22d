// Report generation from a rendered tree

use crate::error::ExportError;
use crate::render::{Indicator, RenderState};
use crate::tree::{NodeId, NodeKind};
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ReportFormat {
    Text,
    Json,
    Svg,
}

impl ReportFormat {
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            "svg" => Some(ReportFormat::Svg),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ReportFormat::Text => "txt",
            ReportFormat::Json => "json",
            ReportFormat::Svg => "svg",
        }
    }
}

/// One node of the nested JSON tree. Hidden nodes carry no position.
#[derive(Debug, Clone, Serialize)]
pub struct JsonNode {
    pub id: NodeId,
    pub name: String,
    pub url: String,
    pub kind: NodeKind,
    pub expanded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<JsonPosition>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<JsonNode>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct JsonPosition {
    pub x: f64,
    pub y: f64,
}

pub fn generate_text_report(state: &RenderState) -> String {
    let tree = state.tree();
    let stats = tree.stats();
    let mut report = String::new();

    report.push_str(RULE);
    report.push_str("                                  SITE TREE\n");
    report.push_str(RULE);
    report.push('\n');

    report.push_str(&format!("Origin:       {}\n", tree.origin()));
    report.push_str(&format!("Nodes:        {}\n", stats.nodes));
    report.push_str(&format!("Leaves:       {}\n", stats.leaves));
    report.push_str(&format!("Depth:        {}\n", stats.depth));
    report.push_str(&format!("Visible:      {}\n", state.visible_nodes().len()));
    report.push('\n');

    report.push_str(RULE);
    report.push('\n');
    report.push_str(&labelled(state, NodeId::ROOT));
    report.push('\n');
    push_branch(state, NodeId::ROOT, "", &mut report);
    report.push('\n');

    report
}

fn labelled(state: &RenderState, id: NodeId) -> String {
    let name = &state.tree()[id].name;
    match state.layout_node(id).and_then(|n| n.indicator.glyph()) {
        Some(glyph) => format!("{} {}", name, glyph),
        None => name.clone(),
    }
}

fn push_branch(state: &RenderState, id: NodeId, prefix: &str, out: &mut String) {
    if !state.is_expanded(id) {
        return;
    }
    let children = state.tree().children(id);
    for (i, &child) in children.iter().enumerate() {
        let is_last = i == children.len() - 1;
        let connector = if is_last { "└── " } else { "├── " };
        out.push_str(prefix);
        out.push_str(connector);
        out.push_str(&labelled(state, child));
        out.push('\n');

        let extension = if is_last { "    " } else { "│   " };
        push_branch(state, child, &format!("{}{}", prefix, extension), out);
    }
}

fn json_node(state: &RenderState, id: NodeId) -> JsonNode {
    let node = &state.tree()[id];
    JsonNode {
        id,
        name: node.name.clone(),
        url: node.url.clone(),
        kind: node.kind,
        expanded: node.has_children() && state.is_expanded(id),
        position: state
            .layout_node(id)
            .map(|n| JsonPosition { x: n.x, y: n.y }),
        children: node.children.iter().map(|&c| json_node(state, c)).collect(),
    }
}

pub fn generate_json_report(state: &RenderState) -> Result<String, serde_json::Error> {
    let tree = state.tree();
    let stats = tree.stats();
    let viewport = state.viewport();

    let json_report = serde_json::json!({
        "report": {
            "metadata": {
                "generator": "sitetree",
                "version": env!("CARGO_PKG_VERSION"),
                "generated_at": chrono::Utc::now().to_rfc3339(),
                "format": "json"
            },
            "site": {
                "origin": tree.origin(),
                "name": tree.root().name
            },
            "summary": {
                "total_nodes": stats.nodes,
                "leaves": stats.leaves,
                "depth": stats.depth,
                "visible_nodes": state.visible_nodes().len()
            },
            "layout": {
                "node_spacing": state.config().node_spacing,
                "depth_spacing": state.config().depth_spacing,
                "viewport": viewport
            },
            "tree": json_node(state, NodeId::ROOT)
        }
    });

    serde_json::to_string_pretty(&json_report)
}

/// Draw the current layout as a static SVG document. The breadth axis runs
/// down the page and depth runs to the right.
pub fn generate_svg_report(state: &RenderState) -> String {
    let viewport = state.viewport();
    let mut svg = String::new();

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"{l} {t} {w} {h}\" \
         style=\"max-width: none; height: auto; font: 18px sans-serif;\">\n",
        l = viewport.left,
        t = viewport.top,
        w = viewport.width(),
        h = viewport.height(),
    ));

    svg.push_str("  <g fill=\"none\" stroke=\"#555\" stroke-opacity=\"0.4\" stroke-width=\"1.5\">\n");
    for (parent, child) in state.links() {
        if let Some(path) = state.link_path(child.id) {
            let (sx, sy) = (path.source.x, path.source.y);
            let (tx, ty) = (path.target.x, path.target.y);
            let mid = (sy + ty) / 2.0;
            svg.push_str(&format!(
                "    <path data-source=\"{}\" data-target=\"{}\" d=\"M{},{}C{},{} {},{} {},{}\"/>\n",
                parent.id.index(),
                child.id.index(),
                sy,
                sx,
                mid,
                sx,
                mid,
                tx,
                ty,
                tx
            ));
        }
    }
    svg.push_str("  </g>\n");

    let config = state.config();
    svg.push_str("  <g>\n");
    for node in state.visible_nodes() {
        let tree_node = &state.tree()[node.id];
        let fill = if node.indicator == Indicator::Collapsed { "#555" } else { "#999" };

        svg.push_str(&format!("    <g transform=\"translate({},{})\">\n", node.y, node.x));
        svg.push_str(&format!(
            "      <circle r=\"2.5\" cx=\"{}\" fill=\"{}\"/>\n",
            -config.target_inset,
            fill
        ));
        svg.push_str(&format!(
            "      <a href=\"{}\" target=\"_blank\"><text dy=\"0.31em\" x=\"{}\" stroke=\"white\" stroke-width=\"3\" paint-order=\"stroke\">{}</text></a>\n",
            escape_xml(&tree_node.url),
            config.label_offset,
            escape_xml(&tree_node.name)
        ));
        if let (Some(glyph), Some(offset)) = (node.indicator.glyph(), node.indicator_x) {
            svg.push_str(&format!(
                "      <text dy=\"0.31em\" x=\"{}\" fill=\"#555\">{}</text>\n",
                offset,
                escape_xml(&glyph.to_string())
            ));
        }
        svg.push_str("    </g>\n");
    }
    svg.push_str("  </g>\n");
    svg.push_str("</svg>\n");

    svg
}

pub fn generate_report(state: &RenderState, format: ReportFormat) -> Result<String, ExportError> {
    Ok(match format {
        ReportFormat::Text => generate_text_report(state),
        ReportFormat::Json => generate_json_report(state)?,
        ReportFormat::Svg => generate_svg_report(state),
    })
}

pub fn save_report(content: &str, path: &Path) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
