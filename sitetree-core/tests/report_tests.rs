// Tests for report generation functionality

use sitetree_core::config::{InitialExpansion, LayoutConfig};
use sitetree_core::measure::FixedAdvance;
use sitetree_core::render::RenderState;
use sitetree_core::report::{
    ReportFormat, generate_json_report, generate_report, generate_svg_report, generate_text_report,
    save_report,
};
use sitetree_core::tree::build_tree;
use tempfile::TempDir;

fn sample_state(expansion: InitialExpansion) -> RenderState {
    let tree = build_tree([
        "https://ex.com/docs/guide",
        "https://ex.com/docs/api",
        "https://ex.com/about",
        "https://ex.com/search?q=a&b",
    ])
    .unwrap();
    let config = LayoutConfig::default().with_initial_expansion(expansion);
    RenderState::initialize(tree, config, &FixedAdvance::default()).0
}

// ============================================================================
// Report Format Tests
// ============================================================================

#[test]
fn test_report_format_from_str() {
    assert_eq!(ReportFormat::from_str("text"), Some(ReportFormat::Text));
    assert_eq!(ReportFormat::from_str("txt"), Some(ReportFormat::Text));
    assert_eq!(ReportFormat::from_str("json"), Some(ReportFormat::Json));
    assert_eq!(ReportFormat::from_str("svg"), Some(ReportFormat::Svg));
}

#[test]
fn test_report_format_from_str_case_insensitive() {
    assert_eq!(ReportFormat::from_str("JSON"), Some(ReportFormat::Json));
    assert_eq!(ReportFormat::from_str("Svg"), Some(ReportFormat::Svg));
}

#[test]
fn test_report_format_from_str_invalid() {
    assert!(ReportFormat::from_str("pdf").is_none());
    assert!(ReportFormat::from_str("").is_none());
}

#[test]
fn test_report_format_extension() {
    assert_eq!(ReportFormat::Text.extension(), "txt");
    assert_eq!(ReportFormat::Json.extension(), "json");
    assert_eq!(ReportFormat::Svg.extension(), "svg");
}

// ============================================================================
// Text Report Tests
// ============================================================================

#[test]
fn test_text_report_shows_visible_tree() {
    let report = generate_text_report(&sample_state(InitialExpansion::default()));

    assert!(report.contains("SITE TREE"));
    assert!(report.contains("Origin:       https://ex.com"));
    assert!(report.contains("Nodes:        6"));
    assert!(report.contains("ex.com <\n"));
    assert!(report.contains("├── docs >\n"));
    assert!(report.contains("├── about\n"));
    assert!(report.contains("└── search\n"));
    assert!(!report.contains("guide"));
}

#[test]
fn test_text_report_nests_expanded_branches() {
    let report = generate_text_report(&sample_state(InitialExpansion::All));

    assert!(report.contains("├── docs <\n"));
    assert!(report.contains("│   ├── guide\n"));
    assert!(report.contains("│   └── api\n"));
}

// ============================================================================
// JSON Report Tests
// ============================================================================

#[test]
fn test_json_report_structure() {
    let json = generate_json_report(&sample_state(InitialExpansion::default())).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    let report = &value["report"];

    assert_eq!(report["metadata"]["generator"], "sitetree");
    assert!(report["metadata"]["generated_at"].is_string());
    assert_eq!(report["site"]["origin"], "https://ex.com");
    assert_eq!(report["summary"]["total_nodes"], 6);
    assert_eq!(report["summary"]["visible_nodes"], 4);
    assert_eq!(report["tree"]["name"], "ex.com");
    assert_eq!(report["tree"]["kind"], "root");
}

#[test]
fn test_json_report_includes_hidden_nodes_without_position() {
    let json = generate_json_report(&sample_state(InitialExpansion::default())).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    let docs = &value["report"]["tree"]["children"][0];
    assert_eq!(docs["name"], "docs");
    assert_eq!(docs["expanded"], false);
    assert!(docs["position"].is_object());

    let guide = &docs["children"][0];
    assert_eq!(guide["url"], "https://ex.com/docs/guide");
    assert!(guide.get("position").is_none());
}

// ============================================================================
// SVG Report Tests
// ============================================================================

#[test]
fn test_svg_report_draws_nodes_and_links() {
    let state = sample_state(InitialExpansion::All);
    let svg = generate_svg_report(&state);

    assert!(svg.starts_with("<svg"));
    assert!(svg.trim_end().ends_with("</svg>"));
    assert_eq!(svg.matches("<path ").count(), state.visible_nodes().len() - 1);
    assert_eq!(svg.matches("<circle ").count(), state.visible_nodes().len());
    assert!(svg.contains("href=\"https://ex.com/docs/api\""));
}

#[test]
fn test_svg_report_escapes_indicators() {
    let svg = generate_svg_report(&sample_state(InitialExpansion::default()));
    assert!(svg.contains(">&gt;</text>"));
    assert!(svg.contains(">&lt;</text>"));
}

// ============================================================================
// Save Tests
// ============================================================================

#[test]
fn test_save_report_writes_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tree.txt");
    let content = generate_report(&sample_state(InitialExpansion::default()), ReportFormat::Text).unwrap();

    save_report(&content, &path).unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), content);
}

#[test]
fn test_save_report_missing_directory_fails() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("missing").join("tree.json");
    assert!(save_report("{}", &path).is_err());
}
