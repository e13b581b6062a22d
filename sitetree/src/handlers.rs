use anyhow::{Context, Result};
use clap::ArgMatches;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use sitetree_core::config::{InitialExpansion, LayoutConfig};
use sitetree_core::measure::FixedAdvance;
use sitetree_core::render::RenderState;
use sitetree_core::report::{ReportFormat, generate_report, generate_text_report, save_report};
use sitetree_core::tree::{SiteTree, build_tree};
use sitetree_sitemap::load_sitemap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

pub fn print_banner() {
    let banner = r#"
      _ _       _
  ___(_) |_ ___| |_ _ __ ___  ___
 / __| | __/ _ \ __| '__/ _ \/ _ \
 \__ \ | ||  __/ |_| | |  __/  __/
 |___/_|\__\___|\__|_|  \___|\___|
"#;
    println!("{}", banner.bright_cyan().bold());
    println!(
        "  {} {}\n",
        "sitemap explorer".bright_white(),
        format!("v{}", env!("CARGO_PKG_VERSION")).bright_black()
    );
}

fn print_divider() {
    println!("{}", "═".repeat(60).bright_blue().bold());
}

fn fail(e: anyhow::Error) -> ! {
    eprintln!("{} {:#}", "✗".red().bold(), e);
    std::process::exit(1);
}

/// Expand `~` and environment variables in a user-supplied path.
pub fn resolve_path(raw: &str) -> PathBuf {
    let expanded = shellexpand::full(raw)
        .map(|p| p.into_owned())
        .unwrap_or_else(|_| shellexpand::tilde(raw).into_owned());
    PathBuf::from(expanded)
}

/// Where `export` writes when no `--output` is given: next to the sitemap,
/// with the format's extension.
pub fn default_output_path(input: &Path, format: ReportFormat) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "sitetree".to_string());
    input.with_file_name(format!("{}-tree.{}", stem, format.extension()))
}

/// Apply `--expand`, `--node-spacing` and `--depth-spacing` on top of `base`.
pub fn layout_config_from_args(args: &ArgMatches, base: LayoutConfig) -> LayoutConfig {
    let mut config = base;
    if let Some(expansion) = args.get_one::<InitialExpansion>("expand") {
        config = config.with_initial_expansion(*expansion);
    }
    if let Some(spacing) = args.get_one::<f64>("node-spacing") {
        config = config.with_node_spacing(*spacing);
    }
    if let Some(spacing) = args.get_one::<f64>("depth-spacing") {
        config = config.with_depth_spacing(*spacing);
    }
    config
}

/// Read a sitemap and build its URL tree.
pub async fn load_site_tree(path: &Path, show_progress: bool) -> Result<SiteTree> {
    let spinner = if show_progress {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .context("Invalid spinner template")?,
        );
        spinner.enable_steady_tick(Duration::from_millis(100));
        spinner.set_message(format!("Reading {}", path.display()));
        Some(spinner)
    } else {
        None
    };

    let result = async {
        let sitemap = load_sitemap(path).await?;
        if let Some(spinner) = &spinner {
            spinner.set_message(format!("Building tree from {} URLs", sitemap.len()));
        }
        let tree = build_tree(&sitemap.urls)
            .with_context(|| format!("Failed to build a tree from {}", path.display()))?;
        Ok::<_, anyhow::Error>((sitemap, tree))
    }
    .await;

    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    let (sitemap, tree) = result?;
    if show_progress {
        println!(
            "{} Loaded {} ({}, {} URLs, {} nodes)",
            "✓".green().bold(),
            path.display().to_string().bright_white(),
            sitemap.kind,
            sitemap.len(),
            tree.len()
        );
    }
    Ok(tree)
}

fn sitemap_path(args: &ArgMatches) -> PathBuf {
    let raw = args
        .get_one::<String>("FILE")
        .map(String::as_str)
        .unwrap_or_default();
    resolve_path(raw)
}

/// True when `-q/--quiet` was given before or after the subcommand.
pub fn is_quiet(args: &ArgMatches) -> bool {
    args.get_flag("quiet")
}

fn init_logging() {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();
}

pub async fn handle_view(args: &ArgMatches) {
    let path = sitemap_path(args);
    let tree = match load_site_tree(&path, !is_quiet(args)).await {
        Ok(tree) => tree,
        Err(e) => fail(e),
    };

    let expansion = args
        .get_one::<InitialExpansion>("expand")
        .copied()
        .unwrap_or_default();
    let config = layout_config_from_args(args, sitetree_tui::cell_layout_config(expansion));

    if let Err(e) = sitetree_tui::run(tree, config) {
        fail(e.context("Error running TUI"));
    }
}

pub async fn handle_tree(args: &ArgMatches) {
    init_logging();

    let path = sitemap_path(args);
    let tree = match load_site_tree(&path, false).await {
        Ok(tree) => tree,
        Err(e) => fail(e),
    };

    let config = layout_config_from_args(args, LayoutConfig::default());
    let (state, _) = RenderState::initialize(tree, config, &FixedAdvance::default());
    print!("{}", generate_text_report(&state));
}

pub async fn handle_export(args: &ArgMatches) {
    init_logging();

    let path = sitemap_path(args);
    let format = args
        .get_one::<String>("format")
        .and_then(|f| ReportFormat::from_str(f))
        .unwrap_or(ReportFormat::Svg);
    let output = args
        .get_one::<String>("output")
        .map(|o| resolve_path(o))
        .unwrap_or_else(|| default_output_path(&path, format));

    let quiet = is_quiet(args);
    if !quiet {
        print_divider();
        println!("{}", "  SITETREE EXPORT".bright_white().bold());
        print_divider();
        println!(
            "{} Source: {}",
            "→".blue(),
            path.display().to_string().bright_white()
        );
        println!(
            "{} Format: {}",
            "→".blue(),
            format!("{:?}", format).to_lowercase().bright_white()
        );
        println!();
    }

    let tree = match load_site_tree(&path, !quiet).await {
        Ok(tree) => tree,
        Err(e) => fail(e),
    };

    let config = layout_config_from_args(args, LayoutConfig::default());
    debug!(
        "Export layout: expansion {}, spacing {}x{}",
        config.initial_expansion, config.node_spacing, config.depth_spacing
    );
    let (state, _) = RenderState::initialize(tree, config, &FixedAdvance::default());

    let written = generate_report(&state, format)
        .context("Failed to generate report")
        .and_then(|content| {
            save_report(&content, &output)
                .with_context(|| format!("Failed to write {}", output.display()))
        });
    if let Err(e) = written {
        fail(e);
    }
    if quiet {
        return;
    }

    println!(
        "{} Wrote {} ({} visible of {} nodes)",
        "✓".green().bold(),
        output.display().to_string().bright_white(),
        state.visible_nodes().len(),
        state.tree().len()
    );
}
