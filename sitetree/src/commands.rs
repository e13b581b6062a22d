use crate::CLAP_STYLING;
use clap::{Arg, arg, command};
use sitetree_core::config::InitialExpansion;

fn sitemap_arg() -> Arg {
    arg!(<FILE>)
        .required(true)
        .help("Path to a sitemap XML file")
}

fn layout_args() -> [Arg; 3] {
    [
        arg!(-e --"expand" <POLICY>)
            .required(false)
            .help("Nodes expanded at start: depth:N, all or none")
            .value_parser(clap::value_parser!(InitialExpansion))
            .default_value("depth:1"),
        arg!(--"node-spacing" <UNITS>)
            .required(false)
            .help("Distance between sibling nodes")
            .value_parser(clap::value_parser!(f64)),
        arg!(--"depth-spacing" <UNITS>)
            .required(false)
            .help("Distance between tree levels")
            .value_parser(clap::value_parser!(f64)),
    ]
}

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("sitetree")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("sitetree")
        .styles(CLAP_STYLING)
        .arg(
            arg!(-q --"quiet" "Suppress banner and non-essential output")
                .required(false)
                .global(true),
        )
        .subcommand_required(false)
        .subcommand(
            command!("view")
                .about("Browse a sitemap as a collapsible tree in the terminal")
                .arg(sitemap_arg())
                .args(layout_args()),
        )
        .subcommand(
            command!("tree")
                .about("Print the expanded part of a sitemap's tree")
                .arg(sitemap_arg())
                .args(layout_args()),
        )
        .subcommand(
            command!("export")
                .about("Write the tree layout to a file")
                .arg(sitemap_arg())
                .args(layout_args())
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .help("Export format: text, json, svg")
                        .value_parser(["text", "json", "svg"])
                        .default_value("svg"),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("Output file (default: the sitemap's name with the format's extension)"),
                ),
        )
}
