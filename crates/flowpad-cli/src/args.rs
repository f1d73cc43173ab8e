//! Command-line argument definitions for the Flowpad CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments select the files to import, the layout
//! direction, whether to restore or save the stored diagram, a Sankey
//! document to chart instead, the output path, the configuration file and
//! logging verbosity.

use std::path::PathBuf;

use clap::Parser;

use flowpad::direction::Direction;

/// Command-line arguments for the Flowpad diagram editor
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Relaxed-JSON file holding an array of nodes
    #[arg(long)]
    pub nodes: Option<PathBuf>,

    /// Relaxed-JSON file holding an array of edges
    #[arg(long)]
    pub edges: Option<PathBuf>,

    /// Lay out the diagram in this direction (UP, DOWN, LEFT, RIGHT)
    #[arg(long, value_name = "DIR")]
    pub layout: Option<Direction>,

    /// Start from the diagram saved in storage
    #[arg(long)]
    pub restore: bool,

    /// Save the resulting diagram to storage
    #[arg(long)]
    pub save: bool,

    /// Render this relaxed-JSON Sankey document instead of a diagram
    #[arg(long, value_name = "FILE", conflicts_with_all = ["nodes", "edges", "layout", "restore", "save"])]
    pub sankey: Option<PathBuf>,

    /// Path to the output SVG file
    #[arg(short, long, default_value = "out.svg")]
    pub output: PathBuf,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
