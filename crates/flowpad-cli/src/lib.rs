//! Flowpad CLI library
//!
//! This module contains the core CLI logic for the Flowpad diagram editor.

pub mod error_adapter;

mod args;
mod config;

pub use args::Args;

use log::{info, warn};

use flowpad::{
    FlowpadError, Session,
    export::sankey::{self, SankeyRenderer},
};

/// Run the Flowpad CLI application
///
/// The pipeline mounts the default diagram, optionally restores the saved
/// one, applies the imports, lays the result out, optionally saves it and
/// finally writes the SVG to the output file. With `--sankey` it charts
/// that document instead and skips the diagram entirely.
///
/// A layout runs when `--layout` is given or anything was imported; the
/// direction defaults to the configured one.
///
/// # Errors
///
/// Returns `FlowpadError` for:
/// - Configuration loading errors
/// - Import read, parse and decode errors
/// - Layout errors
/// - Storage errors
/// - Export errors
pub fn run(args: &Args) -> Result<(), FlowpadError> {
    info!(
        output_path:? = args.output;
        "Processing diagram"
    );

    let app_config = config::with_default_storage(config::load_config(args.config.as_ref())?);

    if let Some(path) = &args.sankey {
        let diagram = sankey::read_sankey(path)?;
        SankeyRenderer::new()
            .with_style(app_config.style())?
            .export_to(&diagram, &args.output)?;
        info!(output_file:? = args.output; "Sankey chart exported successfully");
        return Ok(());
    }

    let default_direction = app_config.layout().direction();
    let mut session = Session::new(app_config);

    session.mount()?;

    if args.restore && !session.restore() {
        warn!("No saved diagram to restore");
    }

    if let Some(path) = &args.nodes {
        session.import_nodes(path)?;
    }
    if let Some(path) = &args.edges {
        session.import_edges(path)?;
    }

    let imported = args.nodes.is_some() || args.edges.is_some();
    if args.layout.is_some() || imported {
        session.layout(args.layout.unwrap_or(default_direction))?;
    }

    if args.save {
        session.save()?;
    }

    session.export_svg(&args.output)?;

    info!(output_file:? = args.output; "SVG exported successfully");

    Ok(())
}
