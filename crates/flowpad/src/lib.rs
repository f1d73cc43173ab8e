//! Flowpad - a headless flow-diagram editor.
//!
//! Keeps an ordered set of nodes and edges, applies editor gestures to them
//! through a single reducer, imports definitions from relaxed-JSON files,
//! arranges the graph with a layered layout engine, persists the diagram to
//! a key/value slot and renders it to SVG.

pub mod changes;
pub mod config;
pub mod editor;
pub mod export;
pub mod import;
pub mod initial;
pub mod layout;
pub mod persist;
pub mod store;

mod error;

pub use flowpad_core::{
    color, direction, edge, geometry, identifier, node, snapshot, style, viewport,
};

pub use error::FlowpadError;

use std::path::Path;

use log::{debug, error, info};

use flowpad_core::{direction::Direction, identifier::SequentialIds, snapshot::Snapshot};

use config::AppConfig;
use editor::{Command, Editor, Effect};
use export::svg::SvgExporter;
use layout::{LayoutEngine, LayoutOptions, SugiyamaEngine};
use persist::{FileStorage, MemoryStorage, Storage};

/// An editing session: the editor plus the services it talks to.
///
/// The session performs the effects the editor asks for. Layout runs
/// synchronously, so by the time [`Session::dispatch`] returns any layout
/// it triggered has been applied.
///
/// # Examples
///
/// ```rust,no_run
/// use flowpad::{Session, config::AppConfig, direction::Direction};
///
/// let mut session = Session::new(AppConfig::default());
///
/// // Lay out the built-in graph
/// session.mount().expect("Failed to mount");
///
/// // Replace the nodes from a file and rearrange left to right
/// session.import_nodes("nodes.json").expect("Failed to import");
/// session.layout(Direction::Right).expect("Failed to lay out");
///
/// let svg = session.render_svg().expect("Failed to render");
/// println!("{svg}");
/// ```
pub struct Session {
    config: AppConfig,
    editor: Editor,
    engine: Box<dyn LayoutEngine>,
    storage: Box<dyn Storage>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}

impl Session {
    /// Creates a session for `config`.
    ///
    /// Layout uses [`SugiyamaEngine`]. The diagram is stored in the file
    /// named by the storage configuration, or in memory when none is set.
    pub fn new(config: AppConfig) -> Self {
        let storage: Box<dyn Storage> = match config.storage().path() {
            Some(path) => {
                debug!(path:? = path; "Using file storage");
                Box::new(FileStorage::new(path))
            }
            None => Box::new(MemoryStorage::new()),
        };
        let editor = Editor::new(
            Box::new(SequentialIds::default()),
            LayoutOptions::from(config.layout()),
        );

        Self {
            config,
            editor,
            engine: Box::new(SugiyamaEngine::new()),
            storage,
        }
    }

    /// Replaces the layout engine.
    pub fn with_engine(mut self, engine: Box<dyn LayoutEngine>) -> Self {
        self.engine = engine;
        self
    }

    /// Replaces the storage backend.
    pub fn with_storage(mut self, storage: Box<dyn Storage>) -> Self {
        self.storage = storage;
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    pub fn snapshot(&self) -> Snapshot {
        self.editor.snapshot()
    }

    /// Applies `command` and performs whatever effect it produces.
    ///
    /// # Errors
    ///
    /// Returns [`FlowpadError::Layout`] when a triggered layout failed. The
    /// diagram keeps its previous positions in that case.
    pub fn dispatch(&mut self, command: Command) -> Result<(), FlowpadError> {
        match self.editor.dispatch(command) {
            Some(effect) => self.perform(effect),
            None => Ok(()),
        }
    }

    fn perform(&mut self, effect: Effect) -> Result<(), FlowpadError> {
        match effect {
            Effect::Layout(request) => {
                let ticket = request.ticket();
                let result = request.run(self.engine.as_ref());
                let failure = result.as_ref().err().cloned();

                self.editor.dispatch(Command::LayoutCompleted { ticket, result });

                match failure {
                    Some(err) => Err(err.into()),
                    None => Ok(()),
                }
            }
        }
    }

    /// Lays out the built-in default graph top to bottom.
    pub fn mount(&mut self) -> Result<(), FlowpadError> {
        info!("Mounting default diagram");
        self.dispatch(Command::RequestLayout {
            direction: Direction::Down,
            use_initial: true,
        })
    }

    /// Arranges the current graph in `direction`.
    pub fn layout(&mut self, direction: Direction) -> Result<(), FlowpadError> {
        info!(direction:% = direction; "Laying out diagram");
        self.dispatch(Command::RequestLayout {
            direction,
            use_initial: false,
        })
    }

    /// Replaces the node sequence with the contents of a node file.
    ///
    /// # Errors
    ///
    /// Read, parse and decode failures are logged and returned; the nodes
    /// are left unchanged.
    pub fn import_nodes(&mut self, path: impl AsRef<Path>) -> Result<(), FlowpadError> {
        let path = path.as_ref();
        let nodes = import::read_nodes(path).inspect_err(|err| {
            error!(path:? = path, err:% = err; "Failed to import nodes");
        })?;

        info!(path:? = path, count = nodes.len(); "Nodes imported");
        self.dispatch(Command::ReplaceNodes(nodes))
    }

    /// Replaces the edge sequence with the contents of an edge file.
    ///
    /// # Errors
    ///
    /// See [`Session::import_nodes`].
    pub fn import_edges(&mut self, path: impl AsRef<Path>) -> Result<(), FlowpadError> {
        let path = path.as_ref();
        let edges = import::read_edges(path).inspect_err(|err| {
            error!(path:? = path, err:% = err; "Failed to import edges");
        })?;

        info!(path:? = path, count = edges.len(); "Edges imported");
        self.dispatch(Command::ReplaceEdges(edges))
    }

    /// Writes the current diagram to the configured storage key.
    pub fn save(&mut self) -> Result<(), FlowpadError> {
        let snapshot = self.editor.snapshot();
        persist::save(
            self.storage.as_mut(),
            self.config.storage().key(),
            &snapshot,
        )?;
        Ok(())
    }

    /// Replaces the diagram with the one saved under the configured key.
    ///
    /// Returns `false`, leaving the diagram untouched, when nothing usable
    /// is stored.
    pub fn restore(&mut self) -> bool {
        let Some(snapshot) = persist::restore(self.storage.as_ref(), self.config.storage().key())
        else {
            return false;
        };
        self.editor.dispatch(Command::Restore(snapshot));
        true
    }

    fn exporter(&self) -> Result<SvgExporter, FlowpadError> {
        let exporter = SvgExporter::new()
            .with_style(self.config.style())?
            .with_fallback_size(self.config.layout().node_size());
        Ok(exporter)
    }

    /// Renders the current diagram to an SVG string.
    pub fn render_svg(&self) -> Result<String, FlowpadError> {
        Ok(self.exporter()?.render_to_string(&self.editor.snapshot()))
    }

    /// Renders the current diagram and writes it to `path`.
    pub fn export_svg(&self, path: impl AsRef<Path>) -> Result<(), FlowpadError> {
        self.exporter()?.export_to(&self.editor.snapshot(), path)?;
        Ok(())
    }
}
