//! The editor reducer.
//!
//! Every gesture and every asynchronous completion reaches the diagram as a
//! [`Command`] passed to [`Editor::dispatch`]. The editor updates its
//! [`DiagramStore`] and, when work has to happen outside the reducer,
//! returns an [`Effect`] for the caller to perform. The only such work today
//! is running a layout; its result comes back as
//! [`Command::LayoutCompleted`].

use log::{debug, error, info};

use flowpad_core::{
    direction::Direction,
    edge::{Connection, Edge},
    geometry::Point,
    identifier::{IdGenerator, SequentialIds},
    node::{Node, NodeKind},
    snapshot::Snapshot,
    viewport::Viewport,
};

use crate::{
    changes::{EdgeChange, NodeChange},
    initial,
    layout::{LayoutError, LayoutOptions, LayoutOutcome, LayoutRequest, LayoutTicket},
    store::DiagramStore,
};

/// An input to the editor.
#[derive(Debug, Clone)]
pub enum Command {
    NodesChanged(Vec<NodeChange>),
    EdgesChanged(Vec<EdgeChange>),
    Connect(Connection),
    ReconnectStart {
        edge_id: String,
    },
    Reconnect {
        edge_id: String,
        connection: Connection,
    },
    ReconnectEnd {
        edge_id: String,
    },
    /// A palette item was dropped on the surface. `payload` names the node
    /// kind; `client` is the pointer position in window coordinates.
    Drop {
        payload: String,
        client: Point,
    },
    ReplaceNodes(Vec<Node>),
    ReplaceEdges(Vec<Edge>),
    SetViewport(Viewport),
    /// Top-left corner of the diagram surface in window coordinates.
    SetSurfaceOrigin(Point),
    /// Lays out the current graph, or the built-in default graph when
    /// `use_initial` is set.
    RequestLayout {
        direction: Direction,
        use_initial: bool,
    },
    LayoutCompleted {
        ticket: LayoutTicket,
        result: Result<LayoutOutcome, LayoutError>,
    },
    Restore(Snapshot),
}

/// Work the caller must perform on the editor's behalf.
#[derive(Debug, Clone)]
pub enum Effect {
    /// Run the request and dispatch its result as
    /// [`Command::LayoutCompleted`].
    Layout(LayoutRequest),
}

/// Diagram state plus the bookkeeping gestures need.
pub struct Editor {
    store: DiagramStore,
    ids: Box<dyn IdGenerator>,
    surface_origin: Point,
    layout_options: LayoutOptions,
    next_ticket: LayoutTicket,
    /// Ticket of the only layout whose completion will be applied.
    pending_layout: Option<LayoutTicket>,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(Box::new(SequentialIds::default()), LayoutOptions::default())
    }
}

impl Editor {
    pub fn new(ids: Box<dyn IdGenerator>, layout_options: LayoutOptions) -> Self {
        Self {
            store: DiagramStore::new(),
            ids,
            surface_origin: Point::default(),
            layout_options,
            next_ticket: LayoutTicket::new(0),
            pending_layout: None,
        }
    }

    pub fn store(&self) -> &DiagramStore {
        &self.store
    }

    pub fn nodes(&self) -> &[Node] {
        self.store.nodes()
    }

    pub fn edges(&self) -> &[Edge] {
        self.store.edges()
    }

    pub fn viewport(&self) -> Viewport {
        self.store.viewport()
    }

    pub fn surface_origin(&self) -> Point {
        self.surface_origin
    }

    /// Ticket of the layout still awaiting completion, if any.
    pub fn pending_layout(&self) -> Option<LayoutTicket> {
        self.pending_layout
    }

    /// Captures nodes, edges and viewport for persistence.
    pub fn snapshot(&self) -> Snapshot {
        self.store.snapshot()
    }

    /// Applies `command` and returns any effect the caller must perform.
    ///
    /// A layout result replaces the whole graph, so any edit that adds,
    /// removes or rewires an element cancels the layout in flight.
    pub fn dispatch(&mut self, command: Command) -> Option<Effect> {
        match command {
            Command::NodesChanged(changes) => {
                if changes.iter().any(NodeChange::is_structural) {
                    self.discard_pending_layout();
                }
                self.store.apply_node_changes(&changes);
            }
            Command::EdgesChanged(changes) => {
                if changes.iter().any(EdgeChange::is_structural) {
                    self.discard_pending_layout();
                }
                self.store.apply_edge_changes(&changes);
            }
            Command::Connect(connection) => {
                if self.store.connect(&connection).is_some() {
                    self.discard_pending_layout();
                }
            }
            Command::ReconnectStart { edge_id } => self.store.begin_reconnect(&edge_id),
            Command::Reconnect {
                edge_id,
                connection,
            } => {
                if self.store.reconnect_edge(&edge_id, &connection) {
                    self.discard_pending_layout();
                }
            }
            Command::ReconnectEnd { edge_id } => {
                if self.store.end_reconnect(&edge_id) {
                    self.discard_pending_layout();
                }
            }
            Command::Drop { payload, client } => {
                if self.drop_node(&payload, client) {
                    self.discard_pending_layout();
                }
            }
            Command::ReplaceNodes(nodes) => {
                self.discard_pending_layout();
                self.store.replace_nodes(nodes);
            }
            Command::ReplaceEdges(edges) => {
                self.discard_pending_layout();
                self.store.replace_edges(edges);
            }
            Command::SetViewport(viewport) => self.store.set_viewport(viewport),
            Command::SetSurfaceOrigin(origin) => self.surface_origin = origin,
            Command::RequestLayout {
                direction,
                use_initial,
            } => return Some(self.request_layout(direction, use_initial)),
            Command::LayoutCompleted { ticket, result } => self.complete_layout(ticket, result),
            Command::Restore(snapshot) => {
                self.discard_pending_layout();
                let (nodes, edges, viewport) = snapshot.into_parts();
                info!(
                    nodes = nodes.len(),
                    edges = edges.len();
                    "Diagram restored"
                );
                self.store.replace_graph(nodes, edges);
                self.store.set_viewport(viewport);
            }
        }
        None
    }

    /// Returns whether a node was created.
    fn drop_node(&mut self, payload: &str, client: Point) -> bool {
        let payload = payload.trim();
        if payload.is_empty() {
            debug!("Ignoring drop without a node kind");
            return false;
        }
        let Some(kind) = NodeKind::from_name(payload) else {
            debug!(payload = payload; "Ignoring drop of unknown node kind");
            return false;
        };

        let position = self
            .store
            .viewport()
            .project(client - self.surface_origin);
        let label = format!("{kind} node");
        let node = Node::new(self.ids.next_id(), kind, label).with_position(position);

        debug!(
            id = node.id(),
            kind = node.kind().name(),
            x = position.x(),
            y = position.y();
            "Node dropped"
        );
        self.store.push_node(node);
        true
    }

    fn request_layout(&mut self, direction: Direction, use_initial: bool) -> Effect {
        let ticket = self.next_ticket;
        self.next_ticket = ticket.next();
        if let Some(superseded) = self.pending_layout.replace(ticket) {
            debug!(ticket = superseded.value(); "Layout superseded");
        }

        let request = if use_initial {
            LayoutRequest::new(
                ticket,
                &initial::default_nodes(),
                &initial::default_edges(),
                direction,
                self.layout_options,
            )
        } else {
            LayoutRequest::new(
                ticket,
                self.store.nodes(),
                self.store.edges(),
                direction,
                self.layout_options,
            )
        };

        debug!(
            ticket = ticket.value(),
            direction:% = direction,
            use_initial = use_initial;
            "Layout requested"
        );
        Effect::Layout(request)
    }

    fn complete_layout(
        &mut self,
        ticket: LayoutTicket,
        result: Result<LayoutOutcome, LayoutError>,
    ) {
        if self.pending_layout != Some(ticket) {
            debug!(ticket = ticket.value(); "Discarding stale layout result");
            return;
        }
        self.pending_layout = None;

        match result {
            Ok(outcome) => self.store.replace_graph(outcome.nodes, outcome.edges),
            Err(err) => error!(ticket = ticket.value(), err:% = err; "Layout failed"),
        }
    }

    fn discard_pending_layout(&mut self) {
        if let Some(ticket) = self.pending_layout.take() {
            debug!(ticket = ticket.value(); "Pending layout invalidated");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::SugiyamaEngine;

    fn editor() -> Editor {
        Editor::new(Box::new(SequentialIds::new("n")), LayoutOptions::default())
    }

    fn run(effect: Option<Effect>) -> (LayoutTicket, Result<LayoutOutcome, LayoutError>) {
        let Some(Effect::Layout(request)) = effect else {
            panic!("expected a layout effect");
        };
        let ticket = request.ticket();
        (ticket, request.run(&SugiyamaEngine::new()))
    }

    #[test]
    fn test_drop_creates_node_at_projected_point() {
        let mut editor = editor();
        editor.dispatch(Command::SetSurfaceOrigin(Point::new(20.0, 10.0)));
        editor.dispatch(Command::Drop {
            payload: "input".into(),
            client: Point::new(100.0, 100.0),
        });

        let node = &editor.nodes()[0];
        assert_eq!(node.id(), "n0");
        assert_eq!(node.kind(), &NodeKind::Input);
        assert_eq!(node.label(), "input node");
        assert_eq!(node.position(), Point::new(80.0, 90.0));
    }

    #[test]
    fn test_drop_respects_viewport() {
        let mut editor = editor();
        editor.dispatch(Command::SetViewport(Viewport::new(10.0, 20.0, 2.0)));
        editor.dispatch(Command::Drop {
            payload: "output".into(),
            client: Point::new(110.0, 120.0),
        });

        assert_eq!(editor.nodes()[0].position(), Point::new(50.0, 50.0));
    }

    #[test]
    fn test_drop_ignores_empty_and_unknown_payloads() {
        let mut editor = editor();
        editor.dispatch(Command::Drop {
            payload: "".into(),
            client: Point::default(),
        });
        editor.dispatch(Command::Drop {
            payload: "hexagon".into(),
            client: Point::default(),
        });
        assert!(editor.nodes().is_empty());
    }

    #[test]
    fn test_successive_drops_get_distinct_ids() {
        let mut editor = editor();
        for _ in 0..3 {
            editor.dispatch(Command::Drop {
                payload: "default".into(),
                client: Point::default(),
            });
        }
        let ids: Vec<&str> = editor.nodes().iter().map(Node::id).collect();
        assert_eq!(ids, ["n0", "n1", "n2"]);
    }

    #[test]
    fn test_layout_of_initial_graph() {
        let mut editor = editor();
        let (ticket, result) = run(editor.dispatch(Command::RequestLayout {
            direction: Direction::Down,
            use_initial: true,
        }));
        editor.dispatch(Command::LayoutCompleted { ticket, result });

        assert_eq!(editor.nodes().len(), 3);
        assert_eq!(editor.edges().len(), 2);
        assert!(editor.pending_layout().is_none());
    }

    #[test]
    fn test_stale_layout_is_discarded() {
        let mut editor = editor();
        editor.dispatch(Command::ReplaceNodes(initial::default_nodes()));

        let (old_ticket, old_result) = run(editor.dispatch(Command::RequestLayout {
            direction: Direction::Down,
            use_initial: false,
        }));
        let (new_ticket, new_result) = run(editor.dispatch(Command::RequestLayout {
            direction: Direction::Right,
            use_initial: false,
        }));
        assert!(new_ticket > old_ticket);

        editor.dispatch(Command::LayoutCompleted {
            ticket: new_ticket,
            result: new_result.clone(),
        });
        editor.dispatch(Command::LayoutCompleted {
            ticket: old_ticket,
            result: old_result,
        });

        assert_eq!(editor.nodes(), new_result.unwrap().nodes.as_slice());
    }

    #[test]
    fn test_failed_layout_leaves_positions() {
        let mut editor = editor();
        editor.dispatch(Command::ReplaceNodes(initial::default_nodes()));
        let before = editor.nodes().to_vec();

        let Some(Effect::Layout(request)) = editor.dispatch(Command::RequestLayout {
            direction: Direction::Down,
            use_initial: false,
        }) else {
            panic!("expected a layout effect");
        };
        editor.dispatch(Command::LayoutCompleted {
            ticket: request.ticket(),
            result: Err(LayoutError::Engine("unavailable".into())),
        });

        assert_eq!(editor.nodes(), before.as_slice());
        assert!(editor.pending_layout().is_none());
    }

    #[test]
    fn test_restore_replaces_everything() {
        let mut editor = editor();
        editor.dispatch(Command::ReplaceNodes(initial::default_nodes()));

        let snapshot = Snapshot::new(
            vec![Node::new("r", NodeKind::Default, "restored")],
            Vec::new(),
            Viewport::new(1.0, 2.0, 0.5),
        );
        editor.dispatch(Command::Restore(snapshot.clone()));

        assert_eq!(editor.snapshot(), snapshot);
    }

    #[test]
    fn test_restore_invalidates_pending_layout() {
        let mut editor = editor();
        editor.dispatch(Command::ReplaceNodes(initial::default_nodes()));
        let (ticket, result) = run(editor.dispatch(Command::RequestLayout {
            direction: Direction::Down,
            use_initial: false,
        }));

        editor.dispatch(Command::Restore(Snapshot::default()));
        editor.dispatch(Command::LayoutCompleted { ticket, result });

        assert!(editor.nodes().is_empty());
    }

    #[test]
    fn test_drop_during_layout_survives_completion() {
        let mut editor = editor();
        editor.dispatch(Command::ReplaceNodes(initial::default_nodes()));
        let (ticket, result) = run(editor.dispatch(Command::RequestLayout {
            direction: Direction::Down,
            use_initial: false,
        }));

        editor.dispatch(Command::Drop {
            payload: "default".into(),
            client: Point::new(5.0, 5.0),
        });
        assert!(editor.pending_layout().is_none());
        editor.dispatch(Command::LayoutCompleted { ticket, result });

        assert_eq!(editor.nodes().len(), 4);
        assert_eq!(editor.nodes()[3].id(), "n0");
        assert_eq!(editor.nodes()[3].position(), Point::new(5.0, 5.0));
    }

    #[test]
    fn test_connect_during_layout_survives_completion() {
        let mut editor = editor();
        editor.dispatch(Command::ReplaceNodes(initial::default_nodes()));
        let (ticket, result) = run(editor.dispatch(Command::RequestLayout {
            direction: Direction::Down,
            use_initial: false,
        }));

        editor.dispatch(Command::Connect(Connection::new("1", "3")));
        editor.dispatch(Command::LayoutCompleted { ticket, result });

        assert_eq!(editor.edges().len(), 1);
        assert_eq!(editor.edges()[0].id(), "reactflow__edge-1-3");
    }

    #[test]
    fn test_selection_does_not_cancel_layout() {
        let mut editor = editor();
        editor.dispatch(Command::ReplaceNodes(initial::default_nodes()));
        let (ticket, _) = run(editor.dispatch(Command::RequestLayout {
            direction: Direction::Down,
            use_initial: false,
        }));

        editor.dispatch(Command::NodesChanged(vec![NodeChange::Select {
            id: "1".into(),
            selected: true,
        }]));
        assert_eq!(editor.pending_layout(), Some(ticket));

        editor.dispatch(Command::NodesChanged(vec![NodeChange::Remove { id: "2".into() }]));
        assert!(editor.pending_layout().is_none());
    }

    #[test]
    fn test_connect_and_reconnect_gesture() {
        let mut editor = editor();
        editor.dispatch(Command::ReplaceNodes(initial::default_nodes()));
        editor.dispatch(Command::Connect(Connection::new("1", "3")));
        assert_eq!(editor.edges()[0].id(), "reactflow__edge-1-3");

        editor.dispatch(Command::ReconnectStart {
            edge_id: "reactflow__edge-1-3".into(),
        });
        editor.dispatch(Command::ReconnectEnd {
            edge_id: "reactflow__edge-1-3".into(),
        });
        assert!(editor.edges().is_empty());
    }
}
