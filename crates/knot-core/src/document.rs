//! The editable node graph.
//!
//! Nodes live in a `StableDiGraph` whose edges run source → dependent, one per
//! connected input whose source exists. The draw order lists the sinks (nodes
//! with no dependents); it is recomputed after every structural edit, keeping
//! the relative order of surviving sinks and appending new ones.

use crate::id::NodeId;
use crate::matrix::Matrix;
use crate::model::{Node, NodeKind, Port, PortRef, TransformParams};
use log::{debug, warn};
use petgraph::Direction;
use petgraph::graph::NodeIndex;
use petgraph::stable_graph::StableDiGraph;
use petgraph::visit::EdgeRef;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::rc::{Rc, Weak};

// ─── Meta ────────────────────────────────────────────────────────────────

/// Document-wide display settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Meta {
    /// Device pixel ratio: raster pixels per CSS pixel.
    pub dpr: f64,
}

impl Default for Meta {
    fn default() -> Self {
        Self { dpr: 1.0 }
    }
}

/// Partial update for [`Meta`]. `None` fields are left alone.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MetaPatch {
    pub dpr: Option<f64>,
}

// ─── Listeners ───────────────────────────────────────────────────────────

type Listener = Rc<dyn Fn(u64)>;

#[derive(Default)]
struct ListenerSet {
    next_key: u64,
    entries: Vec<(u64, Listener)>,
}

/// Shared handle to a document's change listeners.
///
/// Cloning yields another handle to the same set, so a listener can hold one
/// and subscribe or unsubscribe from inside a broadcast.
#[derive(Clone, Default)]
pub struct Listeners {
    set: Rc<RefCell<ListenerSet>>,
}

impl Listeners {
    /// Register `listener`; it receives the document version on each notify.
    pub fn subscribe(&self, listener: impl Fn(u64) + 'static) -> Subscription {
        let mut set = self.set.borrow_mut();
        let key = set.next_key;
        set.next_key += 1;
        set.entries.push((key, Rc::new(listener)));
        Subscription {
            key,
            set: Rc::downgrade(&self.set),
        }
    }

    pub fn len(&self) -> usize {
        self.set.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Call every listener registered at the moment of the call.
    pub fn broadcast(&self, version: u64) {
        let snapshot: Vec<Listener> = self
            .set
            .borrow()
            .entries
            .iter()
            .map(|(_, l)| Rc::clone(l))
            .collect();
        for listener in snapshot {
            listener(version);
        }
    }
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners").field("len", &self.len()).finish()
    }
}

/// Returned by `subscribe`. Dropping it keeps the listener registered.
#[derive(Debug)]
pub struct Subscription {
    key: u64,
    set: Weak<RefCell<ListenerSet>>,
}

impl Subscription {
    pub fn unsubscribe(self) {
        if let Some(set) = self.set.upgrade() {
            set.borrow_mut().entries.retain(|(k, _)| *k != self.key);
        }
    }
}

// ─── Document ────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct Document {
    graph: StableDiGraph<Node, Port>,
    id_index: HashMap<NodeId, NodeIndex>,
    /// Ids in first-insertion order; graph slots are reused after removal.
    insertion: Vec<NodeId>,
    draw_order: Vec<NodeId>,
    meta: Meta,
    listeners: Listeners,
    version: u64,
}

impl Document {
    #[must_use]
    pub fn new(meta: Meta) -> Self {
        Self {
            meta,
            ..Self::default()
        }
    }

    // ─── Queries ─────────────────────────────────────────────────────────

    pub fn get_node(&self, id: NodeId) -> Option<&Node> {
        self.id_index.get(&id).map(|idx| &self.graph[*idx])
    }

    /// All nodes in insertion order. Replacing a node keeps its position.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.insertion
            .iter()
            .filter_map(|id| self.id_index.get(id))
            .map(|idx| &self.graph[*idx])
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.id_index.contains_key(&id)
    }

    /// Nodes whose inputs read from `id`.
    pub fn dependents(&self, id: NodeId) -> Vec<NodeId> {
        let Some(&idx) = self.id_index.get(&id) else {
            return Vec::new();
        };
        let mut out: Vec<NodeId> = self
            .graph
            .neighbors_directed(idx, Direction::Outgoing)
            .map(|n| self.graph[n].id)
            .collect();
        out.dedup();
        out
    }

    pub fn is_sink(&self, id: NodeId) -> bool {
        self.id_index.get(&id).is_some_and(|idx| {
            self.graph
                .neighbors_directed(*idx, Direction::Outgoing)
                .next()
                .is_none()
        })
    }

    pub fn meta(&self) -> Meta {
        self.meta
    }

    pub fn draw_order(&self) -> &[NodeId] {
        &self.draw_order
    }

    /// Bumped on every `notify`.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Read-only view of the dependency graph, for analyses such as lint.
    pub fn graph(&self) -> &StableDiGraph<Node, Port> {
        &self.graph
    }

    // ─── Structural edits ────────────────────────────────────────────────

    /// Insert `node`, replacing any node with the same id.
    pub fn add_node(&mut self, mut node: Node) {
        conform_inputs(&mut node);
        let id = node.id;
        let idx = match self.id_index.get(&id) {
            Some(&idx) => {
                debug!("document: replace node {id}");
                self.graph[idx] = node;
                idx
            }
            None => {
                debug!("document: add node {id} ({})", node.node_type());
                let idx = self.graph.add_node(node);
                self.id_index.insert(id, idx);
                self.insertion.push(id);
                self.link_waiting_dependents(idx);
                idx
            }
        };
        self.relink_inputs(idx);
        self.recompute_draw_order();
        self.notify();
    }

    /// Delete a node. Inputs elsewhere that named it are left dangling.
    pub fn remove_node(&mut self, id: NodeId) -> Option<Node> {
        let idx = self.id_index.remove(&id)?;
        let removed = self.graph.remove_node(idx);
        self.insertion.retain(|n| *n != id);
        debug!("document: remove node {id}");
        self.recompute_draw_order();
        self.notify();
        removed
    }

    /// Connect (`Some`) or disconnect (`None`) a declared input port.
    /// Returns `false` if the target is missing or does not declare `port`.
    pub fn set_input(&mut self, target: NodeId, port: Port, source: Option<NodeId>) -> bool {
        let Some(&idx) = self.id_index.get(&target) else {
            warn!("document: set_input on unknown node {target}");
            return false;
        };
        let node = &mut self.graph[idx];
        if !node.kind.declares(port) {
            warn!(
                "document: {} ({}) has no `{port}` port",
                target,
                node.node_type()
            );
            return false;
        }
        node.inputs.insert(port, source.map(|src| PortRef { node: src }));
        match source {
            Some(src) => debug!("document: connect {src} -> {target}.{port}"),
            None => debug!("document: disconnect {target}.{port}"),
        }
        self.relink_inputs(idx);
        self.recompute_draw_order();
        self.notify();
        true
    }

    /// Edit a node in place. The id cannot be changed this way.
    pub fn update_node(&mut self, id: NodeId, edit: impl FnOnce(&mut Node)) -> bool {
        let Some(&idx) = self.id_index.get(&id) else {
            return false;
        };
        let node = &mut self.graph[idx];
        edit(node);
        if node.id != id {
            warn!("document: update_node cannot rename {id} to {}", node.id);
            node.id = id;
        }
        conform_inputs(node);
        self.relink_inputs(idx);
        self.recompute_draw_order();
        self.notify();
        true
    }

    /// Rebuild the incoming edges of `idx` from its inputs.
    fn relink_inputs(&mut self, idx: NodeIndex) {
        let stale: Vec<_> = self
            .graph
            .edges_directed(idx, Direction::Incoming)
            .map(|e| e.id())
            .collect();
        for edge in stale {
            self.graph.remove_edge(edge);
        }
        let deps: Vec<(Port, NodeId)> = self.graph[idx].dependencies().collect();
        for (port, src) in deps {
            if let Some(&src_idx) = self.id_index.get(&src) {
                self.graph.add_edge(src_idx, idx, port);
            }
        }
    }

    /// Connect existing nodes whose inputs already name the new node at `idx`.
    fn link_waiting_dependents(&mut self, idx: NodeIndex) {
        let id = self.graph[idx].id;
        let waiting: Vec<(NodeIndex, Port)> = self
            .graph
            .node_indices()
            .filter(|n| *n != idx)
            .flat_map(|n| {
                self.graph[n]
                    .dependencies()
                    .filter(|(_, src)| *src == id)
                    .map(move |(port, _)| (n, port))
                    .collect::<Vec<_>>()
            })
            .collect();
        for (dependent, port) in waiting {
            self.graph.add_edge(idx, dependent, port);
        }
    }

    // ─── Draw order ──────────────────────────────────────────────────────

    /// Replace the draw order wholesale. The caller supplies the full list.
    pub fn set_draw_order(&mut self, order: Vec<NodeId>) {
        self.draw_order = order;
        self.notify();
    }

    /// Reset the draw order to exactly the current sinks, keeping the
    /// relative order of those already listed.
    pub fn recompute_draw_order(&mut self) {
        let sinks: Vec<NodeId> = self
            .insertion
            .iter()
            .copied()
            .filter(|id| self.is_sink(*id))
            .collect();
        let sink_set: HashSet<NodeId> = sinks.iter().copied().collect();

        let mut seen = HashSet::with_capacity(sinks.len());
        let mut order: Vec<NodeId> = self
            .draw_order
            .iter()
            .copied()
            .filter(|id| sink_set.contains(id) && seen.insert(*id))
            .collect();
        order.extend(sinks.into_iter().filter(|id| seen.insert(*id)));
        self.draw_order = order;
    }

    // ─── Meta & notification ─────────────────────────────────────────────

    pub fn update_meta(&mut self, patch: MetaPatch) {
        if let Some(dpr) = patch.dpr {
            self.meta.dpr = dpr;
        }
        self.notify();
    }

    pub fn subscribe(&self, listener: impl Fn(u64) + 'static) -> Subscription {
        self.listeners.subscribe(listener)
    }

    /// Another handle to this document's listener set.
    pub fn listeners(&self) -> Listeners {
        self.listeners.clone()
    }

    pub fn notify(&mut self) {
        self.version += 1;
        self.listeners.broadcast(self.version);
    }

    // ─── Commits ─────────────────────────────────────────────────────────

    /// Fold `overlay` into a Transform node's params: the new matrix is
    /// `overlay ∘ current`, decomposed back into scale/rotation/translation.
    /// Shear does not survive the decomposition. Any other node kind is left
    /// untouched and `false` is returned.
    pub fn apply_transform(&mut self, id: NodeId, overlay: &Matrix) -> bool {
        let Some(&idx) = self.id_index.get(&id) else {
            debug!("document: apply_transform on unknown node {id}");
            return false;
        };
        let NodeKind::Transform(params) = &mut self.graph[idx].kind else {
            debug!("document: apply_transform ignored for non-transform {id}");
            return false;
        };
        let combined = overlay.compose(params.to_matrix());
        *params = TransformParams::from_matrix(&combined);
        debug!(
            "document: commit {id} -> t=({:.3}, {:.3}) r={:.3} s=({:.3}, {:.3})",
            params.tx, params.ty, params.r, params.sx, params.sy
        );
        self.notify();
        true
    }
}

/// Make `inputs` hold exactly the ports the node's kind declares.
fn conform_inputs(node: &mut Node) {
    let declared = node.kind.ports();
    let before = node.inputs.len();
    node.inputs.retain(|port, _| declared.contains(port));
    if node.inputs.len() != before {
        warn!(
            "document: dropped undeclared ports on {} ({})",
            node.id,
            node.node_type()
        );
    }
    for port in declared {
        node.inputs.entry(*port).or_insert(None);
    }
}
