//! Core data model for schematic layouts.
//!
//! A wire is an arena of nodes with index edges: node identity is its
//! position in `WireGraph::nodes`, and every edge is stored on both ends.
//! Components are positioned boxes with ports; a `Layout` is one immutable
//! snapshot of components, wires and the current selection.

use crate::geom::{Affine, Dir, Point, Rect, Vec2};
use crate::id::Id;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

// ─── External references ─────────────────────────────────────────────────

/// A component port a wire node is pinned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortRef {
    pub comp: Id,
    pub port: Id,
}

impl PortRef {
    pub fn new(comp: Id, port: Id) -> Self {
        Self { comp, port }
    }
}

// ─── Wire graph ──────────────────────────────────────────────────────────

/// A point in a wire graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireNode {
    /// Index of this node in its graph's node array.
    pub id: usize,
    pub pos: Point,
    /// Neighbour node ids. Always mirrored on the neighbour.
    pub edges: SmallVec<[usize; 4]>,
    /// Set when the node is pinned to a component port.
    pub port_ref: Option<PortRef>,
}

impl WireNode {
    pub fn new(id: usize, pos: Point) -> Self {
        Self {
            id,
            pos,
            edges: SmallVec::new(),
            port_ref: None,
        }
    }

    pub fn is_pinned(&self) -> bool {
        self.port_ref.is_some()
    }
}

/// One wire's connectivity and geometry.
///
/// Cloning is a deep copy: the node array and every edge list are owned,
/// so a clone can be mutated freely without touching the graph it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireGraph {
    pub id: Id,
    pub nodes: Vec<WireNode>,
}

impl WireGraph {
    pub fn new(id: Id) -> Self {
        Self {
            id,
            nodes: Vec::new(),
        }
    }

    /// Append a node with no edges. Returns its id.
    pub fn add_node(&mut self, pos: Point) -> usize {
        let id = self.nodes.len();
        self.nodes.push(WireNode::new(id, pos));
        id
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn has_edge(&self, a: usize, b: usize) -> bool {
        self.nodes[a].edges.contains(&b)
    }

    /// Add the mutual edge `a`–`b`. Self edges and duplicates are ignored.
    pub fn link(&mut self, a: usize, b: usize) {
        if a == b || self.has_edge(a, b) {
            return;
        }
        self.nodes[a].edges.push(b);
        self.nodes[b].edges.push(a);
    }

    /// Remove the mutual edge `a`–`b`. A no-op when the nodes aren't linked,
    /// so deletions can be replayed over pairs that are already detached.
    pub fn unlink(&mut self, a: usize, b: usize) {
        self.nodes[a].edges.retain(|e| *e != b);
        self.nodes[b].edges.retain(|e| *e != a);
    }

    /// Remove every edge of `node`, leaving it isolated.
    pub fn unlink_all(&mut self, node: usize) {
        let edges = std::mem::take(&mut self.nodes[node].edges);
        for e in edges {
            self.nodes[e].edges.retain(|n| *n != node);
        }
    }

    /// Re-point `node`'s edge from `old` to `new`, in place.
    ///
    /// The slot keeps its position in `node`'s edge list; `old` loses its
    /// back-edge and `new` gains one. If `node` already links to `new`, the
    /// edge to `old` is just dropped.
    pub fn replace_neighbor(&mut self, node: usize, old: usize, new: usize) {
        if node == new {
            self.unlink(node, old);
            return;
        }
        let edges = &mut self.nodes[node].edges;
        if edges.contains(&new) {
            edges.retain(|e| *e != old);
        } else if let Some(slot) = edges.iter_mut().find(|e| **e == old) {
            *slot = new;
        } else {
            return;
        }
        self.nodes[old].edges.retain(|e| *e != node);
        if !self.nodes[new].edges.contains(&node) {
            self.nodes[new].edges.push(node);
        }
    }

    /// Each undirected edge once, as `(lower, higher)` node ids.
    pub fn segments(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.nodes.iter().flat_map(|node| {
            node.edges
                .iter()
                .filter(move |&&e| node.id < e)
                .map(move |&e| (node.id, e))
        })
    }
}

/// An axis-aligned line between two points, used to describe a proposed
/// wire before it is turned into a graph.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub p0: Point,
    pub p1: Point,
    /// Port that `p0` is pinned to, if any.
    pub comp0_ref: Option<PortRef>,
}

impl Segment {
    pub fn new(p0: Point, p1: Point) -> Self {
        Self {
            p0,
            p1,
            comp0_ref: None,
        }
    }

    /// Pin `p0` to a component port.
    pub fn pinned(mut self, port: PortRef) -> Self {
        self.comp0_ref = Some(port);
        self
    }
}

// ─── Components ──────────────────────────────────────────────────────────

/// A connection point on a component, relative to the component origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Port {
    pub id: Id,
    pub pos: Point,
}

/// A nested schematic drawn inside a component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubSchematic {
    pub comps: Vec<Component>,
    pub wires: Vec<WireGraph>,
    /// Maps the sub-schematic's model space into its parent's model space.
    pub transform: Affine,
}

/// A positioned component instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub id: Id,
    /// Top-left corner in model space.
    pub pos: Point,
    pub size: Vec2,
    pub ports: Vec<Port>,
    pub sub: Option<Box<SubSchematic>>,
}

impl Component {
    pub fn new(id: Id, pos: Point, size: Vec2) -> Self {
        Self {
            id,
            pos,
            size,
            ports: Vec::new(),
            sub: None,
        }
    }

    /// Builder-style port addition.
    pub fn with_port(mut self, id: &str, x: f64, y: f64) -> Self {
        self.ports.push(Port {
            id: Id::intern(id),
            pos: Point::new(x, y),
        });
        self
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_origin_size(self.pos, self.size.to_size())
    }

    pub fn find_port(&self, id: Id) -> Option<&Port> {
        self.ports.iter().find(|p| p.id == id)
    }

    /// Absolute model-space position of a port.
    pub fn port_pos(&self, port: &Port) -> Point {
        self.pos + port.pos.to_vec2()
    }

    /// Outward direction of a port, derived from the side it sits on.
    /// Ports not on the left, right or top edge face down.
    pub fn port_dir(&self, port: &Port) -> Dir {
        if port.pos.x <= 0.0 {
            Dir::Left
        } else if port.pos.x >= self.size.x {
            Dir::Right
        } else if port.pos.y <= 0.0 {
            Dir::Up
        } else {
            Dir::Down
        }
    }
}

// ─── Element references ──────────────────────────────────────────────────

/// A reference to something in a layout: the result of a hit test or an
/// entry in the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ElRef {
    Comp { id: Id },
    CompPort { comp: Id, port: Id },
    WireNode { wire: Id, node: usize },
    WireSeg { wire: Id, node0: usize, node1: usize },
}

impl ElRef {
    /// Segment reference with its node ids ordered low → high, so both
    /// orientations of the same edge compare equal.
    pub fn wire_seg(wire: Id, a: usize, b: usize) -> Self {
        ElRef::WireSeg {
            wire,
            node0: a.min(b),
            node1: a.max(b),
        }
    }

    /// The wire this reference points into, if any.
    pub fn wire(&self) -> Option<Id> {
        match self {
            ElRef::WireNode { wire, .. } | ElRef::WireSeg { wire, .. } => Some(*wire),
            _ => None,
        }
    }

    /// The component this reference points into, if any.
    pub fn comp(&self) -> Option<Id> {
        match self {
            ElRef::Comp { id } => Some(*id),
            ElRef::CompPort { comp, .. } => Some(*comp),
            _ => None,
        }
    }
}

impl fmt::Display for ElRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElRef::Comp { id } => write!(f, "comp:{id}"),
            ElRef::CompPort { comp, port } => write!(f, "port:{comp}:{port}"),
            ElRef::WireNode { wire, node } => write!(f, "node:{wire}:{node}"),
            ElRef::WireSeg { wire, node0, node1 } => write!(f, "seg:{wire}:{node0}-{node1}"),
        }
    }
}

// ─── Layout snapshot ─────────────────────────────────────────────────────

/// One complete editor state: components, wires and selection.
///
/// Edits never mutate a committed `Layout`; they build a new one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub comps: Vec<Component>,
    pub wires: Vec<WireGraph>,
    pub selected: Vec<ElRef>,
}

impl Layout {
    pub fn find_comp(&self, id: Id) -> Option<&Component> {
        self.comps.iter().find(|c| c.id == id)
    }

    pub fn wire_index(&self, id: Id) -> Option<usize> {
        self.wires.iter().position(|w| w.id == id)
    }

    /// Absolute position of a referenced port, if both component and port exist.
    pub fn port_position(&self, port: PortRef) -> Option<Point> {
        let comp = self.find_comp(port.comp)?;
        let p = comp.find_port(port.port)?;
        Some(comp.port_pos(p))
    }

    /// A `{prefix}_{n}` wire id not used by any wire in this layout.
    ///
    /// Loaded layouts may already hold counter-style ids, so draws are
    /// skipped until one is free.
    pub fn fresh_wire_id(&self, prefix: &str) -> Id {
        loop {
            let id = Id::with_prefix(prefix);
            if self.wire_index(id).is_none() {
                return id;
            }
        }
    }
}
