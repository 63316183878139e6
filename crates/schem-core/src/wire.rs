//! Wire graph algorithms: construction from segments, simplification,
//! repacking and the segment-drag helper.
//!
//! Every function here takes a graph (or segments) and produces a graph;
//! nothing touches a committed `Layout` directly. Node numbering is a
//! deterministic function of input order so callers can assert structure.

use crate::check::{WireError, check_wire};
use crate::geom::{Point, Vec2, approx_eq, is_axis_aligned, is_parallel, on_segment_interior};
use crate::id::Id;
use crate::model::{Component, Segment, WireGraph};
use petgraph::unionfind::UnionFind;

// ─── Construction ────────────────────────────────────────────────────────

/// Build a graph from a list of segments.
///
/// Endpoints at the same position share one node, numbered in order of
/// first appearance. A segment's `comp0_ref` pins its `p0` node.
/// Zero-length segments contribute a node but no edge; `fix_wire` drops it.
pub fn wire_to_graph(id: Id, segments: &[Segment]) -> WireGraph {
    let mut graph = WireGraph::new(id);
    for seg in segments {
        let a = find_or_add_node(&mut graph, seg.p0);
        let b = find_or_add_node(&mut graph, seg.p1);
        if let Some(port) = seg.comp0_ref
            && graph.nodes[a].port_ref.is_none()
        {
            graph.nodes[a].port_ref = Some(port);
        }
        graph.link(a, b);
    }
    graph
}

fn find_or_add_node(graph: &mut WireGraph, pos: Point) -> usize {
    if let Some(i) = graph.nodes.iter().position(|n| approx_eq(n.pos, pos)) {
        return i;
    }
    graph.add_node(pos)
}

/// List a graph's edges as segments, each undirected edge once.
///
/// Segments are oriented so a pinned endpoint comes first and its pin
/// survives a trip back through `wire_to_graph`.
pub fn wire_to_segments(graph: &WireGraph) -> Vec<Segment> {
    graph
        .segments()
        .map(|(a, b)| {
            let (a, b) = if graph.nodes[a].is_pinned() || !graph.nodes[b].is_pinned() {
                (a, b)
            } else {
                (b, a)
            };
            Segment {
                p0: graph.nodes[a].pos,
                p1: graph.nodes[b].pos,
                comp0_ref: graph.nodes[a].port_ref,
            }
        })
        .collect()
}

// ─── Simplification ──────────────────────────────────────────────────────

/// Normalize a freshly built or edited graph.
///
/// 1. Coincident nodes are unioned (zero-length edges collapse).
/// 2. Edges are split at any node lying strictly inside them, so
///    T-junctions and overlapping runs share nodes.
/// 3. Unpinned nodes joining two opposite collinear edges are removed.
/// 4. Ids are repacked and the result is validated.
///
/// # Errors
/// Returns the first invariant violation, e.g. a diagonal segment.
pub fn fix_wire(graph: &WireGraph) -> Result<WireGraph, WireError> {
    let mut g = graph.clone();
    merge_coincident_nodes(&mut g);
    split_edges_at_nodes(&mut g);
    merge_collinear_nodes(&mut g);
    let g = repack_graph_ids(&g);
    check_wire(&g)?;
    Ok(g)
}

/// Union nodes sharing a position into the lowest-numbered one.
fn merge_coincident_nodes(g: &mut WireGraph) {
    let n = g.nodes.len();
    let mut sets = UnionFind::<usize>::new(n);
    for i in 0..n {
        for j in (i + 1)..n {
            if approx_eq(g.nodes[i].pos, g.nodes[j].pos) {
                sets.union(i, j);
            }
        }
    }

    // Canonical member of each set is its lowest index.
    let mut canon: Vec<usize> = (0..n).collect();
    let mut lowest: Vec<Option<usize>> = vec![None; n];
    for (i, slot) in canon.iter_mut().enumerate() {
        let root = sets.find(i);
        *slot = *lowest[root].get_or_insert(i);
    }
    if canon.iter().enumerate().all(|(i, c)| i == *c) {
        return;
    }

    let edges: Vec<(usize, usize)> = g.segments().collect();
    for node in &mut g.nodes {
        node.edges.clear();
    }
    for i in 0..n {
        let c = canon[i];
        if c != i
            && let Some(port) = g.nodes[i].port_ref.take()
            && g.nodes[c].port_ref.is_none()
        {
            g.nodes[c].port_ref = Some(port);
        }
    }
    for (a, b) in edges {
        g.link(canon[a], canon[b]);
    }
    log::trace!("wire {}: merged coincident nodes", g.id);
}

/// Split every axis-aligned edge at nodes lying strictly inside it.
fn split_edges_at_nodes(g: &mut WireGraph) {
    loop {
        let mut split = None;
        'search: for (a, b) in g.segments().collect::<Vec<_>>() {
            let (pa, pb) = (g.nodes[a].pos, g.nodes[b].pos);
            if !is_axis_aligned(pa, pb) {
                continue;
            }
            for k in 0..g.nodes.len() {
                if k != a
                    && k != b
                    && !g.nodes[k].edges.is_empty()
                    && on_segment_interior(g.nodes[k].pos, pa, pb)
                {
                    split = Some((a, b, k));
                    break 'search;
                }
            }
        }
        let Some((a, b, k)) = split else {
            break;
        };
        g.replace_neighbor(a, b, k);
        g.link(k, b);
    }
}

/// Drop unpinned pass-through nodes on straight runs.
fn merge_collinear_nodes(g: &mut WireGraph) {
    while let Some(i) = (0..g.nodes.len()).find(|&i| is_straight_pass_through(g, i)) {
        let (p, q) = (g.nodes[i].edges[0], g.nodes[i].edges[1]);
        // Each neighbour's slot for `i` now points across to the other one.
        for (x, y) in [(p, q), (q, p)] {
            let edges = &mut g.nodes[x].edges;
            if edges.contains(&y) {
                edges.retain(|e| *e != i);
            } else if let Some(slot) = edges.iter_mut().find(|e| **e == i) {
                *slot = y;
            }
        }
        g.nodes[i].edges.clear();
    }
}

fn is_straight_pass_through(g: &WireGraph, i: usize) -> bool {
    let node = &g.nodes[i];
    if node.is_pinned() || node.edges.len() != 2 {
        return false;
    }
    let v1 = g.nodes[node.edges[0]].pos - node.pos;
    let v2 = g.nodes[node.edges[1]].pos - node.pos;
    is_parallel(v1, v2) && v1.dot(v2) < 0.0
}

// ─── Structural mutators ─────────────────────────────────────────────────

/// Drop nodes with no edges and renumber the rest densely from 0,
/// preserving relative order and rewriting every edge list.
///
/// Idempotent: repacking a packed graph returns an equal graph.
#[must_use]
pub fn repack_graph_ids(graph: &WireGraph) -> WireGraph {
    let mut remap = vec![None; graph.nodes.len()];
    let mut next = 0;
    for (i, node) in graph.nodes.iter().enumerate() {
        if !node.edges.is_empty() {
            remap[i] = Some(next);
            next += 1;
        }
    }

    let nodes = graph
        .nodes
        .iter()
        .enumerate()
        .filter_map(|(i, node)| {
            let id = remap[i]?;
            let mut node = node.clone();
            node.id = id;
            node.edges = node.edges.iter().filter_map(|&e| remap[e]).collect();
            Some(node)
        })
        .collect();

    WireGraph {
        id: graph.id,
        nodes,
    }
}

/// Pin unpinned free ends (≤1 edge) that sit exactly on a component port.
pub fn attach_port_refs(graph: &mut WireGraph, comps: &[Component]) {
    for node in &mut graph.nodes {
        if node.is_pinned() || node.edges.len() > 1 {
            continue;
        }
        let hit = comps.iter().find_map(|comp| {
            comp.ports
                .iter()
                .find(|port| approx_eq(comp.port_pos(port), node.pos))
                .map(|port| crate::model::PortRef::new(comp.id, port.id))
        });
        if let Some(port) = hit {
            log::debug!("wire {}: node {} attached to {:?}", graph.id, node.id, port);
            node.port_ref = Some(port);
        }
    }
}

// ─── Segment drag ────────────────────────────────────────────────────────

/// Move segment `a`–`b` by `delta`, which must be perpendicular to it.
///
/// An endpoint slides when every other edge it has runs along the delta
/// axis (those edges just stretch). Otherwise it stays put and a new node
/// is inserted at the moved position, joined to it by a short jog.
/// Run `fix_wire` afterwards to merge whatever became redundant.
pub fn shift_segment(g: &mut WireGraph, a: usize, b: usize, delta: Vec2) {
    let a_end = shift_segment_end(g, a, b, delta);
    shift_segment_end(g, b, a_end, delta);
}

/// Returns the node now terminating the segment at `end`'s side.
fn shift_segment_end(g: &mut WireGraph, end: usize, other: usize, delta: Vec2) -> usize {
    let pos = g.nodes[end].pos;
    let slides = !g.nodes[end].is_pinned()
        && g.nodes[end]
            .edges
            .iter()
            .filter(|&&e| e != other)
            .all(|&e| is_parallel(g.nodes[e].pos - pos, delta));

    if slides {
        g.nodes[end].pos = pos + delta;
        end
    } else {
        let moved = g.add_node(pos + delta);
        g.replace_neighbor(other, end, moved);
        g.link(end, moved);
        moved
    }
}
