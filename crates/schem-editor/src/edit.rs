//! Layout edit operations.
//!
//! Each operation is a pure function from a baseline `Layout` to a new
//! one. Drags call them on every pointer move against the same committed
//! baseline, so nothing here may mutate its input. Absent targets (an
//! unknown port, a degenerate drag) yield an unchanged copy.

use crate::config::EditorConfig;
use schem_core::geom::{EPSILON, approx_eq, is_parallel, snap_to_grid, snap_vec};
use schem_core::{
    Dir, ElRef, Id, Layout, Point, PortRef, Rect, Segment, Vec2, WireError, WireGraph,
    attach_port_refs, check_wires, fix_wire, hit_test_rect, repack_graph_ids, shift_segment,
    wire_to_graph,
};

/// Write a rewritten wire back by index, or remove it when `wire` is
/// `None`. Selection entries pointing into the old wire are dropped since
/// its node numbering is no longer meaningful.
pub fn apply_wires(layout: &Layout, index: usize, wire: Option<WireGraph>) -> Layout {
    let mut out = layout.clone();
    let id = out.wires[index].id;
    match wire {
        Some(w) if !w.is_empty() => out.wires[index] = w,
        _ => {
            log::warn!("wire {id} emptied by edit, removing it");
            out.wires.remove(index);
        }
    }
    out.selected.retain(|r| r.wire() != Some(id));
    out
}

// ─── Create ──────────────────────────────────────────────────────────────

/// Draw a new wire from a component port towards `target`.
///
/// The path leaves the port along its outward direction, turns once and
/// ends on the grid-snapped target. A drag that ends on the port itself
/// adds nothing.
pub fn create_wire(
    layout: &Layout,
    port: PortRef,
    target: Point,
    wire_id: Id,
    cfg: &EditorConfig,
) -> Result<Layout, WireError> {
    let Some(comp) = layout.find_comp(port.comp) else {
        log::debug!("create: unknown component {}", port.comp);
        return Ok(layout.clone());
    };
    let Some(p) = comp.find_port(port.port) else {
        log::debug!("create: unknown port {}:{}", port.comp, port.port);
        return Ok(layout.clone());
    };

    let start = comp.port_pos(p);
    let end = snap_to_grid(target, cfg.grid);
    if approx_eq(start, end) {
        return Ok(layout.clone());
    }
    let dir = comp.port_dir(p).vec();
    let knee = start + dir * (end - start).dot(dir);

    let segments = [
        Segment::new(start, knee).pinned(port),
        Segment::new(knee, end),
    ];
    let mut graph = wire_to_graph(wire_id, &segments);
    attach_port_refs(&mut graph, &layout.comps);
    let graph = fix_wire(&graph)?;

    let mut out = layout.clone();
    if !graph.is_empty() {
        out.wires.push(graph);
    }
    Ok(out)
}

// ─── Extend ──────────────────────────────────────────────────────────────

/// Grow the wire at `node` towards `target`, heading out along `grab`.
///
/// With no grab direction yet the baseline is returned unchanged.
pub fn extend_wire(
    layout: &Layout,
    wire_index: usize,
    node: usize,
    target: Point,
    grab: Option<Dir>,
    cfg: &EditorConfig,
) -> Result<Layout, WireError> {
    let Some(dir) = grab else {
        return Ok(layout.clone());
    };
    let mut g = layout.wires[wire_index].clone();
    let origin = g.nodes[node].pos;
    let end = snap_to_grid(target, cfg.grid);
    if approx_eq(origin, end) {
        return Ok(layout.clone());
    }
    let d = dir.vec();
    let along = (end - origin).dot(d);
    let elbow = origin + d * along;

    let tail = if let Some(neighbor) = reversed_neighbor(&g, node, d, cfg.reverse_tolerance) {
        // Pushing back along an existing edge: branch off that edge
        // instead of folding the wire onto itself.
        let span = (g.nodes[neighbor].pos - origin).hypot();
        let split = g.add_node(origin + d * along.clamp(0.0, span));
        g.replace_neighbor(node, neighbor, split);
        g.link(split, neighbor);
        if along < 0.0 || along > span {
            let corner = g.add_node(elbow);
            g.link(split, corner);
            corner
        } else {
            split
        }
    } else if is_bare_end(&g, node, d) {
        g.nodes[node].pos = elbow;
        node
    } else {
        let corner = g.add_node(elbow);
        g.link(node, corner);
        corner
    };

    if !approx_eq(g.nodes[tail].pos, end) {
        let terminal = g.add_node(end);
        g.link(tail, terminal);
    }

    attach_port_refs(&mut g, &layout.comps);
    let fixed = fix_wire(&g)?;
    log::trace!("extend {}:{node} towards {end:?} ({dir:?})", fixed.id);
    Ok(apply_wires(layout, wire_index, Some(fixed)))
}

/// First neighbour (in stored edge order) lying along `d` from `node`.
fn reversed_neighbor(g: &WireGraph, node: usize, d: Vec2, tolerance: f64) -> Option<usize> {
    let origin = g.nodes[node].pos;
    let min_cos = tolerance.cos();
    g.nodes[node].edges.iter().copied().find(|&e| {
        let v = g.nodes[e].pos - origin;
        let len = v.hypot();
        len > EPSILON && v.dot(d) / len >= min_cos
    })
}

/// An unpinned dead end whose single edge runs along `d`.
fn is_bare_end(g: &WireGraph, node: usize, d: Vec2) -> bool {
    let n = &g.nodes[node];
    !n.is_pinned() && n.edges.len() == 1 && is_parallel(g.nodes[n.edges[0]].pos - n.pos, d)
}

// ─── Drag segment ────────────────────────────────────────────────────────

/// Move segment `a`–`b` sideways by the perpendicular, grid-snapped part
/// of `delta`. Segments touching a port stay where they are.
pub fn drag_wire_segment(
    layout: &Layout,
    wire_index: usize,
    a: usize,
    b: usize,
    delta: Vec2,
    cfg: &EditorConfig,
) -> Result<Layout, WireError> {
    let wire = &layout.wires[wire_index];
    if !wire.has_edge(a, b) {
        log::debug!("drag: {}:{a}-{b} is not a segment", wire.id);
        return Ok(layout.clone());
    }
    if wire.nodes[a].is_pinned() || wire.nodes[b].is_pinned() {
        log::debug!("drag: {}:{a}-{b} is pinned to a port", wire.id);
        return Ok(layout.clone());
    }

    let along = wire.nodes[b].pos - wire.nodes[a].pos;
    let perpendicular = if along.x.abs() >= along.y.abs() {
        Vec2::new(0.0, delta.y)
    } else {
        Vec2::new(delta.x, 0.0)
    };
    let delta = snap_vec(perpendicular, cfg.grid);
    if delta.hypot() < EPSILON {
        return Ok(layout.clone());
    }

    let mut g = wire.clone();
    shift_segment(&mut g, a, b, delta);
    attach_port_refs(&mut g, &layout.comps);
    let fixed = fix_wire(&g)?;
    log::trace!("drag {}:{a}-{b} by {delta:?}", fixed.id);
    Ok(apply_wires(layout, wire_index, Some(fixed)))
}

// ─── Selection ───────────────────────────────────────────────────────────

/// Click selection. `additive` (Shift) toggles `hit` in the selection;
/// otherwise the selection becomes just `hit`, or empty on a miss.
pub fn select(layout: &Layout, hit: Option<ElRef>, additive: bool) -> Layout {
    let mut out = layout.clone();
    match (hit, additive) {
        (Some(r), true) => {
            if let Some(i) = out.selected.iter().position(|s| *s == r) {
                out.selected.remove(i);
            } else {
                out.selected.push(r);
            }
        }
        (Some(r), false) => out.selected = vec![r],
        (None, true) => {}
        (None, false) => out.selected.clear(),
    }
    out
}

/// Rubber-band selection between two model-space corners, in any order.
pub fn select_region(layout: &Layout, a: Point, b: Point, additive: bool) -> Layout {
    let hits = hit_test_rect(&layout.comps, &layout.wires, Rect::from_points(a, b));
    let mut out = layout.clone();
    if !additive {
        out.selected.clear();
    }
    for r in hits {
        if !out.selected.contains(&r) {
            out.selected.push(r);
        }
    }
    out
}

/// Select every component and every wire segment.
pub fn select_all(layout: &Layout) -> Layout {
    let mut out = layout.clone();
    out.selected = layout
        .comps
        .iter()
        .map(|c| ElRef::Comp { id: c.id })
        .chain(layout.wires.iter().flat_map(|w| {
            w.segments().map(move |(a, b)| ElRef::wire_seg(w.id, a, b))
        }))
        .collect();
    out
}

// ─── Delete ──────────────────────────────────────────────────────────────

/// Remove every selected element.
///
/// Segments are unlinked, nodes lose all their edges, and each wire is
/// repacked. Wires left without edges disappear, and pins on deleted
/// components are released. No other simplification runs, so the
/// remaining geometry is exactly what was there before.
pub fn delete_selection(layout: &Layout) -> Result<Layout, WireError> {
    let mut out = layout.clone();
    let mut deleted_comps = Vec::new();

    for r in &layout.selected {
        match *r {
            ElRef::Comp { id } => deleted_comps.push(id),
            ElRef::WireNode { wire, node } => {
                if let Some(i) = out.wire_index(wire) {
                    out.wires[i].unlink_all(node);
                }
            }
            ElRef::WireSeg { wire, node0, node1 } => {
                if let Some(i) = out.wire_index(wire) {
                    out.wires[i].unlink(node0, node1);
                }
            }
            ElRef::CompPort { .. } => {}
        }
    }

    out.wires = out
        .wires
        .iter()
        .filter_map(|w| {
            let packed = repack_graph_ids(w);
            if packed.is_empty() {
                log::warn!("wire {} has no segments left, removing it", w.id);
                None
            } else {
                Some(packed)
            }
        })
        .collect();

    for node in out.wires.iter_mut().flat_map(|w| w.nodes.iter_mut()) {
        if node
            .port_ref
            .is_some_and(|p| deleted_comps.contains(&p.comp))
        {
            node.port_ref = None;
        }
    }
    out.comps.retain(|c| !deleted_comps.contains(&c.id));
    out.selected.clear();

    check_wires(&out.wires)?;
    log::debug!(
        "deleted {} element(s), {} wire(s) remain",
        layout.selected.len(),
        out.wires.len()
    );
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use schem_core::{Component, WireNode};

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    fn cfg() -> EditorConfig {
        EditorConfig::default()
    }

    fn reg() -> Component {
        Component::new(Id::intern("reg"), p(0.0, 0.0), Vec2::new(4.0, 4.0))
            .with_port("q", 4.0, 2.0)
            .with_port("d", 0.0, 2.0)
    }

    fn q() -> PortRef {
        PortRef::new(Id::intern("reg"), Id::intern("q"))
    }

    fn wire(id: &str, points: &[(f64, f64)]) -> WireGraph {
        let segs: Vec<_> = points
            .windows(2)
            .map(|w| Segment::new(p(w[0].0, w[0].1), p(w[1].0, w[1].1)))
            .collect();
        fix_wire(&wire_to_graph(Id::intern(id), &segs)).unwrap()
    }

    fn pos_of(g: &WireGraph, x: f64, y: f64) -> usize {
        g.nodes
            .iter()
            .position(|n| n.pos == p(x, y))
            .unwrap_or_else(|| panic!("no node at ({x}, {y}) in {:?}", g.nodes))
    }

    fn linked(g: &WireGraph, a: (f64, f64), b: (f64, f64)) -> bool {
        g.has_edge(pos_of(g, a.0, a.1), pos_of(g, b.0, b.1))
    }

    // ── create ──

    #[test]
    fn create_leaves_port_outward_then_turns() {
        let layout = Layout {
            comps: vec![reg()],
            ..Default::default()
        };
        let out = create_wire(&layout, q(), p(9.2, 6.9), Id::intern("w_new"), &cfg()).unwrap();
        assert_eq!(out.wires.len(), 1);
        let g = &out.wires[0];
        assert_eq!(g.nodes.len(), 3);
        assert!(linked(g, (4.0, 2.0), (9.0, 2.0)));
        assert!(linked(g, (9.0, 2.0), (9.0, 7.0)));
        assert_eq!(g.nodes[pos_of(g, 4.0, 2.0)].port_ref, Some(q()));
    }

    #[test]
    fn create_on_the_port_adds_nothing() {
        let layout = Layout {
            comps: vec![reg()],
            ..Default::default()
        };
        let out = create_wire(&layout, q(), p(4.1, 1.9), Id::intern("w_none"), &cfg()).unwrap();
        assert_eq!(out, layout);
    }

    #[test]
    fn create_ending_on_a_port_pins_both_ends() {
        let other = Component::new(Id::intern("alu"), p(10.0, 0.0), Vec2::new(4.0, 4.0))
            .with_port("a", 0.0, 2.0);
        let layout = Layout {
            comps: vec![reg(), other],
            ..Default::default()
        };
        let out = create_wire(&layout, q(), p(10.0, 2.0), Id::intern("w_pins"), &cfg()).unwrap();
        let g = &out.wires[0];
        assert_eq!(g.nodes.len(), 2);
        assert_eq!(
            g.nodes[pos_of(g, 10.0, 2.0)].port_ref,
            Some(PortRef::new(Id::intern("alu"), Id::intern("a")))
        );
    }

    // ── extend ──

    fn stub() -> Layout {
        // Bare end at (0,0), wire running left to (-5,0).
        Layout {
            wires: vec![wire("w_stub", &[(0.0, 0.0), (-5.0, 0.0)])],
            ..Default::default()
        }
    }

    #[test]
    fn extend_without_grab_is_baseline() {
        let layout = stub();
        let out = extend_wire(&layout, 0, 0, p(3.0, 3.0), None, &cfg()).unwrap();
        assert_eq!(out, layout);
    }

    #[test]
    fn extend_bare_end_relocates_and_turns() {
        let layout = stub();
        let out = extend_wire(&layout, 0, 0, p(4.0, 2.2), Some(Dir::Right), &cfg()).unwrap();
        let g = &out.wires[0];
        assert_eq!(g.nodes.len(), 3);
        assert!(linked(g, (-5.0, 0.0), (4.0, 0.0)));
        assert!(linked(g, (4.0, 0.0), (4.0, 2.0)));
    }

    #[test]
    fn extend_perpendicular_adds_elbow() {
        let layout = stub();
        let out = extend_wire(&layout, 0, 0, p(1.0, 3.0), Some(Dir::Down), &cfg()).unwrap();
        let g = &out.wires[0];
        assert_eq!(g.nodes.len(), 4);
        assert!(linked(g, (-5.0, 0.0), (0.0, 0.0)));
        assert!(linked(g, (0.0, 0.0), (0.0, 3.0)));
        assert!(linked(g, (0.0, 3.0), (1.0, 3.0)));
    }

    #[test]
    fn extend_reversing_branches_off_the_edge() {
        let layout = stub();
        let out = extend_wire(&layout, 0, 0, p(-2.0, 3.0), Some(Dir::Left), &cfg()).unwrap();
        let g = &out.wires[0];
        // The wire keeps its full length and gains a branch at x = -2.
        assert_eq!(g.nodes.len(), 4);
        assert!(linked(g, (0.0, 0.0), (-2.0, 0.0)));
        assert!(linked(g, (-2.0, 0.0), (-5.0, 0.0)));
        assert!(linked(g, (-2.0, 0.0), (-2.0, 3.0)));
    }

    #[test]
    fn extend_reversing_past_the_neighbor_adds_corner() {
        let layout = stub();
        let out = extend_wire(&layout, 0, 0, p(-8.0, 2.0), Some(Dir::Left), &cfg()).unwrap();
        let g = &out.wires[0];
        // The old far end becomes a straight pass-through and merges away.
        assert_eq!(g.nodes.len(), 3);
        assert!(linked(g, (0.0, 0.0), (-8.0, 0.0)));
        assert!(linked(g, (-8.0, 0.0), (-8.0, 2.0)));
    }

    #[test]
    fn extend_onto_port_pins_terminal() {
        let layout = Layout {
            comps: vec![reg()],
            wires: vec![wire("w_to_d", &[(-6.0, 0.0), (-3.0, 0.0)])],
            ..Default::default()
        };
        // Node 1 is the (-3,0) end; go down then right onto port d at (0,2).
        let out = extend_wire(&layout, 0, 1, p(0.0, 2.0), Some(Dir::Down), &cfg()).unwrap();
        let g = &out.wires[0];
        let terminal = pos_of(g, 0.0, 2.0);
        assert_eq!(
            g.nodes[terminal].port_ref,
            Some(PortRef::new(Id::intern("reg"), Id::intern("d")))
        );
    }

    #[test]
    fn extend_never_mutates_baseline() {
        let layout = stub();
        let before = layout.clone();
        let _ = extend_wire(&layout, 0, 0, p(4.0, 4.0), Some(Dir::Right), &cfg()).unwrap();
        assert_eq!(layout, before);
    }

    // ── drag segment ──

    fn u_shape() -> Layout {
        Layout {
            wires: vec![wire("w_u", &[(0.0, 0.0), (0.0, 4.0), (6.0, 4.0), (6.0, 0.0)])],
            ..Default::default()
        }
    }

    #[test]
    fn drag_segment_moves_perpendicular_only() {
        let layout = u_shape();
        let g = &layout.wires[0];
        let (a, b) = (pos_of(g, 0.0, 4.0), pos_of(g, 6.0, 4.0));
        let out = drag_wire_segment(&layout, 0, a, b, Vec2::new(3.4, 1.8), &cfg()).unwrap();
        let g = &out.wires[0];
        assert!(linked(g, (0.0, 6.0), (6.0, 6.0)));
        assert!(linked(g, (0.0, 0.0), (0.0, 6.0)));
        assert_eq!(g.nodes.len(), 4);
    }

    #[test]
    fn drag_pinned_segment_is_noop() {
        let mut layout = u_shape();
        layout.comps.push(reg());
        layout.wires[0].nodes[0].port_ref = Some(q());
        let g = &layout.wires[0];
        let (a, b) = (pos_of(g, 0.0, 0.0), pos_of(g, 0.0, 4.0));
        let out = drag_wire_segment(&layout, 0, a, b, Vec2::new(2.0, 0.0), &cfg()).unwrap();
        assert_eq!(out, layout);
    }

    #[test]
    fn drag_below_half_a_grid_step_is_noop() {
        let layout = u_shape();
        let g = &layout.wires[0];
        let (a, b) = (pos_of(g, 0.0, 4.0), pos_of(g, 6.0, 4.0));
        let out = drag_wire_segment(&layout, 0, a, b, Vec2::new(5.0, 0.3), &cfg()).unwrap();
        assert_eq!(out, layout);
    }

    // ── apply / select / delete ──

    #[test]
    fn apply_wires_drops_stale_selection() {
        let mut layout = u_shape();
        let w = layout.wires[0].id;
        layout.selected = vec![ElRef::WireNode { wire: w, node: 1 }, ElRef::Comp { id: Id::intern("reg") }];
        let out = apply_wires(&layout, 0, Some(layout.wires[0].clone()));
        assert_eq!(out.selected, vec![ElRef::Comp { id: Id::intern("reg") }]);

        let gone = apply_wires(&layout, 0, None);
        assert!(gone.wires.is_empty());
    }

    #[test]
    fn click_selection_toggles_with_shift() {
        let layout = u_shape();
        let a = ElRef::Comp { id: Id::intern("a") };
        let b = ElRef::Comp { id: Id::intern("b") };
        let one = select(&layout, Some(a), false);
        let two = select(&one, Some(b), true);
        assert_eq!(two.selected, vec![a, b]);
        let back = select(&two, Some(a), true);
        assert_eq!(back.selected, vec![b]);
        assert!(select(&back, None, false).selected.is_empty());
        assert_eq!(select(&back, None, true).selected, vec![b]);
    }

    #[test]
    fn region_corners_in_any_order() {
        let layout = u_shape();
        let fwd = select_region(&layout, p(-1.0, 3.0), p(7.0, 5.0), false);
        let rev = select_region(&layout, p(7.0, 5.0), p(-1.0, 3.0), false);
        assert_eq!(fwd.selected, rev.selected);
        // Two corner nodes, the bottom run and both legs touch the band.
        assert_eq!(fwd.selected.len(), 2 + 3);
    }

    #[test]
    fn select_all_lists_comps_and_segments() {
        let mut layout = u_shape();
        layout.comps.push(reg());
        assert_eq!(select_all(&layout).selected.len(), 1 + 3);
    }

    #[test]
    fn delete_segment_splits_wire_without_simplifying() {
        let mut layout = u_shape();
        let g = &layout.wires[0];
        let (a, b) = (pos_of(g, 0.0, 4.0), pos_of(g, 6.0, 4.0));
        layout.selected = vec![ElRef::wire_seg(g.id, a, b)];
        let out = delete_selection(&layout).unwrap();
        let g = &out.wires[0];
        assert_eq!(g.nodes.len(), 4);
        assert_eq!(g.segments().count(), 2);
        assert!(out.selected.is_empty());
    }

    #[test]
    fn delete_node_and_component_releases_pins() {
        let mut layout = Layout {
            comps: vec![reg()],
            wires: vec![wire("w_del", &[(4.0, 2.0), (8.0, 2.0)])],
            ..Default::default()
        };
        layout.wires[0].nodes[0].port_ref = Some(q());
        layout.selected = vec![ElRef::Comp { id: Id::intern("reg") }];
        let out = delete_selection(&layout).unwrap();
        assert!(out.comps.is_empty());
        assert_eq!(out.wires[0].nodes[0].port_ref, None);

        let mut layout = out;
        layout.selected = vec![ElRef::WireNode {
            wire: Id::intern("w_del"),
            node: 1,
        }];
        let out = delete_selection(&layout).unwrap();
        assert!(out.wires.is_empty());
    }

    #[test]
    fn delete_renumbers_densely() {
        let mut layout = Layout {
            wires: vec![WireGraph {
                id: Id::intern("w_dense"),
                nodes: vec![
                    WireNode::new(0, p(0.0, 0.0)),
                    WireNode::new(1, p(4.0, 0.0)),
                    WireNode::new(2, p(4.0, 4.0)),
                ],
            }],
            ..Default::default()
        };
        layout.wires[0].link(0, 1);
        layout.wires[0].link(1, 2);
        layout.selected = vec![ElRef::WireNode {
            wire: Id::intern("w_dense"),
            node: 0,
        }];
        let out = delete_selection(&layout).unwrap();
        let g = &out.wires[0];
        assert_eq!(g.nodes.len(), 2);
        assert_eq!(g.nodes[0].pos, p(4.0, 0.0));
        assert_eq!(g.nodes[0].edges.as_slice(), &[1]);
        assert_eq!(g.nodes[1].edges.as_slice(), &[0]);
    }
}
