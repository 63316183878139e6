//! Hit testing: pointer → element lookup.
//!
//! Categories are checked in a fixed priority order (ports, component
//! bodies, wire nodes, wire segments). Within a category elements are
//! walked topmost first (reverse draw order) and the first match wins;
//! there is no global distance sort.

use crate::geom::{
    Affine, Point, Rect, nearest_on_segment, rect_contains, rects_intersect, segment_bbox,
};
use crate::model::{Component, ElRef, WireGraph};
use serde::{Deserialize, Serialize};

/// Pick radii and mode flags for hit testing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HitOptions {
    /// Screen-space pick radius around ports, in pixels.
    pub port_radius_px: f64,
    /// Model-space pick radius around ports; either radius is enough.
    pub port_radius_model: f64,
    /// Screen-space pick radius around wire nodes, in pixels.
    pub node_radius_px: f64,
    /// Screen-space pick distance from wire segments, in pixels.
    pub segment_radius_px: f64,
    /// Skip component bodies so wires underneath them stay reachable.
    pub transparent_comps: bool,
}

impl Default for HitOptions {
    fn default() -> Self {
        Self {
            port_radius_px: 10.0,
            port_radius_model: 0.2,
            node_radius_px: 10.0,
            segment_radius_px: 10.0,
            transparent_comps: false,
        }
    }
}

/// Find the element under screen position `screen`.
///
/// `view` maps model space to screen space. Returns `None` over empty
/// canvas.
pub fn hit_test(
    comps: &[Component],
    wires: &[WireGraph],
    view: Affine,
    screen: Point,
    opts: &HitOptions,
) -> Option<ElRef> {
    let hit = hit_schematic(comps, wires, view, screen, opts, "");
    log::trace!("hit at {screen:?}: {hit:?}");
    hit
}

fn hit_schematic(
    comps: &[Component],
    wires: &[WireGraph],
    view: Affine,
    screen: Point,
    opts: &HitOptions,
    prefix: &str,
) -> Option<ElRef> {
    let model = view.inverse() * screen;
    hit_ports(comps, view, screen, model, opts, prefix)
        .or_else(|| hit_comp_bodies(comps, view, screen, model, opts, prefix))
        .or_else(|| hit_wire_nodes(wires, view, screen, opts, prefix))
        .or_else(|| hit_wire_segments(wires, view, screen, opts, prefix))
}

fn hit_ports(
    comps: &[Component],
    view: Affine,
    screen: Point,
    model: Point,
    opts: &HitOptions,
    prefix: &str,
) -> Option<ElRef> {
    for comp in comps.iter().rev() {
        for port in comp.ports.iter().rev() {
            let pos = comp.port_pos(port);
            if (view * pos).distance(screen) < opts.port_radius_px
                || pos.distance(model) < opts.port_radius_model
            {
                return Some(ElRef::CompPort {
                    comp: comp.id.prefixed(prefix),
                    port: port.id,
                });
            }
        }
    }
    None
}

fn hit_comp_bodies(
    comps: &[Component],
    view: Affine,
    screen: Point,
    model: Point,
    opts: &HitOptions,
    prefix: &str,
) -> Option<ElRef> {
    for comp in comps.iter().rev() {
        if !rect_contains(&comp.bounds(), model) {
            continue;
        }
        // Nested schematics are reachable through their parent's body.
        if let Some(sub) = &comp.sub {
            let inner_prefix = format!("{prefix}{}.", comp.id);
            let inner_view = view * sub.transform;
            if let Some(hit) =
                hit_schematic(&sub.comps, &sub.wires, inner_view, screen, opts, &inner_prefix)
            {
                return Some(hit);
            }
        }
        if !opts.transparent_comps {
            return Some(ElRef::Comp {
                id: comp.id.prefixed(prefix),
            });
        }
    }
    None
}

fn hit_wire_nodes(
    wires: &[WireGraph],
    view: Affine,
    screen: Point,
    opts: &HitOptions,
    prefix: &str,
) -> Option<ElRef> {
    for wire in wires.iter().rev() {
        for node in wire.nodes.iter().rev() {
            if (view * node.pos).distance(screen) < opts.node_radius_px {
                return Some(ElRef::WireNode {
                    wire: wire.id.prefixed(prefix),
                    node: node.id,
                });
            }
        }
    }
    None
}

fn hit_wire_segments(
    wires: &[WireGraph],
    view: Affine,
    screen: Point,
    opts: &HitOptions,
    prefix: &str,
) -> Option<ElRef> {
    for wire in wires.iter().rev() {
        for node in wire.nodes.iter().rev() {
            let a = view * node.pos;
            for &e in &node.edges {
                // Each undirected edge is visited from its lower end only.
                if node.id > e {
                    continue;
                }
                let b = view * wire.nodes[e].pos;
                if nearest_on_segment(screen, a, b).distance(screen) < opts.segment_radius_px {
                    return Some(ElRef::wire_seg(wire.id.prefixed(prefix), node.id, e));
                }
            }
        }
    }
    None
}

/// Find every top-level element inside a model-space rectangle.
/// Used for region (rubber-band) selection.
///
/// Components match when their bounds intersect the rect, wire nodes when
/// they lie inside it, and segments when their bounds intersect it.
pub fn hit_test_rect(comps: &[Component], wires: &[WireGraph], rect: Rect) -> Vec<ElRef> {
    let mut out = Vec::new();
    for comp in comps {
        if rects_intersect(&comp.bounds(), &rect) {
            out.push(ElRef::Comp { id: comp.id });
        }
    }
    for wire in wires {
        for node in &wire.nodes {
            if rect_contains(&rect, node.pos) {
                out.push(ElRef::WireNode {
                    wire: wire.id,
                    node: node.id,
                });
            }
        }
        for (a, b) in wire.segments() {
            if rects_intersect(&segment_bbox(wire.nodes[a].pos, wire.nodes[b].pos), &rect) {
                out.push(ElRef::wire_seg(wire.id, a, b));
            }
        }
    }
    out
}
