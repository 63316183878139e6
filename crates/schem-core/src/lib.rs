pub mod check;
pub mod geom;
pub mod hit;
pub mod id;
pub mod model;
pub mod wire;

pub use check::{WireError, check_wire, check_wires, lint_wire};
pub use geom::{Affine, Dir, Point, Rect, Vec2};
pub use hit::{HitOptions, hit_test, hit_test_rect};
pub use id::Id;
pub use model::*;
pub use wire::{
    attach_port_refs, fix_wire, repack_graph_ids, shift_segment, wire_to_graph, wire_to_segments,
};
