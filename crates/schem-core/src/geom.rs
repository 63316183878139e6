//! 2D geometry primitives for schematic model space.
//!
//! Points, vectors, rects and affine transforms come from `kurbo`; this
//! module adds the handful of predicates the wire algorithms lean on:
//! axis alignment, collinearity, nearest point on a segment and grid snap.
//!
//! Model space is y-down, matching screen space.

pub use kurbo::{Affine, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Positions closer than this are treated as the same point.
pub const EPSILON: f64 = 1e-6;

// ─── Cardinal directions ─────────────────────────────────────────────────

/// One of the four axis directions a wire segment can run in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dir {
    Left,
    Right,
    Up,
    Down,
}

impl Dir {
    /// Unit vector for this direction (y-down).
    pub fn vec(self) -> Vec2 {
        match self {
            Dir::Left => Vec2::new(-1.0, 0.0),
            Dir::Right => Vec2::new(1.0, 0.0),
            Dir::Up => Vec2::new(0.0, -1.0),
            Dir::Down => Vec2::new(0.0, 1.0),
        }
    }

    /// Dominant cardinal direction of `v`. Ties go to the horizontal axis.
    /// Returns `None` for a (near) zero vector.
    pub fn from_vec(v: Vec2) -> Option<Dir> {
        if v.x.abs() < EPSILON && v.y.abs() < EPSILON {
            return None;
        }
        Some(if v.x.abs() >= v.y.abs() {
            if v.x > 0.0 { Dir::Right } else { Dir::Left }
        } else if v.y > 0.0 {
            Dir::Down
        } else {
            Dir::Up
        })
    }
}

// ─── Predicates ──────────────────────────────────────────────────────────

/// Whether two points coincide within [`EPSILON`].
pub fn approx_eq(a: Point, b: Point) -> bool {
    (a.x - b.x).abs() < EPSILON && (a.y - b.y).abs() < EPSILON
}

/// A segment is axis-aligned when its endpoints share an x or y coordinate.
pub fn is_axis_aligned(a: Point, b: Point) -> bool {
    (a.x - b.x).abs() < EPSILON || (a.y - b.y).abs() < EPSILON
}

/// Whether `v` runs along the same axis as `axis` (either sense).
/// A zero vector is parallel to everything.
pub fn is_parallel(v: Vec2, axis: Vec2) -> bool {
    v.cross(axis).abs() < EPSILON * (1.0 + v.hypot() * axis.hypot())
}

/// Whether `p` lies on segment `a`–`b`, excluding both endpoints.
///
/// Only meaningful for axis-aligned segments; diagonal segments never
/// contain interior points here.
pub fn on_segment_interior(p: Point, a: Point, b: Point) -> bool {
    if approx_eq(p, a) || approx_eq(p, b) {
        return false;
    }
    if (a.y - b.y).abs() < EPSILON {
        (p.y - a.y).abs() < EPSILON && p.x > a.x.min(b.x) && p.x < a.x.max(b.x)
    } else if (a.x - b.x).abs() < EPSILON {
        (p.x - a.x).abs() < EPSILON && p.y > a.y.min(b.y) && p.y < a.y.max(b.y)
    } else {
        false
    }
}

// ─── Projection ──────────────────────────────────────────────────────────

/// Parameter `t` of the projection of `p` onto the line through `a`, `b`
/// (0 at `a`, 1 at `b`). Degenerate segments project to 0.
pub fn project_on_segment(p: Point, a: Point, b: Point) -> f64 {
    let ab = b - a;
    let len2 = ab.hypot2();
    if len2 < EPSILON * EPSILON {
        return 0.0;
    }
    (p - a).dot(ab) / len2
}

/// Closest point to `p` on the closed segment `a`–`b`.
pub fn nearest_on_segment(p: Point, a: Point, b: Point) -> Point {
    let t = project_on_segment(p, a, b).clamp(0.0, 1.0);
    a + (b - a) * t
}

// ─── Boxes ───────────────────────────────────────────────────────────────

/// Bounding box of a segment (zero-width or zero-height for axis-aligned ones).
pub fn segment_bbox(a: Point, b: Point) -> Rect {
    Rect::from_points(a, b)
}

/// Inclusive point-in-rect test; points on the border count as inside.
pub fn rect_contains(r: &Rect, p: Point) -> bool {
    p.x >= r.x0 && p.x <= r.x1 && p.y >= r.y0 && p.y <= r.y1
}

/// Inclusive AABB overlap, so degenerate (line-like) boxes still intersect.
pub fn rects_intersect(a: &Rect, b: &Rect) -> bool {
    a.x0 <= b.x1 && a.x1 >= b.x0 && a.y0 <= b.y1 && a.y1 >= b.y0
}

// ─── Grid ────────────────────────────────────────────────────────────────

/// Round a point to the nearest multiple of `grid` on both axes.
pub fn snap_to_grid(p: Point, grid: f64) -> Point {
    if grid <= 0.0 {
        return p;
    }
    Point::new((p.x / grid).round() * grid, (p.y / grid).round() * grid)
}

/// Round a vector component-wise to the nearest multiple of `grid`.
pub fn snap_vec(v: Vec2, grid: f64) -> Vec2 {
    snap_to_grid(v.to_point(), grid).to_vec2()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dominant_direction() {
        assert_eq!(Dir::from_vec(Vec2::new(3.0, 1.0)), Some(Dir::Right));
        assert_eq!(Dir::from_vec(Vec2::new(-3.0, 1.0)), Some(Dir::Left));
        assert_eq!(Dir::from_vec(Vec2::new(0.5, -2.0)), Some(Dir::Up));
        assert_eq!(Dir::from_vec(Vec2::new(0.0, 2.0)), Some(Dir::Down));
        assert_eq!(Dir::from_vec(Vec2::ZERO), None);
    }

    #[test]
    fn axis_alignment() {
        assert!(is_axis_aligned(Point::new(0.0, 0.0), Point::new(4.0, 0.0)));
        assert!(is_axis_aligned(Point::new(2.0, 1.0), Point::new(2.0, 9.0)));
        assert!(!is_axis_aligned(Point::new(0.0, 0.0), Point::new(1.0, 1.0)));
    }

    #[test]
    fn interior_points() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(4.0, 0.0);
        assert!(on_segment_interior(Point::new(2.0, 0.0), a, b));
        assert!(!on_segment_interior(a, a, b));
        assert!(!on_segment_interior(Point::new(5.0, 0.0), a, b));
        assert!(!on_segment_interior(Point::new(2.0, 0.5), a, b));
    }

    #[test]
    fn nearest_point_clamps_to_ends() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 0.0);
        assert_eq!(nearest_on_segment(Point::new(4.0, 3.0), a, b), Point::new(4.0, 0.0));
        assert_eq!(nearest_on_segment(Point::new(-4.0, 3.0), a, b), a);
        assert_eq!(nearest_on_segment(Point::new(14.0, -1.0), a, b), b);
    }

    #[test]
    fn degenerate_boxes_intersect() {
        let seg = segment_bbox(Point::new(0.0, 5.0), Point::new(10.0, 5.0));
        let sel = Rect::new(4.0, 4.0, 6.0, 6.0);
        assert!(rects_intersect(&seg, &sel));
        assert!(!rects_intersect(&seg, &Rect::new(4.0, 6.0, 6.0, 8.0)));
    }

    #[test]
    fn grid_snap() {
        assert_eq!(snap_to_grid(Point::new(1.4, -2.6), 1.0), Point::new(1.0, -3.0));
        assert_eq!(snap_vec(Vec2::new(0.2, 2.7), 1.0), Vec2::new(0.0, 3.0));
    }
}
