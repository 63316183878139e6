//! Pointer gestures.
//!
//! A pointer-down picks a gesture from whatever is under the pointer and
//! opens a `DragSession`. Every move recomputes the candidate layout from
//! the baseline captured at pointer-down, never from the previous frame,
//! so a drag can wander and come back without accumulating edits.
//!
//! | Pressed on      | Button            | Gesture                        |
//! |-----------------|-------------------|--------------------------------|
//! | port            | primary           | draw a new wire                |
//! | wire node       | primary           | extend the wire from that node |
//! | wire segment    | primary           | slide the segment sideways     |
//! | component body  | primary           | click-select only              |
//! | empty canvas    | primary           | region select                  |
//! | anything        | middle, secondary | pan                            |
//!
//! A gesture released without leaving `CLICK_SLOP_PX` counts as a click
//! and selects what was under the pointer at press time.

use crate::config::EditorConfig;
use crate::edit::{create_wire, drag_wire_segment, extend_wire, select, select_region};
use crate::input::{Button, Modifiers};
use crate::view::ViewTransform;
use schem_core::{Dir, ElRef, Id, Layout, Point, PortRef, Vec2, WireError};

/// Pointer travel (px) below which a press/release is treated as a click.
pub const CLICK_SLOP_PX: f64 = 3.0;

/// What the current drag does.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragKind {
    /// Draw a new wire out of `port`. The wire id is reserved at press
    /// time so every preview frame reuses it.
    CreateWire { port: PortRef, wire: Id },
    /// Extend wire `wire` (index into the baseline) from `node`.
    ExtendWire { wire: usize, node: usize },
    /// Slide segment `node0`–`node1` of wire `wire`.
    DragSegment {
        wire: usize,
        node0: usize,
        node1: usize,
    },
    /// Rubber-band selection from the press point.
    SelectRegion,
    /// Select on release; dragging does nothing.
    Click,
    /// Move the view. `offset` is the view offset at press time.
    Pan { offset: Vec2 },
}

/// State for one press → move* → release gesture.
///
/// Dropping the session ends the gesture and forgets the grab direction.
#[derive(Debug, Clone)]
pub struct DragSession {
    pub kind: DragKind,
    /// Element under the pointer at press time.
    pub start_hit: Option<ElRef>,
    pub start_screen: Point,
    pub start_model: Point,
    /// Shift was held at press time.
    pub additive: bool,
    /// Set once the pointer leaves the click slop radius.
    pub moved: bool,
    grab: Option<Dir>,
}

impl DragSession {
    /// Pick a gesture for a press at `screen` over `hit`.
    pub fn begin(
        layout: &Layout,
        hit: Option<ElRef>,
        screen: Point,
        view: &ViewTransform,
        button: Button,
        modifiers: Modifiers,
    ) -> Self {
        let kind = match (button, hit) {
            (Button::Middle | Button::Secondary, _) => DragKind::Pan {
                offset: view.offset,
            },
            (Button::Primary, Some(ElRef::CompPort { comp, port })) => DragKind::CreateWire {
                port: PortRef::new(comp, port),
                wire: layout.fresh_wire_id("wire"),
            },
            (Button::Primary, Some(ElRef::WireNode { wire, node })) => {
                match layout.wire_index(wire) {
                    Some(wire) => DragKind::ExtendWire { wire, node },
                    None => DragKind::Click,
                }
            }
            (Button::Primary, Some(ElRef::WireSeg { wire, node0, node1 })) => {
                match layout.wire_index(wire) {
                    Some(wire) => DragKind::DragSegment { wire, node0, node1 },
                    None => DragKind::Click,
                }
            }
            (Button::Primary, Some(ElRef::Comp { .. })) => DragKind::Click,
            (Button::Primary, None) => DragKind::SelectRegion,
        };
        log::debug!("drag start: {kind:?} over {hit:?}");
        Self {
            kind,
            start_hit: hit,
            start_screen: screen,
            start_model: view.to_model(screen),
            additive: modifiers.shift,
            moved: false,
            grab: None,
        }
    }

    /// The captured grab direction of an extend drag, if any.
    pub fn grab_dir(&self) -> Option<Dir> {
        self.grab
    }

    /// Record pointer travel. Returns `true` once the gesture is a drag
    /// rather than a click.
    pub fn track(&mut self, screen: Point) -> bool {
        if !self.moved && screen.distance(self.start_screen) > CLICK_SLOP_PX {
            self.moved = true;
        }
        self.moved
    }

    /// Capture or clear the grab direction for a pointer at `screen`,
    /// relative to the grabbed node at `anchor` (both in screen space).
    ///
    /// Once captured the direction is held until the pointer comes back
    /// within the threshold, so it doesn't flicker near the node.
    pub fn update_grab(&mut self, anchor: Point, screen: Point, threshold_px: f64) {
        let offset = screen - anchor;
        if offset.hypot() <= threshold_px {
            if self.grab.take().is_some() {
                log::trace!("grab direction cleared");
            }
        } else if self.grab.is_none() {
            self.grab = Dir::from_vec(offset);
            log::trace!("grab direction captured: {:?}", self.grab);
        }
    }

    /// The layout this gesture proposes with the pointer at `screen`.
    ///
    /// Always computed from `baseline`; panning proposes no change.
    pub fn preview(
        &mut self,
        baseline: &Layout,
        screen: Point,
        view: &ViewTransform,
        cfg: &EditorConfig,
    ) -> Result<Layout, WireError> {
        let model = view.to_model(screen);
        match self.kind {
            DragKind::CreateWire { port, wire } => create_wire(baseline, port, model, wire, cfg),
            DragKind::ExtendWire { wire, node } => {
                let anchor = view.to_screen(baseline.wires[wire].nodes[node].pos);
                self.update_grab(anchor, screen, cfg.grab_threshold_px);
                extend_wire(baseline, wire, node, model, self.grab, cfg)
            }
            DragKind::DragSegment { wire, node0, node1 } => {
                drag_wire_segment(baseline, wire, node0, node1, model - self.start_model, cfg)
            }
            DragKind::SelectRegion => Ok(select_region(
                baseline,
                self.start_model,
                model,
                self.additive,
            )),
            DragKind::Click | DragKind::Pan { .. } => Ok(baseline.clone()),
        }
    }

    /// The layout produced by releasing without having moved.
    pub fn click(&self, baseline: &Layout) -> Layout {
        match self.kind {
            DragKind::Pan { .. } => baseline.clone(),
            _ => select(baseline, self.start_hit, self.additive),
        }
    }

    /// Move `view` for a pan gesture with the pointer at `screen`.
    /// Returns `false`, leaving the view alone, for any other gesture.
    pub fn pan(&self, view: &mut ViewTransform, screen: Point) -> bool {
        let DragKind::Pan { offset } = self.kind else {
            return false;
        };
        view.offset = offset;
        view.pan(screen - self.start_screen);
        true
    }
}
