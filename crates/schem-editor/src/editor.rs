//! Schematic editor: routes input events to gestures, shortcuts and the
//! view, and owns the edit session.
//!
//! The host shell feeds `InputEvent`s into [`SchematicEditor::handle`] and
//! redraws from [`SchematicEditor::layout`] afterwards.

use crate::commands::EditSession;
use crate::config::EditorConfig;
use crate::edit::{delete_selection, select, select_all};
use crate::input::{Button, InputEvent, Modifiers};
use crate::shortcuts::{ShortcutAction, ShortcutMap};
use crate::tools::DragSession;
use crate::view::ViewTransform;
use schem_core::{ElRef, Layout, Point, WireError, hit_test};
use std::sync::Arc;

pub struct SchematicEditor {
    session: EditSession,
    pub view: ViewTransform,
    pub config: EditorConfig,
    drag: Option<DragSession>,
    hover: Option<ElRef>,
}

impl SchematicEditor {
    /// # Errors
    /// Rejects a layout whose wires break a graph invariant.
    pub fn new(layout: Layout, config: EditorConfig) -> Result<Self, WireError> {
        Ok(Self {
            session: EditSession::new(layout)?,
            view: ViewTransform::default(),
            config,
            drag: None,
            hover: None,
        })
    }

    /// The layout to draw: the live preview during a gesture, otherwise
    /// the committed layout.
    pub fn layout(&self) -> &Layout {
        self.session.current()
    }

    pub fn committed(&self) -> Arc<Layout> {
        self.session.committed()
    }

    pub fn revision(&self) -> u64 {
        self.session.revision()
    }

    /// Element under the pointer, as of the last event.
    pub fn hover(&self) -> Option<ElRef> {
        self.hover
    }

    pub fn drag(&self) -> Option<&DragSession> {
        self.drag.as_ref()
    }

    pub fn hit_at(&self, screen: Point) -> Option<ElRef> {
        let layout = self.session.current();
        hit_test(
            &layout.comps,
            &layout.wires,
            self.view.affine(),
            screen,
            &self.config.hit,
        )
    }

    /// Load a different layout, dropping any gesture in progress.
    ///
    /// # Errors
    /// Rejects a layout whose wires break a graph invariant; the current
    /// layout is kept in that case.
    pub fn load(&mut self, layout: Layout) -> Result<(), WireError> {
        self.session.replace(layout)?;
        self.drag = None;
        self.hover = None;
        Ok(())
    }

    /// Process one input event.
    ///
    /// # Errors
    /// Returns the invariant violation when an edit produced a corrupt
    /// wire. The committed layout is unchanged in that case.
    pub fn handle(&mut self, event: &InputEvent) -> Result<(), WireError> {
        match event {
            InputEvent::PointerDown {
                x,
                y,
                button,
                modifiers,
            } => {
                self.pointer_down(Point::new(*x, *y), *button, *modifiers);
                Ok(())
            }
            InputEvent::PointerMove { x, y, .. } => self.pointer_move(Point::new(*x, *y)),
            InputEvent::PointerUp { x, y, .. } => self.pointer_up(Point::new(*x, *y)),
            InputEvent::Wheel { x, y, delta_y } => {
                self.view.zoom_at(Point::new(*x, *y), *delta_y, &self.config);
                Ok(())
            }
            InputEvent::Key { key, modifiers } => self.key(key, modifiers),
        }
    }

    fn pointer_down(&mut self, screen: Point, button: Button, modifiers: Modifiers) {
        // A second press while dragging abandons the first gesture.
        if self.drag.take().is_some() {
            self.session.discard_preview();
        }
        let hit = self.hit_at(screen);
        self.hover = hit;
        self.drag = Some(DragSession::begin(
            self.session.current(),
            hit,
            screen,
            &self.view,
            button,
            modifiers,
        ));
    }

    fn pointer_move(&mut self, screen: Point) -> Result<(), WireError> {
        let Some(drag) = self.drag.as_mut() else {
            self.hover = self.hit_at(screen);
            log::trace!("hover {:?}", self.hover);
            return Ok(());
        };
        if drag.pan(&mut self.view, screen) {
            return Ok(());
        }
        if !drag.track(screen) {
            return Ok(());
        }
        let (view, cfg) = (self.view, self.config);
        self.session
            .update(false, |base| drag.preview(base, screen, &view, &cfg))
    }

    fn pointer_up(&mut self, screen: Point) -> Result<(), WireError> {
        let Some(mut drag) = self.drag.take() else {
            return Ok(());
        };
        if drag.pan(&mut self.view, screen) {
            return Ok(());
        }
        let (view, cfg) = (self.view, self.config);
        let result = if drag.track(screen) {
            self.session
                .update(true, |base| drag.preview(base, screen, &view, &cfg))
        } else {
            self.session.update(true, |base| Ok(drag.click(base)))
        };
        log::debug!("drag end: {:?}", drag.kind);
        self.hover = self.hit_at(screen);
        result
    }

    fn key(&mut self, key: &str, modifiers: &Modifiers) -> Result<(), WireError> {
        let Some(action) = ShortcutMap::resolve(key, modifiers) else {
            return Ok(());
        };
        log::debug!("shortcut {key:?} -> {action:?}");
        match action {
            ShortcutAction::Deselect if self.drag.is_some() => {
                self.drag = None;
                self.session.discard_preview();
                Ok(())
            }
            ShortcutAction::Deselect => self.session.update(true, |base| Ok(select(base, None, false))),
            ShortcutAction::Delete if self.drag.is_none() => self.session.update(true, delete_selection),
            ShortcutAction::SelectAll if self.drag.is_none() => {
                self.session.update(true, |base| Ok(select_all(base)))
            }
            ShortcutAction::Delete | ShortcutAction::SelectAll => Ok(()),
            ShortcutAction::ToggleTransparentComps => {
                self.config.hit.transparent_comps = !self.config.hit.transparent_comps;
                Ok(())
            }
        }
    }
}
