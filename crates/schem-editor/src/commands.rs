//! Commit/preview edit session.
//!
//! The committed layout is the single source of truth and is only ever
//! replaced wholesale. During a gesture each frame produces a preview
//! snapshot next to it; releasing the gesture either commits the last
//! candidate or drops it. Every candidate is validated first, so a
//! corrupt layout is never shown and never committed.

use schem_core::{Layout, WireError, check_wires};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct EditSession {
    committed: Arc<Layout>,
    preview: Option<Arc<Layout>>,
    revision: u64,
}

impl EditSession {
    /// Start a session on `layout`.
    ///
    /// # Errors
    /// Rejects a layout whose wires break a graph invariant.
    pub fn new(layout: Layout) -> Result<Self, WireError> {
        check_wires(&layout.wires)?;
        Ok(Self {
            committed: Arc::new(layout),
            preview: None,
            revision: 0,
        })
    }

    /// What should be displayed: the preview if one exists.
    pub fn current(&self) -> &Layout {
        self.preview.as_deref().unwrap_or(self.committed.as_ref())
    }

    /// The authoritative snapshot. Cheap to clone and safe to hand out.
    pub fn committed(&self) -> Arc<Layout> {
        Arc::clone(&self.committed)
    }

    /// Bumped every time a commit changes the layout.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn has_preview(&self) -> bool {
        self.preview.is_some()
    }

    /// Run `edit` against the committed layout and either commit the
    /// result or keep it as the preview.
    ///
    /// # Errors
    /// If the edit fails or its result doesn't validate, the preview is
    /// dropped, the committed layout is left alone and the error returned.
    pub fn update<F>(&mut self, commit: bool, edit: F) -> Result<(), WireError>
    where
        F: FnOnce(&Layout) -> Result<Layout, WireError>,
    {
        let candidate = edit(self.committed.as_ref()).and_then(|layout| {
            check_wires(&layout.wires)?;
            Ok(layout)
        });
        let layout = match candidate {
            Ok(layout) => layout,
            Err(err) => {
                log::error!("edit rejected: {err}");
                self.preview = None;
                return Err(err);
            }
        };

        if commit {
            self.preview = None;
            if layout != *self.committed {
                self.committed = Arc::new(layout);
                self.revision += 1;
                log::debug!("committed revision {}", self.revision);
            }
        } else {
            log::trace!("preview updated");
            self.preview = Some(Arc::new(layout));
        }
        Ok(())
    }

    pub fn discard_preview(&mut self) {
        self.preview = None;
    }

    /// Replace the whole layout, e.g. when the host loads another design.
    ///
    /// # Errors
    /// Same validation as [`EditSession::new`].
    pub fn replace(&mut self, layout: Layout) -> Result<(), WireError> {
        check_wires(&layout.wires)?;
        self.committed = Arc::new(layout);
        self.preview = None;
        self.revision += 1;
        Ok(())
    }
}
