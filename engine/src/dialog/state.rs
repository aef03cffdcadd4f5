//! Session state for one open picker dialog.
//!
//! All per-dialog data lives here, owned by the controller for the
//! dialog's lifetime and discarded on close. Handlers receive the session
//! explicitly; nothing is captured in closures or globals.

use common::model::template::TemplateDescriptor;

/// State container for a picker dialog session.
pub struct DialogSession {
    /// Entries shown in the picker, in source order. Never empty: an empty
    /// list short-circuits before a session is constructed.
    pub descriptors: Vec<TemplateDescriptor>,

    /// Index of the currently selected entry.
    pub selected: usize,

    /// Monotonically increasing fetch generation. Every selection change
    /// and submit bumps it; fetch results carrying an older generation are
    /// discarded.
    pub generation: u64,

    /// Whether the submit action is currently available. Cleared when a
    /// fetch fails, restored by the next successful preview.
    pub submit_enabled: bool,

    /// Last preview document shown, kept for the host to re-query.
    pub preview_html: String,

    /// Cleared when the dialog closes; the controller loop exits on it.
    pub open: bool,
}

impl DialogSession {
    /// Builds the session for a non-empty descriptor list with the first
    /// entry selected, per the picker's default-selection contract.
    pub fn new(descriptors: Vec<TemplateDescriptor>) -> Self {
        debug_assert!(!descriptors.is_empty());
        Self {
            descriptors,
            selected: 0,
            generation: 1,
            submit_enabled: true,
            preview_html: String::new(),
            open: true,
        }
    }

    pub fn selected_descriptor(&self) -> &TemplateDescriptor {
        &self.descriptors[self.selected]
    }

    pub fn index_of(&self, title: &str) -> Option<usize> {
        self.descriptors.iter().position(|d| d.title == title)
    }
}
