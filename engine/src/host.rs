//! Seams to the host editor.
//!
//! The pipeline never talks to a concrete editor, HTTP stack, or dialog
//! framework; everything it consumes from the host goes through these three
//! traits. `HttpClient` is deliberately synchronous: async callers wrap it
//! in `tokio::task::spawn_blocking`, keeping the traits trivial for hosts
//! (and tests) to implement.

use common::model::template::TemplateDescriptor;
use tokio::sync::mpsc;

use crate::dialog::messages::Msg;

/// Host-provided HTTP GET helper returning the raw response body.
pub trait HttpClient: Send + Sync {
    fn get(&self, url: &str) -> Result<String, String>;
}

/// The subset of the editor surface the pipeline reads and drives.
pub trait EditorHost {
    /// Stable identifier of the editor instance, used to resolve the
    /// per-editor `body_class` map form.
    fn editor_id(&self) -> &str;

    /// HTML currently selected in the editor.
    fn selected_content(&self) -> String;

    /// Hands final HTML to the editor's content-insertion command.
    fn insert_content(&mut self, html: &str);

    /// Transient, non-blocking informational message.
    fn notify(&self, message: &str);

    /// Base URI of the authoring document.
    fn base_uri(&self) -> String;

    /// Resolves a possibly-relative stylesheet reference against the
    /// authoring document.
    fn resolve_uri(&self, href: &str) -> String;

    /// Configured content stylesheets, in registration order.
    fn content_css(&self) -> Vec<String>;

    /// Text direction of the editor body, when one is set.
    fn text_direction(&self) -> Option<String>;

    /// Whether the host platform uses the meta key as its primary modifier.
    fn is_mac(&self) -> bool;
}

/// The dialog window the host renders for the template picker.
///
/// The session state machine drives this surface; it never inspects it.
pub trait DialogSurface {
    /// Receives the session's message sender when the dialog opens. The
    /// host wires it into its selection-change, submit, and cancel
    /// callbacks.
    fn connect(&mut self, events: mpsc::Sender<Msg>) {
        let _ = events;
    }

    /// Blocks interaction, showing a progress message.
    fn block(&mut self, message: &str);

    fn unblock(&mut self);

    /// Shows the resolved preview for the given template.
    fn show_preview(&mut self, descriptor: &TemplateDescriptor, preview_html: &str);

    fn set_submit_enabled(&mut self, enabled: bool);

    /// Blocking alert naming a failure. The dialog stays open behind it.
    fn alert(&mut self, message: &str);

    /// Returns keyboard focus to the picker control.
    fn focus(&mut self) {}

    fn close(&mut self);
}
