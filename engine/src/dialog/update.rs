//! Update function for the picker dialog session.
//!
//! Single Elm-style `update`: it receives the current `DialogSession`, an
//! `UpdateCtx` with the host seams, and a `Msg`, mutates the session, and
//! returns the fetch effects the controller should perform. All UI side
//! effects flow through the `DialogSurface` in the context, which keeps the
//! state machine fully testable with a recording surface.
//!
//! Key behaviors
//! - Opening selects the first entry and requests its content exactly once.
//! - Every selection change bumps the fetch generation; results tagged with
//!   an older generation are dropped on arrival.
//! - A failed fetch shows an empty preview, disables submit, and raises one
//!   blocking alert; the dialog stays open.
//! - Submit re-resolves the selected body, runs the insertion-path
//!   substitution, hands the HTML to the host, and closes.

use chrono::NaiveDateTime;
use log::{debug, warn};

use common::model::template::TemplateDescriptor;

use crate::config::Settings;
use crate::host::{DialogSurface, EditorHost};
use crate::services::templates::preview;
use crate::services::templates::substitute::{self, NodeRule, SubstituteContext, TokenRule};

use super::messages::{Effect, FetchPurpose, Msg};
use super::state::DialogSession;

const LOADING_MESSAGE: &str = "Loading...";

/// Host seams and configuration shared by every update call.
pub struct UpdateCtx<'a> {
    pub settings: &'a Settings,
    pub token_rules: &'a [TokenRule],
    pub node_rules: &'a [NodeRule],
    pub preview_rules: &'a [TokenRule],
    pub host: &'a mut dyn EditorHost,
    pub surface: &'a mut dyn DialogSurface,
    pub now: NaiveDateTime,
}

/// Opens a session over a resolved descriptor list.
///
/// An empty list emits one transient notification and opens nothing.
/// Otherwise the dialog blocks on a loading message and the first entry's
/// content is requested.
pub fn open_session(
    descriptors: Vec<TemplateDescriptor>,
    ctx: &mut UpdateCtx,
) -> Option<(DialogSession, Vec<Effect>)> {
    if descriptors.is_empty() {
        ctx.host.notify("No templates defined.");
        return None;
    }
    let session = DialogSession::new(descriptors);
    ctx.surface.block(LOADING_MESSAGE);
    let effect = Effect::Fetch {
        generation: session.generation,
        purpose: FetchPurpose::Preview,
        descriptor: session.selected_descriptor().clone(),
    };
    Some((session, vec![effect]))
}

/// Central update function for the dialog session.
pub fn update(session: &mut DialogSession, ctx: &mut UpdateCtx, msg: Msg) -> Vec<Effect> {
    match msg {
        Msg::SelectTemplate(title) => {
            let Some(index) = session.index_of(&title) else {
                warn!("selection for unknown template '{}' ignored", title);
                return Vec::new();
            };
            session.selected = index;
            session.generation += 1;
            ctx.surface.block(LOADING_MESSAGE);
            vec![Effect::Fetch {
                generation: session.generation,
                purpose: FetchPurpose::Preview,
                descriptor: session.selected_descriptor().clone(),
            }]
        }
        Msg::ContentLoaded {
            generation,
            purpose,
            result,
        } => {
            if generation != session.generation {
                debug!(
                    "dropping stale fetch result (generation {}, current {})",
                    generation, session.generation
                );
                return Vec::new();
            }
            match purpose {
                FetchPurpose::Preview => on_preview_loaded(session, ctx, result),
                FetchPurpose::Insert => on_insert_loaded(session, ctx, result),
            }
            Vec::new()
        }
        Msg::Submit => {
            if !session.submit_enabled {
                return Vec::new();
            }
            session.generation += 1;
            vec![Effect::Fetch {
                generation: session.generation,
                purpose: FetchPurpose::Insert,
                descriptor: session.selected_descriptor().clone(),
            }]
        }
        Msg::Close => {
            session.open = false;
            ctx.surface.close();
            Vec::new()
        }
    }
}

fn on_preview_loaded(
    session: &mut DialogSession,
    ctx: &mut UpdateCtx,
    result: Result<String, String>,
) {
    let outcome = result
        .and_then(|body| preview::preview_document(&body, ctx.settings, ctx.host, ctx.preview_rules));
    let descriptor = session.selected_descriptor().clone();
    match outcome {
        Ok(content) => {
            session.preview_html = content;
            session.submit_enabled = true;
            ctx.surface.show_preview(&descriptor, &session.preview_html);
            ctx.surface.set_submit_enabled(true);
            ctx.surface.unblock();
            ctx.surface.focus();
        }
        Err(err) => {
            warn!("preview for '{}' failed: {}", descriptor.title, err);
            fail_selection(session, ctx, &descriptor, &err);
        }
    }
}

fn on_insert_loaded(
    session: &mut DialogSession,
    ctx: &mut UpdateCtx,
    result: Result<String, String>,
) {
    let descriptor = session.selected_descriptor().clone();
    let resolved = result.and_then(|body| {
        let substitute_ctx = SubstituteContext {
            settings: ctx.settings,
            token_rules: ctx.token_rules,
            node_rules: ctx.node_rules,
            selected_content: ctx.host.selected_content(),
            timestamp: ctx.now,
        };
        substitute::substitute(&body, &substitute_ctx)
    });
    match resolved {
        Ok(html) => {
            ctx.host.insert_content(&html);
            session.open = false;
            ctx.surface.close();
        }
        Err(err) => {
            warn!("insert of '{}' failed: {}", descriptor.title, err);
            fail_selection(session, ctx, &descriptor, &err);
        }
    }
}

/// Shared failure path: empty preview, submit disabled, one blocking alert.
fn fail_selection(
    session: &mut DialogSession,
    ctx: &mut UpdateCtx,
    descriptor: &TemplateDescriptor,
    err: &str,
) {
    session.preview_html.clear();
    session.submit_enabled = false;
    ctx.surface.show_preview(descriptor, "");
    ctx.surface.unblock();
    ctx.surface.set_submit_enabled(false);
    ctx.surface
        .alert(&format!("Could not load the template: {}", err));
    ctx.surface.focus();
}
