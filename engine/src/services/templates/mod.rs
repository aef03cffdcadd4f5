//! # Template Service Module
//!
//! This module aggregates the template pipeline and the surface it exposes
//! to the host editor. The host registers two commands and a pair of UI
//! entries; everything else is internal plumbing.
//!
//! ## Registered commands:
//!
//! *   **`insert-template`**:
//!     - **Handler**: `insert`
//!     - **Description**: Runs the full insertion-path substitution over the
//!       given HTML (token rules, marker narrowing, date and selected-content
//!       markers, node rules) and hands the result to the host's
//!       content-insertion command.
//!
//! *   **`list-templates`**:
//!     - **Handler**: `TemplatePlugin::open_picker`
//!     - **Description**: Resolves the configured template source and opens
//!       the picker dialog. An empty list short-circuits with a notification
//!       and no dialog.
//!
//! ## Sub-modules:
//! - `source`: resolves the configured source into the raw template list.
//! - `content`: fetches a selected template's body, with timeout.
//! - `substitute`: the substitution engine shared by preview and insertion.
//! - `dateformat`: `%`-token timestamp rendering for date markers.
//! - `preview`: wraps resolved HTML into the sandboxed preview document.
//! - `presave`: refreshes modification stamps right before the host saves.

pub mod content;
pub mod dateformat;
pub mod presave;
pub mod preview;
pub mod source;
pub mod substitute;

use chrono::NaiveDateTime;

use crate::config::Settings;
use crate::host::EditorHost;
use self::substitute::{NodeRule, SubstituteContext, TokenRule};

pub const INSERT_TEMPLATE: &str = "insert-template";
pub const LIST_TEMPLATES: &str = "list-templates";

/// A command the host may invoke on the plugin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Substitute the given HTML and insert it at the current selection.
    InsertTemplate(String),
    /// Resolve the template source and open the picker dialog.
    ListTemplates,
}

impl Command {
    /// The name this command is registered under in the host's command bus.
    pub fn name(&self) -> &'static str {
        match self {
            Command::InsertTemplate(_) => INSERT_TEMPLATE,
            Command::ListTemplates => LIST_TEMPLATES,
        }
    }
}

/// Toolbar button the host registers for the plugin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonSpec {
    pub name: &'static str,
    pub icon: &'static str,
    pub tooltip: &'static str,
    pub command: &'static str,
}

/// Menu item the host registers for the plugin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItemSpec {
    pub name: &'static str,
    pub icon: &'static str,
    pub text: &'static str,
    pub command: &'static str,
}

pub fn toolbar_button() -> ButtonSpec {
    ButtonSpec {
        name: "template",
        icon: "template",
        tooltip: "Insert template",
        command: LIST_TEMPLATES,
    }
}

pub fn menu_item() -> MenuItemSpec {
    MenuItemSpec {
        name: "template",
        icon: "template",
        text: "Insert template...",
        command: LIST_TEMPLATES,
    }
}

/// The `insert-template` command body.
///
/// Captures the current selection, runs the insertion-path substitution and
/// hands the result to the host. The host decides where the caret ends up.
pub fn insert(
    host: &mut dyn EditorHost,
    settings: &Settings,
    token_rules: &[TokenRule],
    node_rules: &[NodeRule],
    html: &str,
    timestamp: NaiveDateTime,
) -> Result<(), String> {
    let ctx = SubstituteContext {
        settings,
        token_rules,
        node_rules,
        selected_content: host.selected_content(),
        timestamp,
    };
    let resolved = substitute::substitute(html, &ctx)?;
    host.insert_content(&resolved);
    Ok(())
}
