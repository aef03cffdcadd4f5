//! Template-insertion pipeline for a host rich-text editor.
//!
//! The host registers the `insert-template` and `list-templates` commands
//! plus the toolbar/menu entries from `services::templates`, implements the
//! seams in `host`, and hands everything to a `TemplatePlugin`. The plugin
//! resolves the configured template source, drives the picker dialog
//! through `dialog::controller`, substitutes tokens, date markers,
//! selected-content markers, and class rules into the chosen template, and
//! hands the final HTML back to the editor's insertion command. `pre_save`
//! is wired into the host's serialize hook so modification stamps stay
//! current.

pub mod config;
pub mod dialog;
pub mod dom;
pub mod host;
pub mod services;

use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use log::warn;

use crate::config::Settings;
use crate::dialog::controller::DialogController;
use crate::host::{DialogSurface, EditorHost, HttpClient};
use crate::services::templates::source::{self, TemplateSource};
use crate::services::templates::substitute::{NodeRule, TokenRule};
use crate::services::templates::{self, Command};

/// Substitution rules configured by the host, shared by every dialog
/// session and insert command.
#[derive(Default)]
pub struct Rules {
    /// `{$name}` replacements applied on the insertion path.
    pub token_rules: Vec<TokenRule>,
    /// Class-driven element mutators.
    pub node_rules: Vec<NodeRule>,
    /// `{$name}` replacements applied to preview documents only.
    pub preview_rules: Vec<TokenRule>,
}

/// One configured plugin instance, bound to a host editor.
pub struct TemplatePlugin {
    settings: Settings,
    source: Arc<TemplateSource>,
    rules: Arc<Rules>,
    http: Arc<dyn HttpClient>,
}

impl TemplatePlugin {
    pub fn new(
        settings: Settings,
        source: TemplateSource,
        rules: Rules,
        http: Arc<dyn HttpClient>,
    ) -> Self {
        Self {
            settings,
            source: Arc::new(source),
            rules: Arc::new(rules),
            http,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The `insert-template` command: substitute `html` and hand it to the
    /// host's content-insertion command.
    pub fn insert(&self, host: &mut dyn EditorHost, html: &str) -> Result<(), String> {
        templates::insert(
            host,
            &self.settings,
            &self.rules.token_rules,
            &self.rules.node_rules,
            html,
            Local::now().naive_local(),
        )
    }

    /// Pre-save hook: refresh modification stamps in already-inserted
    /// template markup. The host calls this with the document HTML right
    /// before serializing it.
    pub fn pre_save(&self, html: &str) -> Result<String, String> {
        templates::presave::refresh_saved_markup(
            html,
            &self.settings,
            &self.rules.node_rules,
            &Local::now().naive_local(),
        )
    }

    /// The `list-templates` command: resolve the template source and run
    /// the picker dialog to completion.
    ///
    /// List-load failures surface as a blocking alert and no dialog; an
    /// empty list surfaces as one transient notification.
    pub async fn open_picker<H, S>(&self, host: H, mut surface: S) -> Result<(), String>
    where
        H: EditorHost,
        S: DialogSurface,
    {
        let source = Arc::clone(&self.source);
        let http = Arc::clone(&self.http);
        let timeout = Duration::from_secs(self.settings.fetch_timeout_secs);
        let load = tokio::task::spawn_blocking(move || source::load(&source, http.as_ref()));
        let records = match tokio::time::timeout(timeout, load).await {
            Ok(joined) => joined.map_err(|e| e.to_string())?,
            Err(_) => Err("timed out loading the template list".to_string()),
        };
        let records = match records {
            Ok(records) => records,
            Err(err) => {
                warn!("template list failed to load: {}", err);
                surface.alert(&format!("Could not load the template list: {}", err));
                return Ok(());
            }
        };
        let descriptors = source::descriptors_from_raw(records);
        let controller = DialogController::open(
            self.settings.clone(),
            Arc::clone(&self.rules),
            Arc::clone(&self.http),
            descriptors,
            host,
            surface,
        );
        if let Some(controller) = controller {
            controller.run().await;
        }
        Ok(())
    }

    /// Routes a host command invocation to its handler.
    pub async fn dispatch<H, S>(&self, command: Command, mut host: H, surface: S) -> Result<(), String>
    where
        H: EditorHost,
        S: DialogSurface,
    {
        match command {
            Command::InsertTemplate(html) => self.insert(&mut host, &html),
            Command::ListTemplates => self.open_picker(host, surface).await,
        }
    }
}
