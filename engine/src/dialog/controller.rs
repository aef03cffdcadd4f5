//! Drives one picker dialog session on a single logical actor.
//!
//! The controller owns the `DialogSession`, the host seams, and an MPSC
//! channel of `Msg`. UI events arrive as messages through the sender; fetch
//! effects run on the blocking pool via `spawn_blocking` and come back as
//! generation-tagged `ContentLoaded` messages on the same channel. All
//! session mutation therefore happens on the controller task, which is what
//! makes the generation guard race-free without any locking.

use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use log::{debug, info};
use tokio::sync::mpsc;
use uuid::Uuid;

use common::model::template::TemplateDescriptor;

use crate::config::Settings;
use crate::host::{DialogSurface, EditorHost, HttpClient};
use crate::services::templates::content;
use crate::Rules;

use super::messages::{Effect, Msg};
use super::state::DialogSession;
use super::update::{open_session, update, UpdateCtx};

/// How many pending dialog messages may queue before senders wait.
const CHANNEL_CAPACITY: usize = 32;

pub struct DialogController<H: EditorHost, S: DialogSurface> {
    /// Correlation id for log lines from this session.
    id: Uuid,
    session: DialogSession,
    settings: Settings,
    rules: Arc<Rules>,
    host: H,
    surface: S,
    http: Arc<dyn HttpClient>,
    tx: mpsc::Sender<Msg>,
    rx: mpsc::Receiver<Msg>,
    /// Effects produced by opening, performed when `run` starts.
    initial: Vec<Effect>,
}

impl<H: EditorHost, S: DialogSurface> DialogController<H, S> {
    /// Opens a session over the resolved descriptor list.
    ///
    /// Returns `None` for an empty list, after the one-notification
    /// short-circuit has already been delivered through the host.
    pub fn open(
        settings: Settings,
        rules: Arc<Rules>,
        http: Arc<dyn HttpClient>,
        descriptors: Vec<TemplateDescriptor>,
        mut host: H,
        mut surface: S,
    ) -> Option<Self> {
        let opened = {
            let mut ctx = UpdateCtx {
                settings: &settings,
                token_rules: &rules.token_rules,
                node_rules: &rules.node_rules,
                preview_rules: &rules.preview_rules,
                host: &mut host,
                surface: &mut surface,
                now: Local::now().naive_local(),
            };
            open_session(descriptors, &mut ctx)
        };
        let (session, initial) = opened?;
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        surface.connect(tx.clone());
        Some(Self {
            id: Uuid::new_v4(),
            session,
            settings,
            rules,
            host,
            surface,
            http,
            tx,
            rx,
            initial,
        })
    }

    /// Sender the host wires into its dialog callbacks (selection change,
    /// submit, cancel).
    pub fn sender(&self) -> mpsc::Sender<Msg> {
        self.tx.clone()
    }

    /// Processes messages until the session closes.
    pub async fn run(mut self) {
        info!(
            "template dialog {} opened with {} templates",
            self.id,
            self.session.descriptors.len()
        );
        let initial = std::mem::take(&mut self.initial);
        self.perform(initial);

        while self.session.open {
            let Some(msg) = self.rx.recv().await else {
                break;
            };
            let effects = {
                let mut ctx = UpdateCtx {
                    settings: &self.settings,
                    token_rules: &self.rules.token_rules,
                    node_rules: &self.rules.node_rules,
                    preview_rules: &self.rules.preview_rules,
                    host: &mut self.host,
                    surface: &mut self.surface,
                    now: Local::now().naive_local(),
                };
                update(&mut self.session, &mut ctx, msg)
            };
            self.perform(effects);
        }
        info!("template dialog {} closed", self.id);
    }

    /// Spawns one fetch task per effect; results come back as messages.
    fn perform(&self, effects: Vec<Effect>) {
        for effect in effects {
            let Effect::Fetch {
                generation,
                purpose,
                descriptor,
            } = effect;
            let http = Arc::clone(&self.http);
            let tx = self.tx.clone();
            let timeout = Duration::from_secs(self.settings.fetch_timeout_secs);
            let id = self.id;
            tokio::spawn(async move {
                let result = content::fetch_body_with_timeout(descriptor, http, timeout).await;
                if tx
                    .send(Msg::ContentLoaded {
                        generation,
                        purpose,
                        result,
                    })
                    .await
                    .is_err()
                {
                    debug!("dialog {} closed before its fetch finished", id);
                }
            });
        }
    }
}
