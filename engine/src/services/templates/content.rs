//! # Template Content Fetcher
//!
//! Resolves a selected template's body: inline content resolves
//! immediately, URL-backed content goes through the host HTTP helper. The
//! async wrapper runs the (possibly blocking) fetch on the blocking pool
//! and bounds it with the configured timeout, so a hung fetch fails the
//! selection instead of leaving the dialog blocked indefinitely.
//!
//! Callers are responsible for discarding results that arrive after the
//! selection has moved on; the dialog controller tags every fetch with a
//! selection generation for that purpose.

use std::sync::Arc;
use std::time::Duration;

use common::model::template::{TemplateBody, TemplateDescriptor};
use log::{debug, warn};

use crate::host::HttpClient;

/// Resolves the descriptor's body synchronously.
pub fn fetch_body(
    descriptor: &TemplateDescriptor,
    http: &dyn HttpClient,
) -> Result<String, String> {
    match &descriptor.body {
        TemplateBody::Inline(content) => Ok(content.clone()),
        TemplateBody::Url(url) => {
            debug!("fetching body for '{}' from {}", descriptor.title, url);
            http.get(url)
        }
    }
}

/// Resolves the descriptor's body on the blocking pool, bounded by `timeout`.
pub async fn fetch_body_with_timeout(
    descriptor: TemplateDescriptor,
    http: Arc<dyn HttpClient>,
    timeout: Duration,
) -> Result<String, String> {
    let title = descriptor.title.clone();
    let fetch = tokio::task::spawn_blocking(move || fetch_body(&descriptor, http.as_ref()));
    match tokio::time::timeout(timeout, fetch).await {
        Ok(joined) => joined.map_err(|e| e.to_string())?,
        Err(_) => {
            warn!("content fetch for '{}' timed out after {:?}", title, timeout);
            Err(format!("timed out loading template '{}'", title))
        }
    }
}
