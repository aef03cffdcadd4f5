//! # Template Source Loader
//!
//! Resolves the configured template source into the raw record list shown
//! by the picker. A source is one of three explicit shapes:
//!
//! - `List`: records configured inline; passed through unchanged.
//! - `Provider`: a host callback producing the records, possibly after its
//!   own blocking work.
//! - `Url`: an HTTP GET whose response body is a JSON array of records.
//!
//! Order is preserved from the source and is significant: the first record
//! becomes the default selection when the dialog opens. A fetch or parse
//! failure is returned as an error for the caller to surface the same way a
//! content-fetch failure is surfaced; it never propagates unhandled.

use common::model::template::{RawTemplate, TemplateDescriptor};
use log::debug;

use crate::host::HttpClient;

pub type ProviderFn = Box<dyn Fn() -> Result<Vec<RawTemplate>, String> + Send + Sync>;

/// The three configured source shapes.
pub enum TemplateSource {
    List(Vec<RawTemplate>),
    Provider(ProviderFn),
    Url(String),
}

impl TemplateSource {
    pub fn provider<F>(provide: F) -> Self
    where
        F: Fn() -> Result<Vec<RawTemplate>, String> + Send + Sync + 'static,
    {
        Self::Provider(Box::new(provide))
    }
}

/// Resolves the source into its raw record list.
///
/// May block on the provider callback or the HTTP fetch; async callers run
/// this under `spawn_blocking`.
pub fn load(source: &TemplateSource, http: &dyn HttpClient) -> Result<Vec<RawTemplate>, String> {
    match source {
        TemplateSource::List(records) => Ok(records.clone()),
        TemplateSource::Provider(provide) => provide(),
        TemplateSource::Url(url) => {
            debug!("fetching template list from {}", url);
            let body = http.get(url)?;
            serde_json::from_str::<Vec<RawTemplate>>(&body)
                .map_err(|e| format!("invalid template list from {}: {}", url, e))
        }
    }
}

/// Normalizes raw records into picker entries, preserving order.
pub fn descriptors_from_raw(records: Vec<RawTemplate>) -> Vec<TemplateDescriptor> {
    records.into_iter().map(TemplateDescriptor::from).collect()
}
