use serde::{Deserialize, Serialize};

/// Raw template record as configured inline or fetched as JSON from a
/// source URL. `url` and `content` are mutually exclusive in practice:
/// a record with a `url` field is fetched on demand, anything else is
/// treated as inline content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawTemplate {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateBody {
    Url(String),
    Inline(String),
}

/// Normalized template entry presented in the picker. Built once from a
/// `RawTemplate` when a dialog session opens and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateDescriptor {
    pub title: String,
    pub description: String,
    pub body: TemplateBody,
}

impl From<RawTemplate> for TemplateDescriptor {
    fn from(raw: RawTemplate) -> Self {
        // A record is URL-backed iff the raw source had a `url` field;
        // inline content missing from a non-URL record resolves to "".
        let body = match raw.url {
            Some(url) => TemplateBody::Url(url),
            None => TemplateBody::Inline(raw.content.unwrap_or_default()),
        };
        Self {
            title: raw.title,
            description: raw.description,
            body,
        }
    }
}

impl TemplateDescriptor {
    pub fn is_url(&self) -> bool {
        matches!(self.body, TemplateBody::Url(_))
    }
}
