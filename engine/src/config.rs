//! Plugin configuration read from the host editor.
//!
//! Every field has a default so the host can hand over a partial JSON
//! object (or none at all) and still get a working pipeline. The class
//! fields are space-separated sets of class names; matching against
//! template markup is whole-word (see `dom::class_pattern`).

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Classes whose elements receive the creation timestamp.
    pub creation_date_classes: String,
    /// Classes whose elements receive the modification timestamp.
    pub modification_date_classes: String,
    /// Classes whose elements receive the editor selection at insert time.
    pub selected_content_classes: String,
    /// Class marking the root fragment to extract when a template body is
    /// wrapped in boilerplate.
    pub template_marker_class: String,
    pub creation_date_format: String,
    pub modification_date_format: String,
    /// Inline CSS injected into the preview document shell.
    pub content_style: String,
    /// Adds `crossorigin="anonymous"` to injected stylesheet links.
    pub content_css_cors: bool,
    /// Body class for the preview shell. Either a plain class string, or a
    /// per-editor map in the `editor1=class1,editor2=class2` form.
    pub body_class: String,
    /// Upper bound on every template-list and content fetch.
    pub fetch_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            creation_date_classes: "cdate".to_string(),
            modification_date_classes: "mdate".to_string(),
            selected_content_classes: "selcontent".to_string(),
            template_marker_class: "tmpl".to_string(),
            creation_date_format: "%Y-%m-%d".to_string(),
            modification_date_format: "%Y-%m-%d".to_string(),
            content_style: String::new(),
            content_css_cors: false,
            body_class: String::new(),
            fetch_timeout_secs: 30,
        }
    }
}

impl Settings {
    /// Resolves `body_class` for one editor instance.
    ///
    /// A value without `=` applies to every editor. The map form yields the
    /// entry matching `editor_id`, or `""` when the id is not listed.
    pub fn body_class_for(&self, editor_id: &str) -> String {
        if !self.body_class.contains('=') {
            return self.body_class.clone();
        }
        self.body_class
            .split(',')
            .filter_map(|entry| entry.split_once('='))
            .find(|(id, _)| id.trim() == editor_id)
            .map(|(_, class)| class.trim().to_string())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_match_documented_values() {
        let settings = Settings::default();
        assert_eq!(settings.creation_date_classes, "cdate");
        assert_eq!(settings.modification_date_classes, "mdate");
        assert_eq!(settings.selected_content_classes, "selcontent");
        assert_eq!(settings.creation_date_format, "%Y-%m-%d");
        assert_eq!(settings.fetch_timeout_secs, 30);
        assert!(!settings.content_css_cors);
    }

    #[test]
    fn deserializes_partial_json() {
        let settings: Settings =
            serde_json::from_str(r#"{"creation_date_format": "%d.%m.%Y", "content_css_cors": true}"#)
                .unwrap();
        assert_eq!(settings.creation_date_format, "%d.%m.%Y");
        assert!(settings.content_css_cors);
        assert_eq!(settings.modification_date_classes, "mdate");
    }

    #[test]
    fn body_class_plain_form_applies_everywhere() {
        let settings = Settings {
            body_class: "article".to_string(),
            ..Settings::default()
        };
        assert_eq!(settings.body_class_for("any"), "article");
    }

    #[test]
    fn body_class_map_form_resolves_per_editor() {
        let settings = Settings {
            body_class: "main=article, sidebar=aside".to_string(),
            ..Settings::default()
        };
        assert_eq!(settings.body_class_for("main"), "article");
        assert_eq!(settings.body_class_for("sidebar"), "aside");
        assert_eq!(settings.body_class_for("other"), "");
    }
}
