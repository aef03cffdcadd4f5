//! # Preview Document Builder
//!
//! Prepares resolved template HTML for the sandboxed preview pane. A body
//! that is already a complete document (contains `<html>`) is left alone;
//! anything else is wrapped in a full shell so the preview renders with the
//! authoring document's stylesheets and base URI:
//!
//! - `<base>` pointing at the document base URI,
//! - one `<link>` per configured content stylesheet, in source order,
//!   optionally with `crossorigin="anonymous"`,
//! - the configured inline style block, when present,
//! - a script that swallows anchor clicks unless the platform modifier key
//!   is held, so links in the preview cannot navigate the pane,
//! - a `<body>` carrying the resolved body class and the editor's text
//!   direction.
//!
//! The preview-only token rules are applied after wrapping; they are
//! distinct from the token rules used on the insertion path.

use crate::config::Settings;
use crate::dom::escape_html;
use crate::host::EditorHost;
use crate::services::templates::substitute::{replace_tokens, TokenRule};

pub fn preview_document(
    html: &str,
    settings: &Settings,
    host: &dyn EditorHost,
    preview_rules: &[TokenRule],
) -> Result<String, String> {
    let html = if html.contains("<html>") {
        html.to_string()
    } else {
        wrap_in_shell(html, settings, host)
    };
    replace_tokens(&html, preview_rules)
}

fn wrap_in_shell(html: &str, settings: &Settings, host: &dyn EditorHost) -> String {
    let cors = if settings.content_css_cors {
        " crossorigin=\"anonymous\""
    } else {
        ""
    };
    let mut head_entries = String::new();
    for url in host.content_css() {
        head_entries.push_str(&format!(
            "<link type=\"text/css\" rel=\"stylesheet\" href=\"{}\"{}>",
            host.resolve_uri(&url),
            cors
        ));
    }
    if !settings.content_style.is_empty() {
        head_entries.push_str(&format!(
            "<style type=\"text/css\">{}</style>",
            settings.content_style
        ));
    }

    let modifier = if host.is_mac() {
        "e.metaKey"
    } else {
        "e.ctrlKey && !e.altKey"
    };
    let click_guard = format!(
        "<script>document.addEventListener && document.addEventListener(\"click\", \
         function(e) {{for (var elm = e.target; elm; elm = elm.parentNode) \
         {{if (elm.nodeName === \"A\" && !({})) {{e.preventDefault();}}}}}}, false);</script> ",
        modifier
    );

    let body_class = settings.body_class_for(host.editor_id());
    let dir_attr = host
        .text_direction()
        .map(|dir| format!(" dir=\"{}\"", escape_html(&dir)))
        .unwrap_or_default();

    format!(
        "<!DOCTYPE html><html><head><base href=\"{}\">{}{}</head><body class=\"{}\"{}>{}</body></html>",
        escape_html(&host.base_uri()),
        head_entries,
        click_guard,
        escape_html(&body_class),
        dir_attr,
        html
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    struct FakeHost {
        css: Vec<String>,
        dir: Option<String>,
    }

    impl EditorHost for FakeHost {
        fn editor_id(&self) -> &str {
            "main"
        }
        fn selected_content(&self) -> String {
            String::new()
        }
        fn insert_content(&mut self, _html: &str) {}
        fn notify(&self, _message: &str) {}
        fn base_uri(&self) -> String {
            "https://docs.example/base/".to_string()
        }
        fn resolve_uri(&self, href: &str) -> String {
            format!("https://docs.example{}", href)
        }
        fn content_css(&self) -> Vec<String> {
            self.css.clone()
        }
        fn text_direction(&self) -> Option<String> {
            self.dir.clone()
        }
        fn is_mac(&self) -> bool {
            false
        }
    }

    #[test]
    fn wraps_fragment_with_base_and_stylesheets_in_order() {
        let host = FakeHost {
            css: vec!["/a.css".to_string(), "/b.css".to_string()],
            dir: None,
        };
        let out = preview_document("<p>x</p>", &Settings::default(), &host, &[]).unwrap();
        assert_eq!(out.matches("<base ").count(), 1);
        assert!(out.contains("<base href=\"https://docs.example/base/\">"));
        let a = out.find("https://docs.example/a.css").unwrap();
        let b = out.find("https://docs.example/b.css").unwrap();
        assert!(a < b, "stylesheets must keep source order");
        assert!(out.starts_with("<!DOCTYPE html><html>"));
        assert!(out.ends_with("<p>x</p></body></html>"));
    }

    #[test]
    fn complete_documents_are_not_wrapped() {
        let html = "<html><body><p>x</p></body></html>";
        let host = FakeHost { css: vec![], dir: None };
        let out = preview_document(html, &Settings::default(), &host, &[]).unwrap();
        assert_eq!(out, html);
    }

    #[test]
    fn cors_attribute_follows_the_setting() {
        let host = FakeHost {
            css: vec!["/a.css".to_string()],
            dir: None,
        };
        let settings = Settings {
            content_css_cors: true,
            ..Settings::default()
        };
        let out = preview_document("<p>x</p>", &settings, &host, &[]).unwrap();
        assert!(out.contains("crossorigin=\"anonymous\""));
    }

    #[test]
    fn inline_style_and_direction_are_injected() {
        let host = FakeHost {
            css: vec![],
            dir: Some("rtl".to_string()),
        };
        let settings = Settings {
            content_style: "p { color: red }".to_string(),
            body_class: "article".to_string(),
            ..Settings::default()
        };
        let out = preview_document("<p>x</p>", &settings, &host, &[]).unwrap();
        assert!(out.contains("<style type=\"text/css\">p { color: red }</style>"));
        assert!(out.contains("<body class=\"article\" dir=\"rtl\">"));
    }

    #[test]
    fn preview_rules_apply_after_wrapping() {
        let host = FakeHost { css: vec![], dir: None };
        let rules = vec![TokenRule::literal("env", "staging")];
        let out = preview_document("<p>{$env}</p>", &Settings::default(), &host, &rules).unwrap();
        assert!(out.contains("<p>staging</p>"));
    }
}
