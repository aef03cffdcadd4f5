//! # Pre-Save Refresh
//!
//! Document-lifecycle hook run immediately before the host serializes
//! content for saving. Every `div` carrying the template-marker class is
//! rescanned: descendants matching the modification-date class set get a
//! fresh timestamp and the configured node rules are re-applied, so
//! modification stamps stay current no matter when the template was
//! inserted. Creation dates and selected-content regions are deliberately
//! left untouched.

use chrono::NaiveDateTime;

use crate::config::Settings;
use crate::dom;
use crate::services::templates::dateformat::format_datetime;
use crate::services::templates::substitute::{apply_node_rules, NodeRule};

pub fn refresh_saved_markup(
    html: &str,
    settings: &Settings,
    node_rules: &[NodeRule],
    timestamp: &NaiveDateTime,
) -> Result<String, String> {
    let mut nodes = dom::parse_fragment(html);
    let marker = dom::class_pattern(&settings.template_marker_class)?;
    let modification = dom::class_pattern(&settings.modification_date_classes)?;
    let stamp = format_datetime(&settings.modification_date_format, timestamp);

    let mut failure: Option<String> = None;
    dom::for_each_element_mut(&mut nodes, &mut |element| {
        if element.tag != "div" || !dom::has_class(element, &marker) {
            return;
        }
        dom::for_each_element_mut(&mut element.children, &mut |inner| {
            if dom::has_class(inner, &modification) {
                inner.set_inner_html(&stamp);
            }
        });
        if let Err(e) = apply_node_rules(&mut element.children, node_rules) {
            failure.get_or_insert(e);
        }
    });
    match failure {
        Some(e) => Err(e),
        None => Ok(dom::serialize_nodes(&nodes)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn fixed() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 7)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    #[test]
    fn refreshes_modification_dates_inside_marked_divs() {
        let html = "<div class=\"tmpl\"><span class=\"mdate\">2023-01-01</span></div>";
        let out = refresh_saved_markup(html, &Settings::default(), &[], &fixed()).unwrap();
        assert_eq!(
            out,
            "<div class=\"tmpl\"><span class=\"mdate\">2024-03-07</span></div>"
        );
    }

    #[test]
    fn creation_dates_are_left_alone() {
        let html = "<div class=\"tmpl\"><span class=\"cdate\">2023-01-01</span></div>";
        let out = refresh_saved_markup(html, &Settings::default(), &[], &fixed()).unwrap();
        assert_eq!(out, html);
    }

    #[test]
    fn markup_outside_marked_divs_is_untouched() {
        let html = "<p class=\"mdate\">2023-01-01</p><span class=\"tmpl mdate\">x</span>";
        let out = refresh_saved_markup(html, &Settings::default(), &[], &fixed()).unwrap();
        assert_eq!(out, html);
    }

    #[test]
    fn node_rules_are_reapplied_on_save() {
        let rules = vec![NodeRule::new("counter", |el: &mut dom::Element| {
            el.set_inner_html("bumped");
        })];
        let html = "<div class=\"tmpl\"><span class=\"counter\">0</span></div>";
        let out = refresh_saved_markup(html, &Settings::default(), &rules, &fixed()).unwrap();
        assert_eq!(out, "<div class=\"tmpl\"><span class=\"counter\">bumped</span></div>");
    }
}
