//! # Substitution Engine
//!
//! Rewrites a resolved template body for preview or insertion. The passes
//! run in a fixed order:
//!
//! 1. **Token pass**: every `TokenRule`, in rule order, globally replaces
//!    literal `{$name}` occurrences in the raw HTML string. Because rules
//!    are applied sequentially over the whole string, a replacement value
//!    containing a later rule's token is itself substituted. That chaining
//!    is long-standing observable behavior and is kept as-is (see the
//!    `chained_tokens_resolve_in_rule_order` test).
//! 2. **Parse** into a detached element tree.
//! 3. **Marker narrowing**: when any element carries the configured
//!    template-marker class, processing narrows to a clone of the first
//!    such subtree. Templates wrapped in page boilerplate rely on this.
//! 4. **Content markers**: elements matching the creation-date,
//!    modification-date, or selected-content class sets get their inner
//!    content replaced (formatted timestamp or captured selection). Freshly
//!    replaced content is not rescanned.
//! 5. **Node rules**: each configured class rule's mutator runs against
//!    every matching element.
//! 6. **Serialize** back to an HTML string.
//!
//! Tree-level passes match classes structurally (whole-word against the
//! `class` attribute), so re-running them over already-substituted output
//! does not corrupt it. The token pass is a blind string replace and makes
//! no such guarantee.

use chrono::NaiveDateTime;
use log::debug;
use regex::{NoExpand, Regex};

use crate::config::Settings;
use crate::dom::{self, Element, Node};
use crate::services::templates::dateformat::format_datetime;

/// Replacement value for a `{$name}` token.
pub enum TokenValue {
    Literal(String),
    /// Computed at substitution time; receives the token name.
    Resolver(Box<dyn Fn(&str) -> String + Send + Sync>),
}

/// One `{$name}` replacement. Rule order is application order.
pub struct TokenRule {
    pub name: String,
    pub value: TokenValue,
}

impl TokenRule {
    pub fn literal(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: TokenValue::Literal(value.into()),
        }
    }

    pub fn resolver<F>(name: impl Into<String>, resolve: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            value: TokenValue::Resolver(Box::new(resolve)),
        }
    }

    fn resolve(&self) -> String {
        match &self.value {
            TokenValue::Literal(value) => value.clone(),
            TokenValue::Resolver(resolve) => resolve(&self.name),
        }
    }
}

/// Mutates every element carrying `class` (whole-word match).
pub struct NodeRule {
    pub class: String,
    mutate: Box<dyn Fn(&mut Element) + Send + Sync>,
}

impl NodeRule {
    pub fn new<F>(class: impl Into<String>, mutate: F) -> Self
    where
        F: Fn(&mut Element) + Send + Sync + 'static,
    {
        Self {
            class: class.into(),
            mutate: Box::new(mutate),
        }
    }

    pub fn apply(&self, element: &mut Element) {
        (self.mutate)(element)
    }
}

/// Inputs shared by every substitution pass.
pub struct SubstituteContext<'a> {
    pub settings: &'a Settings,
    pub token_rules: &'a [TokenRule],
    pub node_rules: &'a [NodeRule],
    /// Editor selection captured once, before tree construction.
    pub selected_content: String,
    pub timestamp: NaiveDateTime,
}

/// Applies every token rule, in order, over the raw HTML string.
pub fn replace_tokens(html: &str, rules: &[TokenRule]) -> Result<String, String> {
    let mut html = html.to_string();
    for rule in rules {
        let pattern = format!(r"\{{\${}\}}", regex::escape(&rule.name));
        let re = Regex::new(&pattern).map_err(|e| e.to_string())?;
        let value = rule.resolve();
        html = re.replace_all(&html, NoExpand(value.as_str())).into_owned();
    }
    Ok(html)
}

/// Full insertion-path substitution: token pass, parse, marker narrowing,
/// content markers, node rules, serialize.
pub fn substitute(html: &str, ctx: &SubstituteContext) -> Result<String, String> {
    let html = replace_tokens(html, ctx.token_rules)?;
    let mut nodes = dom::parse_fragment(&html);

    let marker = dom::class_pattern(&ctx.settings.template_marker_class)?;
    let narrowed = dom::find_element(&nodes, &|el| dom::has_class(el, &marker)).cloned();
    if let Some(found) = narrowed {
        debug!("narrowing substitution to <{} class=\"{}\">", found.tag, found.class_attr());
        nodes = vec![Node::Element(found)];
    }

    apply_content_markers(&mut nodes, ctx)?;
    apply_node_rules(&mut nodes, ctx.node_rules)?;
    Ok(dom::serialize_nodes(&nodes))
}

/// Date and selected-content replacement over the tree.
fn apply_content_markers(nodes: &mut [Node], ctx: &SubstituteContext) -> Result<(), String> {
    let creation = dom::class_pattern(&ctx.settings.creation_date_classes)?;
    let modification = dom::class_pattern(&ctx.settings.modification_date_classes)?;
    let selected = dom::class_pattern(&ctx.settings.selected_content_classes)?;
    let creation_value = format_datetime(&ctx.settings.creation_date_format, &ctx.timestamp);
    let modification_value =
        format_datetime(&ctx.settings.modification_date_format, &ctx.timestamp);

    fn visit(
        nodes: &mut [Node],
        creation: &Regex,
        modification: &Regex,
        selected: &Regex,
        creation_value: &str,
        modification_value: &str,
        selection: &str,
    ) {
        for node in nodes {
            let Node::Element(element) = node else { continue };
            let mut replaced = false;
            if dom::has_class(element, creation) {
                element.set_inner_html(creation_value);
                replaced = true;
            }
            if dom::has_class(element, modification) {
                element.set_inner_html(modification_value);
                replaced = true;
            }
            if dom::has_class(element, selected) {
                element.set_inner_html(selection);
                replaced = true;
            }
            // Freshly inserted content is not rescanned.
            if !replaced {
                visit(
                    &mut element.children,
                    creation,
                    modification,
                    selected,
                    creation_value,
                    modification_value,
                    selection,
                );
            }
        }
    }

    visit(
        nodes,
        &creation,
        &modification,
        &selected,
        &creation_value,
        &modification_value,
        &ctx.selected_content,
    );
    Ok(())
}

/// Runs every node rule against every matching element.
pub(crate) fn apply_node_rules(nodes: &mut [Node], rules: &[NodeRule]) -> Result<(), String> {
    let compiled = rules
        .iter()
        .map(|rule| dom::class_pattern(&rule.class).map(|pattern| (pattern, rule)))
        .collect::<Result<Vec<_>, String>>()?;
    dom::for_each_element_mut(nodes, &mut |element| {
        for (pattern, rule) in &compiled {
            if dom::has_class(element, pattern) {
                rule.apply(element);
            }
        }
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn fixed() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 7)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
    }

    fn ctx<'a>(
        settings: &'a Settings,
        token_rules: &'a [TokenRule],
        node_rules: &'a [NodeRule],
        selection: &str,
    ) -> SubstituteContext<'a> {
        SubstituteContext {
            settings,
            token_rules,
            node_rules,
            selected_content: selection.to_string(),
            timestamp: fixed(),
        }
    }

    #[test]
    fn tokens_are_replaced_before_parsing() {
        let settings = Settings::default();
        let tokens = vec![TokenRule::literal("x", "hi")];
        let ctx = ctx(&settings, &tokens, &[], "");
        assert_eq!(substitute("<p>{$x}</p>", &ctx).unwrap(), "<p>hi</p>");
    }

    #[test]
    fn chained_tokens_resolve_in_rule_order() {
        let rules = vec![TokenRule::literal("a", "{$b}"), TokenRule::literal("b", "Z")];
        assert_eq!(replace_tokens("{$a}{$b}", &rules).unwrap(), "ZZ");
    }

    #[test]
    fn resolver_tokens_receive_the_token_name() {
        let rules = vec![TokenRule::resolver("user", |name| format!("<{}>", name))];
        assert_eq!(replace_tokens("hello {$user}", &rules).unwrap(), "hello <user>");
    }

    #[test]
    fn token_values_are_inserted_verbatim() {
        // `$0`-style fragments in a replacement value must not be expanded.
        let rules = vec![TokenRule::literal("amount", "$100")];
        assert_eq!(replace_tokens("{$amount}", &rules).unwrap(), "$100");
    }

    #[test]
    fn creation_date_marker_is_filled() {
        let settings = Settings::default();
        let ctx = ctx(&settings, &[], &[], "");
        assert_eq!(
            substitute("<p class=\"cdate\">old</p>", &ctx).unwrap(),
            "<p class=\"cdate\">2024-03-07</p>"
        );
    }

    #[test]
    fn class_matching_is_whole_word() {
        let settings = Settings::default();
        let ctx = ctx(&settings, &[], &[], "");
        assert_eq!(
            substitute("<p class=\"cdateish\">old</p>", &ctx).unwrap(),
            "<p class=\"cdateish\">old</p>"
        );
        assert_eq!(
            substitute("<p class=\"foo cdate bar\">old</p>", &ctx).unwrap(),
            "<p class=\"foo cdate bar\">2024-03-07</p>"
        );
    }

    #[test]
    fn selected_content_marker_receives_the_selection() {
        let settings = Settings::default();
        let ctx = ctx(&settings, &[], &[], "<b>picked</b>");
        assert_eq!(
            substitute("<div class=\"selcontent\">placeholder</div>", &ctx).unwrap(),
            "<div class=\"selcontent\"><b>picked</b></div>"
        );
    }

    #[test]
    fn inserted_selection_is_not_rescanned() {
        let settings = Settings::default();
        let ctx = ctx(&settings, &[], &[], "<span class=\"cdate\">when?</span>");
        assert_eq!(
            substitute("<div class=\"selcontent\">x</div>", &ctx).unwrap(),
            "<div class=\"selcontent\"><span class=\"cdate\">when?</span></div>"
        );
    }

    #[test]
    fn marker_class_narrows_to_first_subtree() {
        let settings = Settings::default();
        let ctx = ctx(&settings, &[], &[], "");
        let html = "<p>junk</p><div class=\"tmpl\"><span>keep</span></div><div class=\"tmpl\">second</div>";
        assert_eq!(
            substitute(html, &ctx).unwrap(),
            "<div class=\"tmpl\"><span>keep</span></div>"
        );
    }

    #[test]
    fn node_rules_mutate_matching_elements() {
        let settings = Settings::default();
        let rules = vec![NodeRule::new("badge", |el: &mut Element| {
            el.attrs.push(("data-stamped".to_string(), "yes".to_string()));
        })];
        let ctx = ctx(&settings, &[], &rules, "");
        assert_eq!(
            substitute("<span class=\"badge\">v</span><span class=\"other\">w</span>", &ctx).unwrap(),
            "<span class=\"badge\" data-stamped=\"yes\">v</span><span class=\"other\">w</span>"
        );
    }

    #[test]
    fn tree_passes_are_idempotent() {
        let settings = Settings::default();
        let ctx = ctx(&settings, &[], &[], "sel");
        let first = substitute(
            "<div class=\"tmpl\"><span class=\"cdate\">x</span><span class=\"selcontent\">y</span></div>",
            &ctx,
        )
        .unwrap();
        let second = substitute(&first, &ctx).unwrap();
        assert_eq!(first, second);
    }
}
