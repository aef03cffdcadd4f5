//! Detached HTML element tree used by the substitution passes.
//!
//! Templates are small, hand-authored HTML fragments, so this module carries
//! a deliberately small tolerant parser instead of a full HTML5 tree builder:
//!
//! - Text and comments are kept verbatim (no entity decoding), which makes
//!   parse/serialize round trips lossless for text content.
//! - Void elements (`<br>`, `<img>`, ...) and self-closing tags produce leaf
//!   elements; `<script>`/`<style>` bodies are captured as raw text.
//! - Unclosed elements are folded into their parent at end of input; stray
//!   close tags are ignored.
//!
//! Class tests are whole-word: a space-separated class-name set is compiled
//! into a single `\b(a|b)\b` pattern and matched against the element's
//! `class` attribute, so `cdateish` never matches a `cdate` rule.

use regex::Regex;

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
    Comment(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    /// Tag name, lowercased at parse time.
    pub tag: String,
    /// Attributes in source order. Names are lowercased; values are kept
    /// verbatim. An empty value serializes as a bare attribute.
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

impl Element {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        let name = name.to_ascii_lowercase();
        self.attrs
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.as_str())
    }

    /// The `class` attribute value, or `""` when absent.
    pub fn class_attr(&self) -> &str {
        self.attr("class").unwrap_or("")
    }

    pub fn is_void(&self) -> bool {
        VOID_ELEMENTS.contains(&self.tag.as_str())
    }

    /// Replaces all children with the parsed fragment.
    pub fn set_inner_html(&mut self, html: &str) {
        self.children = parse_fragment(html);
    }

    pub fn inner_html(&self) -> String {
        serialize_nodes(&self.children)
    }
}

/// Compiles a space-separated class-name set into a whole-word matcher.
///
/// Mirrors the class test applied to template markup: the names are joined
/// with `|` inside a single `\b(...)\b` group. An empty set yields a pattern
/// that matches nothing.
pub fn class_pattern(names: &str) -> Result<Regex, String> {
    let alternatives: Vec<String> = names.split_whitespace().map(regex::escape).collect();
    let pattern = if alternatives.is_empty() {
        r"[^\s\S]".to_string()
    } else {
        format!(r"\b({})\b", alternatives.join("|"))
    };
    Regex::new(&pattern).map_err(|e| e.to_string())
}

pub fn has_class(element: &Element, pattern: &Regex) -> bool {
    pattern.is_match(element.class_attr())
}

/// Pre-order walk over every element in the tree, parents before children.
pub fn for_each_element_mut<F: FnMut(&mut Element)>(nodes: &mut [Node], f: &mut F) {
    for node in nodes {
        if let Node::Element(element) = node {
            f(element);
            for_each_element_mut(&mut element.children, f);
        }
    }
}

/// First element (pre-order) satisfying the predicate.
pub fn find_element<'a>(nodes: &'a [Node], pred: &dyn Fn(&Element) -> bool) -> Option<&'a Element> {
    for node in nodes {
        if let Node::Element(element) = node {
            if pred(element) {
                return Some(element);
            }
            if let Some(found) = find_element(&element.children, pred) {
                return Some(found);
            }
        }
    }
    None
}

/// Escapes special HTML characters in a string.
pub fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Parses an HTML fragment into a detached node list.
pub fn parse_fragment(html: &str) -> Vec<Node> {
    Parser::new(html).run()
}

pub fn serialize_nodes(nodes: &[Node]) -> String {
    nodes.iter().map(serialize_node).collect()
}

fn serialize_node(node: &Node) -> String {
    match node {
        Node::Text(text) => text.clone(),
        Node::Comment(comment) => format!("<!--{}-->", comment),
        Node::Element(element) => {
            let mut out = String::new();
            out.push('<');
            out.push_str(&element.tag);
            for (name, value) in &element.attrs {
                if value.is_empty() {
                    out.push(' ');
                    out.push_str(name);
                } else {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    out.push_str(&value.replace('"', "&quot;"));
                    out.push('"');
                }
            }
            out.push('>');
            if !element.is_void() {
                out.push_str(&serialize_nodes(&element.children));
                out.push_str("</");
                out.push_str(&element.tag);
                out.push('>');
            }
            out
        }
    }
}

struct Parser<'a> {
    html: &'a str,
    pos: usize,
    root: Vec<Node>,
    stack: Vec<Element>,
}

impl<'a> Parser<'a> {
    fn new(html: &'a str) -> Self {
        Self {
            html,
            pos: 0,
            root: Vec::new(),
            stack: Vec::new(),
        }
    }

    fn run(mut self) -> Vec<Node> {
        while self.pos < self.html.len() {
            match self.html[self.pos..].find('<') {
                None => {
                    self.push_text(self.pos, self.html.len());
                    self.pos = self.html.len();
                }
                Some(offset) => {
                    let lt = self.pos + offset;
                    self.push_text(self.pos, lt);
                    self.pos = lt;
                    self.consume_markup();
                }
            }
        }
        // Unclosed elements fold into their parent at end of input.
        while let Some(element) = self.stack.pop() {
            self.push_node(Node::Element(element));
        }
        self.root
    }

    fn rest(&self) -> &'a str {
        &self.html[self.pos..]
    }

    fn push_text(&mut self, start: usize, end: usize) {
        if end > start {
            self.push_node(Node::Text(self.html[start..end].to_string()));
        }
    }

    fn push_node(&mut self, node: Node) {
        match self.stack.last_mut() {
            Some(parent) => parent.children.push(node),
            None => self.root.push(node),
        }
    }

    /// Consumes one `<...>` construct starting at `self.pos`.
    fn consume_markup(&mut self) {
        let rest = self.rest();
        if rest.starts_with("<!--") {
            let body_start = self.pos + 4;
            match self.html[body_start..].find("-->") {
                Some(end) => {
                    let comment = self.html[body_start..body_start + end].to_string();
                    self.push_node(Node::Comment(comment));
                    self.pos = body_start + end + 3;
                }
                None => {
                    self.push_node(Node::Comment(self.html[body_start..].to_string()));
                    self.pos = self.html.len();
                }
            }
        } else if rest.starts_with("<!") || rest.starts_with("<?") {
            // Doctype and processing instructions pass through as raw text.
            match rest.find('>') {
                Some(end) => {
                    self.push_text(self.pos, self.pos + end + 1);
                    self.pos += end + 1;
                }
                None => {
                    self.push_text(self.pos, self.html.len());
                    self.pos = self.html.len();
                }
            }
        } else if let Some(after_slash) = rest.strip_prefix("</") {
            let name: String = after_slash
                .chars()
                .take_while(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == ':')
                .collect();
            let consumed = 2 + name.len();
            let close = match self.html[self.pos + consumed..].find('>') {
                Some(end) => self.pos + consumed + end + 1,
                None => self.html.len(),
            };
            self.pos = close;
            self.close_element(&name.to_ascii_lowercase());
        } else if rest.len() > 1 && rest[1..].starts_with(|c: char| c.is_ascii_alphabetic()) {
            self.consume_open_tag();
        } else {
            // A lone `<` is literal text.
            self.push_text(self.pos, self.pos + 1);
            self.pos += 1;
        }
    }

    fn close_element(&mut self, name: &str) {
        let Some(index) = self.stack.iter().rposition(|el| el.tag == name) else {
            return; // stray close tag
        };
        while self.stack.len() > index + 1 {
            let unclosed = self.stack.pop().unwrap();
            self.push_node(Node::Element(unclosed));
        }
        let element = self.stack.pop().unwrap();
        self.push_node(Node::Element(element));
    }

    fn consume_open_tag(&mut self) {
        self.pos += 1; // past '<'
        let name: String = self
            .rest()
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == ':')
            .collect();
        self.pos += name.len();
        let mut element = Element::new(&name);
        let self_closing = self.consume_attrs(&mut element);

        if !self_closing && RAW_TEXT_ELEMENTS.contains(&element.tag.as_str()) {
            self.consume_raw_text(&mut element);
            self.push_node(Node::Element(element));
        } else if self_closing || element.is_void() {
            self.push_node(Node::Element(element));
        } else {
            self.stack.push(element);
        }
    }

    /// Parses attributes up to and including the closing `>`; returns whether
    /// the tag was self-closing.
    fn consume_attrs(&mut self, element: &mut Element) -> bool {
        loop {
            while self.rest().starts_with(|c: char| c.is_whitespace()) {
                self.pos += 1;
            }
            let rest = self.rest();
            if rest.is_empty() {
                return false;
            }
            if rest.starts_with("/>") {
                self.pos += 2;
                return true;
            }
            if rest.starts_with('>') {
                self.pos += 1;
                return false;
            }
            if rest.starts_with('/') {
                self.pos += 1;
                continue;
            }
            let name: String = rest
                .chars()
                .take_while(|c| !c.is_whitespace() && !matches!(c, '=' | '>' | '/'))
                .collect();
            if name.is_empty() {
                self.pos += 1;
                continue;
            }
            self.pos += name.len();
            while self.rest().starts_with(|c: char| c.is_whitespace()) {
                self.pos += 1;
            }
            let value = if self.rest().starts_with('=') {
                self.pos += 1;
                while self.rest().starts_with(|c: char| c.is_whitespace()) {
                    self.pos += 1;
                }
                self.consume_attr_value()
            } else {
                String::new()
            };
            element.attrs.push((name.to_ascii_lowercase(), value));
        }
    }

    fn consume_attr_value(&mut self) -> String {
        let rest = self.rest();
        if let Some(quote) = rest.chars().next().filter(|c| *c == '"' || *c == '\'') {
            let body = &rest[1..];
            match body.find(quote) {
                Some(end) => {
                    let value = body[..end].to_string();
                    self.pos += 1 + end + 1;
                    value
                }
                None => {
                    self.pos = self.html.len();
                    body.to_string()
                }
            }
        } else {
            let value: String = rest
                .chars()
                .take_while(|c| !c.is_whitespace() && *c != '>')
                .collect();
            self.pos += value.len();
            value
        }
    }

    /// Captures everything up to the matching close tag as a single raw text
    /// child. Used for `<script>` and `<style>`.
    fn consume_raw_text(&mut self, element: &mut Element) {
        let close = format!("</{}", element.tag);
        let haystack = self.rest().to_ascii_lowercase();
        match haystack.find(&close) {
            Some(offset) => {
                if offset > 0 {
                    let text = self.html[self.pos..self.pos + offset].to_string();
                    element.children.push(Node::Text(text));
                }
                let after = self.pos + offset;
                self.pos = match self.html[after..].find('>') {
                    Some(end) => after + end + 1,
                    None => self.html.len(),
                };
            }
            None => {
                let text = self.html[self.pos..].to_string();
                if !text.is_empty() {
                    element.children.push(Node::Text(text));
                }
                self.pos = self.html.len();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_and_serializes_nested_markup() {
        let html = "<div class=\"outer\"><p>Hello <strong>world</strong></p><br></div>";
        let nodes = parse_fragment(html);
        assert_eq!(serialize_nodes(&nodes), html);
    }

    #[test]
    fn keeps_text_and_comments_verbatim() {
        let html = "before<!-- note -->after &amp; more";
        let nodes = parse_fragment(html);
        assert_eq!(serialize_nodes(&nodes), html);
    }

    #[test]
    fn whole_word_class_matching() {
        let pattern = class_pattern("cdate").unwrap();
        let mut el = Element::new("span");
        el.attrs.push(("class".to_string(), "cdateish".to_string()));
        assert!(!has_class(&el, &pattern));
        el.attrs[0].1 = "foo cdate bar".to_string();
        assert!(has_class(&el, &pattern));
    }

    #[test]
    fn class_pattern_supports_multiple_names() {
        let pattern = class_pattern("cdate created-on").unwrap();
        let mut el = Element::new("span");
        el.attrs.push(("class".to_string(), "created-on".to_string()));
        assert!(has_class(&el, &pattern));
        el.attrs[0].1 = "other".to_string();
        assert!(!has_class(&el, &pattern));
    }

    #[test]
    fn empty_class_set_matches_nothing() {
        let pattern = class_pattern("").unwrap();
        let mut el = Element::new("span");
        el.attrs.push(("class".to_string(), String::new()));
        assert!(!has_class(&el, &pattern));
    }

    #[test]
    fn set_inner_html_replaces_children() {
        let mut el = Element::new("div");
        el.set_inner_html("<em>x</em>");
        assert_eq!(el.inner_html(), "<em>x</em>");
        el.set_inner_html("plain");
        assert_eq!(el.inner_html(), "plain");
    }

    #[test]
    fn void_and_self_closing_tags_are_leaves() {
        let nodes = parse_fragment("<img src=\"a.png\"><span/>after");
        assert_eq!(
            serialize_nodes(&nodes),
            "<img src=\"a.png\"><span></span>after"
        );
    }

    #[test]
    fn unclosed_elements_fold_at_end_of_input() {
        let nodes = parse_fragment("<div><p>text");
        assert_eq!(serialize_nodes(&nodes), "<div><p>text</p></div>");
    }

    #[test]
    fn script_body_is_raw_text() {
        let html = "<script>if (a < b) { go(); }</script>";
        let nodes = parse_fragment(html);
        assert_eq!(serialize_nodes(&nodes), html);
    }

    #[test]
    fn escapes_html_entities() {
        assert_eq!(escape_html("<a href=\"x\">&'"), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
    }
}
