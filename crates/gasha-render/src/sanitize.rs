//! Allow-list HTML sanitizer for rich-text fields supplied by the upstream.
//!
//! Input is parsed into a small element tree. Allowed elements are re-emitted
//! with only allowed attributes; any other element is replaced by its escaped
//! text content. Comments are dropped. Output never contains a tag outside
//! [`ALLOWED_TAGS`].

use std::sync::LazyLock;

use regex::Regex;

pub const ALLOWED_TAGS: &[&str] = &[
    "div", "span", "p", "br", "strong", "em", "b", "i", "u", "small",
];

pub const ALLOWED_ATTRIBUTES: &[&str] = &["class", "style"];

const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Elements whose content is raw text up to the matching close tag.
const RAW_TEXT_TAGS: &[&str] = &["script", "style", "textarea", "title"];

/// Open elements beyond this depth are flattened: their start and end tags
/// are dropped and their content joins the deepest kept element.
pub const MAX_DEPTH: usize = 256;

static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?s)<!--.*?(?:-->|\z)|<(/?)([A-Za-z][A-Za-z0-9-]*)((?:[^>"']|"[^"]*"|'[^']*')*)>"#,
    )
    .expect("valid token regex")
});

static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"([A-Za-z_:][-A-Za-z0-9_:.]*)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#,
    )
    .expect("valid attribute regex")
});

static ENTITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[A-Za-z]+);").expect("valid entity regex")
});

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Element {
        name: String,
        attrs: Vec<(String, String)>,
        children: Vec<Node>,
    },
    Text(String),
}

struct OpenElement {
    name: String,
    attrs: Vec<(String, String)>,
    children: Vec<Node>,
}

/// Work item for the tree walkers, which keep their own stack instead of
/// recursing.
enum Step<'a> {
    Enter(&'a Node),
    Leave(&'a str),
}

/// Converts literal `\n` escape sequences (backslash + `n`) to `<br/>` and
/// trims the result.
#[must_use]
pub fn expand_line_breaks(raw: &str) -> String {
    raw.replace("\\n", "<br/>").trim().to_string()
}

/// Sanitizes `input` against the allow-list.
#[must_use]
pub fn sanitize_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    write_sanitized(&parse(input), &mut out);
    out
}

/// Rich-text field pipeline: line-break expansion, then sanitization.
#[must_use]
pub fn sanitize_rich_text(raw: &str) -> String {
    sanitize_html(&expand_line_breaks(raw))
}

/// Plain-text rendering of a rich-text field for terminals.
///
/// `<br>` and block elements become line breaks; everything else is text.
#[must_use]
pub fn rich_text_to_plain(raw: &str) -> String {
    let mut out = String::new();
    write_plain(&parse(&expand_line_breaks(raw)), &mut out);
    out.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Escapes text for use in HTML content and double-quoted attributes.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn parse(input: &str) -> Vec<Node> {
    let mut root: Vec<Node> = Vec::new();
    let mut stack: Vec<OpenElement> = Vec::new();
    // Names of start tags flattened past `MAX_DEPTH`, so their end tags are
    // swallowed instead of closing a kept ancestor.
    let mut flattened: Vec<String> = Vec::new();
    let mut pos = 0;

    while let Some(caps) = TOKEN_RE.captures_at(input, pos) {
        let Some(whole) = caps.get(0) else { break };
        push_text(&mut root, &mut stack, &input[pos..whole.start()]);
        pos = whole.end();

        // Comment.
        let Some(name) = caps.get(2) else { continue };
        let name = name.as_str().to_ascii_lowercase();
        let is_end = caps.get(1).is_some_and(|m| !m.as_str().is_empty());
        let rest = caps.get(3).map_or("", |m| m.as_str());

        if is_end {
            if let Some(index) = flattened.iter().rposition(|open| *open == name) {
                flattened.truncate(index);
            } else {
                close_element(&mut root, &mut stack, &name);
            }
            continue;
        }

        let attrs = parse_attributes(rest);
        let self_closing = rest.trim_end().ends_with('/');

        if VOID_TAGS.contains(&name.as_str()) || self_closing {
            append(
                &mut root,
                &mut stack,
                Node::Element {
                    name,
                    attrs,
                    children: Vec::new(),
                },
            );
            continue;
        }

        if RAW_TEXT_TAGS.contains(&name.as_str()) {
            let (content, next) = raw_text_until_close(input, pos, &name);
            let children = if content.is_empty() {
                Vec::new()
            } else {
                vec![Node::Text(content.to_string())]
            };
            append(
                &mut root,
                &mut stack,
                Node::Element {
                    name,
                    attrs,
                    children,
                },
            );
            pos = next;
            continue;
        }

        if stack.len() >= MAX_DEPTH {
            flattened.push(name);
            continue;
        }
        stack.push(OpenElement {
            name,
            attrs,
            children: Vec::new(),
        });
    }

    push_text(&mut root, &mut stack, &input[pos..]);
    while !stack.is_empty() {
        fold_top(&mut root, &mut stack);
    }
    root
}

/// Returns the raw content after an opening raw-text tag and the position
/// after its close tag (or end of input when unclosed).
fn raw_text_until_close<'a>(input: &'a str, from: usize, name: &str) -> (&'a str, usize) {
    let haystack = input[from..].to_ascii_lowercase();
    let needle = format!("</{name}");
    match haystack.find(&needle) {
        Some(offset) => {
            let close_start = from + offset;
            let close_end = input[close_start..]
                .find('>')
                .map_or(input.len(), |i| close_start + i + 1);
            (&input[from..close_start], close_end)
        }
        None => (&input[from..], input.len()),
    }
}

fn parse_attributes(raw: &str) -> Vec<(String, String)> {
    ATTR_RE
        .captures_iter(raw)
        .filter_map(|cap| {
            let name = cap.get(1)?.as_str().to_ascii_lowercase();
            let value = cap
                .get(2)
                .or_else(|| cap.get(3))
                .or_else(|| cap.get(4))
                .map_or(String::new(), |m| decode_entities(m.as_str()));
            Some((name, value))
        })
        .collect()
}

fn push_text(root: &mut Vec<Node>, stack: &mut [OpenElement], raw: &str) {
    if raw.is_empty() {
        return;
    }
    let node = Node::Text(decode_entities(raw));
    match stack.last_mut() {
        Some(open) => open.children.push(node),
        None => root.push(node),
    }
}

fn append(root: &mut Vec<Node>, stack: &mut [OpenElement], node: Node) {
    match stack.last_mut() {
        Some(open) => open.children.push(node),
        None => root.push(node),
    }
}

fn fold_top(root: &mut Vec<Node>, stack: &mut Vec<OpenElement>) {
    if let Some(open) = stack.pop() {
        let node = Node::Element {
            name: open.name,
            attrs: open.attrs,
            children: open.children,
        };
        append(root, stack, node);
    }
}

/// Closes the nearest open element named `name`; stray close tags are ignored.
fn close_element(root: &mut Vec<Node>, stack: &mut Vec<OpenElement>, name: &str) {
    let Some(index) = stack.iter().rposition(|open| open.name == name) else {
        return;
    };
    while stack.len() > index {
        fold_top(root, stack);
    }
}

fn decode_entities(raw: &str) -> String {
    ENTITY_RE
        .replace_all(raw, |caps: &regex::Captures<'_>| {
            let entity = &caps[1];
            let decoded = if let Some(hex) = entity
                .strip_prefix("#x")
                .or_else(|| entity.strip_prefix("#X"))
            {
                u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
            } else if let Some(dec) = entity.strip_prefix('#') {
                dec.parse::<u32>().ok().and_then(char::from_u32)
            } else {
                match entity {
                    "amp" => Some('&'),
                    "lt" => Some('<'),
                    "gt" => Some('>'),
                    "quot" => Some('"'),
                    "apos" => Some('\''),
                    "nbsp" => Some('\u{a0}'),
                    _ => None,
                }
            };
            decoded.map_or_else(|| caps[0].to_string(), String::from)
        })
        .into_owned()
}

fn text_content(node: &Node, out: &mut String) {
    let mut pending = vec![node];
    while let Some(node) = pending.pop() {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Element { children, .. } => pending.extend(children.iter().rev()),
        }
    }
}

fn write_sanitized(nodes: &[Node], out: &mut String) {
    let mut pending: Vec<Step<'_>> = nodes.iter().rev().map(Step::Enter).collect();
    while let Some(step) = pending.pop() {
        let node = match step {
            Step::Enter(node) => node,
            Step::Leave(name) => {
                out.push_str("</");
                out.push_str(name);
                out.push('>');
                continue;
            }
        };
        match node {
            Node::Text(text) => out.push_str(&escape_html(text)),
            Node::Element {
                name,
                attrs,
                children,
            } => {
                if !ALLOWED_TAGS.contains(&name.as_str()) {
                    let mut text = String::new();
                    text_content(node, &mut text);
                    out.push_str(&escape_html(&text));
                    continue;
                }

                out.push('<');
                out.push_str(name);
                for allowed in ALLOWED_ATTRIBUTES {
                    if let Some((_, value)) = attrs.iter().find(|(attr, _)| attr == allowed) {
                        out.push(' ');
                        out.push_str(allowed);
                        out.push_str("=\"");
                        out.push_str(&escape_html(value));
                        out.push('"');
                    }
                }
                out.push('>');

                if VOID_TAGS.contains(&name.as_str()) {
                    continue;
                }
                pending.push(Step::Leave(name));
                pending.extend(children.iter().rev().map(Step::Enter));
            }
        }
    }
}

fn write_plain(nodes: &[Node], out: &mut String) {
    let mut pending: Vec<Step<'_>> = nodes.iter().rev().map(Step::Enter).collect();
    while let Some(step) = pending.pop() {
        match step {
            Step::Enter(Node::Text(text)) => out.push_str(text),
            Step::Enter(Node::Element { name, children, .. }) => {
                if name == "br" {
                    out.push('\n');
                    continue;
                }
                // Only block elements get a `Leave` step.
                if matches!(name.as_str(), "div" | "p") {
                    out.push('\n');
                    pending.push(Step::Leave(name));
                }
                pending.extend(children.iter().rev().map(Step::Enter));
            }
            Step::Leave(_) => out.push('\n'),
        }
    }
}

#[cfg(test)]
#[path = "sanitize_test.rs"]
mod tests;
