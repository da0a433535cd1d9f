//! Search fragment parser
//!
//! A fragment is a small JavaScript file written by the documentation
//! generator:
//!
//! ```text
//! var searchData=
//! [
//!   ['setts',['setTs',['../classsun_1_1TF__SISO.html#a411b',1,'sun::TF_SISO::setTs()']]],
//!   ...
//! ];
//! ```
//!
//! It is parsed with tree-sitter-javascript and only literal arrays,
//! strings and numbers are accepted inside `searchData`.

use tree_sitter::{Language, Node, Parser};

use crate::docindex::error::{IndexError, IndexResult};
use crate::docindex::types::{DocTarget, LinkEntry, SearchRecord, decode_html_entities};

const SEARCH_DATA: &str = "searchData";

/// Name used in errors for fragments that do not come from a file.
const ANONYMOUS_FRAGMENT: &str = "<fragment>";

pub struct FragmentParser {
    parser: Parser,
}

impl FragmentParser {
    pub fn new() -> IndexResult<Self> {
        let mut parser = Parser::new();
        let language: Language = tree_sitter_javascript::LANGUAGE.into();
        parser
            .set_language(&language)
            .map_err(|e| IndexError::Grammar(e.to_string()))?;
        Ok(Self { parser })
    }

    /// Parse `source`, naming it `fragment` in errors.
    pub fn parse(&mut self, source: &str, fragment: &str) -> IndexResult<Vec<SearchRecord>> {
        let tree = self
            .parser
            .parse(source, None)
            .ok_or_else(|| IndexError::ParseFailed {
                fragment: fragment.to_string(),
            })?;
        let root = tree.root_node();

        if root.has_error() {
            let position = first_error(root).map_or(root.start_position(), |n| n.start_position());
            return Err(IndexError::Syntax {
                fragment: fragment.to_string(),
                line: position.row + 1,
                column: position.column + 1,
            });
        }

        let array = find_search_data(root, source).ok_or_else(|| IndexError::MissingSearchData {
            fragment: fragment.to_string(),
        })?;

        let mut records = Vec::new();
        for (index, element) in elements(array).into_iter().enumerate() {
            let record = parse_record(element, source).map_err(|reason| IndexError::MalformedRecord {
                fragment: fragment.to_string(),
                index,
                reason,
            })?;
            records.push(record);
        }
        tracing::debug!("[docindex] {fragment}: {} records", records.len());
        Ok(records)
    }
}

/// Parse a fragment with a fresh parser.
pub fn parse_fragment(source: &str) -> IndexResult<Vec<SearchRecord>> {
    FragmentParser::new()?.parse(source, ANONYMOUS_FRAGMENT)
}

fn first_error<'t>(node: Node<'t>) -> Option<Node<'t>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.has_error() {
            if let Some(found) = first_error(child) {
                return Some(found);
            }
        }
    }
    None
}

/// The array bound to `searchData` by a `var`, `let` or `const` declaration
/// at the top level.
fn find_search_data<'t>(root: Node<'t>, source: &str) -> Option<Node<'t>> {
    let mut cursor = root.walk();
    for statement in root.named_children(&mut cursor) {
        if !matches!(
            statement.kind(),
            "variable_declaration" | "lexical_declaration"
        ) {
            continue;
        }
        let mut decl_cursor = statement.walk();
        for declarator in statement.named_children(&mut decl_cursor) {
            if declarator.kind() != "variable_declarator" {
                continue;
            }
            let is_search_data = declarator
                .child_by_field_name("name")
                .is_some_and(|name| text(name, source) == SEARCH_DATA);
            if !is_search_data {
                continue;
            }
            if let Some(value) = declarator.child_by_field_name("value") {
                if value.kind() == "array" {
                    return Some(value);
                }
            }
        }
    }
    None
}

fn text<'s>(node: Node<'_>, source: &'s str) -> &'s str {
    &source[node.byte_range()]
}

/// Named children without comments.
fn elements<'t>(array: Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = array.walk();
    array
        .named_children(&mut cursor)
        .filter(|n| n.kind() != "comment")
        .collect()
}

/// `['key', ['Label', [url, flag, scope], ...]]`
fn parse_record(node: Node, source: &str) -> Result<SearchRecord, String> {
    let parts = expect_array(node, 2, "record")?;
    let key = string_value(parts[0], source).ok_or("key is not a string")?;

    let entry = parts[1];
    if entry.kind() != "array" {
        return Err(format!("entry for '{key}' is not an array"));
    }
    let items = elements(entry);
    let (label_node, link_nodes) = items
        .split_first()
        .ok_or_else(|| format!("entry for '{key}' is empty"))?;
    let label = string_value(*label_node, source).ok_or_else(|| format!("label of '{key}' is not a string"))?;

    let mut links = Vec::with_capacity(link_nodes.len());
    for link in link_nodes {
        links.push(parse_link(*link, source).map_err(|reason| format!("'{key}': {reason}"))?);
    }
    if links.is_empty() {
        return Err(format!("'{key}' has no links"));
    }

    Ok(SearchRecord { key, label, links })
}

/// `['../page.html#anchor', 1, 'scope']`
fn parse_link(node: Node, source: &str) -> Result<LinkEntry, String> {
    let parts = expect_array(node, 3, "link")?;
    let url = string_value(parts[0], source).ok_or("link url is not a string")?;
    if parts[1].kind() != "number" {
        return Err("link flag is not a number".to_string());
    }
    let flag = text(parts[1], source)
        .parse::<u32>()
        .map_err(|e| format!("link flag: {e}"))?;
    let scope = string_value(parts[2], source).ok_or("link scope is not a string")?;

    Ok(LinkEntry {
        target: DocTarget::from_url(&url),
        flag,
        scope: decode_html_entities(&scope),
    })
}

fn expect_array<'t>(node: Node<'t>, len: usize, what: &str) -> Result<Vec<Node<'t>>, String> {
    if node.kind() != "array" {
        return Err(format!("{what} is not an array"));
    }
    let items = elements(node);
    if items.len() != len {
        return Err(format!("{what} has {} elements, expected {len}", items.len()));
    }
    Ok(items)
}

/// Content of a string literal with JavaScript escapes resolved.
fn string_value(node: Node, source: &str) -> Option<String> {
    if node.kind() != "string" {
        return None;
    }
    let mut value = String::new();
    // `\uXXXX` code units, held until a surrogate pair can be combined
    let mut units: Vec<u16> = Vec::new();
    let mut cursor = node.walk();
    for part in node.named_children(&mut cursor) {
        let raw = text(part, source);
        match part.kind() {
            "string_fragment" => {
                flush_utf16(&mut units, &mut value);
                value.push_str(raw);
            }
            "escape_sequence" => match utf16_unit(raw) {
                Some(unit) => units.push(unit),
                None => {
                    flush_utf16(&mut units, &mut value);
                    value.push_str(&unescape(raw));
                }
            },
            _ => {}
        }
    }
    flush_utf16(&mut units, &mut value);
    Some(value)
}

/// Code unit of a four-digit `\uXXXX` escape.
fn utf16_unit(sequence: &str) -> Option<u16> {
    let hex = sequence.strip_prefix("\\u")?;
    if hex.len() != 4 {
        return None;
    }
    u16::from_str_radix(hex, 16).ok()
}

/// Lone surrogates decode to U+FFFD.
fn flush_utf16(units: &mut Vec<u16>, value: &mut String) {
    value.extend(
        char::decode_utf16(units.drain(..)).map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER)),
    );
}

fn unescape(sequence: &str) -> String {
    let body = &sequence[1..];
    match body {
        "n" => "\n".to_string(),
        "t" => "\t".to_string(),
        "r" => "\r".to_string(),
        "0" => "\0".to_string(),
        _ => {
            let code = body
                .strip_prefix('u')
                .map(|hex| hex.trim_matches(['{', '}']))
                .or_else(|| body.strip_prefix('x'))
                .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                .and_then(char::from_u32);
            match code {
                Some(c) => c.to_string(),
                None => body.to_string(),
            }
        }
    }
}
