//! Selector language for structural locators
//!
//! Provider profiles describe where fields live using a small subset of CSS:
//!
//! - compound selectors: `tag`, `*`, `.class`, `#id`, `[attr]`, `[attr="v"]`,
//!   `[attr*="v"]`, `[attr^="v"]`
//! - descendant combinator: whitespace (`div .subject`)
//! - selector lists: commas (`span.bog, h2.hP`)
//!
//! Selectors are parsed once, when a profile is built, so a malformed locator
//! is reported as a [`SelectorError`] instead of failing to match at runtime.

use crate::tree::{DocumentTree, NodeId};
use std::error::Error;
use std::fmt;

/// A selector failed to parse
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorError {
    /// The offending selector text
    pub input: String,
    /// What was wrong with it
    pub reason: String,
}

impl fmt::Display for SelectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid selector '{}': {}", self.input, self.reason)
    }
}

impl Error for SelectorError {}

#[derive(Debug, Clone, PartialEq, Eq)]
enum AttrOp {
    Exists,
    Equals(String),
    Contains(String),
    Prefix(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttrMatcher {
    name: String,
    op: AttrOp,
}

impl AttrMatcher {
    fn matches(&self, value: Option<&str>) -> bool {
        match (&self.op, value) {
            (_, None) => false,
            (AttrOp::Exists, Some(_)) => true,
            (AttrOp::Equals(expected), Some(v)) => v == expected,
            (AttrOp::Contains(needle), Some(v)) => v.contains(needle.as_str()),
            (AttrOp::Prefix(prefix), Some(v)) => v.starts_with(prefix.as_str()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrMatcher>,
}

impl Compound {
    fn matches<T: DocumentTree + ?Sized>(&self, tree: &T, node: NodeId) -> bool {
        let Some(tag) = tree.tag_name(node) else {
            return false;
        };
        if let Some(expected) = &self.tag {
            if !expected.eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if tree.attribute(node, "id") != Some(id.as_str()) {
                return false;
            }
        }
        if !self.classes.iter().all(|class| tree.has_class(node, class)) {
            return false;
        }
        self.attrs
            .iter()
            .all(|attr| attr.matches(tree.attribute(node, &attr.name)))
    }
}

/// Descendant chain, outermost first
#[derive(Debug, Clone, PartialEq, Eq)]
struct Complex {
    parts: Vec<Compound>,
}

impl Complex {
    fn matches<T: DocumentTree + ?Sized>(&self, tree: &T, node: NodeId) -> bool {
        let Some((last, ancestors)) = self.parts.split_last() else {
            return false;
        };
        if !last.matches(tree, node) {
            return false;
        }
        // Descendant-only chains can be matched greedily from the right.
        let mut cursor = tree.parent(node);
        for part in ancestors.iter().rev() {
            loop {
                match cursor {
                    Some(candidate) if part.matches(tree, candidate) => {
                        cursor = tree.parent(candidate);
                        break;
                    }
                    Some(candidate) => cursor = tree.parent(candidate),
                    None => return false,
                }
            }
        }
        true
    }
}

/// Parsed selector list
///
/// # Examples
///
/// ```
/// use mailsift_domain::Selector;
///
/// let selector = Selector::parse("span.bog, h2.hP").unwrap();
/// assert_eq!(selector.alternatives(), 2);
/// assert!(Selector::parse("[title").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    source: String,
    alternatives: Vec<Complex>,
}

impl Selector {
    /// Parse a selector list
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        let fail = |reason: &str| SelectorError {
            input: input.to_string(),
            reason: reason.to_string(),
        };

        let mut alternatives = Vec::new();
        for alternative in split_outside_brackets(input, |c| c == ',').map_err(|e| fail(&e))? {
            let mut parts = Vec::new();
            for compound in
                split_outside_brackets(&alternative, char::is_whitespace).map_err(|e| fail(&e))?
            {
                if compound.is_empty() {
                    continue;
                }
                parts.push(parse_compound(&compound).map_err(|e| fail(&e))?);
            }
            if parts.is_empty() {
                return Err(fail("empty selector"));
            }
            alternatives.push(Complex { parts });
        }

        if alternatives.is_empty() {
            return Err(fail("empty selector"));
        }

        Ok(Self {
            source: input.trim().to_string(),
            alternatives,
        })
    }

    /// Selector matching a single class, built without parsing
    pub fn class(class: &str) -> Self {
        Self {
            source: format!(".{}", class),
            alternatives: vec![Complex {
                parts: vec![Compound {
                    classes: vec![class.to_string()],
                    ..Default::default()
                }],
            }],
        }
    }

    /// Whether `node` matches any alternative
    pub fn matches<T: DocumentTree + ?Sized>(&self, tree: &T, node: NodeId) -> bool {
        self.alternatives.iter().any(|alt| alt.matches(tree, node))
    }

    /// Number of comma-separated alternatives
    pub fn alternatives(&self) -> usize {
        self.alternatives.len()
    }

    /// Original selector text
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Split on `is_separator`, ignoring separators inside `[...]` and quotes
fn split_outside_brackets(
    input: &str,
    is_separator: impl Fn(char) -> bool,
) -> Result<Vec<String>, String> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;

    for c in input.chars() {
        match quote {
            Some(q) => {
                current.push(c);
                if c == q {
                    quote = None;
                }
                continue;
            }
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                current.push(c);
                continue;
            }
            None => {}
        }
        match c {
            '[' => {
                depth += 1;
                current.push(c);
            }
            ']' => {
                if depth == 0 {
                    return Err("unbalanced ']'".to_string());
                }
                depth -= 1;
                current.push(c);
            }
            c if depth == 0 && is_separator(c) => {
                pieces.push(std::mem::take(&mut current).trim().to_string());
            }
            c => current.push(c),
        }
    }

    if quote.is_some() {
        return Err("unterminated quote".to_string());
    }
    if depth != 0 {
        return Err("unterminated '['".to_string());
    }
    pieces.push(current.trim().to_string());
    Ok(pieces)
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

fn take_ident(chars: &[char], start: usize) -> (String, usize) {
    let mut end = start;
    while end < chars.len() && is_ident_char(chars[end]) {
        end += 1;
    }
    (chars[start..end].iter().collect(), end)
}

fn parse_compound(input: &str) -> Result<Compound, String> {
    let chars: Vec<char> = input.chars().collect();
    let mut compound = Compound::default();
    let mut pos = 0;

    if pos < chars.len() && chars[pos] == '*' {
        pos += 1;
    } else if pos < chars.len() && is_ident_char(chars[pos]) {
        let (tag, next) = take_ident(&chars, pos);
        compound.tag = Some(tag);
        pos = next;
    }

    while pos < chars.len() {
        match chars[pos] {
            '.' => {
                let (class, next) = take_ident(&chars, pos + 1);
                if class.is_empty() {
                    return Err("expected class name after '.'".to_string());
                }
                compound.classes.push(class);
                pos = next;
            }
            '#' => {
                let (id, next) = take_ident(&chars, pos + 1);
                if id.is_empty() {
                    return Err("expected id after '#'".to_string());
                }
                compound.id = Some(id);
                pos = next;
            }
            '[' => {
                let close = chars[pos..]
                    .iter()
                    .position(|c| *c == ']')
                    .map(|offset| pos + offset)
                    .ok_or_else(|| "unterminated '['".to_string())?;
                let body: String = chars[pos + 1..close].iter().collect();
                compound.attrs.push(parse_attr(&body)?);
                pos = close + 1;
            }
            other => return Err(format!("unexpected character '{}'", other)),
        }
    }

    Ok(compound)
}

fn parse_attr(body: &str) -> Result<AttrMatcher, String> {
    let body = body.trim();
    let (name, op, raw_value) = if let Some((name, value)) = body.split_once("*=") {
        (name, "*=", Some(value))
    } else if let Some((name, value)) = body.split_once("^=") {
        (name, "^=", Some(value))
    } else if let Some((name, value)) = body.split_once('=') {
        (name, "=", Some(value))
    } else {
        (body, "", None)
    };

    let name = name.trim();
    if name.is_empty() || !name.chars().all(is_ident_char) {
        return Err(format!("invalid attribute name '{}'", name));
    }

    let value = raw_value.map(|v| unquote(v.trim()));
    let op = match (op, value) {
        ("", _) => AttrOp::Exists,
        ("=", Some(v)) => AttrOp::Equals(v),
        ("*=", Some(v)) => AttrOp::Contains(v),
        ("^=", Some(v)) => AttrOp::Prefix(v),
        _ => return Err("malformed attribute matcher".to_string()),
    };

    Ok(AttrMatcher {
        name: name.to_string(),
        op,
    })
}

fn unquote(value: &str) -> String {
    let trimmed = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')));
    trimmed.unwrap_or(value).to_string()
}
