//! Regular grammar of the OCCI text rendering.
//!
//! Four directives are recognised by prefix (case-insensitively):
//! `Category:`, `Link:`, `X-OCCI-Attribute:` and `X-OCCI-Location:`.
//! Each has one anchored pattern; sub-patterns for terms, schemes, type
//! identifiers, attribute names, quoted strings, numbers and booleans are
//! assembled into them. The `regex` crate matches in linear time, so long
//! attribute lists cannot trigger catastrophic backtracking.
//!
//! Two variants exist. The strict one only admits terms and attribute name
//! components that start with a lowercase letter; the lenient one also
//! admits a leading digit.

use std::sync::OnceLock;

use regex::{Captures, Regex};
use tracing::trace;

use crate::error::{ParserError, Result};

const SCHEME: &str = r#"[^"\s#]+#"#;
const QUOTED: &str = r#""(?:[^"\\]|\\.)*""#;
const NUMBER: &str = r"-?\d+(?:\.\d+)?";
const URI: &str = r#"(?:/[^\s"<>]*|[a-zA-Z][a-zA-Z0-9+.-]*://[^\s"<>]+)"#;

const STRICT_TERM: &str = r"[a-z][a-z0-9_-]*";
const LENIENT_TERM: &str = r"[a-z0-9][a-z0-9_-]*";
const STRICT_NAME_PART: &str = r"[a-z][a-z0-9_-]*";
const LENIENT_NAME_PART: &str = r"[a-zA-Z0-9_][a-zA-Z0-9_-]*";

/// Directive a line starts with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    /// `Category:`
    Category,
    /// `Link:`
    Link,
    /// `X-OCCI-Attribute:`
    Attribute,
    /// `X-OCCI-Location:`
    Location,
}

impl Directive {
    /// Classifies `line` by prefix; `None` for lines to pass through.
    #[must_use]
    pub fn of(line: &str) -> Option<Self> {
        let (name, _) = line.split_once(':')?;
        match name.trim().to_ascii_lowercase().as_str() {
            "category" => Some(Directive::Category),
            "link" => Some(Directive::Link),
            "x-occi-attribute" => Some(Directive::Attribute),
            "x-occi-location" => Some(Directive::Location),
            _ => None,
        }
    }
}

/// Compiled patterns of one grammar variant.
#[derive(Debug)]
pub struct Grammar {
    /// Full `Category:` line.
    pub category: Regex,
    /// Full `Link:` line.
    pub link: Regex,
    /// One `;name=value` pair out of a matched link's attribute tail.
    pub link_attribute: Regex,
    /// Full `X-OCCI-Attribute:` line.
    pub attribute: Regex,
    /// Full `X-OCCI-Location:` line.
    pub location: Regex,
    /// One `text/uri-list` line.
    pub uri: Regex,
    /// One attribute definition out of a category's `attributes` list.
    pub attribute_definition: Regex,
    /// A whole term.
    pub term: Regex,
}

impl Grammar {
    fn build(strict: bool) -> std::result::Result<Self, regex::Error> {
        let (term, part) = if strict {
            (STRICT_TERM, STRICT_NAME_PART)
        } else {
            (LENIENT_TERM, LENIENT_NAME_PART)
        };
        let name = format!(r"{part}(?:\.{part})*");
        let type_id = format!("{SCHEME}{term}");
        let type_ids = format!(r"(?:{type_id}(?:\s+{type_id})*)?");
        let definition = format!(r#"{name}(?:\{{[^}}"]*\}})?"#);
        let definitions = format!(r"(?:{definition}(?:\s+{definition})*)?");
        let value = format!("(?:{QUOTED}|{NUMBER}|true|false)");
        let sep = r"\s*;\s*";

        let category = format!(
            concat!(
                r#"^(?i:category)\s*:\s*(?P<term>{term}){sep}scheme="(?P<scheme>{scheme})"{sep}class="(?P<class>kind|mixin|action)""#,
                r#"(?:{sep}title=(?P<title>{quoted}))?"#,
                r#"(?:{sep}rel="(?P<rel>{ids})")?"#,
                r#"(?:{sep}depends="(?P<depends>{ids})")?"#,
                r#"(?:{sep}applies="(?P<applies>{ids})")?"#,
                r#"(?:{sep}location="(?P<location>{uri})")?"#,
                r#"(?:{sep}attributes="(?P<attributes>{defs})")?"#,
                r#"(?:{sep}actions="(?P<actions>{ids})")?"#,
                r"\s*;?\s*$"
            ),
            term = term,
            sep = sep,
            scheme = SCHEME,
            quoted = QUOTED,
            ids = type_ids,
            uri = URI,
            defs = definitions,
        );
        let link = format!(
            concat!(
                r#"^(?i:link)\s*:\s*<(?P<uri>[^>\s]+)>{sep}rel="(?P<rel>{id}(?:\s+{id})*)""#,
                r#"(?:{sep}self="(?P<self_>{uri})")?"#,
                r#"(?:{sep}category="(?P<category>{ids})")?"#,
                r"(?P<attributes>(?:{sep}{name}={value})*)",
                r"\s*;?\s*$"
            ),
            sep = sep,
            id = type_id,
            uri = URI,
            ids = type_ids,
            name = name,
            value = value,
        );
        let link_attribute = format!(
            r"(?P<name>{name})=(?:(?P<string>{QUOTED})|(?P<number>{NUMBER})|(?P<bool>true|false))"
        );
        let attribute = format!(
            r"^(?i:x-occi-attribute)\s*:\s*(?P<name>{name})\s*=\s*(?:(?P<string>{QUOTED})|(?P<number>{NUMBER})|(?P<bool>true|false))\s*$"
        );
        let location = format!(r"^(?i:x-occi-location)\s*:\s*(?P<location>{URI})\s*$");

        Ok(Self {
            category: Regex::new(&category)?,
            link: Regex::new(&link)?,
            link_attribute: Regex::new(&link_attribute)?,
            attribute: Regex::new(&attribute)?,
            location: Regex::new(&location)?,
            uri: Regex::new(&format!(r"^\s*(?P<location>{URI})\s*$"))?,
            attribute_definition: Regex::new(&format!(
                r"(?P<name>{name})(?:\{{(?P<flags>[^}}]*)\}})?"
            ))?,
            term: Regex::new(&format!("^{term}$"))?,
        })
    }

    /// Matches `line` against `pattern`, reporting a parsing error naming
    /// `what` on failure.
    pub(crate) fn matches<'l>(
        &self,
        pattern: &Regex,
        line: &'l str,
        what: &str,
    ) -> Result<Captures<'l>> {
        let captures = pattern
            .captures(line)
            .ok_or_else(|| ParserError::parsing(line, format!("malformed {what} line")))?;
        trace!(line, what, "matched");
        Ok(captures)
    }
}

static STRICT: OnceLock<std::result::Result<Grammar, regex::Error>> = OnceLock::new();
static LENIENT: OnceLock<std::result::Result<Grammar, regex::Error>> = OnceLock::new();

/// Returns the compiled grammar variant.
///
/// # Errors
///
/// Returns [`ParserError::Parsing`] if the patterns fail to compile.
pub fn grammar(strict: bool) -> Result<&'static Grammar> {
    let cell = if strict { &STRICT } else { &LENIENT };
    cell.get_or_init(|| Grammar::build(strict))
        .as_ref()
        .map_err(|e| ParserError::parsing("", format!("grammar failed to compile: {e}")))
}

/// A typed attribute value captured by the grammar.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// Unquoted, unescaped string.
    String(String),
    /// Number without a decimal point.
    Integer(i64),
    /// Number with a decimal point.
    Float(f64),
    /// `true` or `false`.
    Boolean(bool),
}

/// Extracts the value of an attribute match (groups `string`, `number`,
/// `bool`).
///
/// # Errors
///
/// Returns [`ParserError::Parsing`] when an integer overflows `i64`.
pub fn literal(captures: &Captures<'_>, line: &str) -> Result<Literal> {
    if let Some(s) = captures.name("string") {
        return Ok(Literal::String(unquote(s.as_str())));
    }
    if let Some(n) = captures.name("number") {
        let n = n.as_str();
        return if n.contains('.') {
            n.parse()
                .map(Literal::Float)
                .map_err(|e| ParserError::parsing(line, format!("bad number {n}: {e}")))
        } else {
            n.parse()
                .map(Literal::Integer)
                .map_err(|e| ParserError::parsing(line, format!("bad number {n}: {e}")))
        };
    }
    match captures.name("bool").map(|b| b.as_str()) {
        Some("true") => Ok(Literal::Boolean(true)),
        Some(_) => Ok(Literal::Boolean(false)),
        None => Err(ParserError::parsing(line, "attribute has no value")),
    }
}

/// Strips the surrounding quotes of a quoted string and resolves escapes.
///
/// `\n` and `\r` become line breaks; any other escaped character stands for
/// itself.
#[must_use]
pub fn unquote(quoted: &str) -> String {
    let inner = quoted
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(quoted);
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('n') => out.push('\n'),
                Some('r') => out.push('\r'),
                Some(escaped) => out.push(escaped),
                None => {}
            },
            c => out.push(c),
        }
    }
    out
}

/// Splits a space-separated identifier list.
#[must_use]
pub fn identifiers(list: Option<regex::Match<'_>>) -> Vec<String> {
    list.map(|m| m.as_str().split_whitespace().map(str::to_owned).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_category_line() {
        let g = grammar(false).unwrap();
        let line = r#"Category: compute;scheme="http://schemas.ogf.org/occi/infrastructure#";class="kind";title="Compute resource";rel="http://schemas.ogf.org/occi/core#resource";location="/compute/";attributes="occi.compute.cores occi.compute.state{immutable required}";actions="http://schemas.ogf.org/occi/infrastructure/compute/action#start""#;
        let c = g.category.captures(line).unwrap();
        assert_eq!(&c["term"], "compute");
        assert_eq!(&c["class"], "kind");
        assert_eq!(&c["title"], "\"Compute resource\"");
        assert_eq!(&c["location"], "/compute/");
        assert_eq!(
            &c["attributes"],
            "occi.compute.cores occi.compute.state{immutable required}"
        );
    }

    #[test]
    fn unquoted_scheme_is_rejected() {
        let g = grammar(false).unwrap();
        assert!(g
            .category
            .captures(r#"Category: entity;scheme=http://x#;class="kind""#)
            .is_none());
    }

    #[test]
    fn prefix_is_case_insensitive() {
        assert_eq!(Directive::of("category: a"), Some(Directive::Category));
        assert_eq!(Directive::of("X-OCCI-ATTRIBUTE: a=1"), Some(Directive::Attribute));
        assert_eq!(Directive::of("Content-Type: text/plain"), None);
        assert_eq!(Directive::of("no colon"), None);
    }

    #[test]
    fn link_with_inline_attributes() {
        let g = grammar(false).unwrap();
        let line = r#"Link: </network/1>;rel="http://schemas.ogf.org/occi/infrastructure#network";self="/link/networkinterface/1";category="http://schemas.ogf.org/occi/infrastructure#networkinterface";occi.networkinterface.interface="eth0";occi.networkinterface.mac="00:11:22:33:44:55";mtu=1500"#;
        let c = g.link.captures(line).unwrap();
        assert_eq!(&c["uri"], "/network/1");
        assert_eq!(&c["self_"], "/link/networkinterface/1");
        let names: Vec<String> = g
            .link_attribute
            .captures_iter(&c["attributes"])
            .map(|a| a["name"].to_owned())
            .collect();
        assert_eq!(
            names,
            vec![
                "occi.networkinterface.interface",
                "occi.networkinterface.mac",
                "mtu"
            ]
        );
    }

    #[test]
    fn booleans_must_be_whole_words() {
        let g = grammar(false).unwrap();
        assert!(g.attribute.is_match("X-OCCI-Attribute: a.b=true"));
        assert!(!g.attribute.is_match("X-OCCI-Attribute: a.b=|true|"));
        assert!(!g.attribute.is_match("X-OCCI-Attribute: a.b=trueish"));
    }

    #[test]
    fn numbers_keep_their_kind() {
        let g = grammar(false).unwrap();
        let line = "X-OCCI-Attribute: occi.compute.memory=1.7";
        let c = g.attribute.captures(line).unwrap();
        assert_eq!(literal(&c, line).unwrap(), Literal::Float(1.7));
        let line = "X-OCCI-Attribute: occi.compute.cores=-3";
        let c = g.attribute.captures(line).unwrap();
        assert_eq!(literal(&c, line).unwrap(), Literal::Integer(-3));
    }

    #[test]
    fn integer_overflow_is_a_parsing_error() {
        let g = grammar(false).unwrap();
        let line = "X-OCCI-Attribute: a=99999999999999999999";
        let c = g.attribute.captures(line).unwrap();
        assert!(matches!(literal(&c, line), Err(ParserError::Parsing { .. })));
    }

    #[test]
    fn unquote_resolves_escapes() {
        assert_eq!(unquote(r#""say \"hi\" \\ bye""#), r#"say "hi" \ bye"#);
    }

    #[test]
    fn unquote_restores_line_breaks() {
        assert_eq!(unquote(r#""one\ntwo\r""#), "one\ntwo\r");
        assert_eq!(unquote(r#""back\\nslash""#), r"back\nslash");
    }

    #[test]
    fn leading_digits_only_in_lenient_terms() {
        assert!(grammar(false).unwrap().term.is_match("1abc"));
        assert!(!grammar(true).unwrap().term.is_match("1abc"));
    }
}
