//! Parser for the text renderings (`text/plain`, `text/occi`, `text/uri-list`).
//!
//! Bodies are read line by line. Lines whose prefix is not one of the four
//! OCCI directives pass through untouched, so OCCI lines may be mixed with
//! other headers. Recognised lines must match their grammar in full.
//!
//! Entity and action-instance bodies are grouped into records: a record
//! ends at a blank line, or when a `Category:` line follows links or
//! attributes of the record before it.

mod action;
mod category;
mod entity;

use std::borrow::Cow;

use occi_core::attribute::{AttributeDefinition, AttributeType, AttributeValue, Attributes};
use occi_core::category::{identifier, CategoryClass};
use occi_core::entity::EntityCore;
use occi_core::{MediaType, Model};
use tracing::warn;

use crate::error::{ParserError, Result};
use crate::grammar::{grammar, literal, Directive, Grammar, Literal};
use crate::options::ParserOptions;

/// Parses text bodies against a model.
#[derive(Debug, Clone, Copy)]
pub struct TextParser<'a> {
    model: &'a Model,
    options: &'a ParserOptions,
    grammar: &'static Grammar,
}

impl<'a> TextParser<'a> {
    /// Creates a parser resolving against `model`.
    ///
    /// # Errors
    ///
    /// Fails only if the grammar does not compile.
    pub fn new(model: &'a Model, options: &'a ParserOptions) -> Result<Self> {
        Ok(Self {
            model,
            options,
            grammar: grammar(options.strict)?,
        })
    }

    /// Parses category definitions and registers them into `model`.
    ///
    /// Headers bodies are canonicalised first. Registration is
    /// all-or-nothing; re-parsing categories already registered verbatim is
    /// a no-op.
    ///
    /// # Errors
    ///
    /// Fails like [`TextParser::categories`], or with a collision error when
    /// a category differs from the one registered under its identifier.
    pub fn model(
        text: &str,
        options: &ParserOptions,
        media_type: MediaType,
        model: &mut Model,
    ) -> Result<()> {
        let body = canonical(text, media_type);
        let categories = TextParser::new(model, options)?.categories(&body)?;
        model.register_all(categories)?;
        Ok(())
    }

    /// Parses the locations of a body.
    ///
    /// # Errors
    ///
    /// See [`locations`].
    pub fn locations(&self, text: &str, media_type: MediaType) -> Result<Vec<String>> {
        locations(text, self.options, media_type)
    }

    fn category_reference(&self, line: &str) -> Result<(String, CategoryClass)> {
        let c = self.grammar.matches(&self.grammar.category, line, "category")?;
        let class = c["class"]
            .parse()
            .map_err(|e: String| ParserError::parsing(line, e))?;
        Ok((identifier(&c["scheme"], &c["term"]), class))
    }

    fn attribute(&self, line: &str) -> Result<(String, Literal)> {
        let c = self.grammar.matches(&self.grammar.attribute, line, "attribute")?;
        Ok((c["name"].to_owned(), literal(&c, line)?))
    }

    fn location(&self, line: &str) -> Result<String> {
        let c = self.grammar.matches(&self.grammar.location, line, "location")?;
        Ok(c["location"].to_owned())
    }
}

/// Parses the locations of a body.
///
/// `text/uri-list` bodies hold one location per line, with blank lines and
/// `#` comments skipped. Text and headers bodies carry `X-OCCI-Location:`
/// lines; other lines are ignored.
///
/// # Errors
///
/// Returns [`ParserError::Parsing`] for a malformed location and
/// [`ParserError::UnsupportedMediaType`] for JSON bodies.
pub fn locations(text: &str, options: &ParserOptions, media_type: MediaType) -> Result<Vec<String>> {
    let grammar = grammar(options.strict)?;
    match media_type {
        MediaType::UriList => text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(|line| {
                grammar
                    .matches(&grammar.uri, line, "uri-list")
                    .map(|c| c["location"].to_owned())
            })
            .collect(),
        MediaType::TextPlain | MediaType::TextOcci | MediaType::Headers => {
            canonical(text, media_type)
                .lines()
                .map(str::trim)
                .filter(|line| Directive::of(line) == Some(Directive::Location))
                .map(|line| {
                    grammar
                        .matches(&grammar.location, line, "location")
                        .map(|c| c["location"].to_owned())
                })
                .collect()
        }
        MediaType::OcciJson | MediaType::Json => Err(ParserError::UnsupportedMediaType(
            format!("{media_type} does not carry locations"),
        )),
    }
}

/// Rewrites a headers body into one directive per line.
///
/// Every `Name: v1, v2` line becomes `Name: v1` and `Name: v2`. Only a comma
/// followed by whitespace separates values, so URIs such as `/compute/a,b`
/// stay whole. Commas inside double-quoted strings never split. Lines
/// without a colon are kept.
#[must_use]
pub fn canonize_headers(text: &str) -> String {
    let mut out = Vec::new();
    for line in text.lines() {
        let Some((name, values)) = line.split_once(':') else {
            out.push(line.to_owned());
            continue;
        };
        let name = name.trim();
        for value in split_values(values) {
            out.push(format!("{name}: {}", value.trim()));
        }
    }
    out.join("\n")
}

fn split_values(s: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let (mut start, mut quoted, mut escaped) = (0, false, false);
    let mut chars = s.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        match c {
            _ if escaped => escaped = false,
            '\\' if quoted => escaped = true,
            '"' => quoted = !quoted,
            ',' if !quoted && chars.peek().is_some_and(|&(_, n)| n.is_whitespace()) => {
                parts.push(&s[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&s[start..]);
    parts
}

pub(crate) fn canonical(text: &str, media_type: MediaType) -> Cow<'_, str> {
    match media_type {
        MediaType::TextOcci | MediaType::Headers => Cow::Owned(canonize_headers(text)),
        _ => Cow::Borrowed(text),
    }
}

/// One grouped record: recognised directives with their lines.
pub(crate) type Record<'t> = Vec<(Directive, &'t str)>;

pub(crate) fn records(text: &str) -> Vec<Record<'_>> {
    let mut records = Vec::new();
    let mut current: Record<'_> = Vec::new();
    for line in text.lines().map(str::trim) {
        if line.is_empty() {
            if !current.is_empty() {
                records.push(std::mem::take(&mut current));
            }
            continue;
        }
        let Some(directive) = Directive::of(line) else {
            continue;
        };
        if directive == Directive::Category
            && current.iter().any(|(d, _)| *d != Directive::Category)
        {
            records.push(std::mem::take(&mut current));
        }
        current.push((directive, line));
    }
    if !current.is_empty() {
        records.push(current);
    }
    records
}

/// Converts a captured literal to a value, guided by the attribute's
/// definition when there is one: strings holding JSON become objects for
/// object-typed attributes.
pub(crate) fn coerce(literal: Literal, definition: Option<&AttributeDefinition>) -> AttributeValue {
    match literal {
        Literal::String(s) => match definition.map(|d| d.type_) {
            Some(AttributeType::Object) => match serde_json::from_str(&s) {
                Ok(value) => AttributeValue::Object(value),
                Err(_) => AttributeValue::String(s),
            },
            _ => AttributeValue::String(s),
        },
        Literal::Integer(i) => AttributeValue::Integer(i),
        Literal::Float(x) => AttributeValue::Float(x),
        Literal::Boolean(b) => AttributeValue::Boolean(b),
    }
}

/// Stores a parsed attribute on `core`. Names outside `definitions` are
/// kept and logged; validation reports them later.
pub(crate) fn apply_attribute(
    core: &mut EntityCore,
    definitions: &Attributes<AttributeDefinition>,
    name: &str,
    literal: Literal,
) {
    let definition = definitions.get(name);
    if definition.is_none() {
        warn!(attribute = name, kind = %core.kind, "attribute is not defined for the entity");
    }
    core.set_attribute(name, coerce(literal, definition));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_split_on_blank_lines_and_new_categories() {
        let text = "Category: a;scheme=\"http://x#\";class=\"kind\"\n\
                    X-OCCI-Attribute: a=1\n\
                    Category: b;scheme=\"http://x#\";class=\"kind\"\n\
                    Category: m;scheme=\"http://x#\";class=\"mixin\"\n\
                    \n\
                    Content-Length: 12\n\
                    Category: c;scheme=\"http://x#\";class=\"kind\"\n";
        let records = records(text);
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].len(), 2);
        assert_eq!(records[1].len(), 2);
        assert_eq!(records[2].len(), 1);
    }

    #[test]
    fn headers_split_outside_quotes() {
        let text = "X-OCCI-Attribute: a=\"x, y\", b=2\nCategory: c;scheme=\"http://x#\";class=\"kind\"";
        assert_eq!(
            canonize_headers(text),
            "X-OCCI-Attribute: a=\"x, y\"\nX-OCCI-Attribute: b=2\nCategory: c;scheme=\"http://x#\";class=\"kind\""
        );
    }

    #[test]
    fn escaped_quotes_do_not_close_strings() {
        assert_eq!(split_values(r#""a\", b", c"#), vec![r#""a\", b""#, " c"]);
    }

    #[test]
    fn commas_inside_uris_do_not_split() {
        assert_eq!(
            canonize_headers("X-OCCI-Location: /compute/a,b, /compute/c"),
            "X-OCCI-Location: /compute/a,b\nX-OCCI-Location: /compute/c"
        );
        assert_eq!(
            locations(
                "X-OCCI-Location: /compute/a,b",
                &ParserOptions::default(),
                MediaType::TextOcci
            )
            .unwrap(),
            vec!["/compute/a,b"]
        );
    }

    #[test]
    fn uri_lists_skip_comments() {
        let text = "# servers\n/compute/1\n\nhttp://example.org/storage/2\n";
        assert_eq!(
            locations(text, &ParserOptions::default(), MediaType::UriList).unwrap(),
            vec!["/compute/1", "http://example.org/storage/2"]
        );
    }

    #[test]
    fn bad_uri_list_lines_are_parsing_errors() {
        let err = locations("not a uri", &ParserOptions::default(), MediaType::UriList).unwrap_err();
        assert!(matches!(err, ParserError::Parsing { line, .. } if line == "not a uri"));
    }

    #[test]
    fn json_has_no_locations() {
        assert!(matches!(
            locations("{}", &ParserOptions::default(), MediaType::OcciJson),
            Err(ParserError::UnsupportedMediaType(_))
        ));
    }

    #[test]
    fn object_attributes_decode_json_strings() {
        let definition = AttributeDefinition::object();
        let value = coerce(Literal::String("[1,2]".into()), Some(&definition));
        assert_eq!(value, AttributeValue::Object(serde_json::json!([1, 2])));
        let value = coerce(Literal::String("[1,2]".into()), None);
        assert_eq!(value, AttributeValue::from("[1,2]"));
    }
}
