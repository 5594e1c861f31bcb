//! Parsers for the OCCI renderings.
//!
//! The `occi-parser` crate turns `text/plain`, `text/occi`, `text/uri-list`
//! and `application/occi+json` bodies into the category and instance types
//! of [`occi_core`]. Category bodies are resolved in two passes, so
//! categories may refer to each other in any order, and are registered into
//! a [`Model`] all or nothing.
//!
//! # Entry Point
//!
//! ```
//! use occi_core::{MediaType, Model};
//! use occi_parser::{parse_entities, ParserOptions};
//!
//! let model = Model::with_infrastructure()?;
//! let body = "Category: compute;scheme=\"http://schemas.ogf.org/occi/infrastructure#\";class=\"kind\"\n\
//!             X-OCCI-Attribute: occi.compute.cores=4";
//! let entities = parse_entities(body, MediaType::TextPlain, &model, &ParserOptions::default(), None)?;
//! assert_eq!(entities[0].attribute("occi.compute.cores").and_then(|v| v.as_i64()), Some(4));
//! # Ok::<(), occi_parser::ParserError>(())
//! ```

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

pub mod error;
pub mod grammar;
pub mod json;
pub mod options;
pub mod text;

use occi_core::{ActionInstance, Category, Entity, MediaType, Model};

pub use error::{ParserError, Result};
pub use options::{LinkKindPolicy, ParserOptions};
pub use text::{canonize_headers, TextParser};

/// Resolves a media type string.
///
/// # Errors
///
/// Returns [`ParserError::UnsupportedMediaType`] for unknown types.
pub fn media_type(s: &str) -> Result<MediaType> {
    MediaType::parse(s).ok_or_else(|| ParserError::UnsupportedMediaType(s.to_owned()))
}

fn text_only(media_type: MediaType, what: &str) -> Result<()> {
    match media_type {
        MediaType::UriList => Err(ParserError::UnsupportedMediaType(format!(
            "{media_type} cannot carry {what}"
        ))),
        _ => Ok(()),
    }
}

/// Parses category definitions and registers them into `model`.
///
/// # Errors
///
/// Parsing, lookup and collision errors; `model` is unchanged on failure.
pub fn parse_model(
    body: &str,
    media_type: MediaType,
    model: &mut Model,
    options: &ParserOptions,
) -> Result<()> {
    text_only(media_type, "categories")?;
    match media_type {
        MediaType::OcciJson | MediaType::Json => json::model(body, model),
        _ => TextParser::model(body, options, media_type, model),
    }
}

/// Parses category definitions resolved against `model` without
/// registering them.
///
/// # Errors
///
/// Parsing and lookup errors.
pub fn parse_categories(
    body: &str,
    media_type: MediaType,
    model: &Model,
    options: &ParserOptions,
) -> Result<Vec<Category>> {
    text_only(media_type, "categories")?;
    match media_type {
        MediaType::OcciJson | MediaType::Json => json::categories(body, model),
        _ => TextParser::new(model, options)?.categories(&text::canonical(body, media_type)),
    }
}

/// Parses entities; see [`TextParser::entities`].
///
/// # Errors
///
/// Parsing, lookup and type-mismatch errors.
pub fn parse_entities(
    body: &str,
    media_type: MediaType,
    model: &Model,
    options: &ParserOptions,
    expected_kind: Option<&str>,
) -> Result<Vec<Entity>> {
    text_only(media_type, "entities")?;
    match media_type {
        MediaType::OcciJson | MediaType::Json => json::entities(body, model, expected_kind),
        _ => TextParser::new(model, options)?
            .entities(&text::canonical(body, media_type), expected_kind),
    }
}

/// Parses action instances; see [`TextParser::action_instances`].
///
/// # Errors
///
/// Parsing and lookup errors.
pub fn parse_action_instances(
    body: &str,
    media_type: MediaType,
    model: &Model,
    options: &ParserOptions,
) -> Result<Vec<ActionInstance>> {
    text_only(media_type, "action instances")?;
    match media_type {
        MediaType::OcciJson | MediaType::Json => json::action_instances(body, model),
        _ => TextParser::new(model, options)?
            .action_instances(&text::canonical(body, media_type)),
    }
}

/// Parses locations; see [`text::locations`].
///
/// # Errors
///
/// Parsing errors, or [`ParserError::UnsupportedMediaType`] for JSON.
pub fn parse_locations(
    body: &str,
    media_type: MediaType,
    options: &ParserOptions,
) -> Result<Vec<String>> {
    text::locations(body, options, media_type)
}
