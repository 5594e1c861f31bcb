//! Model renderings parse back into the registry they came from.

use occi_core::renderer::{render, Format};
use occi_core::{MediaType, Model};
use occi_parser::{parse_model, ParserOptions};

fn parse_into(model: &mut Model, body: &str, media_type: MediaType) {
    parse_model(body, media_type, model, &ParserOptions::strict()).unwrap();
}

// ============================================================================
// Text
// ============================================================================

#[test]
fn rendered_model_parses_into_an_empty_registry() {
    for source in [
        Model::bootstrap().unwrap(),
        Model::with_infrastructure().unwrap(),
        Model::with_extensions().unwrap(),
    ] {
        let text = render(&source, Format::Text).unwrap();
        let mut parsed = Model::new();
        parse_into(&mut parsed, &text, MediaType::TextPlain);
        assert_eq!(parsed.len(), source.len());
        assert_eq!(render(&parsed, Format::Text).unwrap(), text);
        parsed.valid().unwrap();
    }
}

#[test]
fn reparsing_a_registered_model_changes_nothing() {
    let source = Model::with_infrastructure().unwrap();
    let text = render(&source, Format::Text).unwrap();
    let mut target = Model::with_infrastructure().unwrap();
    parse_into(&mut target, &text, MediaType::TextPlain);
    assert_eq!(target, source);
}

#[test]
fn parsing_twice_equals_parsing_once() {
    let text = render(&Model::with_infrastructure().unwrap(), Format::Text).unwrap();
    let mut once = Model::new();
    parse_into(&mut once, &text, MediaType::TextPlain);
    let mut twice = once.clone();
    parse_into(&mut twice, &text, MediaType::TextPlain);
    assert_eq!(twice, once);
}

// ============================================================================
// Headers and JSON
// ============================================================================

#[test]
fn headers_rendering_parses_like_text() {
    let source = Model::with_infrastructure().unwrap();
    let headers = render(&source, Format::Headers).unwrap();
    let mut from_headers = Model::new();
    parse_into(&mut from_headers, &headers, MediaType::TextOcci);

    let text = render(&source, Format::Text).unwrap();
    let mut from_text = Model::new();
    parse_into(&mut from_text, &text, MediaType::TextPlain);
    assert_eq!(from_headers, from_text);
}

#[test]
fn json_rendering_restores_the_registry() {
    let source = Model::with_extensions().unwrap();
    let json = render(&source, Format::Json).unwrap();
    let mut parsed = Model::new();
    parse_into(&mut parsed, &json, MediaType::OcciJson);
    for category in source.categories() {
        assert_eq!(parsed.find(&category.identifier()), Some(category));
    }
    assert_eq!(parsed.len(), source.len());
}
