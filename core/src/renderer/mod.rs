//! Renderers for OCCI objects.
//!
//! Four output formats are supported:
//! - **Text** ([`text`]) — `text/plain`, one `Category:`/`Link:`/`X-OCCI-*` directive per line
//! - **Headers** ([`headers`]) — `text/occi`, the same directives folded into one header per name
//! - **JSON** ([`json`]) — `application/occi+json`
//! - **URI list** — `text/uri-list`, collection locations only
//!
//! [`render`] dispatches on the closed set of [`Renderable`] variants; any
//! variant/format pair without a serializer is a [`Error::Rendering`].

pub mod headers;
pub mod json;
pub mod text;

use crate::action_instance::ActionInstance;
use crate::category::{Action, Category, Kind, Mixin};
use crate::collection::Collection;
use crate::entity::{Entity, Link, Resource};
use crate::error::{Error, Result};
use crate::model::Model;

/// Output format of [`render`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// Line-oriented text.
    Text,
    /// Text directives folded into headers.
    Headers,
    /// JSON document.
    Json,
    /// Bare locations.
    UriList,
}

impl Format {
    /// Name used in diagnostics.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Format::Text => "text",
            Format::Headers => "headers",
            Format::Json => "json",
            Format::UriList => "uri-list",
        }
    }
}

/// Every object the renderers know how to serialize.
#[derive(Debug, Clone, Copy)]
pub enum Renderable<'a> {
    /// Any category.
    Category(&'a Category),
    /// A kind.
    Kind(&'a Kind),
    /// A mixin.
    Mixin(&'a Mixin),
    /// An action.
    Action(&'a Action),
    /// A resource or link.
    Entity(&'a Entity),
    /// A resource.
    Resource(&'a Resource),
    /// A link.
    Link(&'a Link),
    /// A whole model.
    Model(&'a Model),
    /// A collection of entities.
    Collection(&'a Collection),
    /// An action invocation.
    ActionInstance(&'a ActionInstance),
}

impl Renderable<'_> {
    /// Name of the variant, used in diagnostics.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Renderable::Category(_) => "category",
            Renderable::Kind(_) => "kind",
            Renderable::Mixin(_) => "mixin",
            Renderable::Action(_) => "action",
            Renderable::Entity(_) => "entity",
            Renderable::Resource(_) => "resource",
            Renderable::Link(_) => "link",
            Renderable::Model(_) => "model",
            Renderable::Collection(_) => "collection",
            Renderable::ActionInstance(_) => "action instance",
        }
    }
}

macro_rules! renderable_from {
    ($($ty:ident),*) => {
        $(
            impl<'a> From<&'a $ty> for Renderable<'a> {
                fn from(value: &'a $ty) -> Self {
                    Renderable::$ty(value)
                }
            }
        )*
    };
}

renderable_from!(
    Category,
    Kind,
    Mixin,
    Action,
    Entity,
    Resource,
    Link,
    Model,
    Collection,
    ActionInstance
);

/// Renders `object` in `format`.
///
/// # Errors
///
/// Returns [`Error::Rendering`] when no serializer exists for the pair:
/// collections cannot be folded into a single header set, and the URI list
/// format only renders collections.
pub fn render<'a>(object: impl Into<Renderable<'a>>, format: Format) -> Result<String> {
    let object = object.into();
    let unsupported = || Error::Rendering {
        object: object.name(),
        format: format.as_str(),
    };
    match format {
        Format::Text => Ok(join_lines(&text_lines(object))),
        Format::Headers => match object {
            Renderable::Collection(_) => Err(unsupported()),
            other => Ok(join_lines(&headers::fold(&text_lines(other)))),
        },
        Format::Json => serde_json::to_string_pretty(&json::to_json(object))
            .map_err(|_| unsupported()),
        Format::UriList => match object {
            Renderable::Collection(c) => Ok(join_lines(
                &c.locations().into_iter().map(str::to_owned).collect::<Vec<_>>(),
            )),
            _ => Err(unsupported()),
        },
    }
}

fn text_lines(object: Renderable<'_>) -> Vec<String> {
    match object {
        Renderable::Category(c) => vec![text::category_line(c)],
        Renderable::Kind(k) => vec![text::kind_line(k)],
        Renderable::Mixin(m) => vec![text::mixin_line(m)],
        Renderable::Action(a) => vec![text::action_line(a)],
        Renderable::Entity(e) => text::entity_lines(e),
        Renderable::Resource(r) => text::resource_lines(r),
        Renderable::Link(l) => text::link_entity_lines(l),
        Renderable::Model(m) => text::model_lines(m),
        Renderable::Collection(c) => text::collection_lines(c),
        Renderable::ActionInstance(a) => text::action_instance_lines(a),
    }
}

fn join_lines(lines: &[String]) -> String {
    let mut out = lines.join("\n");
    if !out.is_empty() {
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::infrastructure;
    use crate::InstanceBuilder;

    #[test]
    fn uri_list_only_renders_collections() {
        let model = Model::with_infrastructure().unwrap();
        let err = render(&model, Format::UriList).unwrap_err();
        assert_eq!(
            err,
            Error::Rendering {
                object: "model",
                format: "uri-list"
            }
        );
    }

    #[test]
    fn collections_do_not_fold_into_headers() {
        let collection = Collection::new();
        assert!(render(&collection, Format::Headers).is_err());
        assert_eq!(render(&collection, Format::Text).unwrap(), "");
    }

    #[test]
    fn uri_list_lists_locations() {
        let model = Model::with_infrastructure().unwrap();
        let builder = InstanceBuilder::new(&model);
        let mut a = builder.build(infrastructure::COMPUTE).unwrap();
        a.core_mut().location = Some("/compute/a".into());
        let mut b = builder.build(infrastructure::STORAGE).unwrap();
        b.core_mut().location = Some("/storage/b".into());
        let collection: Collection = vec![a, b].into_iter().collect();
        assert_eq!(
            render(&collection, Format::UriList).unwrap(),
            "/compute/a\n/storage/b\n"
        );
    }

    #[test]
    fn kinds_render_through_the_category_serializer() {
        let model = Model::with_infrastructure().unwrap();
        let kind = model.find_kind(infrastructure::COMPUTE).unwrap();
        let via_kind = render(kind, Format::Text).unwrap();
        let via_category = render(model.find(infrastructure::COMPUTE).unwrap(), Format::Text).unwrap();
        assert_eq!(via_kind, via_category);
    }
}
