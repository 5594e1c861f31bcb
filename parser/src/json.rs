//! Parser for the `application/occi+json` rendering.
//!
//! Documents are deserialised into serde-derived shapes, then converted
//! into categories and entities. Category documents go through the same
//! transactional registration as text bodies.

use occi_core::attribute::{AttributeDefinition, AttributeType, AttributeValue, Attributes};
use occi_core::catalog::core::LINK;
use occi_core::entity::names;
use occi_core::{
    Action, ActionInstance, Category, Entity, Error, InstanceBuilder, Kind, Mixin, Model,
};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::{ParserError, Result};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ModelDocument {
    #[serde(default)]
    kinds: Vec<CategoryDocument>,
    #[serde(default)]
    mixins: Vec<CategoryDocument>,
    #[serde(default)]
    actions: Vec<CategoryDocument>,
}

#[derive(Debug, Deserialize)]
struct CategoryDocument {
    term: String,
    scheme: String,
    title: Option<String>,
    #[serde(default)]
    attributes: Map<String, Value>,
    parent: Option<String>,
    #[serde(default)]
    depends: Vec<String>,
    #[serde(default)]
    applies: Vec<String>,
    #[serde(default)]
    actions: Vec<String>,
    location: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DefinitionDocument {
    #[serde(rename = "type", default)]
    type_: AttributeType,
    #[serde(default)]
    required: bool,
    #[serde(default = "mutable_by_default")]
    mutable: bool,
    default: Option<Value>,
    pattern: Option<String>,
    description: Option<String>,
}

fn mutable_by_default() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct EntityDocument {
    kind: String,
    #[serde(default)]
    mixins: Vec<String>,
    #[serde(default)]
    actions: Vec<String>,
    id: Option<String>,
    title: Option<String>,
    summary: Option<String>,
    location: Option<String>,
    #[serde(default)]
    attributes: Map<String, Value>,
    #[serde(default)]
    links: Vec<EntityDocument>,
    source: Option<Endpoint>,
    target: Option<Endpoint>,
}

#[derive(Debug, Deserialize)]
struct Endpoint {
    location: Option<String>,
    kind: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CollectionDocument {
    #[serde(default)]
    resources: Vec<EntityDocument>,
    #[serde(default)]
    links: Vec<EntityDocument>,
}

#[derive(Debug, Deserialize)]
struct ActionInstanceDocument {
    action: String,
    #[serde(default)]
    attributes: Map<String, Value>,
}

/// Parses a model document into categories, resolved against `model`
/// without modifying it. Kinds come first, then mixins, then actions.
///
/// # Errors
///
/// Returns [`ParserError::Json`] for malformed documents and model lookup
/// errors for unresolvable references.
pub fn categories(body: &str, model: &Model) -> Result<Vec<Category>> {
    let document: ModelDocument = serde_json::from_str(body)?;
    let mut batch = Vec::new();
    for doc in document.kinds {
        let mut kind = Kind::new(&doc.scheme, &doc.term);
        kind.parent = doc.parent.clone();
        kind.actions = doc.actions.clone();
        kind.location = doc.location.clone();
        batch.push(finish(Category::Kind(kind), doc)?);
    }
    for doc in document.mixins {
        let mut mixin = Mixin::new(&doc.scheme, &doc.term);
        mixin.depends = doc.depends.clone();
        mixin.applies = doc.applies.clone();
        mixin.actions = doc.actions.clone();
        mixin.location = doc.location.clone();
        batch.push(finish(Category::Mixin(mixin), doc)?);
    }
    for doc in document.actions {
        let action = Action::new(&doc.scheme, &doc.term);
        batch.push(finish(Category::Action(action), doc)?);
    }
    model.view(&batch).check_references(&batch)?;
    Ok(batch)
}

fn finish(mut category: Category, doc: CategoryDocument) -> Result<Category> {
    let base = category.base_mut();
    base.title = doc.title;
    base.attributes = definitions(doc.attributes)?;
    debug!(identifier = %base.identifier(), "decoded category");
    Ok(category)
}

fn definitions(attributes: Map<String, Value>) -> Result<Attributes<AttributeDefinition>> {
    attributes
        .into_iter()
        .map(|(name, value)| -> Result<(String, AttributeDefinition)> {
            let doc: DefinitionDocument = serde_json::from_value(value)?;
            let mut definition = AttributeDefinition::new(doc.type_);
            definition.required = doc.required;
            definition.mutable = doc.mutable;
            definition.default = doc.default.as_ref().map(AttributeValue::from_json);
            definition.pattern = doc.pattern;
            definition.description = doc.description;
            Ok((name, definition))
        })
        .collect()
}

/// Parses a model document and registers its categories into `model`,
/// all or nothing.
///
/// # Errors
///
/// Fails like [`categories`], or with a collision error.
pub fn model(body: &str, model: &mut Model) -> Result<()> {
    let batch = categories(body, model)?;
    model.register_all(batch)?;
    Ok(())
}

/// Parses a single entity, an array of entities, or a `{resources, links}`
/// collection.
///
/// # Errors
///
/// Returns [`ParserError::Json`] for malformed documents, instance lookup
/// errors for unknown categories, and [`ParserError::TypeMismatch`] when a
/// kind does not match `expected_kind` or a link's kind is not a link.
pub fn entities(body: &str, model: &Model, expected_kind: Option<&str>) -> Result<Vec<Entity>> {
    let value: Value = serde_json::from_str(body)?;
    let is_collection = matches!(&value, Value::Object(map) if !map.contains_key("kind"));
    let documents: Vec<EntityDocument> = if value.is_array() {
        serde_json::from_value(value)?
    } else if is_collection {
        let collection: CollectionDocument = serde_json::from_value(value)?;
        collection
            .resources
            .into_iter()
            .chain(collection.links)
            .collect()
    } else {
        vec![serde_json::from_value(value)?]
    };
    let builder = InstanceBuilder::new(model);
    documents
        .into_iter()
        .map(|doc| decode_entity(&builder, model, doc, expected_kind))
        .collect()
}

fn decode_entity(
    builder: &InstanceBuilder<'_>,
    model: &Model,
    doc: EntityDocument,
    expected_kind: Option<&str>,
) -> Result<Entity> {
    let mut entity = builder.build(&doc.kind)?;
    if let Some(expected) = expected_kind {
        if !model.is_related(&doc.kind, expected) {
            return Err(ParserError::TypeMismatch {
                expected: expected.to_owned(),
                found: doc.kind,
            });
        }
    }
    for mixin in &doc.mixins {
        builder.attach_mixin(&mut entity, mixin)?;
    }
    for action in &doc.actions {
        if model.find_action(action).is_none() {
            return Err(Error::InstanceLookup(format!("unknown action {action}")).into());
        }
    }

    let definitions = model.entity_attributes(&doc.kind, &entity.core().mixins)?;
    let core = entity.core_mut();
    core.actions = doc.actions;
    core.location = doc.location;
    for (name, value) in doc.attributes {
        if !definitions.contains(&name) {
            warn!(attribute = %name, kind = %core.kind, "attribute is not defined for the entity");
        }
        core.set_attribute(&name, AttributeValue::from_json(&value));
    }
    for (name, value) in [
        (names::ID, doc.id),
        (names::TITLE, doc.title),
        (names::SUMMARY, doc.summary),
    ] {
        if let Some(value) = value {
            core.set_attribute(name, value);
        }
    }
    for (endpoint, location, kind) in [
        (doc.source, names::SOURCE, names::SOURCE_KIND),
        (doc.target, names::TARGET, names::TARGET_KIND),
    ] {
        let Some(endpoint) = endpoint else { continue };
        if let Some(value) = endpoint.location {
            core.set_attribute(location, value);
        }
        if let Some(value) = endpoint.kind {
            core.set_attribute(kind, value);
        }
    }

    if !doc.links.is_empty() {
        let links = doc
            .links
            .into_iter()
            .map(|link| -> Result<occi_core::Link> {
                match decode_entity(builder, model, link, None)? {
                    Entity::Link(link) => Ok(link),
                    Entity::Resource(r) => Err(ParserError::TypeMismatch {
                        expected: LINK.to_owned(),
                        found: r.core.kind,
                    }),
                }
            })
            .collect::<Result<Vec<_>>>()?;
        match &mut entity {
            Entity::Resource(resource) => resource.links = links,
            Entity::Link(link) => {
                return Err(ParserError::TypeMismatch {
                    expected: occi_core::catalog::core::RESOURCE.to_owned(),
                    found: link.core.kind.clone(),
                })
            }
        }
    }
    Ok(entity)
}

/// Parses one action instance or an array of them.
///
/// # Errors
///
/// Returns [`ParserError::Json`] for malformed documents and
/// [`Error::ModelLookup`] for unknown actions.
pub fn action_instances(body: &str, model: &Model) -> Result<Vec<ActionInstance>> {
    let value: Value = serde_json::from_str(body)?;
    let documents: Vec<ActionInstanceDocument> = match value {
        Value::Array(_) => serde_json::from_value(value)?,
        other => vec![serde_json::from_value(other)?],
    };
    let builder = InstanceBuilder::new(model);
    documents
        .into_iter()
        .map(|doc| -> Result<ActionInstance> {
            let action = model
                .find_action(&doc.action)
                .ok_or_else(|| Error::ModelLookup(doc.action.clone()))?;
            let mut instance = builder.build_action(&doc.action)?;
            for (name, value) in doc.attributes {
                if !action.base.attributes.contains(&name) {
                    warn!(attribute = %name, action = %doc.action, "parameter is not defined for the action");
                }
                instance.attributes.insert(name, AttributeValue::from_json(&value));
            }
            Ok(instance)
        })
        .collect()
}
