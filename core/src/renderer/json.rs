//! `application/occi+json` rendering.
//!
//! Attribute names stay flat (`"occi.compute.cores": 4`); core attributes
//! that have a dedicated field (`id`, `title`, `summary`, `source`, `target`)
//! are lifted out of the `attributes` object.

use serde_json::{json, Map, Value};

use super::Renderable;
use crate::action_instance::ActionInstance;
use crate::attribute::{AttributeDefinition, AttributeValue, Attributes};
use crate::category::{Action, Category, CategoryBase, Kind, Mixin};
use crate::collection::Collection;
use crate::entity::{names, Entity, EntityCore, Link, Resource};
use crate::model::Model;

/// Builds the JSON document for any renderable object.
#[must_use]
pub fn to_json(object: Renderable<'_>) -> Value {
    match object {
        Renderable::Category(c) => category(c),
        Renderable::Kind(k) => kind(k),
        Renderable::Mixin(m) => mixin(m),
        Renderable::Action(a) => action(a),
        Renderable::Entity(e) => entity(e),
        Renderable::Resource(r) => resource(r),
        Renderable::Link(l) => link(l),
        Renderable::Model(m) => model(m),
        Renderable::Collection(c) => collection(c),
        Renderable::ActionInstance(a) => action_instance(a),
    }
}

/// Serializes any category.
#[must_use]
pub fn category(category: &Category) -> Value {
    match category {
        Category::Kind(k) => kind(k),
        Category::Mixin(m) => mixin(m),
        Category::Action(a) => action(a),
    }
}

fn base(base: &CategoryBase) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("term".into(), json!(base.term));
    map.insert("scheme".into(), json!(base.scheme));
    if let Some(title) = &base.title {
        map.insert("title".into(), json!(title));
    }
    if !base.attributes.is_empty() {
        map.insert("attributes".into(), definitions(&base.attributes));
    }
    map
}

fn definitions(attributes: &Attributes<AttributeDefinition>) -> Value {
    let mut map = Map::new();
    for (name, def) in attributes.iter() {
        let mut entry = Map::new();
        entry.insert("type".into(), json!(def.type_.as_str()));
        entry.insert("required".into(), json!(def.required));
        entry.insert("mutable".into(), json!(def.mutable));
        if let Some(default) = &def.default {
            entry.insert("default".into(), default.to_json());
        }
        if let Some(pattern) = &def.pattern {
            entry.insert("pattern".into(), json!(pattern));
        }
        if let Some(description) = &def.description {
            entry.insert("description".into(), json!(description));
        }
        map.insert(name.to_owned(), Value::Object(entry));
    }
    Value::Object(map)
}

fn insert_list(map: &mut Map<String, Value>, key: &str, values: &[String]) {
    if !values.is_empty() {
        map.insert(key.to_owned(), json!(values));
    }
}

/// Serializes a kind.
#[must_use]
pub fn kind(kind: &Kind) -> Value {
    let mut map = base(&kind.base);
    if let Some(parent) = &kind.parent {
        map.insert("parent".into(), json!(parent));
    }
    insert_list(&mut map, "actions", &kind.actions);
    if let Some(location) = &kind.location {
        map.insert("location".into(), json!(location));
    }
    Value::Object(map)
}

/// Serializes a mixin.
#[must_use]
pub fn mixin(mixin: &Mixin) -> Value {
    let mut map = base(&mixin.base);
    insert_list(&mut map, "depends", &mixin.depends);
    insert_list(&mut map, "applies", &mixin.applies);
    insert_list(&mut map, "actions", &mixin.actions);
    if let Some(location) = &mixin.location {
        map.insert("location".into(), json!(location));
    }
    Value::Object(map)
}

/// Serializes an action.
#[must_use]
pub fn action(action: &Action) -> Value {
    Value::Object(base(&action.base))
}

/// `{kinds, mixins, actions}`.
#[must_use]
pub fn model(model: &Model) -> Value {
    json!({
        "kinds": model.kinds().map(kind).collect::<Vec<_>>(),
        "mixins": model.mixins().map(mixin).collect::<Vec<_>>(),
        "actions": model.actions().map(action).collect::<Vec<_>>(),
    })
}

/// Serializes either entity variant.
#[must_use]
pub fn entity(entity: &Entity) -> Value {
    match entity {
        Entity::Resource(r) => resource(r),
        Entity::Link(l) => link(l),
    }
}

fn entity_map(core: &EntityCore, lifted: &[&str]) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("kind".into(), json!(core.kind));
    insert_list(&mut map, "mixins", &core.mixins);
    insert_list(&mut map, "actions", &core.actions);
    for name in [names::ID, names::TITLE] {
        if let Some(value) = core.attribute(name) {
            map.insert(short_name(name).into(), value.to_json());
        }
    }
    if let Some(location) = &core.location {
        map.insert("location".into(), json!(location));
    }
    let attributes = values(&core.attributes, lifted);
    if !attributes.is_empty() {
        map.insert("attributes".into(), Value::Object(attributes));
    }
    map
}

fn short_name(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}

fn values(attributes: &Attributes<AttributeValue>, skip: &[&str]) -> Map<String, Value> {
    attributes
        .iter()
        .filter(|(name, _)| !skip.contains(name))
        .map(|(name, value)| (name.to_owned(), value.to_json()))
        .collect()
}

/// Serializes a resource with its links.
#[must_use]
pub fn resource(resource: &Resource) -> Value {
    let mut map = entity_map(
        &resource.core,
        &[names::ID, names::TITLE, names::SUMMARY],
    );
    if let Some(summary) = resource.summary() {
        map.insert("summary".into(), json!(summary));
    }
    if !resource.links.is_empty() {
        map.insert(
            "links".into(),
            Value::Array(resource.links.iter().map(link).collect()),
        );
    }
    Value::Object(map)
}

/// Serializes a link; `source` and `target` become `{location, kind}`.
#[must_use]
pub fn link(link: &Link) -> Value {
    let mut map = entity_map(
        &link.core,
        &[
            names::ID,
            names::TITLE,
            names::SOURCE,
            names::TARGET,
            names::SOURCE_KIND,
            names::TARGET_KIND,
        ],
    );
    map.insert("source".into(), endpoint(link.source(), link.source_kind()));
    map.insert("target".into(), endpoint(link.target(), link.target_kind()));
    Value::Object(map)
}

fn endpoint(location: Option<&str>, kind: Option<&str>) -> Value {
    let mut map = Map::new();
    if let Some(location) = location {
        map.insert("location".into(), json!(location));
    }
    if let Some(kind) = kind {
        map.insert("kind".into(), json!(kind));
    }
    Value::Object(map)
}

/// `{resources, links}`.
#[must_use]
pub fn collection(collection: &Collection) -> Value {
    json!({
        "resources": collection.resources().map(resource).collect::<Vec<_>>(),
        "links": collection.links().map(link).collect::<Vec<_>>(),
    })
}

/// `{action, attributes}`.
#[must_use]
pub fn action_instance(instance: &ActionInstance) -> Value {
    json!({
        "action": instance.action,
        "attributes": values(&instance.attributes, &[]),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::infrastructure;
    use crate::InstanceBuilder;

    #[test]
    fn core_attributes_are_lifted() {
        let model = Model::with_infrastructure().unwrap();
        let mut entity = InstanceBuilder::new(&model)
            .build(infrastructure::COMPUTE)
            .unwrap();
        entity.set_attribute(names::TITLE, "web");
        entity.set_attribute("occi.compute.cores", 4_i64);
        let doc = super::entity(&entity);
        assert_eq!(doc["kind"], json!(infrastructure::COMPUTE));
        assert_eq!(doc["title"], json!("web"));
        assert_eq!(doc["id"], json!(entity.id().unwrap()));
        assert_eq!(doc["attributes"]["occi.compute.cores"], json!(4));
        assert!(doc["attributes"].get(names::ID).is_none());
    }

    #[test]
    fn links_carry_endpoints() {
        let model = Model::with_infrastructure().unwrap();
        let mut entity = InstanceBuilder::new(&model)
            .build(infrastructure::NETWORK_INTERFACE)
            .unwrap();
        entity.set_attribute(names::SOURCE, "/compute/1");
        entity.set_attribute(names::TARGET, "/network/1");
        entity.set_attribute(names::TARGET_KIND, infrastructure::NETWORK);
        let doc = super::entity(&entity);
        assert_eq!(doc["source"], json!({"location": "/compute/1"}));
        assert_eq!(
            doc["target"],
            json!({"location": "/network/1", "kind": infrastructure::NETWORK})
        );
    }

    #[test]
    fn model_lists_every_class() {
        let model = Model::with_infrastructure().unwrap();
        let doc = super::model(&model);
        assert_eq!(doc["kinds"].as_array().map(Vec::len), Some(8));
        assert_eq!(doc["mixins"].as_array().map(Vec::len), Some(6));
        assert_eq!(doc["actions"].as_array().map(Vec::len), Some(12));
    }
}
