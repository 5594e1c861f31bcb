//! Line-oriented text rendering (`text/plain`).

use crate::action_instance::ActionInstance;
use crate::attribute::{quote, AttributeDefinition, AttributeValue, Attributes};
use crate::catalog::core::RESOURCE;
use crate::category::{
    split_identifier, Action, Category, CategoryBase, CategoryClass, Kind, Mixin,
};
use crate::collection::Collection;
use crate::entity::{names, Entity, EntityCore, Link, Resource};
use crate::model::Model;

/// Attributes carried on a `Link:` line by other means than `name=value`.
const IMPLIED_LINK_ATTRIBUTES: [&str; 4] = [
    names::SOURCE,
    names::TARGET,
    names::SOURCE_KIND,
    names::TARGET_KIND,
];

/// Renders any category as a full `Category:` line.
#[must_use]
pub fn category_line(category: &Category) -> String {
    match category {
        Category::Kind(k) => kind_line(k),
        Category::Mixin(m) => mixin_line(m),
        Category::Action(a) => action_line(a),
    }
}

/// Renders a kind as a full `Category:` line.
#[must_use]
pub fn kind_line(kind: &Kind) -> String {
    let rel: Vec<&str> = kind.parent.iter().map(String::as_str).collect();
    full_line(
        &kind.base,
        CategoryClass::Kind,
        &rel,
        kind.location.as_deref(),
        &kind.actions,
    )
}

/// Renders a mixin as a full `Category:` line; `rel` lists the mixins it
/// depends on followed by the kinds it applies to.
#[must_use]
pub fn mixin_line(mixin: &Mixin) -> String {
    let rel: Vec<&str> = mixin
        .depends
        .iter()
        .chain(&mixin.applies)
        .map(String::as_str)
        .collect();
    full_line(
        &mixin.base,
        CategoryClass::Mixin,
        &rel,
        mixin.location.as_deref(),
        &mixin.actions,
    )
}

/// Renders an action as a full `Category:` line.
#[must_use]
pub fn action_line(action: &Action) -> String {
    full_line(&action.base, CategoryClass::Action, &[], None, &[])
}

fn full_line(
    base: &CategoryBase,
    class: CategoryClass,
    rel: &[&str],
    location: Option<&str>,
    actions: &[String],
) -> String {
    let mut line = format!(
        "Category: {};scheme=\"{}\";class=\"{}\"",
        base.term, base.scheme, class
    );
    if let Some(title) = &base.title {
        line.push_str(&format!(";title={}", quote(title)));
    }
    if !rel.is_empty() {
        line.push_str(&format!(";rel=\"{}\"", rel.join(" ")));
    }
    if let Some(location) = location {
        line.push_str(&format!(";location=\"{location}\""));
    }
    if !base.attributes.is_empty() {
        line.push_str(&format!(
            ";attributes=\"{}\"",
            attribute_definitions(&base.attributes)
        ));
    }
    if !actions.is_empty() {
        line.push_str(&format!(";actions=\"{}\"", actions.join(" ")));
    }
    line
}

fn attribute_definitions(attributes: &Attributes<AttributeDefinition>) -> String {
    attributes
        .iter()
        .map(|(name, def)| format!("{name}{}", def.flags()))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Short `Category:` reference used inside entity renderings.
#[must_use]
pub fn category_reference(id: &str, class: CategoryClass) -> String {
    match split_identifier(id) {
        Some((scheme, term)) => {
            format!("Category: {term};scheme=\"{scheme}\";class=\"{class}\"")
        }
        None => format!("Category: {id};class=\"{class}\""),
    }
}

/// Every registered category, kinds first, then mixins, then actions.
#[must_use]
pub fn model_lines(model: &Model) -> Vec<String> {
    model
        .kinds()
        .map(kind_line)
        .chain(model.mixins().map(mixin_line))
        .chain(model.actions().map(action_line))
        .collect()
}

/// Renders either entity variant.
#[must_use]
pub fn entity_lines(entity: &Entity) -> Vec<String> {
    match entity {
        Entity::Resource(r) => resource_lines(r),
        Entity::Link(l) => link_entity_lines(l),
    }
}

/// Category lines, location, inline links, action links, then attributes.
#[must_use]
pub fn resource_lines(resource: &Resource) -> Vec<String> {
    let mut lines = classification_lines(&resource.core);
    lines.extend(resource.links.iter().map(link_line));
    lines.extend(action_link_lines(&resource.core));
    lines.extend(attribute_lines(&resource.core.attributes));
    lines
}

/// A link rendered as a standalone entity: its source and target travel as
/// ordinary attributes.
#[must_use]
pub fn link_entity_lines(link: &Link) -> Vec<String> {
    let mut lines = classification_lines(&link.core);
    lines.extend(action_link_lines(&link.core));
    lines.extend(attribute_lines(&link.core.attributes));
    lines
}

fn classification_lines(core: &EntityCore) -> Vec<String> {
    std::iter::once(category_reference(&core.kind, CategoryClass::Kind))
        .chain(
            core.mixins
                .iter()
                .map(|m| category_reference(m, CategoryClass::Mixin)),
        )
        .chain(location_lines(core.location.as_slice()))
        .collect()
}

fn action_link_lines(core: &EntityCore) -> Vec<String> {
    let location = core.location.as_deref().unwrap_or_default();
    core.actions
        .iter()
        .map(|action| {
            let term = split_identifier(action).map_or(action.as_str(), |(_, t)| t);
            format!("Link: <{location}?action={term}>;rel=\"{action}\"")
        })
        .collect()
}

/// Renders a link as an inline `Link:` line of its owning resource.
#[must_use]
pub fn link_line(link: &Link) -> String {
    let core = &link.core;
    let mut line = format!(
        "Link: <{}>;rel=\"{}\"",
        link.target().unwrap_or_default(),
        link.target_kind().unwrap_or(RESOURCE)
    );
    if let Some(location) = &core.location {
        line.push_str(&format!(";self=\"{location}\""));
    }
    let categories: Vec<&str> = std::iter::once(core.kind.as_str())
        .chain(core.mixins.iter().map(String::as_str))
        .collect();
    line.push_str(&format!(";category=\"{}\"", categories.join(" ")));
    for (name, value) in core.attributes.iter() {
        if !IMPLIED_LINK_ATTRIBUTES.contains(&name) {
            line.push_str(&format!(";{name}={value}"));
        }
    }
    line
}

/// One `X-OCCI-Attribute:` line per value.
#[must_use]
pub fn attribute_lines(attributes: &Attributes<AttributeValue>) -> Vec<String> {
    attributes
        .iter()
        .map(|(name, value)| format!("X-OCCI-Attribute: {name}={value}"))
        .collect()
}

/// The action reference followed by its parameters.
#[must_use]
pub fn action_instance_lines(instance: &ActionInstance) -> Vec<String> {
    let mut lines = vec![category_reference(&instance.action, CategoryClass::Action)];
    lines.extend(attribute_lines(&instance.attributes));
    lines
}

/// Entity records separated by a blank line.
#[must_use]
pub fn collection_lines(collection: &Collection) -> Vec<String> {
    let mut lines = Vec::new();
    for (i, entity) in collection.entities.iter().enumerate() {
        if i > 0 {
            lines.push(String::new());
        }
        lines.extend(entity_lines(entity));
    }
    lines
}

/// One `X-OCCI-Location:` line per location.
#[must_use]
pub fn location_lines<S: AsRef<str>>(locations: &[S]) -> Vec<String> {
    locations
        .iter()
        .map(|l| format!("X-OCCI-Location: {}", l.as_ref()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{core as occi_core, infrastructure};
    use crate::InstanceBuilder;

    #[test]
    fn kind_line_carries_every_field() {
        let model = Model::with_infrastructure().unwrap();
        let line = kind_line(model.find_kind(infrastructure::NETWORK).unwrap());
        assert!(line.starts_with(
            "Category: network;scheme=\"http://schemas.ogf.org/occi/infrastructure#\";class=\"kind\""
        ));
        assert!(line.contains(";rel=\"http://schemas.ogf.org/occi/core#resource\""));
        assert!(line.contains(";location=\"/network/\""));
        assert!(line.contains(";actions=\"http://schemas.ogf.org/occi/infrastructure/network/action#up"));
    }

    #[test]
    fn attribute_flags_follow_names() {
        let model = Model::bootstrap().unwrap();
        let line = kind_line(model.find_kind(occi_core::ENTITY).unwrap());
        assert!(line.contains("attributes=\"occi.core.id{immutable required} occi.core.title\""));
    }

    #[test]
    fn resource_lines_order() {
        let model = Model::with_infrastructure().unwrap();
        let mut entity = InstanceBuilder::new(&model)
            .build(infrastructure::COMPUTE)
            .unwrap();
        entity.core_mut().location = Some("/compute/1".into());
        entity
            .core_mut()
            .actions
            .push(infrastructure::action::COMPUTE_START.to_owned());
        let lines = entity_lines(&entity);
        assert!(lines[0].starts_with("Category: compute;"));
        assert_eq!(lines[1], "X-OCCI-Location: /compute/1");
        assert_eq!(
            lines[2],
            format!(
                "Link: </compute/1?action=start>;rel=\"{}\"",
                infrastructure::action::COMPUTE_START
            )
        );
        assert!(lines[3..].iter().all(|l| l.starts_with("X-OCCI-Attribute: ")));
    }

    #[test]
    fn inline_link_omits_implied_attributes() {
        let model = Model::with_infrastructure().unwrap();
        let mut link = InstanceBuilder::new(&model)
            .build(infrastructure::STORAGE_LINK)
            .unwrap();
        link.set_attribute(names::TARGET, "/storage/1");
        link.set_attribute(names::TARGET_KIND, infrastructure::STORAGE);
        link.set_attribute(names::SOURCE, "/compute/1");
        link.set_attribute("occi.storagelink.deviceid", "vda");
        link.core_mut().location = Some("/link/storagelink/1".into());
        let line = link_line(link.as_link().unwrap());
        assert!(line.starts_with(&format!(
            "Link: </storage/1>;rel=\"{}\";self=\"/link/storagelink/1\";category=\"{}\"",
            infrastructure::STORAGE,
            infrastructure::STORAGE_LINK
        )));
        assert!(line.contains(";occi.storagelink.deviceid=\"vda\""));
        assert!(!line.contains("occi.core.source="));
    }

    #[test]
    fn location_lines_prefix() {
        assert_eq!(location_lines(&["/a"]), vec!["X-OCCI-Location: /a".to_owned()]);
    }
}
