//! Entities: resources and links bound to one kind and any number of mixins.
//!
//! Every attribute value, including `occi.core.id` and the link endpoints,
//! lives in the entity's attribute map; typed accessors read from it.
//! Parsers write through the permissive [`EntityCore::set_attribute`];
//! [`Entity::assign`] and [`Entity::valid`] enforce the model's definitions.

use std::collections::HashMap;
use std::sync::{Mutex, OnceLock, PoisonError};

use regex::Regex;
use uuid::Uuid;

use crate::attribute::{AttributeDefinition, AttributeValue, Attributes};
use crate::error::{Error, Result};
use crate::model::Model;

/// Well-known `occi.core` attribute names.
pub mod names {
    /// Entity identifier.
    pub const ID: &str = "occi.core.id";
    /// Entity title.
    pub const TITLE: &str = "occi.core.title";
    /// Resource summary.
    pub const SUMMARY: &str = "occi.core.summary";
    /// Link source location.
    pub const SOURCE: &str = "occi.core.source";
    /// Link target location.
    pub const TARGET: &str = "occi.core.target";
    /// Kind of the link source.
    pub const SOURCE_KIND: &str = "occi.core.source.kind";
    /// Kind of the link target.
    pub const TARGET_KIND: &str = "occi.core.target.kind";
}

/// State shared by resources and links.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityCore {
    /// Identifier of the entity's kind.
    pub kind: String,
    /// Identifiers of attached mixins, in attachment order.
    pub mixins: Vec<String>,
    /// Identifiers of actions currently offered by the entity.
    pub actions: Vec<String>,
    /// Location of the entity, when known.
    pub location: Option<String>,
    /// Attribute values.
    pub attributes: Attributes<AttributeValue>,
}

impl EntityCore {
    /// Creates an entity core of `kind` with no attributes.
    #[must_use]
    pub fn new(kind: &str) -> Self {
        Self {
            kind: kind.to_owned(),
            mixins: Vec::new(),
            actions: Vec::new(),
            location: None,
            attributes: Attributes::new(),
        }
    }

    /// Stores a value without consulting any definition.
    pub fn set_attribute(
        &mut self,
        name: &str,
        value: impl Into<AttributeValue>,
    ) -> Option<AttributeValue> {
        self.attributes.insert(name, value.into())
    }

    /// Returns the value of `name`.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name)
    }

    fn string(&self, name: &str) -> Option<&str> {
        self.attribute(name).and_then(AttributeValue::as_str)
    }

    /// Raw `occi.core.id` value.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.string(names::ID)
    }

    /// `occi.core.id` parsed as a UUID.
    #[must_use]
    pub fn uuid(&self) -> Option<Uuid> {
        self.id().and_then(|id| Uuid::parse_str(id).ok())
    }

    /// `occi.core.title`.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.string(names::TITLE)
    }

    /// Returns true if `mixin` is attached.
    #[must_use]
    pub fn has_mixin(&self, mixin: &str) -> bool {
        self.mixins.iter().any(|m| m == mixin)
    }
}

/// A resource: an entity that may own links.
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    /// Shared entity state.
    pub core: EntityCore,
    /// Links originating at this resource, in source order.
    pub links: Vec<Link>,
}

impl Resource {
    /// Creates an empty resource of `kind`.
    #[must_use]
    pub fn new(kind: &str) -> Self {
        Self {
            core: EntityCore::new(kind),
            links: Vec::new(),
        }
    }

    /// `occi.core.summary`.
    #[must_use]
    pub fn summary(&self) -> Option<&str> {
        self.core.string(names::SUMMARY)
    }
}

/// A link between two resources.
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    /// Shared entity state.
    pub core: EntityCore,
}

impl Link {
    /// Creates an empty link of `kind`.
    #[must_use]
    pub fn new(kind: &str) -> Self {
        Self {
            core: EntityCore::new(kind),
        }
    }

    /// Location of the source resource.
    #[must_use]
    pub fn source(&self) -> Option<&str> {
        self.core.string(names::SOURCE)
    }

    /// Location of the target resource.
    #[must_use]
    pub fn target(&self) -> Option<&str> {
        self.core.string(names::TARGET)
    }

    /// Kind identifier of the source resource.
    #[must_use]
    pub fn source_kind(&self) -> Option<&str> {
        self.core.string(names::SOURCE_KIND)
    }

    /// Kind identifier of the target resource (the `rel` of a `Link:` line).
    #[must_use]
    pub fn target_kind(&self) -> Option<&str> {
        self.core.string(names::TARGET_KIND)
    }

    fn valid(&self, model: &Model) -> Result<()> {
        validate_core(&self.core, model)?;
        for (name, endpoint) in [(names::SOURCE, self.source()), (names::TARGET, self.target())] {
            match endpoint {
                Some(location) => validate_location(location)?,
                None => {
                    return Err(Error::InstanceValidation(format!(
                        "link {} has no {name}",
                        self.core.id().unwrap_or("<unidentified>")
                    )))
                }
            }
        }
        Ok(())
    }
}

/// A resource or a link.
#[derive(Debug, Clone, PartialEq)]
pub enum Entity {
    /// A resource.
    Resource(Resource),
    /// A link.
    Link(Link),
}

impl Entity {
    /// Shared entity state.
    #[must_use]
    pub fn core(&self) -> &EntityCore {
        match self {
            Entity::Resource(r) => &r.core,
            Entity::Link(l) => &l.core,
        }
    }

    /// Mutable shared entity state.
    pub fn core_mut(&mut self) -> &mut EntityCore {
        match self {
            Entity::Resource(r) => &mut r.core,
            Entity::Link(l) => &mut l.core,
        }
    }

    /// Kind identifier.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.core().kind
    }

    /// Raw `occi.core.id` value.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.core().id()
    }

    /// `occi.core.title`.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.core().title()
    }

    /// Location, when known.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.core().location.as_deref()
    }

    /// Attribute values.
    #[must_use]
    pub fn attributes(&self) -> &Attributes<AttributeValue> {
        &self.core().attributes
    }

    /// Returns the value of `name`.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.core().attribute(name)
    }

    /// Stores a value without consulting any definition.
    pub fn set_attribute(
        &mut self,
        name: &str,
        value: impl Into<AttributeValue>,
    ) -> Option<AttributeValue> {
        self.core_mut().set_attribute(name, value)
    }

    /// Returns the resource, if this is one.
    #[must_use]
    pub fn as_resource(&self) -> Option<&Resource> {
        match self {
            Entity::Resource(r) => Some(r),
            Entity::Link(_) => None,
        }
    }

    /// Returns the link, if this is one.
    #[must_use]
    pub fn as_link(&self) -> Option<&Link> {
        match self {
            Entity::Link(l) => Some(l),
            Entity::Resource(_) => None,
        }
    }

    /// Assigns a value through the model's attribute definitions.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AttributeValidation`] if `name` is not defined for
    /// this entity, the value has the wrong type, or the attribute is
    /// immutable and already holds a value. Lookup errors propagate if the
    /// entity's kind or mixins are not in `model`.
    pub fn assign(
        &mut self,
        name: &str,
        value: impl Into<AttributeValue>,
        model: &Model,
    ) -> Result<()> {
        let value = value.into();
        let definitions = model.entity_attributes(self.kind(), &self.core().mixins)?;
        let definition = definitions
            .get(name)
            .ok_or_else(|| attribute_error(name, "not defined by the kind or its mixins"))?;
        if !definition.mutable && self.attribute(name).is_some() {
            return Err(attribute_error(name, "immutable attribute is already set"));
        }
        check_value(name, &value, definition)?;
        self.set_attribute(name, value);
        Ok(())
    }

    /// Validates the entity against `model`.
    ///
    /// # Errors
    ///
    /// Returns the first failure found: [`Error::CategoryValidation`] for an
    /// unknown or inapplicable kind/mixin/action, [`Error::LocationValidation`],
    /// [`Error::InstanceValidation`] for a missing/malformed identifier or link
    /// endpoint, or [`Error::AttributeValidation`] for missing required,
    /// mistyped, or undefined attributes. Links of a resource are validated
    /// recursively.
    pub fn valid(&self, model: &Model) -> Result<()> {
        match self {
            Entity::Resource(resource) => {
                validate_core(&resource.core, model)?;
                for link in &resource.links {
                    link.valid(model)?;
                }
                Ok(())
            }
            Entity::Link(link) => link.valid(model),
        }
    }
}

fn attribute_error(name: &str, reason: &str) -> Error {
    Error::AttributeValidation {
        attribute: name.to_owned(),
        reason: reason.to_owned(),
    }
}

fn check_value(name: &str, value: &AttributeValue, definition: &AttributeDefinition) -> Result<()> {
    if !value.conforms_to(definition.type_) {
        return Err(attribute_error(
            name,
            &format!("expected a {} value", definition.type_.as_str()),
        ));
    }
    if let (Some(pattern), AttributeValue::String(s)) = (&definition.pattern, value) {
        let re = compiled(pattern).map_err(|e| {
            Error::AttributeDefinition {
                attribute: name.to_owned(),
                reason: e.to_string(),
            }
        })?;
        if !re.is_match(s) {
            return Err(attribute_error(
                name,
                &format!("{s:?} does not match pattern {pattern:?}"),
            ));
        }
    }
    Ok(())
}

/// Anchored value patterns, compiled once per distinct pattern.
static PATTERNS: OnceLock<Mutex<HashMap<String, Regex>>> = OnceLock::new();

fn compiled(pattern: &str) -> std::result::Result<Regex, regex::Error> {
    let cache = PATTERNS.get_or_init(Mutex::default);
    let mut cache = cache.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(re) = cache.get(pattern) {
        return Ok(re.clone());
    }
    let re = Regex::new(&format!("^(?:{pattern})$"))?;
    cache.insert(pattern.to_owned(), re.clone());
    Ok(re)
}

fn validate_core(core: &EntityCore, model: &Model) -> Result<()> {
    if model.find_kind(&core.kind).is_none() {
        return Err(Error::CategoryValidation(format!(
            "kind {} is not defined in the model",
            core.kind
        )));
    }
    for id in &core.mixins {
        let mixin = model.find_mixin(id).ok_or_else(|| {
            Error::CategoryValidation(format!("mixin {id} is not defined in the model"))
        })?;
        if !mixin.applies.is_empty()
            && !mixin.applies.iter().any(|a| model.is_related(&core.kind, a))
        {
            return Err(Error::CategoryValidation(format!(
                "mixin {id} does not apply to kind {}",
                core.kind
            )));
        }
    }
    for id in &core.actions {
        if model.find_action(id).is_none() {
            return Err(Error::CategoryValidation(format!(
                "action {id} is not defined in the model"
            )));
        }
    }
    if let Some(location) = &core.location {
        validate_location(location)?;
    }
    match core.id() {
        Some(id) if Uuid::parse_str(id).is_ok() => {}
        Some(id) => {
            return Err(Error::InstanceValidation(format!(
                "identifier {id:?} is not a UUID"
            )))
        }
        None => {
            return Err(Error::InstanceValidation(format!(
                "instance of {} has no identifier",
                core.kind
            )))
        }
    }

    let definitions = model.entity_attributes(&core.kind, &core.mixins)?;
    for (name, definition) in definitions.iter() {
        match core.attribute(name) {
            Some(value) => check_value(name, value, definition)?,
            None if definition.required => {
                return Err(attribute_error(name, "required attribute has no value"))
            }
            None => {}
        }
    }
    if let Some(unknown) = core.attributes.names().find(|n| !definitions.contains(n)) {
        return Err(attribute_error(
            unknown,
            "not defined by the kind or its mixins",
        ));
    }
    Ok(())
}

/// Checks that `location` is an absolute path or an absolute URI.
///
/// # Errors
///
/// Returns [`Error::LocationValidation`] otherwise.
pub fn validate_location(location: &str) -> Result<()> {
    let absolute_path = location.starts_with('/');
    let absolute_uri = location
        .split_once("://")
        .map(|(scheme, rest)| {
            !rest.is_empty()
                && scheme.starts_with(|c: char| c.is_ascii_alphabetic())
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '.' | '-'))
        })
        .unwrap_or(false);
    if location.chars().any(char::is_whitespace) || !(absolute_path || absolute_uri) {
        return Err(Error::LocationValidation(location.to_owned()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{core as occi_core, infrastructure};
    use crate::InstanceBuilder;

    fn model() -> Model {
        Model::with_infrastructure().unwrap()
    }

    #[test]
    fn built_compute_validates() {
        let model = model();
        let entity = InstanceBuilder::new(&model)
            .build(infrastructure::COMPUTE)
            .unwrap();
        entity.valid(&model).unwrap();
    }

    #[test]
    fn missing_required_attribute_fails() {
        let model = model();
        let mut entity = InstanceBuilder::new(&model)
            .build(infrastructure::NETWORK_INTERFACE)
            .unwrap();
        entity.set_attribute(names::SOURCE, "/compute/1");
        entity.set_attribute(names::TARGET, "/network/1");
        let err = entity.valid(&model).unwrap_err();
        assert!(matches!(
            err,
            Error::AttributeValidation { ref attribute, .. } if attribute == "occi.networkinterface.interface"
        ));
    }

    #[test]
    fn unknown_attribute_is_flagged_only_on_validation() {
        let model = model();
        let mut entity = InstanceBuilder::new(&model)
            .build(infrastructure::COMPUTE)
            .unwrap();
        entity.set_attribute("org.example.flavour", "small");
        let err = entity.valid(&model).unwrap_err();
        assert!(matches!(
            err,
            Error::AttributeValidation { ref attribute, .. } if attribute == "org.example.flavour"
        ));
    }

    #[test]
    fn immutable_attribute_cannot_be_reassigned() {
        let model = model();
        let mut entity = InstanceBuilder::new(&model)
            .build(infrastructure::COMPUTE)
            .unwrap();
        let err = entity
            .assign(names::ID, "7f3c0c6e-0000-4000-8000-000000000000", &model)
            .unwrap_err();
        assert!(matches!(err, Error::AttributeValidation { .. }));
    }

    #[test]
    fn assign_checks_types() {
        let model = model();
        let mut entity = InstanceBuilder::new(&model)
            .build(infrastructure::COMPUTE)
            .unwrap();
        entity.assign("occi.compute.cores", 4i64, &model).unwrap();
        assert_eq!(
            entity.attribute("occi.compute.cores"),
            Some(&AttributeValue::Integer(4))
        );
        assert!(entity.assign("occi.compute.cores", "four", &model).is_err());
    }

    #[test]
    fn pattern_is_enforced() {
        let model = model();
        let mut entity = InstanceBuilder::new(&model)
            .build(infrastructure::COMPUTE)
            .unwrap();
        entity.set_attribute("occi.compute.state", "exploded");
        let err = entity.valid(&model).unwrap_err();
        assert!(matches!(
            err,
            Error::AttributeValidation { ref attribute, .. } if attribute == "occi.compute.state"
        ));
    }

    #[test]
    fn patterns_hold_across_repeated_checks() {
        let model = model();
        let mut entity = InstanceBuilder::new(&model)
            .build(infrastructure::COMPUTE)
            .unwrap();
        for _ in 0..3 {
            entity.assign("occi.compute.architecture", "x64", &model).unwrap();
            assert!(entity
                .assign("occi.compute.architecture", "x64 sparc", &model)
                .is_err());
            entity.valid(&model).unwrap();
        }
        assert!(compiled("x86|x64").unwrap().is_match("x86"));
        assert!(!compiled("x86|x64").unwrap().is_match("x86_64"));
        assert!(compiled("(").is_err());
    }

    #[test]
    fn link_requires_endpoints() {
        let model = model();
        let mut entity = InstanceBuilder::new(&model).build(occi_core::LINK).unwrap();
        entity.set_attribute(names::SOURCE, "/compute/1");
        let err = entity.valid(&model).unwrap_err();
        assert!(matches!(err, Error::AttributeValidation { .. } | Error::InstanceValidation(_)));
    }

    #[test]
    fn locations_must_be_absolute() {
        assert!(validate_location("/compute/1").is_ok());
        assert!(validate_location("https://cloud.example.org/compute/1").is_ok());
        assert_eq!(
            validate_location("compute/1"),
            Err(Error::LocationValidation("compute/1".into()))
        );
        assert!(validate_location("/compute/ 1").is_err());
    }
}
