//! Entity records and their inline links.

use occi_core::catalog::core::LINK;
use occi_core::category::CategoryClass;
use occi_core::entity::names;
use occi_core::{Category, Entity, Error, InstanceBuilder};
use tracing::debug;
use uuid::Uuid;

use super::{apply_attribute, records, Record, TextParser};
use crate::error::{ParserError, Result};
use crate::grammar::{identifiers, literal, Directive, Literal};

impl TextParser<'_> {
    /// Parses every entity record of `text`, in input order.
    ///
    /// Each record names exactly one kind and any number of mixins.
    /// `X-OCCI-Attribute:` values are typed as written: numbers with a
    /// decimal point are floats, other numbers integers. `Link:` lines whose
    /// relation is an action add that action to the entity; other `Link:`
    /// lines become links of the resource, in input order. A link's own
    /// location is its `self` parameter, left unset when absent; `<uri>` is
    /// always its target. When `expected_kind` is given, every entity's kind
    /// must be it or descend from it.
    ///
    /// # Errors
    ///
    /// Returns [`ParserError::Parsing`] for malformed lines,
    /// [`Error::InstanceLookup`] for a record with no kind, several kinds,
    /// or unknown categories, and [`ParserError::TypeMismatch`] when a kind
    /// does not match `expected_kind`.
    pub fn entities(&self, text: &str, expected_kind: Option<&str>) -> Result<Vec<Entity>> {
        records(text)
            .iter()
            .map(|record| self.entity(record, expected_kind))
            .collect()
    }

    fn entity(&self, record: &Record<'_>, expected_kind: Option<&str>) -> Result<Entity> {
        let mut kinds = Vec::new();
        let mut mixins = Vec::new();
        let mut location = None;
        let mut attributes = Vec::new();
        let mut links = Vec::new();
        for &(directive, line) in record {
            match directive {
                Directive::Category => match self.category_reference(line)? {
                    (id, CategoryClass::Kind) => kinds.push(id),
                    (id, CategoryClass::Mixin) => mixins.push(id),
                    (_, CategoryClass::Action) => {
                        return Err(ParserError::parsing(
                            line,
                            "action categories cannot classify an entity",
                        ))
                    }
                },
                Directive::Location => location = Some(self.location(line)?),
                Directive::Attribute => attributes.push(self.attribute(line)?),
                Directive::Link => links.push(line),
            }
        }

        let kind = match kinds.as_slice() {
            [kind] => kind,
            [] => {
                return Err(Error::InstanceLookup("entity record names no kind".into()).into())
            }
            several => {
                return Err(Error::InstanceLookup(format!(
                    "entity record names several kinds: {}",
                    several.join(" ")
                ))
                .into())
            }
        };
        let builder = InstanceBuilder::new(self.model);
        let mut entity = builder.build(kind)?;
        if let Some(expected) = expected_kind {
            if !self.model.is_related(kind, expected) {
                return Err(ParserError::TypeMismatch {
                    expected: expected.to_owned(),
                    found: kind.clone(),
                });
            }
        }
        for mixin in &mixins {
            builder.attach_mixin(&mut entity, mixin)?;
        }
        entity.core_mut().location = location;

        let definitions = self.model.entity_attributes(kind, &entity.core().mixins)?;
        for (name, value) in attributes {
            apply_attribute(entity.core_mut(), &definitions, &name, value);
        }
        for line in links {
            self.link(&mut entity, line)?;
        }
        debug!(kind = %kind, id = ?entity.id(), "parsed entity");
        Ok(entity)
    }

    fn link(&self, owner: &mut Entity, line: &str) -> Result<()> {
        let g = self.grammar;
        let c = g.matches(&g.link, line, "link")?;
        let uri = &c["uri"];
        let rel = identifiers(c.name("rel"));
        let Some(target_kind) = rel.first() else {
            return Err(ParserError::parsing(line, "link has no relation"));
        };

        let names_action = matches!(self.model.find(target_kind), Some(Category::Action(_)));
        if names_action || uri.contains("?action=") {
            if self.model.find_action(target_kind).is_none() {
                return Err(Error::ModelLookup(target_kind.clone()).into());
            }
            let actions = &mut owner.core_mut().actions;
            if !actions.contains(target_kind) {
                actions.push(target_kind.clone());
            }
            return Ok(());
        }
        self.model.lookup(target_kind)?;

        let Entity::Resource(resource) = owner else {
            return Err(ParserError::parsing(line, "only resources carry inline links"));
        };

        let mut link_kind = None;
        let mut mixins = Vec::new();
        for id in identifiers(c.name("category")) {
            if link_kind.is_none() && self.model.find_kind(&id).is_some() {
                link_kind = Some(id);
            } else {
                mixins.push(id);
            }
        }
        let link_kind = link_kind.unwrap_or_else(|| {
            self.options
                .link_kinds
                .resolve(self.model, Some(target_kind.as_str()))
        });

        let builder = InstanceBuilder::new(self.model);
        let mut built = builder.build(&link_kind)?;
        for mixin in &mixins {
            builder.attach_mixin(&mut built, mixin)?;
        }
        let Entity::Link(mut link) = built else {
            return Err(ParserError::TypeMismatch {
                expected: LINK.to_owned(),
                found: link_kind,
            });
        };

        let core = &mut link.core;
        core.location = c.name("self_").map(|s| s.as_str().to_owned());
        if let Some(id) = core
            .location
            .as_deref()
            .and_then(|l| l.rsplit('/').next())
            .filter(|last| Uuid::parse_str(last).is_ok())
        {
            let id = id.to_owned();
            core.set_attribute(names::ID, id);
        }
        core.set_attribute(names::TARGET, uri);
        core.set_attribute(names::TARGET_KIND, target_kind.as_str());
        let source = resource.core.location.clone().or_else(|| {
            resource
                .core
                .id()
                .and_then(|id| self.model.default_location(&resource.core.kind, id))
        });
        if let Some(source) = source {
            core.set_attribute(names::SOURCE, source);
        }
        core.set_attribute(names::SOURCE_KIND, resource.core.kind.as_str());

        let definitions = self.model.entity_attributes(&core.kind, &core.mixins)?;
        for a in g.link_attribute.captures_iter(&c["attributes"]) {
            let value: Literal = literal(&a, line)?;
            apply_attribute(core, &definitions, &a["name"], value);
        }
        resource.links.push(link);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use occi_core::catalog::infrastructure;
    use occi_core::{AttributeValue, Model};

    use super::*;
    use crate::options::ParserOptions;

    const COMPUTE: &str =
        r#"Category: compute;scheme="http://schemas.ogf.org/occi/infrastructure#";class="kind""#;

    #[test]
    fn action_links_add_actions() {
        let model = Model::with_infrastructure().unwrap();
        let options = ParserOptions::default();
        let parser = TextParser::new(&model, &options).unwrap();
        let text = format!(
            "{COMPUTE}\nLink: </compute/1?action=start>;rel=\"{}\"",
            infrastructure::action::COMPUTE_START
        );
        let entities = parser.entities(&text, None).unwrap();
        assert_eq!(
            entities[0].core().actions,
            vec![infrastructure::action::COMPUTE_START.to_owned()]
        );
    }

    #[test]
    fn self_locations_supply_link_ids() {
        let model = Model::with_infrastructure().unwrap();
        let options = ParserOptions::default();
        let parser = TextParser::new(&model, &options).unwrap();
        let id = "2f6c1b1e-0b4c-4b6e-9b1a-3e2c5d7f8a90";
        let text = format!(
            "{COMPUTE}\nX-OCCI-Location: /compute/1\nLink: </storage/1>;rel=\"{}\";self=\"/link/storagelink/{id}\"",
            infrastructure::STORAGE
        );
        let entities = parser.entities(&text, None).unwrap();
        let link = &entities[0].as_resource().unwrap().links[0];
        assert_eq!(link.core.kind, infrastructure::STORAGE_LINK);
        assert_eq!(link.core.id(), Some(id));
        assert_eq!(link.source(), Some("/compute/1"));
        assert_eq!(link.source_kind(), Some(infrastructure::COMPUTE));
        assert_eq!(link.target(), Some("/storage/1"));
    }

    #[test]
    fn sources_default_to_the_kind_location() {
        let model = Model::with_infrastructure().unwrap();
        let options = ParserOptions::default();
        let parser = TextParser::new(&model, &options).unwrap();
        let text = format!(
            "{COMPUTE}\nX-OCCI-Attribute: occi.core.id=\"abc\"\nLink: </network/1>;rel=\"{}\"",
            infrastructure::NETWORK
        );
        let entities = parser.entities(&text, None).unwrap();
        let link = &entities[0].as_resource().unwrap().links[0];
        assert_eq!(link.source(), Some("/compute/abc"));
        assert_eq!(link.core.kind, infrastructure::NETWORK_INTERFACE);
    }

    #[test]
    fn expected_kind_accepts_descendants() {
        let model = Model::with_infrastructure().unwrap();
        let options = ParserOptions::default();
        let parser = TextParser::new(&model, &options).unwrap();
        assert!(parser
            .entities(COMPUTE, Some(occi_core::catalog::core::RESOURCE))
            .is_ok());
        let err = parser.entities(COMPUTE, Some(LINK)).unwrap_err();
        assert!(matches!(err, ParserError::TypeMismatch { .. }));
    }

    #[test]
    fn object_attributes_are_decoded() {
        let model = Model::with_extensions().unwrap();
        let options = ParserOptions::default();
        let parser = TextParser::new(&model, &options).unwrap();
        let text = "Category: securitygroup;scheme=\"http://schemas.ogf.org/occi/infrastructure#\";class=\"kind\"\n\
                    X-OCCI-Attribute: occi.securitygroup.rules=\"[{\\\"port\\\":22}]\"";
        let entities = parser.entities(text, None).unwrap();
        assert_eq!(
            entities[0].attribute("occi.securitygroup.rules"),
            Some(&AttributeValue::Object(serde_json::json!([{"port": 22}])))
        );
    }
}
