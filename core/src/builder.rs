//! Instance builder: allocates entities and action instances from the model.

use tracing::trace;
use uuid::Uuid;

use crate::action_instance::ActionInstance;
use crate::catalog::core::LINK;
use crate::entity::{names, Entity, Link, Resource};
use crate::error::{Error, Result};
use crate::model::Model;

/// Builds entities whose concrete shape is chosen by their kind's ancestry.
#[derive(Debug, Clone, Copy)]
pub struct InstanceBuilder<'m> {
    model: &'m Model,
}

impl<'m> InstanceBuilder<'m> {
    /// Creates a builder over `model`.
    #[must_use]
    pub fn new(model: &'m Model) -> Self {
        Self { model }
    }

    /// Builds an entity of `kind_id` with a fresh identifier and every
    /// default declared along the kind's parent chain.
    ///
    /// Kinds descending from `occi/core#link` produce [`Entity::Link`], all
    /// others [`Entity::Resource`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InstanceLookup`] if `kind_id` is not a kind in the
    /// model, or a lookup error for a broken parent chain.
    pub fn build(&self, kind_id: &str) -> Result<Entity> {
        if self.model.find_kind(kind_id).is_none() {
            return Err(Error::InstanceLookup(format!("unknown kind {kind_id}")));
        }
        let mut entity = if self.model.is_related(kind_id, LINK) {
            Entity::Link(Link::new(kind_id))
        } else {
            Entity::Resource(Resource::new(kind_id))
        };

        for (name, definition) in self.model.kind_attributes(kind_id)?.iter() {
            if let Some(default) = &definition.default {
                entity.set_attribute(name, default.clone());
            }
        }
        entity.set_attribute(names::ID, Uuid::new_v4().to_string());
        trace!(kind = %kind_id, id = ?entity.id(), "built entity");
        Ok(entity)
    }

    /// Attaches `mixin_id` to `entity`, filling in the mixin's defaults for
    /// attributes the entity does not carry yet. Attaching twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InstanceLookup`] if the mixin is unknown.
    pub fn attach_mixin(&self, entity: &mut Entity, mixin_id: &str) -> Result<()> {
        if self.model.find_mixin(mixin_id).is_none() {
            return Err(Error::InstanceLookup(format!("unknown mixin {mixin_id}")));
        }
        if entity.core().has_mixin(mixin_id) {
            return Ok(());
        }
        let defaults = self.model.view(&[]).mixin_attributes(mixin_id)?;
        let core = entity.core_mut();
        for (name, definition) in defaults.iter() {
            if let (Some(default), false) = (&definition.default, core.attributes.contains(name)) {
                core.set_attribute(name, default.clone());
            }
        }
        core.mixins.push(mixin_id.to_owned());
        Ok(())
    }

    /// Builds an action instance of `action_id` with parameter defaults.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InstanceLookup`] if the action is unknown.
    pub fn build_action(&self, action_id: &str) -> Result<ActionInstance> {
        let action = self
            .model
            .find_action(action_id)
            .ok_or_else(|| Error::InstanceLookup(format!("unknown action {action_id}")))?;
        let mut instance = ActionInstance::new(action_id);
        for (name, definition) in action.base.attributes.iter() {
            if let Some(default) = &definition.default {
                instance.attributes.insert(name, default.clone());
            }
        }
        Ok(instance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::AttributeValue;
    use crate::catalog::{core as occi_core, infrastructure};

    #[test]
    fn link_kinds_build_links() {
        let model = Model::with_infrastructure().unwrap();
        let builder = InstanceBuilder::new(&model);
        assert!(builder
            .build(infrastructure::STORAGE_LINK)
            .unwrap()
            .as_link()
            .is_some());
        assert!(builder
            .build(infrastructure::COMPUTE)
            .unwrap()
            .as_resource()
            .is_some());
    }

    #[test]
    fn defaults_and_identity_are_assigned() {
        let model = Model::with_infrastructure().unwrap();
        let entity = InstanceBuilder::new(&model)
            .build(infrastructure::COMPUTE)
            .unwrap();
        assert!(entity.core().uuid().is_some());
        assert_eq!(
            entity.attribute("occi.compute.state"),
            Some(&AttributeValue::from("inactive"))
        );
    }

    #[test]
    fn unknown_kind_is_a_lookup_error() {
        let model = Model::bootstrap().unwrap();
        let err = InstanceBuilder::new(&model)
            .build("http://example.org/occi#nothing")
            .unwrap_err();
        assert!(matches!(err, Error::InstanceLookup(_)));
    }

    #[test]
    fn attach_mixin_is_idempotent() {
        let model = Model::with_infrastructure().unwrap();
        let builder = InstanceBuilder::new(&model);
        let mut entity = builder.build(occi_core::RESOURCE).unwrap();
        builder.attach_mixin(&mut entity, infrastructure::OS_TPL).unwrap();
        builder.attach_mixin(&mut entity, infrastructure::OS_TPL).unwrap();
        assert_eq!(entity.core().mixins, vec![infrastructure::OS_TPL.to_owned()]);
    }

    #[test]
    fn action_instances_get_parameter_defaults() {
        let model = Model::with_infrastructure().unwrap();
        let instance = InstanceBuilder::new(&model)
            .build_action(infrastructure::action::COMPUTE_STOP)
            .unwrap();
        assert_eq!(
            instance.attributes.get("method"),
            Some(&AttributeValue::from("graceful"))
        );
    }
}
