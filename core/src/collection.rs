//! Collections of entities, as returned by listing a location.

use crate::entity::{Entity, Link, Resource};
use crate::error::{Error, Result};
use crate::model::Model;

/// An ordered set of resources and links.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collection {
    /// Entities in insertion order.
    pub entities: Vec<Entity>,
}

impl Collection {
    /// Creates an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Iterates over the resources.
    pub fn resources(&self) -> impl Iterator<Item = &Resource> {
        self.entities.iter().filter_map(Entity::as_resource)
    }

    /// Iterates over the top-level links.
    pub fn links(&self) -> impl Iterator<Item = &Link> {
        self.entities.iter().filter_map(Entity::as_link)
    }

    /// Finds an entity by `occi.core.id` or by location.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CollectionLookup`] if nothing matches.
    pub fn find(&self, id_or_location: &str) -> Result<&Entity> {
        self.entities
            .iter()
            .find(|e| e.id() == Some(id_or_location) || e.location() == Some(id_or_location))
            .ok_or_else(|| Error::CollectionLookup(id_or_location.to_owned()))
    }

    /// Locations of all entities that have one.
    #[must_use]
    pub fn locations(&self) -> Vec<&str> {
        self.entities.iter().filter_map(Entity::location).collect()
    }

    /// Validates every entity.
    ///
    /// # Errors
    ///
    /// Returns the first entity validation failure.
    pub fn valid(&self, model: &Model) -> Result<()> {
        self.entities.iter().try_for_each(|e| e.valid(model))
    }
}

impl FromIterator<Entity> for Collection {
    fn from_iter<I: IntoIterator<Item = Entity>>(iter: I) -> Self {
        Self {
            entities: iter.into_iter().collect(),
        }
    }
}
