//! The model registry: every Kind, Mixin, and Action known to a deployment.
//!
//! Categories are stored in registration order and indexed by type
//! identifier. References between categories stay identifiers; they are
//! resolved on demand through a [`ModelView`], which overlays a batch of
//! not-yet-registered categories on top of the registry. Registration of a
//! batch is all-or-nothing: every reference is resolved against the
//! registry plus the batch before anything is inserted.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::debug;

use crate::attribute::{AttributeDefinition, Attributes};
use crate::category::{Action, Category, CategoryClass, Kind, Mixin, Relation};
use crate::error::{Error, Result};

/// Insertion-ordered registry of categories.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Model {
    categories: Vec<Category>,
    index: HashMap<String, usize>,
}

impl Model {
    /// Creates an empty model.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one category.
    ///
    /// Registering a category identical to one already present is a no-op.
    /// References are not checked here; see [`Model::register_all`] and
    /// [`Model::valid`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::CategoryCollision`] if a different category is
    /// already registered under the same identifier.
    pub fn register(&mut self, category: Category) -> Result<()> {
        let id = category.identifier();
        if let Some(existing) = self.find(&id) {
            if *existing == category {
                return Ok(());
            }
            return Err(Error::CategoryCollision(id));
        }
        debug!(identifier = %id, class = %category.class(), "registered category");
        self.index.insert(id, self.categories.len());
        self.categories.push(category);
        Ok(())
    }

    /// Registers a batch of categories transactionally.
    ///
    /// Collisions and references are checked against the registry plus the
    /// batch first, in the order `depends`, `applies`, `parent`, `actions`,
    /// followed by parent-chain cycles. Nothing is registered unless every
    /// check passes. Categories already registered verbatim are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CategoryCollision`] on conflicting definitions,
    /// [`Error::ModelLookup`] naming the first unresolved identifier, or
    /// [`Error::ModelValidation`] on a cyclic parent chain.
    pub fn register_all(&mut self, categories: Vec<Category>) -> Result<()> {
        let mut batch: Vec<Category> = Vec::with_capacity(categories.len());
        for category in categories {
            let id = category.identifier();
            let known = self
                .find(&id)
                .or_else(|| batch.iter().find(|c| c.identifier() == id));
            match known {
                Some(existing) if *existing == category => continue,
                Some(_) => return Err(Error::CategoryCollision(id)),
                None => batch.push(category),
            }
        }

        self.view(&batch).check_references(&batch)?;

        for category in batch {
            self.register(category)?;
        }
        Ok(())
    }

    /// Returns a resolution view overlaying `batch` on this registry.
    #[must_use]
    pub fn view<'a>(&'a self, batch: &'a [Category]) -> ModelView<'a> {
        ModelView::new(self, batch)
    }

    /// Looks up a category by type identifier.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&Category> {
        self.index.get(id).and_then(|&i| self.categories.get(i))
    }

    /// Looks up a category, failing with [`Error::ModelLookup`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::ModelLookup`] if `id` is not registered.
    pub fn lookup(&self, id: &str) -> Result<&Category> {
        self.find(id).ok_or_else(|| Error::ModelLookup(id.to_owned()))
    }

    /// Looks up a kind by type identifier.
    #[must_use]
    pub fn find_kind(&self, id: &str) -> Option<&Kind> {
        match self.find(id) {
            Some(Category::Kind(k)) => Some(k),
            _ => None,
        }
    }

    /// Looks up a mixin by type identifier.
    #[must_use]
    pub fn find_mixin(&self, id: &str) -> Option<&Mixin> {
        match self.find(id) {
            Some(Category::Mixin(m)) => Some(m),
            _ => None,
        }
    }

    /// Looks up an action by type identifier.
    #[must_use]
    pub fn find_action(&self, id: &str) -> Option<&Action> {
        match self.find(id) {
            Some(Category::Action(a)) => Some(a),
            _ => None,
        }
    }

    /// Looks up the kind or mixin whose collection location is `location`.
    #[must_use]
    pub fn find_by_location(&self, location: &str) -> Option<&Category> {
        self.categories
            .iter()
            .find(|c| c.location() == Some(location))
    }

    /// Returns the mixins whose `depends` lists `id`.
    #[must_use]
    pub fn find_dependents(&self, id: &str) -> Vec<&Mixin> {
        self.mixins()
            .filter(|m| m.depends.iter().any(|d| d == id))
            .collect()
    }

    /// Iterates over all categories in registration order.
    pub fn categories(&self) -> impl Iterator<Item = &Category> {
        self.categories.iter()
    }

    /// Iterates over registered kinds.
    pub fn kinds(&self) -> impl Iterator<Item = &Kind> {
        self.categories.iter().filter_map(|c| match c {
            Category::Kind(k) => Some(k),
            _ => None,
        })
    }

    /// Iterates over registered mixins.
    pub fn mixins(&self) -> impl Iterator<Item = &Mixin> {
        self.categories.iter().filter_map(|c| match c {
            Category::Mixin(m) => Some(m),
            _ => None,
        })
    }

    /// Iterates over registered actions.
    pub fn actions(&self) -> impl Iterator<Item = &Action> {
        self.categories.iter().filter_map(|c| match c {
            Category::Action(a) => Some(a),
            _ => None,
        })
    }

    /// Number of registered categories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Returns the parent chain of `kind_id`, nearest first, excluding the kind itself.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ModelLookup`] for a missing kind or ancestor and
    /// [`Error::ModelValidation`] for a cyclic chain.
    pub fn ancestors(&self, kind_id: &str) -> Result<Vec<&Kind>> {
        self.view(&[]).ancestors(kind_id)
    }

    /// Returns true if `kind_id` is `ancestor_id` or one of its descendants.
    #[must_use]
    pub fn is_related(&self, kind_id: &str, ancestor_id: &str) -> bool {
        self.view(&[]).is_related(kind_id, ancestor_id)
    }

    /// Effective attribute definitions of a kind: its own plus every ancestor's.
    ///
    /// # Errors
    ///
    /// Fails like [`Model::ancestors`].
    pub fn kind_attributes(&self, kind_id: &str) -> Result<Attributes<AttributeDefinition>> {
        self.view(&[]).kind_attributes(kind_id)
    }

    /// Effective attribute definitions of an entity of `kind_id` with `mixins` attached.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ModelLookup`] if the kind, a mixin, or a dependency is missing.
    pub fn entity_attributes(
        &self,
        kind_id: &str,
        mixins: &[String],
    ) -> Result<Attributes<AttributeDefinition>> {
        let view = self.view(&[]);
        let mut attributes = view.kind_attributes(kind_id)?;
        for mixin in mixins {
            attributes.merge(&view.mixin_attributes(mixin)?);
        }
        Ok(attributes)
    }

    /// Location an instance of `kind_id` with identifier `id` gets when it
    /// has none of its own: the kind's collection location followed by `id`.
    #[must_use]
    pub fn default_location(&self, kind_id: &str, id: &str) -> Option<String> {
        let location = self.find_kind(kind_id)?.location.as_deref()?;
        Some(format!("{}/{}", location.trim_end_matches('/'), id))
    }

    /// Cross-checks every registered reference.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ModelValidation`] listing every dangling, mistyped,
    /// or cyclic reference.
    pub fn valid(&self) -> Result<()> {
        let view = self.view(&[]);
        let mut violations = Vec::new();

        for category in &self.categories {
            let id = category.identifier();
            for (relation, target) in category.references() {
                match self.find(target) {
                    None => violations.push(format!(
                        "{} references unknown {} target {}",
                        id,
                        relation.as_str(),
                        target
                    )),
                    Some(found) if found.class() != relation.target_class() => {
                        violations.push(format!(
                            "{} lists {} under {}, but it is a {}",
                            id,
                            target,
                            relation.as_str(),
                            found.class()
                        ))
                    }
                    Some(_) => {}
                }
            }
            if let Category::Kind(kind) = category {
                if let Err(Error::ModelValidation(cycle)) = view.ancestors(&kind.identifier()) {
                    violations.extend(cycle);
                }
            }
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(Error::ModelValidation(violations))
        }
    }

    /// Validates the model and hands out a shared read-only handle.
    ///
    /// # Errors
    ///
    /// Fails like [`Model::valid`].
    pub fn freeze(self) -> Result<Arc<Model>> {
        self.valid()?;
        debug!(categories = self.len(), "model frozen");
        Ok(Arc::new(self))
    }
}

/// A registry with a batch of pending categories laid over it.
///
/// Lookups consult the batch first, then the registry.
#[derive(Debug)]
pub struct ModelView<'a> {
    model: &'a Model,
    batch: &'a [Category],
    batch_index: HashMap<String, usize>,
}

impl<'a> ModelView<'a> {
    fn new(model: &'a Model, batch: &'a [Category]) -> Self {
        let batch_index = batch
            .iter()
            .enumerate()
            .map(|(i, c)| (c.identifier(), i))
            .collect();
        Self {
            model,
            batch,
            batch_index,
        }
    }

    /// Looks up a category in the batch, then in the registry.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&'a Category> {
        match self.batch_index.get(id) {
            Some(&i) => self.batch.get(i),
            None => self.model.find(id),
        }
    }

    /// Looks up a category of a given class.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ModelLookup`] if `id` is absent or has another class.
    pub fn expect_class(&self, id: &str, class: CategoryClass) -> Result<&'a Category> {
        match self.find(id) {
            Some(found) if found.class() == class => Ok(found),
            _ => Err(Error::ModelLookup(id.to_owned())),
        }
    }

    fn kind(&self, id: &str) -> Result<&'a Kind> {
        match self.expect_class(id, CategoryClass::Kind)? {
            Category::Kind(k) => Ok(k),
            _ => Err(Error::ModelLookup(id.to_owned())),
        }
    }

    fn mixin(&self, id: &str) -> Result<&'a Mixin> {
        match self.expect_class(id, CategoryClass::Mixin)? {
            Category::Mixin(m) => Ok(m),
            _ => Err(Error::ModelLookup(id.to_owned())),
        }
    }

    /// Parent chain of `kind_id`, nearest first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ModelLookup`] for a missing link in the chain and
    /// [`Error::ModelValidation`] when the chain loops.
    pub fn ancestors(&self, kind_id: &str) -> Result<Vec<&'a Kind>> {
        let mut chain = Vec::new();
        let mut seen: HashSet<&str> = HashSet::new();
        let mut current = self.kind(kind_id)?;
        seen.insert(kind_id);
        while let Some(parent) = current.parent.as_deref() {
            if !seen.insert(parent) {
                return Err(Error::ModelValidation(vec![format!(
                    "parent chain of {kind_id} loops through {parent}"
                )]));
            }
            current = self.kind(parent)?;
            chain.push(current);
        }
        Ok(chain)
    }

    /// Returns true if `kind_id` is `ancestor_id` or descends from it.
    #[must_use]
    pub fn is_related(&self, kind_id: &str, ancestor_id: &str) -> bool {
        kind_id == ancestor_id
            || self
                .ancestors(kind_id)
                .map(|chain| chain.iter().any(|k| k.identifier() == ancestor_id))
                .unwrap_or(false)
    }

    /// Attributes of `kind_id` unioned with all its ancestors', root first.
    ///
    /// # Errors
    ///
    /// Fails like [`ModelView::ancestors`].
    pub fn kind_attributes(&self, kind_id: &str) -> Result<Attributes<AttributeDefinition>> {
        let kind = self.kind(kind_id)?;
        let mut attributes = Attributes::new();
        for ancestor in self.ancestors(kind_id)?.iter().rev() {
            attributes.merge(&ancestor.base.attributes);
        }
        attributes.merge(&kind.base.attributes);
        Ok(attributes)
    }

    /// Attributes of `mixin_id` unioned with those of every mixin it
    /// transitively depends on, dependencies first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ModelLookup`] for a missing mixin or dependency.
    pub fn mixin_attributes(&self, mixin_id: &str) -> Result<Attributes<AttributeDefinition>> {
        let mut attributes = Attributes::new();
        let mut seen = HashSet::new();
        self.collect_mixin_attributes(mixin_id, &mut seen, &mut attributes)?;
        Ok(attributes)
    }

    fn collect_mixin_attributes(
        &self,
        mixin_id: &str,
        seen: &mut HashSet<String>,
        into: &mut Attributes<AttributeDefinition>,
    ) -> Result<()> {
        if !seen.insert(mixin_id.to_owned()) {
            return Ok(());
        }
        let mixin = self.mixin(mixin_id)?;
        for dependency in &mixin.depends {
            self.collect_mixin_attributes(dependency, seen, into)?;
        }
        into.merge(&mixin.base.attributes);
        Ok(())
    }

    /// Resolves every reference of `categories` through this view.
    ///
    /// References are resolved relation by relation in the order `depends`,
    /// `applies`, `parent`, `actions`; parent chains are then walked to
    /// reject cycles.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ModelLookup`] naming the first identifier that is
    /// missing or has the wrong class, or [`Error::ModelValidation`] for a
    /// cyclic parent chain.
    pub fn check_references(&self, categories: &[Category]) -> Result<()> {
        for relation in [
            Relation::Depends,
            Relation::Applies,
            Relation::Parent,
            Relation::Action,
        ] {
            for category in categories {
                for (rel, target) in category.references() {
                    if rel == relation {
                        self.expect_class(target, relation.target_class())?;
                    }
                }
            }
        }
        for category in categories {
            if let Category::Kind(kind) = category {
                self.ancestors(&kind.identifier())?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::AttributeDefinition;

    const S: &str = "http://example.org/occi#";

    fn sample() -> Model {
        let mut model = Model::new();
        model
            .register_all(vec![
                Kind::new(S, "entity")
                    .attribute("occi.core.id", AttributeDefinition::string().required())
                    .into(),
                Kind::new(S, "resource")
                    .parent("http://example.org/occi#entity")
                    .attribute("occi.core.summary", AttributeDefinition::string())
                    .into(),
                Action::new(S, "start").into(),
                Kind::new(S, "compute")
                    .parent("http://example.org/occi#resource")
                    .actions(&["http://example.org/occi#start"])
                    .location("/compute/")
                    .attribute("occi.compute.cores", AttributeDefinition::number())
                    .into(),
                Mixin::new(S, "base_tpl").into(),
                Mixin::new(S, "os_tpl")
                    .depends(&["http://example.org/occi#base_tpl"])
                    .applies(&["http://example.org/occi#compute"])
                    .attribute("occi.os.hostname", AttributeDefinition::string())
                    .into(),
            ])
            .unwrap();
        model
    }

    #[test]
    fn register_identical_is_noop() {
        let mut model = sample();
        let before = model.clone();
        model.register(Mixin::new(S, "base_tpl").into()).unwrap();
        assert_eq!(model, before);
    }

    #[test]
    fn register_conflicting_definition_collides() {
        let mut model = sample();
        let err = model
            .register(Mixin::new(S, "base_tpl").title("changed").into())
            .unwrap_err();
        assert_eq!(
            err,
            Error::CategoryCollision("http://example.org/occi#base_tpl".into())
        );
    }

    #[test]
    fn register_all_is_transactional() {
        let mut model = sample();
        let before = model.clone();
        let err = model
            .register_all(vec![
                Kind::new(S, "network")
                    .parent("http://example.org/occi#resource")
                    .into(),
                Mixin::new(S, "broken")
                    .applies(&["http://example.org/occi#unknown-kind"])
                    .into(),
            ])
            .unwrap_err();
        assert_eq!(
            err,
            Error::ModelLookup("http://example.org/occi#unknown-kind".into())
        );
        assert_eq!(model, before);
    }

    #[test]
    fn register_all_accepts_forward_references() {
        let mut model = Model::new();
        model
            .register_all(vec![
                Mixin::new(S, "tag")
                    .applies(&["http://example.org/occi#later"])
                    .into(),
                Kind::new(S, "later").into(),
            ])
            .unwrap();
        assert_eq!(model.len(), 2);
    }

    #[test]
    fn kind_attributes_walk_the_parent_chain() {
        let model = sample();
        let attrs = model
            .kind_attributes("http://example.org/occi#compute")
            .unwrap();
        let names: Vec<_> = attrs.names().collect();
        assert_eq!(
            names,
            ["occi.core.id", "occi.core.summary", "occi.compute.cores"]
        );
    }

    #[test]
    fn entity_attributes_include_mixins() {
        let model = sample();
        let attrs = model
            .entity_attributes(
                "http://example.org/occi#compute",
                &["http://example.org/occi#os_tpl".to_owned()],
            )
            .unwrap();
        assert!(attrs.contains("occi.os.hostname"));
        assert!(attrs.contains("occi.core.id"));
    }

    #[test]
    fn relatedness_follows_ancestry() {
        let model = sample();
        assert!(model.is_related(
            "http://example.org/occi#compute",
            "http://example.org/occi#entity"
        ));
        assert!(!model.is_related(
            "http://example.org/occi#resource",
            "http://example.org/occi#compute"
        ));
    }

    #[test]
    fn find_dependents_lists_requiring_mixins() {
        let model = sample();
        let dependents = model.find_dependents("http://example.org/occi#base_tpl");
        assert_eq!(dependents.len(), 1);
        assert_eq!(dependents[0].base.term, "os_tpl");
    }

    #[test]
    fn valid_reports_dangling_references() {
        let mut model = Model::new();
        model
            .register(Kind::new(S, "orphan").parent("http://example.org/occi#ghost").into())
            .unwrap();
        let err = model.valid().unwrap_err();
        assert!(matches!(
            &err,
            Error::ModelValidation(violations) if violations[0].contains("http://example.org/occi#ghost")
        ));
    }

    #[test]
    fn valid_rejects_parent_cycles() {
        let mut model = Model::new();
        model
            .register(Kind::new(S, "a").parent("http://example.org/occi#b").into())
            .unwrap();
        model
            .register(Kind::new(S, "b").parent("http://example.org/occi#a").into())
            .unwrap();
        assert!(matches!(model.valid(), Err(Error::ModelValidation(_))));
    }

    #[test]
    fn default_location_joins_kind_location_and_id() {
        let model = sample();
        assert_eq!(
            model.default_location("http://example.org/occi#compute", "42"),
            Some("/compute/42".to_owned())
        );
        assert_eq!(model.default_location("http://example.org/occi#entity", "42"), None);
    }

    #[test]
    fn freeze_shares_a_valid_model() {
        let frozen = sample().freeze().unwrap();
        let reader = Arc::clone(&frozen);
        let handle = std::thread::spawn(move || {
            reader
                .find_kind("http://example.org/occi#compute")
                .is_some()
        });
        assert!(handle.join().unwrap());
    }
}
