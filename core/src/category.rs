//! Categories: Kinds, Mixins, and Actions.
//!
//! A category is identified by its *type identifier*, the concatenation of
//! its scheme (which ends in `#`) and its term. Cross-references between
//! categories (`parent`, `depends`, `applies`, `actions`) are stored as type
//! identifiers and resolved through a [`Model`](crate::Model).

use std::fmt;
use std::str::FromStr;

use crate::attribute::{AttributeDefinition, Attributes};

/// Builds a type identifier from a scheme and a term.
///
/// A missing trailing `#` on the scheme is supplied.
#[must_use]
pub fn identifier(scheme: &str, term: &str) -> String {
    if scheme.ends_with('#') {
        format!("{scheme}{term}")
    } else {
        format!("{scheme}#{term}")
    }
}

/// Splits a type identifier into `(scheme, term)`; the scheme keeps its `#`.
#[must_use]
pub fn split_identifier(id: &str) -> Option<(&str, &str)> {
    let pos = id.rfind('#')?;
    let (scheme, term) = id.split_at(pos + 1);
    if term.is_empty() || scheme.len() < 2 {
        return None;
    }
    Some((scheme, term))
}

/// Which of the three category classes a category belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CategoryClass {
    /// Structural type of an entity.
    Kind,
    /// Attachable extension of an entity.
    Mixin,
    /// Invokable operation.
    Action,
}

impl CategoryClass {
    /// Returns the value used in the `class="..."` parameter.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            CategoryClass::Kind => "kind",
            CategoryClass::Mixin => "mixin",
            CategoryClass::Action => "action",
        }
    }
}

impl fmt::Display for CategoryClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CategoryClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "kind" => Ok(CategoryClass::Kind),
            "mixin" => Ok(CategoryClass::Mixin),
            "action" => Ok(CategoryClass::Action),
            other => Err(format!("unknown category class {other:?}")),
        }
    }
}

/// Fields shared by every category class.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CategoryBase {
    /// Term, unique within the scheme.
    pub term: String,
    /// Scheme URI, ending in `#`.
    pub scheme: String,
    /// Human-readable title.
    pub title: Option<String>,
    /// Attributes declared directly on this category (not inherited).
    pub attributes: Attributes<AttributeDefinition>,
}

impl CategoryBase {
    fn new(scheme: &str, term: &str) -> Self {
        let scheme = if scheme.ends_with('#') {
            scheme.to_owned()
        } else {
            format!("{scheme}#")
        };
        Self {
            term: term.to_owned(),
            scheme,
            ..Self::default()
        }
    }

    /// Returns the type identifier.
    #[must_use]
    pub fn identifier(&self) -> String {
        format!("{}{}", self.scheme, self.term)
    }
}

/// A Kind: the structural type of a resource or link.
#[derive(Debug, Clone, PartialEq)]
pub struct Kind {
    /// Shared category fields.
    pub base: CategoryBase,
    /// Identifier of the parent kind.
    pub parent: Option<String>,
    /// Identifiers of the actions instances of this kind support.
    pub actions: Vec<String>,
    /// Collection location of instances (e.g. `/compute/`).
    pub location: Option<String>,
}

/// A Mixin: optional attributes and actions attachable to entities.
#[derive(Debug, Clone, PartialEq)]
pub struct Mixin {
    /// Shared category fields.
    pub base: CategoryBase,
    /// Identifiers of mixins this mixin requires.
    pub depends: Vec<String>,
    /// Identifiers of kinds this mixin may be attached to.
    pub applies: Vec<String>,
    /// Identifiers of actions this mixin contributes.
    pub actions: Vec<String>,
    /// Collection location of tagged instances.
    pub location: Option<String>,
}

/// An Action: an invokable operation whose attributes are its parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Action {
    /// Shared category fields.
    pub base: CategoryBase,
}

macro_rules! base_builders {
    ($ty:ident) => {
        impl $ty {
            /// Sets the title.
            #[must_use]
            pub fn title(mut self, title: &str) -> Self {
                self.base.title = Some(title.to_owned());
                self
            }

            /// Declares an attribute directly on this category.
            #[must_use]
            pub fn attribute(mut self, name: &str, definition: AttributeDefinition) -> Self {
                self.base.attributes.insert(name, definition);
                self
            }

            /// Returns the type identifier.
            #[must_use]
            pub fn identifier(&self) -> String {
                self.base.identifier()
            }
        }
    };
}

base_builders!(Kind);
base_builders!(Mixin);
base_builders!(Action);

impl Kind {
    /// Creates a kind with no parent, actions, or attributes.
    #[must_use]
    pub fn new(scheme: &str, term: &str) -> Self {
        Self {
            base: CategoryBase::new(scheme, term),
            parent: None,
            actions: Vec::new(),
            location: None,
        }
    }

    /// Sets the parent kind identifier.
    #[must_use]
    pub fn parent(mut self, parent: &str) -> Self {
        self.parent = Some(parent.to_owned());
        self
    }

    /// Sets the supported actions.
    #[must_use]
    pub fn actions(mut self, actions: &[&str]) -> Self {
        self.actions = actions.iter().map(|a| (*a).to_owned()).collect();
        self
    }

    /// Sets the collection location.
    #[must_use]
    pub fn location(mut self, location: &str) -> Self {
        self.location = Some(location.to_owned());
        self
    }
}

impl Mixin {
    /// Creates a mixin with no relations or attributes.
    #[must_use]
    pub fn new(scheme: &str, term: &str) -> Self {
        Self {
            base: CategoryBase::new(scheme, term),
            depends: Vec::new(),
            applies: Vec::new(),
            actions: Vec::new(),
            location: None,
        }
    }

    /// Sets the mixins this mixin depends on.
    #[must_use]
    pub fn depends(mut self, depends: &[&str]) -> Self {
        self.depends = depends.iter().map(|d| (*d).to_owned()).collect();
        self
    }

    /// Sets the kinds this mixin applies to.
    #[must_use]
    pub fn applies(mut self, applies: &[&str]) -> Self {
        self.applies = applies.iter().map(|a| (*a).to_owned()).collect();
        self
    }

    /// Sets the contributed actions.
    #[must_use]
    pub fn actions(mut self, actions: &[&str]) -> Self {
        self.actions = actions.iter().map(|a| (*a).to_owned()).collect();
        self
    }

    /// Sets the collection location.
    #[must_use]
    pub fn location(mut self, location: &str) -> Self {
        self.location = Some(location.to_owned());
        self
    }
}

impl Action {
    /// Creates an action with no parameters.
    #[must_use]
    pub fn new(scheme: &str, term: &str) -> Self {
        Self {
            base: CategoryBase::new(scheme, term),
        }
    }
}

/// Any category held by a model.
#[derive(Debug, Clone, PartialEq)]
pub enum Category {
    /// A kind.
    Kind(Kind),
    /// A mixin.
    Mixin(Mixin),
    /// An action.
    Action(Action),
}

impl Category {
    /// Returns the shared category fields.
    #[must_use]
    pub fn base(&self) -> &CategoryBase {
        match self {
            Category::Kind(k) => &k.base,
            Category::Mixin(m) => &m.base,
            Category::Action(a) => &a.base,
        }
    }

    /// Mutable shared category fields.
    pub fn base_mut(&mut self) -> &mut CategoryBase {
        match self {
            Category::Kind(k) => &mut k.base,
            Category::Mixin(m) => &mut m.base,
            Category::Action(a) => &mut a.base,
        }
    }

    /// Returns the type identifier.
    #[must_use]
    pub fn identifier(&self) -> String {
        self.base().identifier()
    }

    /// Returns the category class.
    #[must_use]
    pub fn class(&self) -> CategoryClass {
        match self {
            Category::Kind(_) => CategoryClass::Kind,
            Category::Mixin(_) => CategoryClass::Mixin,
            Category::Action(_) => CategoryClass::Action,
        }
    }

    /// Returns the collection location, if the class has one.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        match self {
            Category::Kind(k) => k.location.as_deref(),
            Category::Mixin(m) => m.location.as_deref(),
            Category::Action(_) => None,
        }
    }

    /// Returns the attributes declared directly on this category.
    #[must_use]
    pub fn attributes(&self) -> &Attributes<AttributeDefinition> {
        &self.base().attributes
    }

    /// Lists every outgoing reference as `(relation, identifier)`.
    #[must_use]
    pub fn references(&self) -> Vec<(Relation, &str)> {
        let mut refs = Vec::new();
        match self {
            Category::Kind(k) => {
                if let Some(parent) = &k.parent {
                    refs.push((Relation::Parent, parent.as_str()));
                }
                refs.extend(k.actions.iter().map(|a| (Relation::Action, a.as_str())));
            }
            Category::Mixin(m) => {
                refs.extend(m.depends.iter().map(|d| (Relation::Depends, d.as_str())));
                refs.extend(m.applies.iter().map(|a| (Relation::Applies, a.as_str())));
                refs.extend(m.actions.iter().map(|a| (Relation::Action, a.as_str())));
            }
            Category::Action(_) => {}
        }
        refs
    }
}

/// A typed reference from one category to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    /// Kind → parent kind.
    Parent,
    /// Mixin → required mixin.
    Depends,
    /// Mixin → kind it applies to.
    Applies,
    /// Kind or mixin → action.
    Action,
}

impl Relation {
    /// The class the referenced category must have.
    #[must_use]
    pub fn target_class(self) -> CategoryClass {
        match self {
            Relation::Parent | Relation::Applies => CategoryClass::Kind,
            Relation::Depends => CategoryClass::Mixin,
            Relation::Action => CategoryClass::Action,
        }
    }

    /// Name used in diagnostics.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Relation::Parent => "parent",
            Relation::Depends => "depends",
            Relation::Applies => "applies",
            Relation::Action => "actions",
        }
    }
}

impl From<Kind> for Category {
    fn from(kind: Kind) -> Self {
        Category::Kind(kind)
    }
}

impl From<Mixin> for Category {
    fn from(mixin: Mixin) -> Self {
        Category::Mixin(mixin)
    }
}

impl From<Action> for Category {
    fn from(action: Action) -> Self {
        Category::Action(action)
    }
}
