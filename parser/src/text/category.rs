//! Category definitions: extraction, then reference resolution.

use std::collections::HashMap;

use occi_core::attribute::{AttributeDefinition, Attributes};
use occi_core::category::{Action, Category, CategoryClass, Kind, Mixin};
use occi_core::{Error, ModelView};
use tracing::debug;

use super::TextParser;
use crate::error::{ParserError, Result};
use crate::grammar::{identifiers, unquote, Directive};

/// Fields of one `Category:` line that need resolving.
#[derive(Debug, Clone, PartialEq)]
struct Pending {
    line: String,
    rel: Vec<String>,
    depends: Vec<String>,
    applies: Vec<String>,
    actions: Vec<String>,
    attributes: Vec<(String, Option<String>)>,
}

/// References resolved for one category.
#[derive(Debug, Default)]
struct Resolved {
    parent: Option<String>,
    depends: Vec<String>,
    applies: Vec<String>,
    actions: Vec<String>,
}

impl TextParser<'_> {
    /// Parses every `Category:` line of `text`, in input order.
    ///
    /// Categories may refer to each other in any order within one body, and
    /// to categories already in the parser's model. References are resolved
    /// in the order `depends`, `applies`, `parent`, `actions`; declared
    /// attributes are then bound to inherited or existing definitions. The
    /// model itself is not modified.
    ///
    /// # Errors
    ///
    /// Returns [`ParserError::Parsing`] for a malformed line,
    /// a model lookup error naming the first unresolvable identifier,
    /// [`Error::AttributeDefinition`] for an unknown attribute flag, and
    /// [`Error::CategoryCollision`] when one identifier is defined twice
    /// differently.
    pub fn categories(&self, text: &str) -> Result<Vec<Category>> {
        let mut pending: Vec<Pending> = Vec::new();
        let mut batch: Vec<Category> = Vec::new();
        for line in text.lines().map(str::trim) {
            if Directive::of(line) != Some(Directive::Category) {
                continue;
            }
            let (next, bare) = self.extract(line)?;
            let id = bare.identifier();
            match batch.iter().position(|c| c.identifier() == id) {
                Some(i) if batch[i] == bare && same_fields(&pending[i], &next) => continue,
                Some(_) => return Err(Error::CategoryCollision(id).into()),
                None => {
                    pending.push(next);
                    batch.push(bare);
                }
            }
        }

        let resolved = self.resolve(&pending, &batch)?;
        for (category, resolved) in batch.iter_mut().zip(resolved) {
            link_references(category, resolved);
        }
        self.bind_attributes(&pending, &mut batch)?;
        self.model.view(&batch).check_references(&batch)?;
        Ok(batch)
    }

    /// Pass one: grammar match and a bare category holding only its
    /// identity, title and location.
    fn extract(&self, line: &str) -> Result<(Pending, Category)> {
        let g = self.grammar;
        let c = g.matches(&g.category, line, "category")?;
        let class: CategoryClass = c["class"]
            .parse()
            .map_err(|e: String| ParserError::parsing(line, e))?;
        let (scheme, term) = (&c["scheme"], &c["term"]);
        let title = c.name("title").map(|t| unquote(t.as_str()));
        let location = c.name("location").map(|l| l.as_str().to_owned());
        let next = Pending {
            line: line.to_owned(),
            rel: identifiers(c.name("rel")),
            depends: identifiers(c.name("depends")),
            applies: identifiers(c.name("applies")),
            actions: identifiers(c.name("actions")),
            attributes: c
                .name("attributes")
                .map(|list| {
                    g.attribute_definition
                        .captures_iter(list.as_str())
                        .map(|d| {
                            (
                                d["name"].to_owned(),
                                d.name("flags").map(|f| f.as_str().to_owned()),
                            )
                        })
                        .collect()
                })
                .unwrap_or_default(),
        };

        let mut bare = match class {
            CategoryClass::Kind => {
                if !next.depends.is_empty() || !next.applies.is_empty() {
                    return Err(ParserError::parsing(line, "kinds take no depends or applies"));
                }
                let mut kind = Kind::new(scheme, term);
                kind.location = location;
                Category::Kind(kind)
            }
            CategoryClass::Mixin => {
                let mut mixin = Mixin::new(scheme, term);
                mixin.location = location;
                Category::Mixin(mixin)
            }
            CategoryClass::Action => {
                if location.is_some()
                    || !next.rel.is_empty()
                    || !next.depends.is_empty()
                    || !next.applies.is_empty()
                    || !next.actions.is_empty()
                {
                    return Err(ParserError::parsing(
                        line,
                        "actions take no rel, depends, applies, location or actions",
                    ));
                }
                Category::Action(Action::new(scheme, term))
            }
        };
        bare.base_mut().title = title;
        Ok((next, bare))
    }

    /// Pass two: resolves references of every pending category against
    /// the batch and the model, relation by relation.
    fn resolve(&self, pending: &[Pending], batch: &[Category]) -> Result<Vec<Resolved>> {
        let view = self.model.view(batch);
        let mut resolved: Vec<Resolved> = pending.iter().map(|_| Resolved::default()).collect();

        // depends: mixins named in rel, plus explicit depends
        for (i, p) in pending.iter().enumerate() {
            if batch[i].class() != CategoryClass::Mixin {
                continue;
            }
            for id in &p.rel {
                match view.find(id).map(Category::class) {
                    Some(CategoryClass::Mixin) => resolved[i].depends.push(id.clone()),
                    Some(CategoryClass::Kind) => {}
                    _ => return Err(Error::ModelLookup(id.clone()).into()),
                }
            }
            for id in &p.depends {
                view.expect_class(id, CategoryClass::Mixin)?;
                resolved[i].depends.push(id.clone());
            }
        }

        // applies: kinds named in rel, plus explicit applies
        for (i, p) in pending.iter().enumerate() {
            if batch[i].class() != CategoryClass::Mixin {
                continue;
            }
            for id in &p.rel {
                if view.find(id).map(Category::class) == Some(CategoryClass::Kind) {
                    resolved[i].applies.push(id.clone());
                }
            }
            for id in &p.applies {
                view.expect_class(id, CategoryClass::Kind)?;
                resolved[i].applies.push(id.clone());
            }
        }

        // parent
        for (i, p) in pending.iter().enumerate() {
            if batch[i].class() != CategoryClass::Kind {
                continue;
            }
            match p.rel.as_slice() {
                [] => {}
                [parent] => {
                    view.expect_class(parent, CategoryClass::Kind)?;
                    resolved[i].parent = Some(parent.clone());
                }
                _ => return Err(ParserError::parsing(&p.line, "a kind has at most one parent")),
            }
        }

        // actions
        for (i, p) in pending.iter().enumerate() {
            for id in &p.actions {
                view.expect_class(id, CategoryClass::Action)?;
                resolved[i].actions.push(id.clone());
            }
        }
        Ok(resolved)
    }

    /// Binds declared attributes, parents and dependencies before their
    /// dependents so inherited definitions are complete when reused.
    fn bind_attributes(&self, pending: &[Pending], batch: &mut [Category]) -> Result<()> {
        let index: HashMap<String, usize> = batch
            .iter()
            .enumerate()
            .map(|(i, c)| (c.identifier(), i))
            .collect();
        let mut bound = vec![false; batch.len()];
        loop {
            let mut progressed = false;
            for i in 0..batch.len() {
                let ready = !bound[i]
                    && prerequisites(&batch[i])
                        .iter()
                        .all(|p| index.get(*p).map_or(true, |&j| bound[j]));
                if ready {
                    self.bind(pending, batch, i)?;
                    bound[i] = true;
                    progressed = true;
                }
            }
            if !progressed {
                break;
            }
        }
        // Cycles remain unbound; resolve them in input order so the cycle
        // surfaces as a model error.
        for i in 0..batch.len() {
            if !bound[i] {
                self.bind(pending, batch, i)?;
            }
        }
        Ok(())
    }

    fn bind(&self, pending: &[Pending], batch: &mut [Category], i: usize) -> Result<()> {
        let attributes = {
            let view = self.model.view(batch);
            let inherited = inherited(&view, &batch[i])?;
            let id = batch[i].identifier();
            let existing = self.model.find(&id).map(Category::attributes);
            let mut own = Attributes::new();
            for (name, flags) in &pending[i].attributes {
                let mut definition = existing
                    .and_then(|e| e.get(name))
                    .or_else(|| inherited.get(name))
                    .cloned()
                    .unwrap_or_else(AttributeDefinition::string);
                apply_flags(&mut definition, name, flags.as_deref())?;
                own.insert(name.clone(), definition);
            }
            debug!(identifier = %id, attributes = own.len(), "resolved category");
            own
        };
        batch[i].base_mut().attributes = attributes;
        Ok(())
    }
}

fn same_fields(a: &Pending, b: &Pending) -> bool {
    a.rel == b.rel
        && a.depends == b.depends
        && a.applies == b.applies
        && a.actions == b.actions
        && a.attributes == b.attributes
}

fn link_references(category: &mut Category, resolved: Resolved) {
    match category {
        Category::Kind(kind) => {
            kind.parent = resolved.parent;
            kind.actions = resolved.actions;
        }
        Category::Mixin(mixin) => {
            mixin.depends = resolved.depends;
            mixin.applies = resolved.applies;
            mixin.actions = resolved.actions;
        }
        Category::Action(_) => {}
    }
}

fn prerequisites(category: &Category) -> Vec<&str> {
    match category {
        Category::Kind(k) => k.parent.iter().map(String::as_str).collect(),
        Category::Mixin(m) => m.depends.iter().map(String::as_str).collect(),
        Category::Action(_) => Vec::new(),
    }
}

fn inherited(view: &ModelView<'_>, category: &Category) -> Result<Attributes<AttributeDefinition>> {
    match category {
        Category::Kind(Kind {
            parent: Some(parent),
            ..
        }) => Ok(view.kind_attributes(parent)?),
        Category::Mixin(mixin) => {
            let mut attributes = Attributes::new();
            for dependency in &mixin.depends {
                attributes.merge(&view.mixin_attributes(dependency)?);
            }
            Ok(attributes)
        }
        _ => Ok(Attributes::new()),
    }
}

fn apply_flags(definition: &mut AttributeDefinition, name: &str, flags: Option<&str>) -> Result<()> {
    definition.required = false;
    definition.mutable = true;
    for flag in flags.unwrap_or_default().split_whitespace() {
        match flag {
            "required" => definition.required = true,
            "immutable" => definition.mutable = false,
            other => {
                return Err(Error::AttributeDefinition {
                    attribute: name.to_owned(),
                    reason: format!("unknown property {other:?}"),
                }
                .into())
            }
        }
    }
    Ok(())
}
