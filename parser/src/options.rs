//! Parser configuration.
//!
//! Options are plain data handed to each parser call; nothing is global.
//! Every field has a default, so a partial TOML file deserialises:
//!
//! ```
//! let options: occi_parser::ParserOptions = serde_json::from_str(r#"{"strict": true}"#)?;
//! assert!(options.strict);
//! assert_eq!(options.link_kinds.fallback, "http://schemas.ogf.org/occi/core#link");
//! # Ok::<(), serde_json::Error>(())
//! ```

use std::collections::BTreeMap;

use occi_core::catalog::{core, infrastructure};
use occi_core::Model;
use serde::Deserialize;

/// Options shared by the text and JSON parsers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParserOptions {
    /// Only accept terms and attribute names starting with a lowercase
    /// letter. When false, leading digits are also accepted.
    pub strict: bool,
    /// Kind given to inline links that name none.
    pub link_kinds: LinkKindPolicy,
}

impl ParserOptions {
    /// Lenient options with the default link policy.
    #[must_use]
    pub fn lenient() -> Self {
        Self::default()
    }

    /// Strict options with the default link policy.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            strict: true,
            ..Self::default()
        }
    }
}

/// Chooses the kind of an inline `Link:` that carries no kind in its
/// `category` parameter, keyed by the kind of the link's target.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LinkKindPolicy {
    /// Target kind identifier to link kind identifier.
    pub by_target: BTreeMap<String, String>,
    /// Link kind used when no entry matches.
    pub fallback: String,
}

impl Default for LinkKindPolicy {
    fn default() -> Self {
        let by_target = [
            (infrastructure::NETWORK, infrastructure::NETWORK_INTERFACE),
            (infrastructure::STORAGE, infrastructure::STORAGE_LINK),
        ]
        .into_iter()
        .map(|(target, link)| (target.to_owned(), link.to_owned()))
        .collect();
        Self {
            by_target,
            fallback: core::LINK.to_owned(),
        }
    }
}

impl LinkKindPolicy {
    /// Link kind for a link pointing at an instance of `target_kind`.
    ///
    /// The target kind and then its ancestors are looked up in
    /// [`by_target`](Self::by_target); entries naming a kind absent from
    /// `model` are skipped.
    #[must_use]
    pub fn resolve(&self, model: &Model, target_kind: Option<&str>) -> String {
        let Some(target_kind) = target_kind else {
            return self.fallback.clone();
        };
        let mut chain = vec![target_kind.to_owned()];
        if let Ok(ancestors) = model.ancestors(target_kind) {
            chain.extend(ancestors.iter().map(|k| k.identifier()));
        }
        chain
            .iter()
            .filter_map(|kind| self.by_target.get(kind))
            .find(|link| model.find_kind(link).is_some())
            .cloned()
            .unwrap_or_else(|| self.fallback.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use occi_core::catalog::infrastructure_ext;

    #[test]
    fn storage_targets_get_storage_links() {
        let model = Model::with_infrastructure().unwrap();
        let policy = LinkKindPolicy::default();
        assert_eq!(
            policy.resolve(&model, Some(infrastructure::STORAGE)),
            infrastructure::STORAGE_LINK
        );
        assert_eq!(policy.resolve(&model, Some(infrastructure::COMPUTE)), core::LINK);
        assert_eq!(policy.resolve(&model, None), core::LINK);
    }

    #[test]
    fn descendants_inherit_the_mapping() {
        let model = Model::with_extensions().unwrap();
        assert_eq!(
            LinkKindPolicy::default().resolve(&model, Some(infrastructure_ext::IP_RESERVATION)),
            infrastructure::NETWORK_INTERFACE
        );
    }

    #[test]
    fn unknown_link_kinds_fall_back() {
        let model = Model::bootstrap().unwrap();
        assert_eq!(
            LinkKindPolicy::default().resolve(&model, Some(infrastructure::STORAGE)),
            core::LINK
        );
    }
}
