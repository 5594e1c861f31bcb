//! `occi/core` — the Entity, Resource, and Link kinds.
//!
//! Every other kind descends from one of these three. Entity carries the
//! identity attributes; Link adds the required `source` and `target`.

use crate::attribute::AttributeDefinition;
use crate::category::{Category, Kind};

/// Scheme of the core categories.
pub const SCHEME: &str = "http://schemas.ogf.org/occi/core#";
/// `occi/core#entity`.
pub const ENTITY: &str = "http://schemas.ogf.org/occi/core#entity";
/// `occi/core#resource`.
pub const RESOURCE: &str = "http://schemas.ogf.org/occi/core#resource";
/// `occi/core#link`.
pub const LINK: &str = "http://schemas.ogf.org/occi/core#link";

/// Returns the core kinds in dependency order.
#[must_use]
pub fn categories() -> Vec<Category> {
    vec![
        Kind::new(SCHEME, "entity")
            .title("Entity")
            .attribute(
                "occi.core.id",
                AttributeDefinition::string()
                    .required()
                    .immutable()
                    .describe("Unique identifier of the instance"),
            )
            .attribute(
                "occi.core.title",
                AttributeDefinition::string().describe("Display name of the instance"),
            )
            .into(),
        Kind::new(SCHEME, "resource")
            .title("Resource")
            .parent(ENTITY)
            .location("/resource/")
            .attribute(
                "occi.core.summary",
                AttributeDefinition::string().describe("Textual description of the resource"),
            )
            .into(),
        Kind::new(SCHEME, "link")
            .title("Link")
            .parent(ENTITY)
            .location("/link/")
            .attribute(
                "occi.core.source",
                AttributeDefinition::string()
                    .required()
                    .describe("Location of the source resource"),
            )
            .attribute(
                "occi.core.target",
                AttributeDefinition::string()
                    .required()
                    .describe("Location of the target resource"),
            )
            .attribute("occi.core.source.kind", AttributeDefinition::string())
            .attribute("occi.core.target.kind", AttributeDefinition::string())
            .into(),
    ]
}
