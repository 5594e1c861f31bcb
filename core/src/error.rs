//! Error types for the OCCI core model and its renderers.

use thiserror::Error;

/// Errors raised by the model registry, entity validation, and renderers.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// A category identifier referenced by `rel`, `depends`, `applies`,
    /// `actions`, or a kind lookup is not present in the model.
    #[error("category not found in model: {0}")]
    ModelLookup(String),

    /// An entity identifier or location is not present in a collection.
    #[error("entity not found in collection: {0}")]
    CollectionLookup(String),

    /// An entity or action instance could not be instantiated from the model.
    #[error("cannot instantiate {0}")]
    InstanceLookup(String),

    /// Two different categories were registered under the same identifier.
    #[error("category {0} is already registered with a different definition")]
    CategoryCollision(String),

    /// Malformed attribute definition, e.g. an unknown `{...}` property.
    #[error("invalid definition of attribute {attribute}: {reason}")]
    AttributeDefinition {
        /// Attribute name.
        attribute: String,
        /// What was wrong with it.
        reason: String,
    },

    /// An attribute value is missing, of the wrong type, or not assignable.
    #[error("attribute {attribute} is invalid: {reason}")]
    AttributeValidation {
        /// Attribute name.
        attribute: String,
        /// What was wrong with it.
        reason: String,
    },

    /// A category attached to an instance is unknown or not applicable.
    #[error("category validation failed: {0}")]
    CategoryValidation(String),

    /// An instance is structurally invalid (e.g. a link without a target).
    #[error("instance validation failed: {0}")]
    InstanceValidation(String),

    /// A location is neither an absolute path nor an absolute URI.
    #[error("invalid location: {0:?}")]
    LocationValidation(String),

    /// The model contains dangling or cyclic category references.
    #[error("model validation failed with {} violation(s), first: {}", .0.len(), .0.first().map(String::as_str).unwrap_or("none"))]
    ModelValidation(Vec<String>),

    /// No serializer is registered for the object/format pair.
    #[error("cannot render {object} as {format}")]
    Rendering {
        /// Kind of object that was passed to the renderer.
        object: &'static str,
        /// Requested output format.
        format: &'static str,
    },
}

/// Result type for OCCI core operations.
pub type Result<T> = std::result::Result<T, Error>;
