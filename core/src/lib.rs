//! OCCI core model encoded as typed Rust data.
//!
//! The `occi-core` crate provides the Open Cloud Computing Interface
//! category meta-model (kinds, mixins, actions), entities (resources and
//! links), action instances, the [`Model`] registry that resolves category
//! references, and renderers for the text, header and JSON wire formats.
//!
//! # Entry Point
//!
//! ```
//! let model = occi_core::Model::with_infrastructure()?;
//! let compute = model
//!     .find_kind("http://schemas.ogf.org/occi/infrastructure#compute")
//!     .ok_or(occi_core::Error::ModelLookup("compute".into()))?;
//! assert_eq!(compute.location.as_deref(), Some("/compute/"));
//! # Ok::<(), occi_core::Error>(())
//! ```
//!
//! # Rendering
//!
//! ```
//! use occi_core::renderer::{render, Format};
//!
//! let model = occi_core::Model::bootstrap()?;
//! let text = render(&model, Format::Text)?;
//! assert!(text.starts_with("Category: entity;"));
//! # Ok::<(), occi_core::Error>(())
//! ```

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

pub mod action_instance;
pub mod attribute;
pub mod builder;
pub mod catalog;
pub mod category;
pub mod collection;
pub mod entity;
pub mod error;
pub mod media_type;
pub mod model;
pub mod renderer;

pub use action_instance::ActionInstance;
pub use attribute::{AttributeDefinition, AttributeType, AttributeValue, Attributes};
pub use builder::InstanceBuilder;
pub use category::{Action, Category, CategoryClass, Kind, Mixin};
pub use collection::Collection;
pub use entity::{Entity, Link, Resource};
pub use error::{Error, Result};
pub use media_type::MediaType;
pub use model::{Model, ModelView};
pub use renderer::{render, Format, Renderable};

impl Model {
    /// Returns a registry holding the `occi/core` categories.
    ///
    /// # Errors
    ///
    /// Fails only if the built-in catalog is inconsistent.
    pub fn bootstrap() -> Result<Model> {
        let mut model = Model::new();
        model.register_all(catalog::core::categories())?;
        Ok(model)
    }

    /// Returns a registry holding core and infrastructure categories.
    ///
    /// # Errors
    ///
    /// Fails only if the built-in catalogs are inconsistent.
    pub fn with_infrastructure() -> Result<Model> {
        let mut model = Model::bootstrap()?;
        model.register_all(catalog::infrastructure::categories())?;
        Ok(model)
    }

    /// Returns a registry holding core, infrastructure and extension
    /// categories.
    ///
    /// # Errors
    ///
    /// Fails only if the built-in catalogs are inconsistent.
    pub fn with_extensions() -> Result<Model> {
        let mut model = Model::with_infrastructure()?;
        model.register_all(catalog::infrastructure_ext::categories())?;
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phases_accumulate() {
        let core = Model::bootstrap().unwrap();
        let infra = Model::with_infrastructure().unwrap();
        let ext = Model::with_extensions().unwrap();
        assert_eq!(core.len(), 3);
        assert!(infra.len() > core.len());
        assert!(ext.len() > infra.len());
        ext.valid().unwrap();
    }

    #[test]
    fn bootstrapping_twice_is_idempotent() {
        let mut model = Model::with_infrastructure().unwrap();
        model
            .register_all(catalog::infrastructure::categories())
            .unwrap();
        assert_eq!(model, Model::with_infrastructure().unwrap());
    }

    #[test]
    fn frozen_models_are_shared() {
        let model = Model::with_extensions().unwrap().freeze().unwrap();
        let reader = std::sync::Arc::clone(&model);
        let handle = std::thread::spawn(move || reader.kinds().count());
        assert_eq!(handle.join().unwrap(), model.kinds().count());
    }
}
