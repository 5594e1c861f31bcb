//! Action instances: an invocation of an Action with parameter values.

use crate::attribute::{AttributeValue, Attributes};
use crate::error::{Error, Result};
use crate::model::Model;

/// A request to perform an action.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionInstance {
    /// Identifier of the action.
    pub action: String,
    /// Parameter values.
    pub attributes: Attributes<AttributeValue>,
}

impl ActionInstance {
    /// Creates an instance of `action` with no parameters.
    #[must_use]
    pub fn new(action: &str) -> Self {
        Self {
            action: action.to_owned(),
            attributes: Attributes::new(),
        }
    }

    /// Validates the instance against the action's parameter definitions.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CategoryValidation`] if the action is unknown and
    /// [`Error::AttributeValidation`] for undefined, mistyped, or missing
    /// required parameters.
    pub fn valid(&self, model: &Model) -> Result<()> {
        let action = model.find_action(&self.action).ok_or_else(|| {
            Error::CategoryValidation(format!("action {} is not defined in the model", self.action))
        })?;
        let definitions = &action.base.attributes;
        for (name, value) in self.attributes.iter() {
            let definition = definitions.get(name).ok_or_else(|| Error::AttributeValidation {
                attribute: name.to_owned(),
                reason: format!("not a parameter of {}", self.action),
            })?;
            if !value.conforms_to(definition.type_) {
                return Err(Error::AttributeValidation {
                    attribute: name.to_owned(),
                    reason: format!("expected a {} value", definition.type_.as_str()),
                });
            }
        }
        if let Some((name, _)) = definitions
            .iter()
            .find(|(name, d)| d.required && !self.attributes.contains(name))
        {
            return Err(Error::AttributeValidation {
                attribute: name.to_owned(),
                reason: "required parameter has no value".to_owned(),
            });
        }
        Ok(())
    }
}
