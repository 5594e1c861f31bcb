//! Action invocation records.

use occi_core::category::CategoryClass;
use occi_core::{ActionInstance, Error, InstanceBuilder};
use tracing::warn;

use super::{coerce, records, Record, TextParser};
use crate::error::{ParserError, Result};
use crate::grammar::Directive;

impl TextParser<'_> {
    /// Parses every action-instance record of `text`, in input order.
    ///
    /// A record holds one action `Category:` line followed by its
    /// parameters as `X-OCCI-Attribute:` lines.
    ///
    /// # Errors
    ///
    /// Returns [`ParserError::Parsing`] for malformed lines or records that
    /// do not name exactly one action, and [`Error::ModelLookup`] for an
    /// unknown action.
    pub fn action_instances(&self, text: &str) -> Result<Vec<ActionInstance>> {
        records(text)
            .iter()
            .map(|record| self.action_instance(record))
            .collect()
    }

    fn action_instance(&self, record: &Record<'_>) -> Result<ActionInstance> {
        let mut actions = Vec::new();
        let mut parameters = Vec::new();
        for &(directive, line) in record {
            match directive {
                Directive::Category => match self.category_reference(line)? {
                    (id, CategoryClass::Action) => actions.push(id),
                    _ => return Err(ParserError::parsing(line, "expected an action category")),
                },
                Directive::Attribute => parameters.push(self.attribute(line)?),
                Directive::Link | Directive::Location => {
                    return Err(ParserError::parsing(
                        line,
                        "unexpected line in an action instance",
                    ))
                }
            }
        }
        let first = record.first().map_or("", |(_, line)| *line);
        let [action] = actions.as_slice() else {
            return Err(ParserError::parsing(
                first,
                format!("expected one action per record, found {}", actions.len()),
            ));
        };

        let definition = self
            .model
            .find_action(action)
            .ok_or_else(|| Error::ModelLookup(action.clone()))?;
        let mut instance = InstanceBuilder::new(self.model).build_action(action)?;
        for (name, value) in parameters {
            let parameter = definition.base.attributes.get(&name);
            if parameter.is_none() {
                warn!(attribute = %name, action = %action, "parameter is not defined for the action");
            }
            instance.attributes.insert(name, coerce(value, parameter));
        }
        Ok(instance)
    }
}

#[cfg(test)]
mod tests {
    use occi_core::catalog::infrastructure::action;
    use occi_core::{AttributeValue, Model};

    use super::*;
    use crate::options::ParserOptions;

    #[test]
    fn parameters_override_defaults() {
        let model = Model::with_infrastructure().unwrap();
        let options = ParserOptions::default();
        let parser = TextParser::new(&model, &options).unwrap();
        let text = "Category: stop;scheme=\"http://schemas.ogf.org/occi/infrastructure/compute/action#\";class=\"action\"\n\
                    X-OCCI-Attribute: method=\"acpioff\"\n\
                    \n\
                    Category: start;scheme=\"http://schemas.ogf.org/occi/infrastructure/compute/action#\";class=\"action\"";
        let instances = parser.action_instances(text).unwrap();
        assert_eq!(instances.len(), 2);
        assert_eq!(instances[0].action, action::COMPUTE_STOP);
        assert_eq!(
            instances[0].attributes.get("method"),
            Some(&AttributeValue::from("acpioff"))
        );
        assert_eq!(instances[1].action, action::COMPUTE_START);
    }

    #[test]
    fn unknown_actions_are_lookup_errors() {
        let model = Model::with_infrastructure().unwrap();
        let options = ParserOptions::default();
        let parser = TextParser::new(&model, &options).unwrap();
        let err = parser
            .action_instances("Category: fly;scheme=\"http://x#\";class=\"action\"")
            .unwrap_err();
        assert!(matches!(err, ParserError::Model(Error::ModelLookup(id)) if id == "http://x#fly"));
    }

    #[test]
    fn kinds_are_not_actions() {
        let model = Model::with_infrastructure().unwrap();
        let options = ParserOptions::default();
        let parser = TextParser::new(&model, &options).unwrap();
        let err = parser
            .action_instances(
                "Category: compute;scheme=\"http://schemas.ogf.org/occi/infrastructure#\";class=\"kind\"",
            )
            .unwrap_err();
        assert!(matches!(err, ParserError::Parsing { .. }));
    }
}
