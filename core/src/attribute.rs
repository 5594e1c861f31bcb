//! Attribute definitions, attribute values, and the ordered attribute map.
//!
//! Categories carry `Attributes<AttributeDefinition>`; entities and action
//! instances carry `Attributes<AttributeValue>`. Attribute names are dotted
//! strings (`occi.core.id`) compared by plain string equality.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Value type declared by an attribute definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeType {
    /// A UTF-8 string.
    #[default]
    String,
    /// An integer or floating point number.
    Number,
    /// `true` or `false`.
    Boolean,
    /// An arbitrary JSON object or array.
    Object,
}

impl AttributeType {
    /// Returns the lowercase name used in the JSON rendering.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            AttributeType::String => "string",
            AttributeType::Number => "number",
            AttributeType::Boolean => "boolean",
            AttributeType::Object => "object",
        }
    }
}

/// A typed attribute value held by an entity or action instance.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    /// A string literal.
    String(String),
    /// A number without a decimal point.
    Integer(i64),
    /// A number with a decimal point.
    Float(f64),
    /// A boolean literal.
    Boolean(bool),
    /// Structured data, only reachable through the JSON rendering.
    Object(serde_json::Value),
}

impl AttributeValue {
    /// Returns true if this value may be stored in an attribute of type `type_`.
    #[must_use]
    pub fn conforms_to(&self, type_: AttributeType) -> bool {
        matches!(
            (self, type_),
            (AttributeValue::String(_), AttributeType::String)
                | (AttributeValue::Integer(_), AttributeType::Number)
                | (AttributeValue::Float(_), AttributeType::Number)
                | (AttributeValue::Boolean(_), AttributeType::Boolean)
                | (AttributeValue::Object(_), AttributeType::Object)
        )
    }

    /// Returns the string payload, if this is a string value.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer payload, if this is an integer value.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            AttributeValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the numeric payload widened to `f64`.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttributeValue::Integer(i) => Some(*i as f64),
            AttributeValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Returns the boolean payload, if this is a boolean value.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttributeValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Converts a JSON value; integral numbers become [`AttributeValue::Integer`].
    #[must_use]
    pub fn from_json(value: &serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::String(s) => AttributeValue::String(s.clone()),
            Value::Bool(b) => AttributeValue::Boolean(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => AttributeValue::Integer(i),
                None => AttributeValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            other => AttributeValue::Object(other.clone()),
        }
    }

    /// Converts into a JSON value.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value;
        match self {
            AttributeValue::String(s) => Value::String(s.clone()),
            AttributeValue::Integer(i) => Value::from(*i),
            AttributeValue::Float(f) => Value::from(*f),
            AttributeValue::Boolean(b) => Value::Bool(*b),
            AttributeValue::Object(v) => v.clone(),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::String(value.to_owned())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::String(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        AttributeValue::Integer(value)
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        AttributeValue::Float(value)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        AttributeValue::Boolean(value)
    }
}

/// Formats the value as it appears on the right-hand side of an
/// `X-OCCI-Attribute:` line. Floats always carry a decimal point so that they
/// parse back as floats.
impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::String(s) => write!(f, "{}", quote(s)),
            AttributeValue::Integer(i) => write!(f, "{i}"),
            AttributeValue::Float(x) => {
                let mut s = x.to_string();
                if x.is_finite() && !s.contains('.') {
                    s.push_str(".0");
                }
                f.write_str(&s)
            }
            AttributeValue::Boolean(b) => write!(f, "{b}"),
            AttributeValue::Object(v) => write!(f, "{}", quote(&v.to_string())),
        }
    }
}

/// Wraps `s` in double quotes, escaping backslashes, quotes and line breaks
/// so the result stays on one line.
#[must_use]
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Definition of one attribute on a category.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AttributeDefinition {
    /// Declared value type.
    pub type_: AttributeType,
    /// Whether an instance must carry a value before it validates.
    pub required: bool,
    /// Whether a value may be reassigned once set.
    pub mutable: bool,
    /// Value assigned to freshly built instances.
    pub default: Option<AttributeValue>,
    /// Regular expression string values must match in full.
    pub pattern: Option<String>,
    /// Human-readable description.
    pub description: Option<String>,
}

impl AttributeDefinition {
    /// Creates a mutable, optional definition of the given type.
    #[must_use]
    pub fn new(type_: AttributeType) -> Self {
        Self {
            type_,
            mutable: true,
            ..Self::default()
        }
    }

    /// Shorthand for a string definition.
    #[must_use]
    pub fn string() -> Self {
        Self::new(AttributeType::String)
    }

    /// Shorthand for a number definition.
    #[must_use]
    pub fn number() -> Self {
        Self::new(AttributeType::Number)
    }

    /// Shorthand for a boolean definition.
    #[must_use]
    pub fn boolean() -> Self {
        Self::new(AttributeType::Boolean)
    }

    /// Shorthand for an object definition.
    #[must_use]
    pub fn object() -> Self {
        Self::new(AttributeType::Object)
    }

    /// Marks the attribute as required.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Marks the attribute as immutable.
    #[must_use]
    pub fn immutable(mut self) -> Self {
        self.mutable = false;
        self
    }

    /// Sets the default value.
    #[must_use]
    pub fn with_default(mut self, value: impl Into<AttributeValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Sets the value pattern.
    #[must_use]
    pub fn with_pattern(mut self, pattern: &str) -> Self {
        self.pattern = Some(pattern.to_owned());
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn describe(mut self, description: &str) -> Self {
        self.description = Some(description.to_owned());
        self
    }

    /// Renders the `{...}` suffix used in the text rendering, or an empty
    /// string when the attribute is mutable and optional.
    #[must_use]
    pub fn flags(&self) -> String {
        match (!self.mutable, self.required) {
            (true, true) => "{immutable required}".to_owned(),
            (true, false) => "{immutable}".to_owned(),
            (false, true) => "{required}".to_owned(),
            (false, false) => String::new(),
        }
    }
}

/// Insertion-ordered mapping from attribute name to `T`.
#[derive(Debug, Clone, PartialEq)]
pub struct Attributes<T> {
    entries: Vec<(String, T)>,
}

impl<T> Default for Attributes<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T> Attributes<T> {
    /// Creates an empty mapping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up an attribute by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&T> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Returns true if `name` is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Inserts or replaces `name`, keeping the original position on replace.
    /// Returns the previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: T) -> Option<T> {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((name, value));
                None
            }
        }
    }

    /// Removes `name`, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<T> {
        let pos = self.entries.iter().position(|(n, _)| n == name)?;
        Some(self.entries.remove(pos).1)
    }

    /// Iterates over `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Iterates over names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T: Clone> Attributes<T> {
    /// Unions `other` into `self`; entries of `other` replace same-named ones.
    pub fn merge(&mut self, other: &Attributes<T>) {
        for (name, value) in &other.entries {
            self.insert(name.clone(), value.clone());
        }
    }
}

impl<T> FromIterator<(String, T)> for Attributes<T> {
    fn from_iter<I: IntoIterator<Item = (String, T)>>(iter: I) -> Self {
        let mut attributes = Attributes::new();
        for (name, value) in iter {
            attributes.insert(name, value);
        }
        attributes
    }
}

impl<T> IntoIterator for Attributes<T> {
    type Item = (String, T);
    type IntoIter = std::vec::IntoIter<(String, T)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
