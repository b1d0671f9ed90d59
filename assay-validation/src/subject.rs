//! Validation subjects and property access by name

use crate::rules::Schema;
use crate::traits::Validate;
use crate::value::Value;
use once_cell::sync::Lazy;
use std::sync::Arc;

/// Visibility of a property on a subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Private,
}

/// Name and visibility of a property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyInfo {
    pub name: String,
    pub visibility: Visibility,
}

impl PropertyInfo {
    pub fn new(name: impl Into<String>, visibility: Visibility) -> Self {
        Self {
            name: name.into(),
            visibility,
        }
    }

    pub fn public(name: impl Into<String>) -> Self {
        Self::new(name, Visibility::Public)
    }

    pub fn private(name: impl Into<String>) -> Self {
        Self::new(name, Visibility::Private)
    }
}

/// An object whose properties can be read by name.
///
/// Implement it by hand, with [`impl_subject!`](crate::impl_subject), or use
/// a [`Record`].
pub trait Subject {
    /// Type name used in diagnostics
    fn type_name(&self) -> &str;

    /// Every declared property, public and private.
    fn properties(&self) -> Vec<PropertyInfo>;

    /// Current value of the property with exactly this name.
    fn get(&self, name: &str) -> Option<Value>;
}

/// Binding policy for looking up a sibling property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyQuery {
    ignore_case: bool,
    include_private: bool,
}

impl PropertyQuery {
    /// Case-sensitive, public and private members.
    pub fn exact_any_visibility() -> Self {
        Self {
            ignore_case: false,
            include_private: true,
        }
    }

    /// Case-insensitive, public members only.
    pub fn public_ignore_case() -> Self {
        Self {
            ignore_case: true,
            include_private: false,
        }
    }

    /// Case-sensitive, public members only.
    pub fn public_exact() -> Self {
        Self {
            ignore_case: false,
            include_private: false,
        }
    }

    fn matches(&self, property: &PropertyInfo, name: &str) -> bool {
        if !self.include_private && property.visibility != Visibility::Public {
            return false;
        }
        if self.ignore_case {
            property.name.to_lowercase() == name.to_lowercase()
        } else {
            property.name == name
        }
    }

    /// Resolve a property. An exact-case match wins over a case-folded one.
    pub fn find(&self, subject: &dyn Subject, name: &str) -> Option<PropertyInfo> {
        let properties = subject.properties();
        let mut candidates = properties.iter().filter(|p| self.matches(p, name));
        let first = candidates.next()?;

        if first.name == name {
            return Some(first.clone());
        }
        Some(
            candidates
                .find(|p| p.name == name)
                .unwrap_or(first)
                .clone(),
        )
    }

    /// Read a property value; `None` when the property cannot be resolved.
    pub fn read(&self, subject: &dyn Subject, name: &str) -> Option<Value> {
        self.find(subject, name)
            .map(|p| subject.get(&p.name).unwrap_or(Value::Null))
    }
}

static EMPTY_SCHEMA: Lazy<Schema> = Lazy::new(Schema::new);

/// A dynamic subject built at runtime.
///
/// ```
/// use assay_validation::{Record, Subject, Value};
///
/// let order = Record::new("Order")
///     .with("Min", 10)
///     .with("Max", 20)
///     .with_private("Secret", "x");
///
/// assert_eq!(order.get("Min"), Some(Value::Int(10)));
/// assert_eq!(order.properties().len(), 3);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Record {
    type_name: String,
    fields: Vec<(PropertyInfo, Value)>,
    schema: Option<Arc<Schema>>,
}

impl Record {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            ..Self::default()
        }
    }

    /// Add or replace a public property.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(PropertyInfo::public(name), value.into());
        self
    }

    /// Add or replace a private property.
    pub fn with_private(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(PropertyInfo::private(name), value.into());
        self
    }

    /// Attach the rules used by [`Validate`].
    pub fn with_schema(mut self, schema: impl Into<Arc<Schema>>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Replace the value of an existing property, keeping its visibility.
    /// Unknown names are added as public properties.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) {
        let value = value.into();
        match self.fields.iter_mut().find(|(p, _)| p.name == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((PropertyInfo::public(name), value)),
        }
    }

    fn insert(&mut self, info: PropertyInfo, value: Value) {
        match self.fields.iter_mut().find(|(p, _)| p.name == info.name) {
            Some(slot) => *slot = (info, value),
            None => self.fields.push((info, value)),
        }
    }
}

impl Subject for Record {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn properties(&self) -> Vec<PropertyInfo> {
        self.fields.iter().map(|(p, _)| p.clone()).collect()
    }

    fn get(&self, name: &str) -> Option<Value> {
        self.fields
            .iter()
            .find(|(p, _)| p.name == name)
            .map(|(_, v)| v.clone())
    }
}

impl Validate for Record {
    fn schema(&self) -> &Schema {
        self.schema.as_deref().unwrap_or(&EMPTY_SCHEMA)
    }
}

/// Implement [`Subject`] for a struct by listing its properties.
///
/// Each field is converted with `Value::from(field.clone())`.
///
/// ```
/// use assay_validation::{impl_subject, PropertyQuery, Subject, Value};
///
/// struct Window {
///     min: i32,
///     max: i32,
///     note: Option<String>,
/// }
///
/// impl_subject!(Window {
///     public min => "Min",
///     public max => "Max",
///     private note => "Note",
/// });
///
/// let window = Window { min: 1, max: 5, note: None };
/// assert_eq!(window.get("Max"), Some(Value::Int(5)));
/// assert!(PropertyQuery::public_exact().find(&window, "Note").is_none());
/// ```
#[macro_export]
macro_rules! impl_subject {
    ($ty:ident { $($vis:ident $field:ident => $name:literal),* $(,)? }) => {
        impl $crate::Subject for $ty {
            fn type_name(&self) -> &str {
                stringify!($ty)
            }

            fn properties(&self) -> Vec<$crate::PropertyInfo> {
                vec![$($crate::PropertyInfo::$vis($name)),*]
            }

            fn get(&self, name: &str) -> Option<$crate::Value> {
                match name {
                    $($name => Some($crate::Value::from(self.$field.clone())),)*
                    _ => None,
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subject() -> Record {
        Record::new("Person")
            .with("Name", "Ada")
            .with("Country", "TR")
            .with_private("Secret", 42)
    }

    #[test]
    fn test_exact_any_visibility_sees_private() {
        let query = PropertyQuery::exact_any_visibility();
        assert_eq!(query.read(&subject(), "Secret"), Some(Value::Int(42)));
        assert_eq!(query.read(&subject(), "name"), None);
    }

    #[test]
    fn test_public_ignore_case() {
        let query = PropertyQuery::public_ignore_case();
        assert_eq!(query.read(&subject(), "country"), Some(Value::from("TR")));
        assert_eq!(query.read(&subject(), "secret"), None);
    }

    #[test]
    fn test_public_exact() {
        let query = PropertyQuery::public_exact();
        assert!(query.find(&subject(), "Name").is_some());
        assert!(query.find(&subject(), "Secret").is_none());
    }

    #[test]
    fn test_ignore_case_prefers_exact_match() {
        let record = Record::new("T").with("value", 1).with("Value", 2);
        let found = PropertyQuery::public_ignore_case().find(&record, "Value").unwrap();
        assert_eq!(found.name, "Value");
    }

    #[test]
    fn test_set_keeps_visibility() {
        let mut record = subject();
        record.set("Secret", 7);
        record.set("New", true);

        let props = record.properties();
        assert_eq!(props[2], PropertyInfo::private("Secret"));
        assert_eq!(record.get("Secret"), Some(Value::Int(7)));
        assert_eq!(record.get("New"), Some(Value::Bool(true)));
    }

    #[test]
    fn test_record_without_schema_has_no_rules() {
        assert!(subject().schema().is_empty());
    }
}
