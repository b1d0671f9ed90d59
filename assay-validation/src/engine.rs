//! Validation engine
//!
//! Walks a [`Schema`] over a [`Subject`], reading each member by name and
//! running its rules. Required rules run first; a failing required rule
//! skips the member's remaining rules.

use crate::errors::ValidationError;
use crate::rules::{FieldRules, Schema};
use crate::subject::Subject;
use crate::traits::{Outcome, Rule, Validate, ValidationContext};
use crate::value::Value;
use assay_i18n::Locale;
use assay_log::trace;

/// Runs schemas against subjects.
#[derive(Debug, Clone)]
pub struct Validator {
    locale: Option<Locale>,
    validate_all_properties: bool,
}

impl Default for Validator {
    fn default() -> Self {
        Self {
            locale: None,
            validate_all_properties: true,
        }
    }
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Locale passed to message lookups
    pub fn with_locale(mut self, locale: Option<Locale>) -> Self {
        self.locale = locale;
        self
    }

    /// When false, only required rules run.
    pub fn validate_all_properties(mut self, all: bool) -> Self {
        self.validate_all_properties = all;
        self
    }

    /// Validate a type that carries its own schema
    pub fn validate<T: Validate>(&self, subject: &T) -> Result<(), Vec<ValidationError>> {
        let errors = self.try_validate(subject, subject.schema());
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Collect every failure of `schema` on `subject`
    pub fn try_validate(&self, subject: &dyn Subject, schema: &Schema) -> Vec<ValidationError> {
        schema
            .fields()
            .iter()
            .flat_map(|field| self.validate_field(subject, field))
            .collect()
    }

    fn validate_field(&self, subject: &dyn Subject, field: &FieldRules) -> Vec<ValidationError> {
        let mut ctx = ValidationContext::for_member(subject, field.member())
            .with_locale(self.locale.clone());
        if let Some(display_name) = field.display_name() {
            ctx = ctx.with_display_name(display_name);
        }

        let Some(value) = subject.get(field.member()) else {
            return vec![ctx.diagnostic("schema", format!("Unknown property: {}", field.member()))];
        };

        let (required, others): (Vec<_>, Vec<_>) =
            field.rules().iter().partition(|rule| rule.is_required());

        let mut errors: Vec<ValidationError> = required
            .into_iter()
            .filter_map(|rule| run(&**rule, &value, &ctx).err())
            .collect();

        if !errors.is_empty() || !self.validate_all_properties {
            return errors;
        }

        errors.extend(
            others
                .into_iter()
                .filter_map(|rule| run(&**rule, &value, &ctx).err()),
        );
        errors
    }
}

fn run(rule: &dyn Rule, value: &Value, ctx: &ValidationContext<'_>) -> Outcome {
    let outcome = rule.check(value, ctx);
    trace!(
        target: "assay::engine",
        "{}.{} {} -> {}",
        ctx.subject.type_name(),
        ctx.member_name,
        rule.name(),
        if outcome.is_ok() { "ok" } else { "failed" }
    );
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MaxLength, MessageResource, Record, Required};
    use assay_i18n::{MessageBundle, MessageSource};
    use std::sync::Arc;

    fn message(key: &str) -> MessageResource {
        let source: Arc<dyn MessageSource> = Arc::new(
            MessageBundle::new()
                .with("Required", "{field} is required.")
                .with("TooLong", "{field} is too long."),
        );
        MessageResource::new(source, key).unwrap()
    }

    fn schema() -> Schema {
        Schema::builder().field("Name", |f| {
            f.display("Full name")
                .rule(MaxLength::new(3, message("TooLong")).unwrap())
                .rule(Required::new(message("Required")))
        })
    }

    #[test]
    fn test_required_failure_skips_other_rules() {
        let record = Record::new("Person").with("Name", "");
        let errors = Validator::new().try_validate(&record, &schema());

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "Full name is required.");
        assert_eq!(errors[0].members, vec!["Name".to_string()]);
    }

    #[test]
    fn test_all_properties() {
        let record = Record::new("Person").with("Name", "Grace Hopper");

        let errors = Validator::new().try_validate(&record, &schema());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "Full name is too long.");

        let errors = Validator::new()
            .validate_all_properties(false)
            .try_validate(&record, &schema());
        assert!(errors.is_empty());
    }

    #[test]
    fn test_unknown_member_is_diagnostic() {
        let record = Record::new("Person");
        let errors = Validator::new().try_validate(&record, &schema());

        assert_eq!(errors.len(), 1);
        assert!(errors[0].is_diagnostic());
        assert_eq!(errors[0].message, "Unknown property: Name");
    }

    #[test]
    fn test_validate_uses_attached_schema() {
        let record = Record::new("Person").with("Name", "Ada").with_schema(schema());
        assert!(Validator::new().validate(&record).is_ok());
        assert!(record.validate().is_ok());

        let record = Record::new("Person").with("Name", Option::<String>::None).with_schema(schema());
        assert_eq!(record.validate().unwrap_err().len(), 1);
    }
}
