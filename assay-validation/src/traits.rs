// Validation traits

use crate::ValidationError;
use crate::engine::Validator;
use crate::rules::Schema;
use crate::subject::Subject;
use crate::value::Value;
use assay_i18n::Locale;
use assay_log::debug;

/// Result of checking one rule against one value.
pub type Outcome = Result<(), ValidationError>;

/// Trait for validatable types
pub trait Validate: Subject {
    /// Rules declared for this type
    fn schema(&self) -> &Schema;

    /// Validate every property and return errors if any
    fn validate(&self) -> Result<(), Vec<ValidationError>>
    where
        Self: Sized,
    {
        let errors = Validator::new().try_validate(self, self.schema());
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// A single validation rule attached to a member.
pub trait Rule: Send + Sync {
    /// Constraint name reported in failures
    fn name(&self) -> &'static str;

    /// Check the member's value.
    fn check(&self, value: &Value, ctx: &ValidationContext<'_>) -> Outcome;

    /// Required rules run before the others and gate them.
    fn is_required(&self) -> bool {
        false
    }
}

/// What a rule knows about the member it is checking.
#[derive(Clone)]
pub struct ValidationContext<'a> {
    /// The object being validated
    pub subject: &'a dyn Subject,

    /// Name of the member under validation; may be empty
    pub member_name: String,

    display_name: Option<String>,
    locale: Option<Locale>,
}

impl<'a> ValidationContext<'a> {
    pub fn new(subject: &'a dyn Subject) -> Self {
        Self {
            subject,
            member_name: String::new(),
            display_name: None,
            locale: None,
        }
    }

    /// Context for one member of `subject`.
    pub fn for_member(subject: &'a dyn Subject, member_name: impl Into<String>) -> Self {
        Self {
            member_name: member_name.into(),
            ..Self::new(subject)
        }
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    pub fn with_locale(mut self, locale: Option<Locale>) -> Self {
        self.locale = locale;
        self
    }

    /// Display name, or the member name when none was set.
    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.member_name)
    }

    pub fn locale(&self) -> Option<&Locale> {
        self.locale.as_ref()
    }

    /// Members a failure applies to.
    pub fn member_list(&self) -> Vec<String> {
        if self.member_name.is_empty() {
            Vec::new()
        } else {
            vec![self.member_name.clone()]
        }
    }

    /// Build a configuration diagnostic for this member.
    pub fn diagnostic(&self, constraint: &str, message: impl Into<String>) -> ValidationError {
        let message = message.into();
        debug!(
            target: "assay::rule",
            "{} on {}.{}: {}",
            constraint,
            self.subject.type_name(),
            self.member_name,
            message
        );
        ValidationError::diagnostic("", message)
            .with_members(self.member_list())
            .with_constraint(constraint)
    }
}

impl std::fmt::Debug for ValidationContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidationContext")
            .field("subject", &self.subject.type_name())
            .field("member_name", &self.member_name)
            .field("display_name", &self.display_name)
            .field("locale", &self.locale)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Record;
    use crate::errors::FailureKind;

    #[test]
    fn test_display_name_defaults_to_member() {
        let record = Record::new("Address");
        let ctx = ValidationContext::for_member(&record, "City");
        assert_eq!(ctx.display_name(), "City");

        let ctx = ctx.with_display_name("Town");
        assert_eq!(ctx.display_name(), "Town");
        assert_eq!(ctx.member_list(), vec!["City".to_string()]);
    }

    #[test]
    fn test_empty_member_has_no_members() {
        let record = Record::new("Address");
        assert!(ValidationContext::new(&record).member_list().is_empty());
    }

    #[test]
    fn test_diagnostic() {
        let record = Record::new("Order");
        let ctx = ValidationContext::for_member(&record, "Total");
        let error = ctx.diagnostic("compare_to", "Unknown property: Limit");

        assert_eq!(error.kind, FailureKind::Diagnostic);
        assert_eq!(error.constraint, "compare_to");
        assert_eq!(error.members, vec!["Total".to_string()]);
    }
}
