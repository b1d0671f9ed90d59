// Conditional requirement

use crate::errors::{RuleError, require_non_blank};
use crate::message::MessageResource;
use crate::subject::PropertyQuery;
use crate::traits::{Outcome, Rule, ValidationContext};
use crate::value::Value;

/// Requires the member when a sibling property equals an expected value.
///
/// The sibling is matched case-insensitively among public properties.
/// [`inverted`](Self::inverted) requires the member when the sibling does
/// *not* equal the expected value.
#[derive(Debug, Clone)]
pub struct RequiredIf {
    dependent_property: String,
    expected: Value,
    invert: bool,
    message: MessageResource,
}

impl RequiredIf {
    pub fn new(
        dependent_property: impl Into<String>,
        expected: impl Into<Value>,
        message: MessageResource,
    ) -> Result<Self, RuleError> {
        Ok(Self {
            dependent_property: require_non_blank("dependent_property", dependent_property.into())?,
            expected: expected.into(),
            invert: false,
            message,
        })
    }

    pub fn inverted(self) -> Self {
        self.with_invert(true)
    }

    pub fn with_invert(mut self, invert: bool) -> Self {
        self.invert = invert;
        self
    }

    pub fn dependent_property(&self) -> &str {
        &self.dependent_property
    }
}

impl Rule for RequiredIf {
    fn name(&self) -> &'static str {
        "required_if"
    }

    fn check(&self, value: &Value, ctx: &ValidationContext<'_>) -> Outcome {
        let actual = PropertyQuery::public_ignore_case()
            .read(ctx.subject, &self.dependent_property)
            .ok_or_else(|| {
                ctx.diagnostic(
                    self.name(),
                    format!("Unknown property: {}", self.dependent_property),
                )
            })?;

        let condition = (actual == self.expected) != self.invert;

        if condition && value.is_blank() {
            Err(self.message.fail(ctx, self.name()))
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Record, Subject};
    use assay_i18n::{MessageBundle, MessageSource};
    use std::sync::Arc;

    fn message() -> MessageResource {
        let source: Arc<dyn MessageSource> =
            Arc::new(MessageBundle::new().with("Value_Required", "{field} is required."));
        MessageResource::new(source, "Value_Required").unwrap()
    }

    fn check(rule: &RequiredIf, record: &Record) -> Outcome {
        let ctx = ValidationContext::for_member(record, "Value");
        rule.check(&record.get("Value").unwrap_or_default(), &ctx)
    }

    fn subject(dependent: &str, value: impl Into<Value>) -> Record {
        Record::new("Form").with("Dependent", dependent).with("Value", value)
    }

    #[test]
    fn test_required_when_condition_holds() {
        let rule = RequiredIf::new("Dependent", "trigger", message()).unwrap();

        let error = check(&rule, &subject("trigger", Value::Null)).unwrap_err();
        assert_eq!(error.message, "Value is required.");
        assert!(check(&rule, &subject("other", Value::Null)).is_ok());
        assert!(check(&rule, &subject("trigger", "filled")).is_ok());
    }

    #[test]
    fn test_blank_text_counts_as_missing() {
        let rule = RequiredIf::new("Dependent", "trigger", message()).unwrap();
        assert!(check(&rule, &subject("trigger", "")).is_err());
        assert!(check(&rule, &subject("trigger", "   ")).is_err());
    }

    #[test]
    fn test_inverted() {
        let rule = RequiredIf::new("Dependent", "trigger", message())
            .unwrap()
            .inverted();

        assert!(check(&rule, &subject("trigger", Value::Null)).is_ok());
        assert!(check(&rule, &subject("other", Value::Null)).is_err());
    }

    #[test]
    fn test_dependent_lookup_ignores_case() {
        let rule = RequiredIf::new("dependent", "trigger", message()).unwrap();
        assert!(check(&rule, &subject("trigger", Value::Null)).is_err());
    }

    #[test]
    fn test_private_dependent_is_unknown() {
        let rule = RequiredIf::new("Dependent", "trigger", message()).unwrap();
        let record = Record::new("Form")
            .with_private("Dependent", "trigger")
            .with("Value", Value::Null);

        let error = check(&rule, &record).unwrap_err();
        assert!(error.is_diagnostic());
        assert_eq!(error.message, "Unknown property: Dependent");
    }

    #[test]
    fn test_non_text_expected_value() {
        let rule = RequiredIf::new("Dependent", true, message()).unwrap();
        let record = Record::new("Form").with("Dependent", true).with("Value", Value::Null);
        assert!(check(&rule, &record).is_err());

        let record = Record::new("Form").with("Dependent", false).with("Value", Value::Null);
        assert!(check(&rule, &record).is_ok());
    }

    #[test]
    fn test_null_expected_value() {
        let rule = RequiredIf::new("Dependent", Value::Null, message()).unwrap();
        let record = Record::new("Form").with("Dependent", Value::Null).with("Value", "");
        assert!(check(&rule, &record).is_err());
    }
}
