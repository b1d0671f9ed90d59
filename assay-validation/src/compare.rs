//! Cross-property comparison rules
//!
//! [`CompareTo`] orders the member against one sibling property,
//! [`Between`] checks it against two. Siblings are resolved by exact name and
//! may be private.

use crate::errors::{RuleError, ValidationError, require_non_blank};
use crate::message::MessageResource;
use crate::subject::PropertyQuery;
use crate::traits::{Outcome, Rule, ValidationContext};
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Comparison policy applied to `value` versus the sibling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    Equal,
    NotEqual,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
}

impl Comparison {
    /// Whether `value.cmp(other)` satisfies the policy.
    pub fn accepts(self, ordering: Ordering) -> bool {
        match self {
            Comparison::Equal => ordering == Ordering::Equal,
            Comparison::NotEqual => ordering != Ordering::Equal,
            Comparison::GreaterThan => ordering == Ordering::Greater,
            Comparison::GreaterThanOrEqual => ordering != Ordering::Less,
            Comparison::LessThan => ordering == Ordering::Less,
            Comparison::LessThanOrEqual => ordering != Ordering::Greater,
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self {
            Comparison::Equal => "==",
            Comparison::NotEqual => "!=",
            Comparison::GreaterThan => ">",
            Comparison::GreaterThanOrEqual => ">=",
            Comparison::LessThan => "<",
            Comparison::LessThanOrEqual => "<=",
        };
        f.write_str(op)
    }
}

fn unknown_property(ctx: &ValidationContext<'_>, constraint: &str, name: &str) -> ValidationError {
    ctx.diagnostic(constraint, format!("Unknown property: {}", name))
}

/// Compares the member against a sibling property.
///
/// ```
/// use assay_i18n::MessageBundle;
/// use assay_validation::{CompareTo, Comparison, MessageResource, Record, Rule, ValidationContext, Value};
/// use std::sync::Arc;
///
/// let messages = MessageResource::new(
///     Arc::new(MessageBundle::new().with("End_BeforeStart", "{field} must not precede the start.")),
///     "End_BeforeStart",
/// )
/// .unwrap();
/// let rule = CompareTo::new("Start", Comparison::GreaterThanOrEqual, messages).unwrap();
///
/// let booking = Record::new("Booking").with("Start", 5).with("End", 3);
/// let ctx = ValidationContext::for_member(&booking, "End");
/// let error = rule.check(&Value::from(3), &ctx).unwrap_err();
/// assert_eq!(error.message, "End must not precede the start.");
/// ```
#[derive(Debug, Clone)]
pub struct CompareTo {
    other_property: String,
    comparison: Comparison,
    message: MessageResource,
    constraint: &'static str,
}

impl CompareTo {
    pub fn new(
        other_property: impl Into<String>,
        comparison: Comparison,
        message: MessageResource,
    ) -> Result<Self, RuleError> {
        Ok(Self {
            other_property: require_non_blank("other_property", other_property.into())?,
            comparison,
            message,
            constraint: "compare_to",
        })
    }

    pub fn other_property(&self) -> &str {
        &self.other_property
    }

    pub fn comparison(&self) -> Comparison {
        self.comparison
    }
}

impl Rule for CompareTo {
    fn name(&self) -> &'static str {
        self.constraint
    }

    fn check(&self, value: &Value, ctx: &ValidationContext<'_>) -> Outcome {
        let other = PropertyQuery::exact_any_visibility()
            .read(ctx.subject, &self.other_property)
            .ok_or_else(|| unknown_property(ctx, self.constraint, &self.other_property))?;

        if value.is_null() || other.is_null() {
            let both_null = value.is_null() && other.is_null();
            let satisfied = match self.comparison {
                Comparison::Equal => both_null,
                Comparison::NotEqual => !both_null,
                _ => false,
            };
            return if satisfied {
                Ok(())
            } else {
                Err(self.message.fail(ctx, self.constraint))
            };
        }

        if value.kind() != other.kind() {
            return Err(ctx.diagnostic(
                self.constraint,
                format!(
                    "Type mismatch: {} ({}) vs {} ({})",
                    ctx.member_name,
                    value.kind(),
                    self.other_property,
                    other.kind()
                ),
            ));
        }

        let ordering = match value.compare(&other) {
            Some(ordering) => ordering,
            None => {
                return Err(ctx.diagnostic(
                    self.constraint,
                    format!(
                        "{} and {} must implement comparison.",
                        ctx.member_name, self.other_property
                    ),
                ));
            }
        };

        if self.comparison.accepts(ordering) {
            Ok(())
        } else {
            Err(self.message.fail(ctx, self.constraint))
        }
    }
}

/// `value > other`
pub struct GreaterThan;

impl GreaterThan {
    pub fn new(
        other_property: impl Into<String>,
        message: MessageResource,
    ) -> Result<CompareTo, RuleError> {
        let mut rule = CompareTo::new(other_property, Comparison::GreaterThan, message)?;
        rule.constraint = "greater_than";
        Ok(rule)
    }
}

/// `value < other`
pub struct LessThan;

impl LessThan {
    pub fn new(
        other_property: impl Into<String>,
        message: MessageResource,
    ) -> Result<CompareTo, RuleError> {
        let mut rule = CompareTo::new(other_property, Comparison::LessThan, message)?;
        rule.constraint = "less_than";
        Ok(rule)
    }
}

/// Checks that the member lies between two sibling properties.
///
/// Inclusive unless [`exclusive`](Self::exclusive) is called.
#[derive(Debug, Clone)]
pub struct Between {
    min_property: String,
    max_property: String,
    inclusive: bool,
    message: MessageResource,
}

impl Between {
    pub fn new(
        min_property: impl Into<String>,
        max_property: impl Into<String>,
        message: MessageResource,
    ) -> Result<Self, RuleError> {
        Ok(Self {
            min_property: require_non_blank("min_property", min_property.into())?,
            max_property: require_non_blank("max_property", max_property.into())?,
            inclusive: true,
            message,
        })
    }

    /// Exclude both bounds.
    pub fn exclusive(self) -> Self {
        self.with_inclusive(false)
    }

    pub fn with_inclusive(mut self, inclusive: bool) -> Self {
        self.inclusive = inclusive;
        self
    }

    pub fn is_inclusive(&self) -> bool {
        self.inclusive
    }

    fn type_mismatch(&self, ctx: &ValidationContext<'_>, other: &str) -> ValidationError {
        ctx.diagnostic(
            self.name(),
            format!("Type mismatch: {} vs {}", ctx.member_name, other),
        )
    }
}

impl Rule for Between {
    fn name(&self) -> &'static str {
        "between"
    }

    fn check(&self, value: &Value, ctx: &ValidationContext<'_>) -> Outcome {
        let query = PropertyQuery::exact_any_visibility();
        let min = query
            .read(ctx.subject, &self.min_property)
            .ok_or_else(|| unknown_property(ctx, self.name(), &self.min_property))?;
        let max = query
            .read(ctx.subject, &self.max_property)
            .ok_or_else(|| unknown_property(ctx, self.name(), &self.max_property))?;

        if value.is_null() || min.is_null() || max.is_null() {
            return Err(self.message.fail(ctx, self.name()));
        }

        if value.kind() != min.kind() {
            return Err(self.type_mismatch(ctx, &self.min_property));
        }
        if value.kind() != max.kind() {
            return Err(self.type_mismatch(ctx, &self.max_property));
        }

        let (Some(to_min), Some(to_max)) = (value.compare(&min), value.compare(&max)) else {
            return Err(ctx.diagnostic(
                self.name(),
                format!(
                    "{}, {}, and {} must implement comparison.",
                    ctx.member_name, self.min_property, self.max_property
                ),
            ));
        };

        let within = if self.inclusive {
            to_min != Ordering::Less && to_max != Ordering::Greater
        } else {
            to_min == Ordering::Greater && to_max == Ordering::Less
        };

        if within {
            Ok(())
        } else {
            Err(self.message.fail(ctx, self.name()))
        }
    }
}
