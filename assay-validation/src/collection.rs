//! Collection rules
//!
//! Count bounds, non-emptiness and per-item rules. Values that are not
//! collections pass every rule here except [`RequiredCollection`] with null.

use crate::errors::{RuleError, ValidationError};
use crate::message::MessageResource;
use crate::traits::{Outcome, Rule, ValidationContext};
use crate::value::{Shape, Value};
use assay_log::trace;
use std::fmt;
use std::sync::Arc;

fn bound(name: &'static str, value: i64) -> Result<usize, RuleError> {
    usize::try_from(value).map_err(|_| RuleError::OutOfRange {
        name,
        message: format!("must be non-negative, got {}", value),
    })
}

/// At most `max` elements. Null passes.
#[derive(Debug, Clone)]
pub struct MaxCount {
    max: usize,
    message: MessageResource,
}

impl MaxCount {
    pub fn new(max: i64, message: MessageResource) -> Result<Self, RuleError> {
        Ok(Self {
            max: bound("max", max)?,
            message,
        })
    }

    pub fn max(&self) -> usize {
        self.max
    }
}

impl Rule for MaxCount {
    fn name(&self) -> &'static str {
        "max_count"
    }

    fn check(&self, value: &Value, ctx: &ValidationContext<'_>) -> Outcome {
        let within = match value.shape() {
            Shape::Array(len) | Shape::Counted(len) => len <= self.max,
            // Stop one past the bound so unbounded sequences terminate.
            Shape::Enumerable(items) => items.take(self.max.saturating_add(1)).count() <= self.max,
            Shape::NotCollection => true,
        };

        if within {
            Ok(())
        } else {
            Err(self.message.fail(ctx, self.name()))
        }
    }
}

/// At least `min` elements. Null passes only when `min` is zero.
#[derive(Debug, Clone)]
pub struct MinCount {
    min: usize,
    message: MessageResource,
}

impl MinCount {
    pub fn new(min: i64, message: MessageResource) -> Result<Self, RuleError> {
        Ok(Self {
            min: bound("min", min)?,
            message,
        })
    }

    pub fn min(&self) -> usize {
        self.min
    }
}

impl Rule for MinCount {
    fn name(&self) -> &'static str {
        "min_count"
    }

    fn check(&self, value: &Value, ctx: &ValidationContext<'_>) -> Outcome {
        let within = match value.shape() {
            _ if value.is_null() => self.min == 0,
            Shape::Array(len) | Shape::Counted(len) => len >= self.min,
            Shape::Enumerable(items) => items.take(self.min).count() >= self.min,
            Shape::NotCollection => true,
        };

        if within {
            Ok(())
        } else {
            Err(self.message.fail(ctx, self.name()))
        }
    }
}

/// Non-null and non-empty.
#[derive(Debug, Clone)]
pub struct RequiredCollection {
    message: MessageResource,
}

impl RequiredCollection {
    pub fn new(message: MessageResource) -> Self {
        Self { message }
    }
}

impl Rule for RequiredCollection {
    fn name(&self) -> &'static str {
        "required_collection"
    }

    fn check(&self, value: &Value, ctx: &ValidationContext<'_>) -> Outcome {
        let present = match value.shape() {
            _ if value.is_null() => false,
            Shape::Array(len) | Shape::Counted(len) => len > 0,
            Shape::Enumerable(mut items) => items.next().is_some(),
            Shape::NotCollection => true,
        };

        if present {
            Ok(())
        } else {
            Err(self.message.fail(ctx, self.name()))
        }
    }
}

/// Builds a nested item rule that reports with the parent's message.
pub type ItemRuleFactory =
    Arc<dyn Fn(MessageResource) -> Result<Box<dyn Rule>, RuleError> + Send + Sync>;

/// Wrap a rule constructor as an [`ItemRuleFactory`].
///
/// ```
/// use assay_validation::{item_rule, Email, MaxLength};
///
/// let email = item_rule(|m| Ok(Email::new(m)));
/// let short = item_rule(|m| MaxLength::new(20, m));
/// # let _ = (email, short);
/// ```
pub fn item_rule<F, R>(factory: F) -> ItemRuleFactory
where
    F: Fn(MessageResource) -> Result<R, RuleError> + Send + Sync + 'static,
    R: Rule + 'static,
{
    Arc::new(move |message| Ok(Box::new(factory(message)?) as Box<dyn Rule>))
}

/// Applies nested rules to every element of a collection.
///
/// By default the first failing element fails the member with the parent's
/// message. With [`aggregate_all_errors`](Self::aggregate_all_errors) every
/// failing element is reported as `"<message> (item #N)"`, joined with `"; "`.
///
/// Nested rules run in order and the first one that rejects an element stops
/// the checks for that element, so an element produces at most one entry even
/// when several rules would reject it.
#[derive(Clone)]
pub struct CollectionItemsMatch {
    rules: Vec<ItemRuleFactory>,
    aggregate: bool,
    message: MessageResource,
}

impl CollectionItemsMatch {
    /// Single nested rule.
    pub fn new(rule: ItemRuleFactory, message: MessageResource) -> Result<Self, RuleError> {
        Self::with_rules(vec![rule], message)
    }

    /// Several nested rules, applied in order to each element.
    ///
    /// Each factory is invoked once here so a misconfigured nested rule
    /// fails at construction.
    pub fn with_rules(
        rules: Vec<ItemRuleFactory>,
        message: MessageResource,
    ) -> Result<Self, RuleError> {
        if rules.is_empty() {
            return Err(RuleError::EmptyRuleList);
        }
        for factory in &rules {
            factory(message.clone())?;
        }

        Ok(Self {
            rules,
            aggregate: false,
            message,
        })
    }

    pub fn aggregate_all_errors(mut self, aggregate: bool) -> Self {
        self.aggregate = aggregate;
        self
    }

    pub fn set_aggregate_all_errors(&mut self, aggregate: bool) {
        self.aggregate = aggregate;
    }

    pub fn aggregates(&self) -> bool {
        self.aggregate
    }

    fn members(ctx: &ValidationContext<'_>) -> Vec<String> {
        match ctx.member_list() {
            members if members.is_empty() => vec!["item".to_string()],
            members => members,
        }
    }

    fn instantiate(&self, ctx: &ValidationContext<'_>) -> Result<Vec<Box<dyn Rule>>, ValidationError> {
        self.rules
            .iter()
            .map(|factory| factory(self.message.clone()))
            .collect::<Result<_, _>>()
            .map_err(|e| ctx.diagnostic(self.name(), e.to_string()))
    }
}

impl Rule for CollectionItemsMatch {
    fn name(&self) -> &'static str {
        "items_match"
    }

    fn check(&self, value: &Value, ctx: &ValidationContext<'_>) -> Outcome {
        let Some(items) = value.items() else {
            return Ok(());
        };

        let rules = self.instantiate(ctx)?;
        let message = self.message.format(ctx.display_name(), ctx.locale());
        let mut failures = Vec::new();

        for (index, item) in items.enumerate() {
            let failed = rules.iter().find(|rule| rule.check(&item, ctx).is_err());
            let Some(rule) = failed else {
                continue;
            };
            trace!(
                target: "assay::rule",
                "items_match: {} rejected item #{} of {}",
                rule.name(),
                index + 1,
                ctx.member_name
            );

            if !self.aggregate {
                return Err(ValidationError::new("", message)
                    .with_members(Self::members(ctx))
                    .with_constraint(self.name()));
            }
            failures.push(format!("{} (item #{})", message, index + 1));
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::new("", failures.join("; "))
                .with_members(Self::members(ctx))
                .with_constraint(self.name()))
        }
    }
}

impl fmt::Debug for CollectionItemsMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectionItemsMatch")
            .field("rules", &self.rules.len())
            .field("aggregate", &self.aggregate)
            .field("message", &self.message)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validators::{Email, MaxLength, Required};
    use crate::{Record, Sequence};
    use assay_i18n::{MessageBundle, MessageSource};

    fn message(key: &str) -> MessageResource {
        let source: Arc<dyn MessageSource> = Arc::new(
            MessageBundle::new()
                .with("Items_Count", "{field} has the wrong number of items.")
                .with("Items_Invalid", "Invalid email"),
        );
        MessageResource::new(source, key).unwrap()
    }

    fn check(rule: &dyn Rule, value: impl Into<Value>) -> Outcome {
        let record = Record::new("Cart");
        let ctx = ValidationContext::for_member(&record, "Items");
        rule.check(&value.into(), &ctx)
    }

    fn naturals() -> Value {
        Value::Seq(Sequence::new(|| (0..).map(Value::Int)))
    }

    #[test]
    fn test_max_count() {
        let rule = MaxCount::new(2, message("Items_Count")).unwrap();

        let error = check(&rule, [1, 2, 3]).unwrap_err();
        assert_eq!(error.message, "Items has the wrong number of items.");
        assert!(check(&rule, [1, 2]).is_ok());
        assert!(check(&rule, Value::Null).is_ok());
        assert!(check(&rule, vec!["a", "b", "c"]).is_err());
        assert!(check(&rule, 42).is_ok());
    }

    #[test]
    fn test_max_count_stops_on_unbounded_sequence() {
        let rule = MaxCount::new(3, message("Items_Count")).unwrap();
        assert!(check(&rule, naturals()).is_err());
    }

    #[test]
    fn test_min_count() {
        let rule = MinCount::new(2, message("Items_Count")).unwrap();

        assert!(check(&rule, [1]).is_err());
        assert!(check(&rule, [1, 2]).is_ok());
        assert!(check(&rule, Value::Null).is_err());
        assert!(check(&rule, naturals()).is_ok());
    }

    #[test]
    fn test_min_count_zero() {
        let rule = MinCount::new(0, message("Items_Count")).unwrap();
        assert!(check(&rule, Value::Null).is_ok());
        assert!(check(&rule, Vec::<i32>::new()).is_ok());
    }

    #[test]
    fn test_count_bounds_match_lengths() {
        for len in 0..5usize {
            for bound in 0..5i64 {
                let items = vec![0; len];
                let max = MaxCount::new(bound, message("Items_Count")).unwrap();
                let min = MinCount::new(bound, message("Items_Count")).unwrap();

                assert_eq!(check(&max, items.clone()).is_ok(), len as i64 <= bound);
                assert_eq!(check(&min, items).is_ok(), len as i64 >= bound);
            }
        }
    }

    #[test]
    fn test_text_counts_chars() {
        let max = MaxCount::new(1, message("Items_Count")).unwrap();
        let min = MinCount::new(1, message("Items_Count")).unwrap();
        assert!(check(&max, "abc").is_err());
        assert!(check(&min, "abc").is_ok());
    }

    #[test]
    fn test_negative_bounds_rejected() {
        assert!(matches!(
            MaxCount::new(-1, message("Items_Count")),
            Err(RuleError::OutOfRange { name: "max", .. })
        ));
        assert!(matches!(
            MinCount::new(-5, message("Items_Count")),
            Err(RuleError::OutOfRange { name: "min", .. })
        ));
    }

    #[test]
    fn test_required_collection() {
        let rule = RequiredCollection::new(message("Items_Count"));

        assert!(check(&rule, Value::Null).is_err());
        assert!(check(&rule, Vec::<i32>::new()).is_err());
        assert!(check(&rule, [0; 0]).is_err());
        assert!(check(&rule, vec![1]).is_ok());
        assert!(check(&rule, naturals()).is_ok());
        assert!(check(&rule, Value::Seq(Sequence::new(std::iter::empty))).is_err());
        assert!(check(&rule, true).is_ok());
    }

    fn emails(aggregate: bool) -> CollectionItemsMatch {
        CollectionItemsMatch::new(item_rule(|m| Ok(Email::new(m))), message("Items_Invalid"))
            .unwrap()
            .aggregate_all_errors(aggregate)
    }

    #[test]
    fn test_items_match_first_failure() {
        let error = check(&emails(false), vec!["a@b.com", "bad", "worse"]).unwrap_err();
        assert_eq!(error.message, "Invalid email");
        assert_eq!(error.members, vec!["Items".to_string()]);
    }

    #[test]
    fn test_items_match_aggregates() {
        let error = check(&emails(true), vec!["bad", "a@b.com", "worse"]).unwrap_err();
        assert_eq!(error.message, "Invalid email (item #1); Invalid email (item #3)");
    }

    #[test]
    fn test_items_match_marker_count() {
        let values = vec!["x", "a@b.com", "y", "z", "c@d.org"];
        let error = check(&emails(true), values.clone()).unwrap_err();
        assert_eq!(error.message.matches("(item #").count(), 3);

        let error = check(&emails(false), values).unwrap_err();
        assert_eq!(error.message.matches("(item #").count(), 0);
    }

    #[test]
    fn test_items_match_valid_and_non_enumerable() {
        assert!(check(&emails(true), vec!["a@b.com"]).is_ok());
        assert!(check(&emails(true), 5).is_ok());
        assert!(check(&emails(true), Value::Null).is_ok());
    }

    #[test]
    fn test_items_match_index_counts_elements() {
        let rule = CollectionItemsMatch::with_rules(
            vec![
                item_rule(|m| Ok(Required::new(m))),
                item_rule(|m| MaxLength::new(3, m)),
            ],
            message("Items_Invalid"),
        )
        .unwrap()
        .aggregate_all_errors(true);

        let error = check(&rule, vec!["ok", "", "toolong"]).unwrap_err();
        assert_eq!(error.message, "Invalid email (item #2); Invalid email (item #3)");
    }

    #[test]
    fn test_items_match_one_entry_per_element() {
        let rule = CollectionItemsMatch::with_rules(
            vec![
                item_rule(|m| Ok(Email::new(m))),
                item_rule(|m| MaxLength::new(3, m)),
            ],
            message("Items_Invalid"),
        )
        .unwrap()
        .aggregate_all_errors(true);

        let error = check(&rule, vec!["not-an-email", "a@b.com"]).unwrap_err();
        assert_eq!(error.message, "Invalid email (item #1); Invalid email (item #2)");
    }

    #[test]
    fn test_items_match_default_member() {
        let record = Record::new("Cart");
        let ctx = ValidationContext::new(&record);
        let error = emails(true).check(&Value::from(vec!["bad"]), &ctx).unwrap_err();
        assert_eq!(error.members, vec!["item".to_string()]);
    }

    #[test]
    fn test_items_match_construction_errors() {
        assert!(matches!(
            CollectionItemsMatch::with_rules(Vec::new(), message("Items_Invalid")),
            Err(RuleError::EmptyRuleList)
        ));
        assert!(matches!(
            CollectionItemsMatch::new(item_rule(|m| MaxLength::new(0, m)), message("Items_Invalid")),
            Err(RuleError::OutOfRange { .. })
        ));
    }
}
