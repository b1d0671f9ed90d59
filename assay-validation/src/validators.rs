// Built-in validators
//
// Null passes every rule here except `Required`; pair them with `Required`
// to demand a value.

use crate::errors::{RuleError, ValidationError, require_non_blank};
use crate::message::MessageResource;
use crate::subject::PropertyQuery;
use crate::traits::{Outcome, Rule, ValidationContext};
use crate::value::{Shape, Value};
use once_cell::sync::Lazy;
use regex::Regex;

// Common regex patterns
static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$").unwrap()
});

static URL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(https?|ftp)://[^\s/$.?#].[^\s]*$").unwrap());

static PHONE_EXTENSION_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\s*(?:extension|ext\.?|x)\s*\d+$").unwrap());

static PHONE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[0-9\s().\-]*[0-9][0-9\s().\-]*$").unwrap());

macro_rules! text_rule {
    ($(#[$doc:meta])* $name:ident, $constraint:literal, |$text:ident| $body:expr) => {
        $(#[$doc])*
        #[derive(Debug, Clone)]
        pub struct $name {
            message: MessageResource,
        }

        impl $name {
            pub fn new(message: MessageResource) -> Self {
                Self { message }
            }
        }

        impl Rule for $name {
            fn name(&self) -> &'static str {
                $constraint
            }

            fn check(&self, value: &Value, ctx: &ValidationContext<'_>) -> Outcome {
                let valid = match value {
                    Value::Null => true,
                    Value::Text($text) => $body,
                    _ => false,
                };

                if valid {
                    Ok(())
                } else {
                    Err(self.message.fail(ctx, self.name()))
                }
            }
        }
    };
}

/// Value must be present; text must not be blank.
#[derive(Debug, Clone)]
pub struct Required {
    allow_empty_strings: bool,
    message: MessageResource,
}

impl Required {
    pub fn new(message: MessageResource) -> Self {
        Self {
            allow_empty_strings: false,
            message,
        }
    }

    /// Accept empty and whitespace-only text.
    pub fn allow_empty_strings(mut self, allow: bool) -> Self {
        self.allow_empty_strings = allow;
        self
    }
}

impl Rule for Required {
    fn name(&self) -> &'static str {
        "required"
    }

    fn check(&self, value: &Value, ctx: &ValidationContext<'_>) -> Outcome {
        let missing = match value {
            Value::Null => true,
            Value::Text(_) => !self.allow_empty_strings && value.is_blank(),
            _ => false,
        };

        if missing {
            Err(self.message.fail(ctx, self.name()))
        } else {
            Ok(())
        }
    }

    fn is_required(&self) -> bool {
        true
    }
}

text_rule!(
    /// Email address with a single `@`.
    Email,
    "email",
    |text| EMAIL_REGEX.is_match(text)
);

text_rule!(
    /// Absolute http, https or ftp URL.
    Url,
    "url",
    |text| URL_REGEX.is_match(text)
);

text_rule!(
    /// Digits with common separators and an optional extension.
    Phone,
    "phone",
    |text| {
        let number = PHONE_EXTENSION_REGEX.replace(text.trim(), "");
        PHONE_REGEX.is_match(&number)
    }
);

text_rule!(
    /// Card number passing the Luhn checksum. Dashes and spaces are ignored.
    CreditCard,
    "credit_card",
    |text| luhn(text)
);

fn luhn(number: &str) -> bool {
    let digits: Option<Vec<u32>> = number
        .chars()
        .filter(|c| *c != '-' && *c != ' ')
        .map(|c| c.to_digit(10))
        .collect();

    let Some(digits) = digits.filter(|d| !d.is_empty()) else {
        return false;
    };

    let checksum: u32 = digits
        .iter()
        .rev()
        .enumerate()
        .map(|(i, &d)| match (i % 2 == 1, d * 2) {
            (true, doubled) if doubled > 9 => doubled - 9,
            (true, doubled) => doubled,
            (false, _) => d,
        })
        .sum();

    checksum % 10 == 0
}

/// Length of text (in chars) or of a collection. Enumeration stops at `cap`.
fn length_of(value: &Value, cap: usize) -> Option<usize> {
    match value {
        Value::Text(text) => Some(text.chars().count()),
        _ => match value.shape() {
            Shape::Array(len) | Shape::Counted(len) => Some(len),
            Shape::Enumerable(items) => Some(items.take(cap).count()),
            Shape::NotCollection => None,
        },
    }
}

fn not_measurable(ctx: &ValidationContext<'_>, constraint: &str, value: &Value) -> ValidationError {
    ctx.diagnostic(
        constraint,
        format!(
            "{} ({}) must be text or a collection.",
            ctx.member_name,
            value.kind()
        ),
    )
}

/// Text or collection with at least `length` elements.
#[derive(Debug, Clone)]
pub struct MinLength {
    length: usize,
    message: MessageResource,
}

impl MinLength {
    pub fn new(length: i64, message: MessageResource) -> Result<Self, RuleError> {
        let length = usize::try_from(length).map_err(|_| RuleError::OutOfRange {
            name: "length",
            message: format!("must be non-negative, got {}", length),
        })?;
        Ok(Self { length, message })
    }
}

impl Rule for MinLength {
    fn name(&self) -> &'static str {
        "min_length"
    }

    fn check(&self, value: &Value, ctx: &ValidationContext<'_>) -> Outcome {
        if value.is_null() {
            return Ok(());
        }
        let len = length_of(value, self.length)
            .ok_or_else(|| not_measurable(ctx, self.name(), value))?;

        if len >= self.length {
            Ok(())
        } else {
            Err(self.message.fail(ctx, self.name()))
        }
    }
}

/// Text or collection with at most `length` elements; `-1` means unbounded.
#[derive(Debug, Clone)]
pub struct MaxLength {
    length: Option<usize>,
    message: MessageResource,
}

impl MaxLength {
    pub fn new(length: i64, message: MessageResource) -> Result<Self, RuleError> {
        let length = match length {
            -1 => None,
            n if n > 0 => usize::try_from(n).ok(),
            n => {
                return Err(RuleError::OutOfRange {
                    name: "length",
                    message: format!("must be greater than zero or -1, got {}", n),
                });
            }
        };
        Ok(Self { length, message })
    }

    pub fn unbounded(message: MessageResource) -> Self {
        Self {
            length: None,
            message,
        }
    }
}

impl Rule for MaxLength {
    fn name(&self) -> &'static str {
        "max_length"
    }

    fn check(&self, value: &Value, ctx: &ValidationContext<'_>) -> Outcome {
        if value.is_null() {
            return Ok(());
        }
        let cap = self.length.map_or(0, |max| max.saturating_add(1));
        let len = length_of(value, cap).ok_or_else(|| not_measurable(ctx, self.name(), value))?;

        match self.length {
            Some(max) if len > max => Err(self.message.fail(ctx, self.name())),
            _ => Ok(()),
        }
    }
}

/// Text whose char count lies in `min..=max`.
#[derive(Debug, Clone)]
pub struct StringLength {
    min: usize,
    max: usize,
    message: MessageResource,
}

impl StringLength {
    pub fn new(max: i64, message: MessageResource) -> Result<Self, RuleError> {
        let max = usize::try_from(max).map_err(|_| RuleError::OutOfRange {
            name: "max",
            message: format!("must be non-negative, got {}", max),
        })?;
        Ok(Self {
            min: 0,
            max,
            message,
        })
    }

    pub fn with_min_length(mut self, min: i64) -> Result<Self, RuleError> {
        self.min = usize::try_from(min)
            .ok()
            .filter(|min| *min <= self.max)
            .ok_or_else(|| RuleError::OutOfRange {
                name: "min",
                message: format!("must be between 0 and {}, got {}", self.max, min),
            })?;
        Ok(self)
    }
}

impl Rule for StringLength {
    fn name(&self) -> &'static str {
        "string_length"
    }

    fn check(&self, value: &Value, ctx: &ValidationContext<'_>) -> Outcome {
        let len = match value {
            Value::Null => return Ok(()),
            Value::Text(text) => text.chars().count(),
            _ => {
                return Err(ctx.diagnostic(
                    self.name(),
                    format!("{} ({}) must be text.", ctx.member_name, value.kind()),
                ));
            }
        };

        if (self.min..=self.max).contains(&len) {
            Ok(())
        } else {
            Err(self.message.fail(ctx, self.name()))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Bounds {
    Int(i64, i64),
    Float(f64, f64),
}

/// Numeric value within inclusive bounds. Numeric text is parsed; empty text passes.
#[derive(Debug, Clone)]
pub struct InRange {
    bounds: Bounds,
    message: MessageResource,
}

impl InRange {
    pub fn int(min: i64, max: i64, message: MessageResource) -> Result<Self, RuleError> {
        if min > max {
            return Err(inverted_range(min, max));
        }
        Ok(Self {
            bounds: Bounds::Int(min, max),
            message,
        })
    }

    pub fn float(min: f64, max: f64, message: MessageResource) -> Result<Self, RuleError> {
        if min.is_nan() || max.is_nan() || min > max {
            return Err(inverted_range(min, max));
        }
        Ok(Self {
            bounds: Bounds::Float(min, max),
            message,
        })
    }

    fn contains(&self, value: &Value) -> bool {
        match (self.bounds, value) {
            (Bounds::Int(min, max), Value::Int(v)) => (min..=max).contains(v),
            (Bounds::Int(min, max), Value::Float(v)) => ((min as f64)..=(max as f64)).contains(v),
            (Bounds::Int(min, max), Value::Text(text)) => text
                .trim()
                .parse::<i64>()
                .is_ok_and(|v| (min..=max).contains(&v)),
            (Bounds::Float(min, max), Value::Int(v)) => (min..=max).contains(&(*v as f64)),
            (Bounds::Float(min, max), Value::Float(v)) => (min..=max).contains(v),
            (Bounds::Float(min, max), Value::Text(text)) => text
                .trim()
                .parse::<f64>()
                .is_ok_and(|v| (min..=max).contains(&v)),
            _ => false,
        }
    }
}

fn inverted_range(min: impl std::fmt::Display, max: impl std::fmt::Display) -> RuleError {
    RuleError::OutOfRange {
        name: "min",
        message: format!("minimum {} must not exceed maximum {}", min, max),
    }
}

impl Rule for InRange {
    fn name(&self) -> &'static str {
        "range"
    }

    fn check(&self, value: &Value, ctx: &ValidationContext<'_>) -> Outcome {
        let skip = match value {
            Value::Null => true,
            Value::Text(text) => text.is_empty(),
            _ => false,
        };

        if skip || self.contains(value) {
            Ok(())
        } else {
            Err(self.message.fail(ctx, self.name()))
        }
    }
}

/// The whole value, rendered as text, must match a pattern. Empty text passes.
#[derive(Debug, Clone)]
pub struct RegularExpression {
    pattern: String,
    regex: Regex,
    message: MessageResource,
}

impl RegularExpression {
    pub fn new(pattern: impl Into<String>, message: MessageResource) -> Result<Self, RuleError> {
        let pattern = require_non_blank("pattern", pattern.into())?;
        let regex = Regex::new(&format!("^(?:{})$", pattern))?;
        Ok(Self {
            pattern,
            regex,
            message,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

impl Rule for RegularExpression {
    fn name(&self) -> &'static str {
        "pattern"
    }

    fn check(&self, value: &Value, ctx: &ValidationContext<'_>) -> Outcome {
        let text = match value {
            Value::Null => return Ok(()),
            other => other.to_string(),
        };

        if text.is_empty() || self.regex.is_match(&text) {
            Ok(())
        } else {
            Err(self.message.fail(ctx, self.name()))
        }
    }
}

/// Equal to a public sibling property.
#[derive(Debug, Clone)]
pub struct Compare {
    other_property: String,
    message: MessageResource,
}

impl Compare {
    pub fn new(other_property: impl Into<String>, message: MessageResource) -> Result<Self, RuleError> {
        Ok(Self {
            other_property: require_non_blank("other_property", other_property.into())?,
            message,
        })
    }
}

impl Rule for Compare {
    fn name(&self) -> &'static str {
        "compare"
    }

    fn check(&self, value: &Value, ctx: &ValidationContext<'_>) -> Outcome {
        let other = PropertyQuery::public_exact()
            .read(ctx.subject, &self.other_property)
            .ok_or_else(|| {
                ctx.diagnostic(
                    self.name(),
                    format!("Could not find a property named {}.", self.other_property),
                )
            })?;

        if *value == other {
            Ok(())
        } else {
            Err(self.message.fail(ctx, self.name()))
        }
    }
}
