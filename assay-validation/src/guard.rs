//! Guards
//!
//! Two families: `is_valid*` report a bool, `ensure_valid*` return an error.
//! Both accept [`GuardOptions`]; the optional callback runs exactly once per
//! call, after validation and before any error is returned. A panicking
//! callback is caught and logged, never propagated.
//!
//! ```
//! use assay_i18n::MessageBundle;
//! use assay_validation::guard::{self, GuardOptions, GuardOutcome};
//! use assay_validation::{MessageResource, Record, Required, Schema};
//! use std::cell::Cell;
//! use std::sync::Arc;
//!
//! let required = MessageResource::new(
//!     Arc::new(MessageBundle::new().with("Name_Required", "{field} is required.")),
//!     "Name_Required",
//! )
//! .unwrap();
//! let person = Record::new("Person")
//!     .with("Name", "")
//!     .with_schema(Schema::builder().field("Name", |f| f.rule(Required::new(required))));
//!
//! let seen = Cell::new(None);
//! let record_outcome = |outcome: GuardOutcome| seen.set(Some(outcome));
//!
//! let error = guard::ensure_valid(&person, GuardOptions::new().with_callback(&record_outcome)).unwrap_err();
//! assert_eq!(error.errors()[0].message, "Name is required.");
//! assert_eq!(seen.get(), Some(GuardOutcome::Failure));
//! ```

use crate::engine::Validator;
use crate::errors::{ValidationError, ValidationFailed};
use crate::traits::Validate;
use assay_i18n::Locale;
use assay_log::warn;
use std::panic::{self, AssertUnwindSafe};

/// Result reported to guard callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardOutcome {
    Success,
    Failure,
}

/// Options shared by every guard.
#[derive(Clone, Copy)]
pub struct GuardOptions<'a> {
    /// Run every rule, not only required ones
    pub validate_all_properties: bool,
    pub callback: Option<&'a dyn Fn(GuardOutcome)>,
    pub locale: Option<&'a Locale>,
}

impl Default for GuardOptions<'_> {
    fn default() -> Self {
        Self {
            validate_all_properties: true,
            callback: None,
            locale: None,
        }
    }
}

impl<'a> GuardOptions<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only run required rules
    pub fn only_required(mut self) -> Self {
        self.validate_all_properties = false;
        self
    }

    pub fn with_callback(mut self, callback: &'a dyn Fn(GuardOutcome)) -> Self {
        self.callback = Some(callback);
        self
    }

    pub fn with_locale(mut self, locale: &'a Locale) -> Self {
        self.locale = Some(locale);
        self
    }

    fn validate<T: Validate>(&self, subject: &T) -> Vec<ValidationError> {
        Validator::new()
            .validate_all_properties(self.validate_all_properties)
            .with_locale(self.locale.cloned())
            .try_validate(subject, subject.schema())
    }

    fn notify(&self, valid: bool) {
        let Some(callback) = self.callback else {
            return;
        };
        let outcome = if valid {
            GuardOutcome::Success
        } else {
            GuardOutcome::Failure
        };

        if panic::catch_unwind(AssertUnwindSafe(|| callback(outcome))).is_err() {
            warn!(target: "assay::guard", "guard callback panicked on {:?}; ignored", outcome);
        }
    }
}

impl std::fmt::Debug for GuardOptions<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuardOptions")
            .field("validate_all_properties", &self.validate_all_properties)
            .field("callback", &self.callback.is_some())
            .field("locale", &self.locale)
            .finish()
    }
}

fn check<T: Validate>(subject: &T, options: &GuardOptions<'_>) -> Vec<ValidationError> {
    let errors = options.validate(subject);
    options.notify(errors.is_empty());
    errors
}

/// Whether `subject` passes its schema.
pub fn is_valid<T: Validate>(subject: &T, options: GuardOptions<'_>) -> bool {
    check(subject, &options).is_empty()
}

/// Like [`is_valid`], also returning the failures.
pub fn is_valid_with_errors<T: Validate>(
    subject: &T,
    options: GuardOptions<'_>,
) -> (bool, Vec<ValidationError>) {
    let errors = check(subject, &options);
    (errors.is_empty(), errors)
}

/// Fail with a [`ValidationFailed`] carrying every failure.
pub fn ensure_valid<T: Validate>(subject: &T, options: GuardOptions<'_>) -> Result<(), ValidationFailed> {
    ensure_valid_or_else(subject, ValidationFailed::new, options)
}

/// Fail with the given error.
pub fn ensure_valid_or<T: Validate, E>(subject: &T, error: E, options: GuardOptions<'_>) -> Result<(), E> {
    ensure_valid_or_else(subject, |_| error, options)
}

/// Fail with an error built from the failures. `make_error` runs after the
/// callback and only when validation failed.
pub fn ensure_valid_or_else<T, E, F>(subject: &T, make_error: F, options: GuardOptions<'_>) -> Result<(), E>
where
    T: Validate,
    F: FnOnce(&[ValidationError]) -> E,
{
    let errors = check(subject, &options);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(make_error(&errors))
    }
}

/// Fail with `E::default()`.
pub fn ensure_valid_or_default<T: Validate, E: Default>(
    subject: &T,
    options: GuardOptions<'_>,
) -> Result<(), E> {
    ensure_valid_or_else(subject, |_| E::default(), options)
}
