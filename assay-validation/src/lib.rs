//! Declarative validation rules for assay
//!
//! Rules are attached to the members of a [`Subject`] through a [`Schema`]
//! and report failures with localized messages resolved from a
//! [`MessageSource`](assay_i18n::MessageSource).
//!
//! - **Cross-property rules**: [`CompareTo`], [`GreaterThan`], [`LessThan`],
//!   [`Between`], [`RequiredIf`], [`Compare`]
//! - **Collection rules**: [`MinCount`], [`MaxCount`], [`RequiredCollection`],
//!   [`CollectionItemsMatch`]
//! - **Value rules**: [`Required`], [`Email`], [`Url`], [`Phone`],
//!   [`CreditCard`], [`MinLength`], [`MaxLength`], [`StringLength`],
//!   [`InRange`], [`RegularExpression`]
//! - **Guards**: [`guard::is_valid`] and [`guard::ensure_valid`] families
//!
//! Misconfigured rules (unknown sibling property, incompatible types) fail
//! with a [`FailureKind::Diagnostic`] carrying plain developer text; invalid
//! data fails with [`FailureKind::Invalid`] and the localized message.
//!
//! # Examples
//!
//! ## Cross-property range
//!
//! ```
//! use assay_i18n::{I18n, Locale, MessageBundle};
//! use assay_validation::{Between, MessageResource, Record, Schema, Validator};
//! use std::sync::Arc;
//!
//! let i18n = Arc::new(
//!     I18n::new()
//!         .with_bundle(&Locale::en(), MessageBundle::new().with("Value_OutOfRange", "{field} is out of range."))
//!         .with_bundle(&Locale::tr(), MessageBundle::new().with("Value_OutOfRange", "{field} aralık dışında.")),
//! );
//!
//! let schema = Schema::builder().field("Value", |f| {
//!     f.rule(Between::new("Min", "Max", MessageResource::new(i18n.clone(), "Value_OutOfRange").unwrap()).unwrap())
//! });
//!
//! let order = Record::new("Order").with("Min", 10).with("Max", 20).with("Value", 9);
//!
//! let errors = Validator::new().try_validate(&order, &schema);
//! assert_eq!(errors[0].message, "Value is out of range.");
//!
//! let errors = Validator::new()
//!     .with_locale(Some(Locale::tr_tr()))
//!     .try_validate(&order, &schema);
//! assert_eq!(errors[0].message, "Value aralık dışında.");
//! ```
//!
//! ## Message fallback
//!
//! ```
//! use assay_i18n::MessageBundle;
//! use assay_validation::MessageResource;
//! use std::sync::Arc;
//!
//! let source = Arc::new(MessageBundle::new().with("Generic_Invalid", "Invalid value."));
//!
//! let message = MessageResource::new(source.clone(), "Specific_Invalid")
//!     .unwrap()
//!     .with_fallback_key("Generic_Invalid");
//! assert_eq!(message.resolve(None), "Invalid value.");
//!
//! let message = MessageResource::new(source, "Missing_Key").unwrap();
//! assert_eq!(message.resolve(None), "[Missing_Key]");
//! ```
//!
//! ## Collections
//!
//! ```
//! use assay_i18n::MessageBundle;
//! use assay_validation::{item_rule, CollectionItemsMatch, Email, MessageResource, Rule, Record, ValidationContext, Value};
//! use std::sync::Arc;
//!
//! let message = MessageResource::new(
//!     Arc::new(MessageBundle::new().with("Email_Invalid", "Invalid email")),
//!     "Email_Invalid",
//! )
//! .unwrap();
//! let rule = CollectionItemsMatch::new(item_rule(|m| Ok(Email::new(m))), message)
//!     .unwrap()
//!     .aggregate_all_errors(true);
//!
//! let team = Record::new("Team");
//! let ctx = ValidationContext::for_member(&team, "Emails");
//! let error = rule
//!     .check(&Value::from(vec!["a@b.com", "nope", "x"]), &ctx)
//!     .unwrap_err();
//! assert_eq!(error.message, "Invalid email (item #2); Invalid email (item #3)");
//! ```

mod collection;
mod compare;
mod conditional;
mod config;
mod engine;
mod errors;
pub mod guard;
mod message;
mod rules;
mod subject;
mod traits;
mod validators;
mod value;

pub use collection::*;
pub use compare::*;
pub use conditional::*;
pub use config::*;
pub use engine::*;
pub use errors::*;
pub use message::*;
pub use rules::*;
pub use subject::*;
pub use traits::*;
pub use validators::*;
pub use value::*;

pub use guard::{GuardOptions, GuardOutcome};

/// Commonly used items
pub mod prelude {
    pub use crate::guard::{self, GuardOptions, GuardOutcome};
    pub use crate::{
        Between, CollectionItemsMatch, CompareTo, Comparison, ErrorEntry, GreaterThan, LessThan,
        MaxCount, MessageResource, MinCount, Record, Required, RequiredCollection, RequiredIf, Rule,
        RuleError, Schema, Subject, Validate, ValidationContext, ValidationError, ValidationFailed,
        Validator, Value, impl_subject, item_rule,
    };
}
