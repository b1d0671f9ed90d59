//! Localized messages for assay validation rules
//!
//! - **Catalogs**: per-locale [`MessageBundle`]s loaded from JSON or built in code
//! - **Fallback**: [`I18n`] walks requested locale, language, fallback, default
//! - **Lookup capability**: [`MessageSource`] is what rules depend on
//!
//! # Quick Start
//!
//! ```rust
//! use assay_i18n::{I18n, Locale, MessageBundle, MessageSource};
//!
//! let i18n = I18n::new()
//!     .with_default_locale(Locale::en())
//!     .with_bundle(&Locale::en(), MessageBundle::new().with("City_Required", "City is required."))
//!     .with_bundle(&Locale::tr(), MessageBundle::new().with("City_Required", "Şehir zorunludur."));
//!
//! assert_eq!(i18n.lookup("City_Required", Some(&Locale::tr_tr())).as_deref(), Some("Şehir zorunludur."));
//! assert_eq!(i18n.lookup("Missing", None), None);
//! ```

mod error;
mod locale;
mod messages;
mod source;

pub use error::I18nError;
pub use locale::Locale;
pub use messages::{I18n, MessageBundle, Messages, interpolate};
pub use source::{FnSource, MessageSource};

/// Result type for i18n operations
pub type Result<T> = std::result::Result<T, I18nError>;

pub mod prelude {
    pub use crate::{FnSource, I18n, I18nError, Locale, MessageBundle, MessageSource, Result};
}
