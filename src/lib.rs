// Assay - declarative, localized validation rules for Rust
//
// This library bundles the rule engine, the message catalogs its rules resolve
// their text from, and the logging facade the engine reports through.

// Re-export the rule engine
pub use assay_validation::*;

// Re-export member crates
pub use assay_i18n;
pub use assay_log;
pub use assay_validation;

/// Prelude for common imports.
///
/// ```
/// use assay::prelude::*;
/// use std::sync::Arc;
///
/// let source = Arc::new(MessageBundle::new().with("Name_Required", "{field} is required."));
/// let schema = Schema::builder().field("Name", |f| {
///     f.rule(Required::new(MessageResource::new(source, "Name_Required").unwrap()))
/// });
///
/// let person = Record::new("Person").with("Name", "").with_schema(schema);
/// assert!(!guard::is_valid(&person, GuardOptions::new()));
/// ```
pub mod prelude {
    pub use assay_i18n::{I18n, Locale, MessageBundle, MessageSource};
    pub use assay_validation::prelude::*;
}
