//! Localized failure messages
//!
//! Every rule owns a [`MessageResource`]: a primary key in a
//! [`MessageSource`], an optional fallback key and an optional literal
//! fallback. Resolution walks them in that order and finally emits the
//! primary key in brackets, so a message is always produced.

use crate::errors::{RuleError, ValidationError, require_non_blank};
use crate::traits::ValidationContext;
use assay_i18n::{Locale, MessageSource, interpolate};
use assay_log::debug;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// Decides whether a lookup result is a real message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingResourcePolicy {
    /// Found iff the source returned a non-empty string.
    #[default]
    Explicit,
    /// Also treat strings starting with `[` or mentioning "resource" as
    /// missing. For sources that return placeholders instead of `None`.
    Heuristic,
}

impl MissingResourcePolicy {
    fn accepts(&self, message: &str) -> bool {
        match self {
            MissingResourcePolicy::Explicit => !message.is_empty(),
            MissingResourcePolicy::Heuristic => {
                !message.is_empty()
                    && !message.starts_with('[')
                    && !message.to_lowercase().contains("resource")
            }
        }
    }
}

/// Reference to a localized message with its fallback chain.
#[derive(Clone)]
pub struct MessageResource {
    source: Arc<dyn MessageSource>,
    key: String,
    fallback_key: Option<String>,
    fallback_message: Option<String>,
    policy: MissingResourcePolicy,
}

impl MessageResource {
    /// Reference `key` in `source`. A blank key is rejected.
    pub fn new(source: Arc<dyn MessageSource>, key: impl Into<String>) -> Result<Self, RuleError> {
        Ok(Self {
            source,
            key: require_non_blank("key", key.into())?,
            fallback_key: None,
            fallback_message: None,
            policy: MissingResourcePolicy::default(),
        })
    }

    /// Key consulted when the primary key is missing.
    pub fn with_fallback_key(mut self, key: impl Into<String>) -> Self {
        self.fallback_key = Some(key.into()).filter(|k| !k.is_empty());
        self
    }

    /// Literal text used when neither key resolves.
    pub fn with_fallback_message(mut self, message: impl Into<String>) -> Self {
        self.fallback_message = Some(message.into()).filter(|m| !m.is_empty());
        self
    }

    pub fn with_policy(mut self, policy: MissingResourcePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn fallback_key(&self) -> Option<&str> {
        self.fallback_key.as_deref()
    }

    pub fn fallback_message(&self) -> Option<&str> {
        self.fallback_message.as_deref()
    }

    /// Look up `key`; a panicking source counts as "not found".
    fn lookup_safe(&self, key: &str, locale: Option<&Locale>) -> Option<String> {
        panic::catch_unwind(AssertUnwindSafe(|| self.source.lookup(key, locale)))
            .ok()
            .flatten()
    }

    fn lookup_primary(&self, locale: Option<&Locale>) -> Option<String> {
        self.lookup_safe(&self.key, locale)
            .filter(|m| self.policy.accepts(m))
    }

    /// Resolve the message template without placeholder substitution.
    pub fn resolve(&self, locale: Option<&Locale>) -> String {
        if let Some(message) = self.lookup_primary(locale) {
            return message;
        }

        if let Some(fallback_key) = &self.fallback_key {
            let message = self
                .lookup_safe(fallback_key, locale)
                .filter(|m| !m.is_empty());
            if let Some(message) = message {
                debug!(
                    target: "assay::message",
                    "'{}' missing in {}, using fallback key '{}'",
                    self.key,
                    self.source.name(),
                    fallback_key
                );
                return message;
            }
        }

        if let Some(message) = &self.fallback_message {
            debug!(
                target: "assay::message",
                "'{}' missing in {}, using fallback message",
                self.key,
                self.source.name()
            );
            return message.clone();
        }

        debug!(target: "assay::message", "'{}' missing, no fallback", self.key);
        format!("[{}]", self.key)
    }

    /// Resolve and substitute `{field}` with the display name.
    pub fn format(&self, display_name: &str, locale: Option<&Locale>) -> String {
        interpolate(&self.resolve(locale), &[("field", display_name)])
    }

    /// Build the localized failure for the member in `ctx`.
    pub fn fail(&self, ctx: &ValidationContext<'_>, constraint: &str) -> ValidationError {
        ValidationError::new("", self.format(ctx.display_name(), ctx.locale()))
            .with_members(ctx.member_list())
            .with_constraint(constraint)
    }
}

impl fmt::Debug for MessageResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageResource")
            .field("source", &self.source.name())
            .field("key", &self.key)
            .field("fallback_key", &self.fallback_key)
            .field("fallback_message", &self.fallback_message)
            .field("policy", &self.policy)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assay_i18n::{FnSource, I18n, MessageBundle};

    fn source() -> Arc<dyn MessageSource> {
        Arc::new(
            MessageBundle::new()
                .with("Primary", "Primary message")
                .with("Fallback", "Fallback message")
                .with("Field_Required", "{field} is required.")
                .with("Empty", ""),
        )
    }

    #[test]
    fn test_primary_wins() {
        let resource = MessageResource::new(source(), "Primary")
            .unwrap()
            .with_fallback_key("Fallback")
            .with_fallback_message("literal");
        assert_eq!(resource.resolve(None), "Primary message");
    }

    #[test]
    fn test_fallback_key_when_primary_missing() {
        let resource = MessageResource::new(source(), "Missing")
            .unwrap()
            .with_fallback_key("Fallback")
            .with_fallback_message("literal");
        assert_eq!(resource.resolve(None), "Fallback message");
    }

    #[test]
    fn test_literal_when_both_keys_missing() {
        let resource = MessageResource::new(source(), "Missing")
            .unwrap()
            .with_fallback_key("AlsoMissing")
            .with_fallback_message("literal");
        assert_eq!(resource.resolve(None), "literal");
    }

    #[test]
    fn test_bracketed_key_last() {
        let resource = MessageResource::new(source(), "Missing_Key").unwrap();
        assert_eq!(resource.resolve(None), "[Missing_Key]");
    }

    #[test]
    fn test_empty_message_counts_as_missing() {
        let resource = MessageResource::new(source(), "Empty")
            .unwrap()
            .with_fallback_message("literal");
        assert_eq!(resource.resolve(None), "literal");
    }

    #[test]
    fn test_blank_key_rejected() {
        assert!(matches!(
            MessageResource::new(source(), "  "),
            Err(RuleError::InvalidArgument { name: "key" })
        ));
    }

    #[test]
    fn test_format_substitutes_field() {
        let resource = MessageResource::new(source(), "Field_Required").unwrap();
        assert_eq!(resource.format("City", None), "City is required.");
    }

    #[test]
    fn test_panicking_source_falls_through() {
        let panicking: Arc<dyn MessageSource> =
            Arc::new(FnSource::new(|_, _| panic!("resource assembly not loaded")));
        let resource = MessageResource::new(panicking, "Boom")
            .unwrap()
            .with_fallback_message("still works");
        assert_eq!(resource.resolve(None), "still works");
    }

    #[test]
    fn test_panicking_fallback_key_falls_through() {
        let source: Arc<dyn MessageSource> = Arc::new(FnSource::new(|key, _| {
            if key == "Fallback" {
                panic!("fallback catalog unavailable");
            }
            None
        }));
        let resource = MessageResource::new(source, "Missing")
            .unwrap()
            .with_fallback_key("Fallback")
            .with_fallback_message("literal");
        assert_eq!(resource.resolve(None), "literal");
    }

    #[test]
    fn test_explicit_policy_keeps_resource_word() {
        let source: Arc<dyn MessageSource> =
            Arc::new(MessageBundle::new().with("K", "This resource is locked."));
        let resource = MessageResource::new(source, "K").unwrap();
        assert_eq!(resource.resolve(None), "This resource is locked.");
    }

    #[test]
    fn test_heuristic_policy_rejects_placeholders() {
        let source: Arc<dyn MessageSource> = Arc::new(
            MessageBundle::new()
                .with("Bracket", "[Bracket]")
                .with("Diag", "The Resource key was not found"),
        );

        for key in ["Bracket", "Diag"] {
            let resource = MessageResource::new(source.clone(), key)
                .unwrap()
                .with_policy(MissingResourcePolicy::Heuristic)
                .with_fallback_message("fallback");
            assert_eq!(resource.resolve(None), "fallback");
        }
    }

    #[test]
    fn test_locale_reaches_source() {
        let i18n = I18n::new()
            .with_bundle(&Locale::en(), MessageBundle::new().with("Hi", "Hello"))
            .with_bundle(&Locale::tr(), MessageBundle::new().with("Hi", "Merhaba"));
        let resource = MessageResource::new(Arc::new(i18n), "Hi").unwrap();

        assert_eq!(resource.resolve(Some(&Locale::tr_tr())), "Merhaba");
        assert_eq!(resource.resolve(None), "Hello");
    }
}
