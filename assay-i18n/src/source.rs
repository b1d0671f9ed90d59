//! Lookup capability consumed by validation rules
//!
//! Rules never know where their messages live. They hold a
//! `Arc<dyn MessageSource>` and ask it for a key; `None` means "not found".

use crate::{I18n, Locale, MessageBundle};
use std::fmt;
use std::sync::Arc;

/// Resolves a message key for an optional locale.
pub trait MessageSource: Send + Sync {
    /// Look up `key`. `None` for `locale` means "the source's default".
    fn lookup(&self, key: &str, locale: Option<&Locale>) -> Option<String>;

    /// Short name used in log lines.
    fn name(&self) -> &str {
        "message source"
    }
}

impl MessageSource for I18n {
    fn lookup(&self, key: &str, locale: Option<&Locale>) -> Option<String> {
        I18n::lookup(self, key, locale)
    }

    fn name(&self) -> &str {
        "i18n"
    }
}

/// A single bundle answers for every locale.
impl MessageSource for MessageBundle {
    fn lookup(&self, key: &str, _locale: Option<&Locale>) -> Option<String> {
        self.get(key).map(str::to_string)
    }

    fn name(&self) -> &str {
        "bundle"
    }
}

impl<S: MessageSource + ?Sized> MessageSource for Arc<S> {
    fn lookup(&self, key: &str, locale: Option<&Locale>) -> Option<String> {
        (**self).lookup(key, locale)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

type LookupFn = dyn Fn(&str, Option<&Locale>) -> Option<String> + Send + Sync;

/// Adapts a closure into a [`MessageSource`].
///
/// ```
/// use assay_i18n::{FnSource, MessageSource};
///
/// let source = FnSource::new(|key, _locale| (key == "Hello").then(|| "Hi".to_string()));
/// assert_eq!(source.lookup("Hello", None).as_deref(), Some("Hi"));
/// assert_eq!(source.lookup("Bye", None), None);
/// ```
#[derive(Clone)]
pub struct FnSource {
    lookup: Arc<LookupFn>,
}

impl FnSource {
    pub fn new<F>(lookup: F) -> Self
    where
        F: Fn(&str, Option<&Locale>) -> Option<String> + Send + Sync + 'static,
    {
        Self {
            lookup: Arc::new(lookup),
        }
    }
}

impl MessageSource for FnSource {
    fn lookup(&self, key: &str, locale: Option<&Locale>) -> Option<String> {
        (self.lookup)(key, locale)
    }

    fn name(&self) -> &str {
        "fn"
    }
}

impl fmt::Debug for FnSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnSource")
    }
}
