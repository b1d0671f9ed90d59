//! Message catalogs
//!
//! A [`MessageBundle`] holds the templates of one locale, [`Messages`] groups
//! bundles by locale tag and [`I18n`] adds locale fallback on top.

use crate::{I18nError, Locale, Result};
use assay_log::debug;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Message templates for a single locale.
#[derive(Debug, Clone, Default)]
pub struct MessageBundle {
    messages: HashMap<String, String>,
}

impl MessageBundle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a flat or nested JSON object.
    ///
    /// Nested objects become dotted keys: `{"user": {"name": "..."}}`
    /// yields `user.name`. Non-string leaves are rejected.
    pub fn from_json(json: &str) -> Result<Self> {
        let data: serde_json::Map<String, serde_json::Value> = serde_json::from_str(json)?;
        let mut bundle = Self::new();
        bundle.insert_json("", data)?;
        Ok(bundle)
    }

    fn insert_json(
        &mut self,
        prefix: &str,
        data: serde_json::Map<String, serde_json::Value>,
    ) -> Result<()> {
        for (key, value) in data {
            let full_key = if prefix.is_empty() {
                key
            } else {
                format!("{}.{}", prefix, key)
            };

            match value {
                serde_json::Value::String(s) => {
                    self.messages.insert(full_key, s);
                }
                serde_json::Value::Object(nested) => self.insert_json(&full_key, nested)?,
                other => {
                    return Err(I18nError::ParseError(format!(
                        "message '{}' must be a string, found {}",
                        full_key, other
                    )));
                }
            }
        }
        Ok(())
    }

    /// Add (or replace) a message.
    pub fn add(&mut self, key: impl Into<String>, message: impl Into<String>) {
        self.messages.insert(key.into(), message.into());
    }

    /// Builder-style [`add`](Self::add).
    pub fn with(mut self, key: impl Into<String>, message: impl Into<String>) -> Self {
        self.add(key, message);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.messages.get(key).map(String::as_str)
    }

    pub fn has(&self, key: &str) -> bool {
        self.messages.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.messages.keys()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// Bundles keyed by locale tag.
#[derive(Debug, Default)]
pub struct Messages {
    bundles: HashMap<String, MessageBundle>,
}

impl Messages {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a bundle, merging into an existing one for the same locale.
    pub fn add_bundle(&mut self, locale: &Locale, bundle: MessageBundle) {
        self.bundles
            .entry(locale.tag())
            .or_default()
            .messages
            .extend(bundle.messages);
    }

    /// Exact locale first, then its language-only parent.
    pub fn get_bundle(&self, locale: &Locale) -> Option<&MessageBundle> {
        self.bundles.get(&locale.tag()).or_else(|| {
            locale
                .region
                .as_ref()
                .and_then(|_| self.bundles.get(&locale.language_only().tag()))
        })
    }

    /// Load every `<locale>.json` file in a directory.
    ///
    /// Expected structure:
    /// - `locales/en.json`
    /// - `locales/tr-TR.json`
    pub fn load_from_dir(&mut self, dir: impl AsRef<Path>) -> Result<usize> {
        let dir = dir.as_ref();
        let mut loaded = 0;

        for entry in fs::read_dir(dir)? {
            let path = entry?.path();

            if path.extension().is_none_or(|ext| ext != "json") {
                continue;
            }

            let stem = path
                .file_stem()
                .and_then(|s| s.to_str())
                .ok_or_else(|| I18nError::ParseError(format!("invalid file name: {:?}", path)))?;

            let locale = Locale::parse(stem)?;
            let bundle = MessageBundle::from_json(&fs::read_to_string(&path)?)?;
            debug!(
                target: "assay::i18n",
                "loaded {} messages for {} from {:?}",
                bundle.len(),
                locale,
                path
            );
            self.add_bundle(&locale, bundle);
            loaded += 1;
        }

        Ok(loaded)
    }
}

/// Thread-safe catalog with locale fallback.
///
/// Lookups try the requested locale, its language-only parent, the
/// fallback locale and finally the default locale.
pub struct I18n {
    messages: Arc<RwLock<Messages>>,
    default_locale: Locale,
    fallback_locale: Option<Locale>,
}

impl I18n {
    pub fn new() -> Self {
        Self {
            messages: Arc::new(RwLock::new(Messages::new())),
            default_locale: Locale::en_us(),
            fallback_locale: Some(Locale::en()),
        }
    }

    pub fn with_default_locale(mut self, locale: Locale) -> Self {
        self.default_locale = locale;
        self
    }

    pub fn with_fallback(mut self, locale: Locale) -> Self {
        self.fallback_locale = Some(locale);
        self
    }

    pub fn without_fallback(mut self) -> Self {
        self.fallback_locale = None;
        self
    }

    /// Builder-style bundle registration.
    pub fn with_bundle(self, locale: &Locale, bundle: MessageBundle) -> Self {
        self.add_bundle(locale, bundle);
        self
    }

    /// Load `<locale>.json` files from a directory.
    pub fn load_from_dir(self, dir: impl AsRef<Path>) -> Result<Self> {
        self.messages.write().load_from_dir(dir)?;
        Ok(self)
    }

    pub fn add_bundle(&self, locale: &Locale, bundle: MessageBundle) {
        self.messages.write().add_bundle(locale, bundle);
    }

    pub fn default_locale(&self) -> &Locale {
        &self.default_locale
    }

    /// Resolve a message, or `None` if no locale in the chain has it.
    ///
    /// `None` for `locale` means "use the default locale".
    pub fn lookup(&self, key: &str, locale: Option<&Locale>) -> Option<String> {
        let messages = self.messages.read();
        let requested = locale.unwrap_or(&self.default_locale);

        [Some(requested), self.fallback_locale.as_ref(), Some(&self.default_locale)]
            .into_iter()
            .flatten()
            .filter_map(|l| messages.get_bundle(l))
            .find_map(|bundle| bundle.get(key))
            .map(str::to_string)
    }

    /// Translate a key; a missing key is returned unchanged.
    pub fn t(&self, key: &str, locale: &Locale) -> String {
        self.lookup(key, Some(locale))
            .unwrap_or_else(|| key.to_string())
    }

    /// Translate and replace `{name}` placeholders.
    pub fn t_args(&self, key: &str, locale: &Locale, args: &[(&str, &str)]) -> String {
        interpolate(&self.t(key, locale), args)
    }

    /// Whether the exact locale (or its language) has the key.
    pub fn has(&self, key: &str, locale: &Locale) -> bool {
        self.messages
            .read()
            .get_bundle(locale)
            .is_some_and(|b| b.has(key))
    }
}

impl Default for I18n {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for I18n {
    fn clone(&self) -> Self {
        Self {
            messages: Arc::clone(&self.messages),
            default_locale: self.default_locale.clone(),
            fallback_locale: self.fallback_locale.clone(),
        }
    }
}

impl std::fmt::Debug for I18n {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("I18n")
            .field("default_locale", &self.default_locale)
            .field("fallback_locale", &self.fallback_locale)
            .finish_non_exhaustive()
    }
}

/// Replace `{name}` placeholders with the given values.
pub fn interpolate(template: &str, args: &[(&str, &str)]) -> String {
    args.iter().fold(template.to_string(), |acc, (name, value)| {
        acc.replace(&format!("{{{}}}", name), value)
    })
}
