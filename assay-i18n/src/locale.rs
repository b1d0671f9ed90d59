//! Locale representation
//!
//! Only what message lookup needs: parsing BCP 47-ish tags, rendering them
//! back, and deriving the language-only parent used for fallback.

use crate::{I18nError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A locale (language + optional script and region).
///
/// # Examples
///
/// ```
/// use assay_i18n::Locale;
/// use std::str::FromStr;
///
/// let tr = Locale::from_str("tr_TR").unwrap();
/// assert_eq!(tr.tag(), "tr-TR");
/// assert_eq!(tr.language_only().tag(), "tr");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locale {
    /// Language code (ISO 639-1, e.g., "en", "tr")
    pub language: String,
    /// Optional script (e.g., "Latn", "Hans")
    pub script: Option<String>,
    /// Optional region code (ISO 3166-1, e.g., "US", "TR")
    pub region: Option<String>,
}

impl Locale {
    /// Create a locale from a language and optional region.
    pub fn new(language: impl Into<String>, region: Option<impl Into<String>>) -> Self {
        Self {
            language: language.into().to_lowercase(),
            script: None,
            region: region.map(|r| r.into().to_uppercase()),
        }
    }

    /// Parse a tag such as `en`, `en-US`, `tr_TR` or `zh-Hans-CN`.
    pub fn parse(tag: &str) -> Result<Self> {
        let mut parts = tag.trim().split(['-', '_']);

        let language = parts
            .next()
            .map(str::to_lowercase)
            .filter(|l| (2..=3).contains(&l.len()) && l.chars().all(|c| c.is_ascii_alphabetic()))
            .ok_or_else(|| I18nError::InvalidLocale(tag.to_string()))?;

        let mut script = None;
        let mut region = None;

        for part in parts {
            let alphabetic = part.chars().all(|c| c.is_ascii_alphabetic());
            match part.len() {
                4 if alphabetic => {
                    let mut chars = part.chars();
                    script = chars.next().map(|first| {
                        first
                            .to_uppercase()
                            .chain(chars.flat_map(char::to_lowercase))
                            .collect()
                    });
                }
                2 if alphabetic => region = Some(part.to_uppercase()),
                3 if part.chars().all(|c| c.is_ascii_digit()) => region = Some(part.to_string()),
                _ => return Err(I18nError::InvalidLocale(tag.to_string())),
            }
        }

        Ok(Self {
            language,
            script,
            region,
        })
    }

    /// The canonical tag, e.g. `en-US`.
    pub fn tag(&self) -> String {
        let mut tag = self.language.clone();
        for part in [&self.script, &self.region].into_iter().flatten() {
            tag.push('-');
            tag.push_str(part);
        }
        tag
    }

    /// Same locale without the region.
    pub fn language_only(&self) -> Self {
        Self {
            language: self.language.clone(),
            script: self.script.clone(),
            region: None,
        }
    }

    /// English (no region)
    pub fn en() -> Self {
        Self::new("en", None::<&str>)
    }

    /// English (US)
    pub fn en_us() -> Self {
        Self::new("en", Some("US"))
    }

    /// Turkish (no region)
    pub fn tr() -> Self {
        Self::new("tr", None::<&str>)
    }

    /// Turkish (Turkey)
    pub fn tr_tr() -> Self {
        Self::new("tr", Some("TR"))
    }

    /// French (no region)
    pub fn fr() -> Self {
        Self::new("fr", None::<&str>)
    }

    /// German (no region)
    pub fn de() -> Self {
        Self::new("de", None::<&str>)
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tag())
    }
}

impl FromStr for Locale {
    type Err = I18nError;

    fn from_str(s: &str) -> Result<Self> {
        Locale::parse(s)
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self::en_us()
    }
}
