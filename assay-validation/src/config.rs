// Schema configuration files
//
// A schema can be declared in TOML or JSON instead of code:
//
// ```toml
// [[fields]]
// member = "Tags"
//
// [[fields.rules]]
// rule = "max_count"
// max = 2
// key = "Tags_TooMany"
// ```
//
// Building runs the same argument checks as the rule constructors.

use crate::collection::{
    CollectionItemsMatch, ItemRuleFactory, MaxCount, MinCount, RequiredCollection,
};
use crate::compare::{Between, CompareTo, Comparison, GreaterThan, LessThan};
use crate::conditional::RequiredIf;
use crate::errors::{ConfigError, RuleError};
use crate::message::MessageResource;
use crate::rules::{FieldRules, Schema};
use crate::traits::Rule;
use crate::validators::{
    Compare, CreditCard, Email, InRange, MaxLength, MinLength, Phone, RegularExpression, Required,
    StringLength, Url,
};
use crate::value::Value;
use assay_i18n::MessageSource;
use assay_log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FileFormat {
    Json,
    Toml,
}

impl FileFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "json" => Some(FileFormat::Json),
            "toml" => Some(FileFormat::Toml),
            _ => None,
        }
    }

    /// Detect the format from a path's extension
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .ok_or_else(|| ConfigError::LoadError("No file extension found".to_string()))?;

        Self::from_extension(ext).ok_or_else(|| ConfigError::UnsupportedFormat(ext.to_string()))
    }
}

/// Numeric bound of a `range` rule
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Bound {
    Int(i64),
    Float(f64),
}

impl Bound {
    fn as_f64(self) -> f64 {
        match self {
            Bound::Int(i) => i as f64,
            Bound::Float(f) => f,
        }
    }
}

fn default_true() -> bool {
    true
}

/// A configured rule, tagged by `rule`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum RuleKind {
    Required {
        #[serde(default)]
        allow_empty_strings: bool,
    },
    Email,
    Url,
    Phone,
    CreditCard,
    MinLength {
        length: i64,
    },
    MaxLength {
        length: i64,
    },
    StringLength {
        max: i64,
        #[serde(default)]
        min: Option<i64>,
    },
    Range {
        min: Bound,
        max: Bound,
    },
    Pattern {
        pattern: String,
    },
    Compare {
        other: String,
    },
    CompareTo {
        other: String,
        comparison: Comparison,
    },
    GreaterThan {
        other: String,
    },
    LessThan {
        other: String,
    },
    Between {
        min: String,
        max: String,
        #[serde(default = "default_true")]
        inclusive: bool,
    },
    RequiredIf {
        dependent: String,
        expected: serde_json::Value,
        #[serde(default)]
        invert: bool,
    },
    MinCount {
        min: i64,
    },
    MaxCount {
        max: i64,
    },
    RequiredCollection,
    ItemsMatch {
        items: Vec<RuleKind>,
        #[serde(default)]
        aggregate: bool,
    },
}

impl RuleKind {
    /// Construct the rule with the given message.
    pub fn build(&self, message: MessageResource) -> Result<Box<dyn Rule>, RuleError> {
        let rule: Box<dyn Rule> = match self {
            RuleKind::Required {
                allow_empty_strings,
            } => Box::new(Required::new(message).allow_empty_strings(*allow_empty_strings)),
            RuleKind::Email => Box::new(Email::new(message)),
            RuleKind::Url => Box::new(Url::new(message)),
            RuleKind::Phone => Box::new(Phone::new(message)),
            RuleKind::CreditCard => Box::new(CreditCard::new(message)),
            RuleKind::MinLength { length } => Box::new(MinLength::new(*length, message)?),
            RuleKind::MaxLength { length } => Box::new(MaxLength::new(*length, message)?),
            RuleKind::StringLength { max, min } => {
                let rule = StringLength::new(*max, message)?;
                match min {
                    Some(min) => Box::new(rule.with_min_length(*min)?),
                    None => Box::new(rule),
                }
            }
            RuleKind::Range { min, max } => match (min, max) {
                (Bound::Int(min), Bound::Int(max)) => Box::new(InRange::int(*min, *max, message)?),
                (min, max) => Box::new(InRange::float(min.as_f64(), max.as_f64(), message)?),
            },
            RuleKind::Pattern { pattern } => {
                Box::new(RegularExpression::new(pattern.clone(), message)?)
            }
            RuleKind::Compare { other } => Box::new(Compare::new(other.clone(), message)?),
            RuleKind::CompareTo { other, comparison } => {
                Box::new(CompareTo::new(other.clone(), *comparison, message)?)
            }
            RuleKind::GreaterThan { other } => Box::new(GreaterThan::new(other.clone(), message)?),
            RuleKind::LessThan { other } => Box::new(LessThan::new(other.clone(), message)?),
            RuleKind::Between {
                min,
                max,
                inclusive,
            } => Box::new(Between::new(min.clone(), max.clone(), message)?.with_inclusive(*inclusive)),
            RuleKind::RequiredIf {
                dependent,
                expected,
                invert,
            } => Box::new(
                RequiredIf::new(dependent.clone(), Value::from(expected.clone()), message)?
                    .with_invert(*invert),
            ),
            RuleKind::MinCount { min } => Box::new(MinCount::new(*min, message)?),
            RuleKind::MaxCount { max } => Box::new(MaxCount::new(*max, message)?),
            RuleKind::RequiredCollection => Box::new(RequiredCollection::new(message)),
            RuleKind::ItemsMatch { items, aggregate } => {
                let factories = items
                    .iter()
                    .cloned()
                    .map(|kind| Arc::new(move |m: MessageResource| kind.build(m)) as ItemRuleFactory)
                    .collect();
                Box::new(
                    CollectionItemsMatch::with_rules(factories, message)?
                        .aggregate_all_errors(*aggregate),
                )
            }
        };
        Ok(rule)
    }
}

/// One configured rule with its message reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleEntry {
    #[serde(flatten)]
    pub kind: RuleKind,

    /// Primary message key
    pub key: String,

    #[serde(default)]
    pub fallback_key: Option<String>,

    #[serde(default)]
    pub fallback_message: Option<String>,
}

impl RuleEntry {
    fn message(&self, source: &Arc<dyn MessageSource>) -> Result<MessageResource, RuleError> {
        let mut message = MessageResource::new(Arc::clone(source), self.key.clone())?;
        if let Some(key) = &self.fallback_key {
            message = message.with_fallback_key(key.clone());
        }
        if let Some(text) = &self.fallback_message {
            message = message.with_fallback_message(text.clone());
        }
        Ok(message)
    }
}

/// Rules of one member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldConfig {
    pub member: String,

    #[serde(default)]
    pub display_name: Option<String>,

    #[serde(default)]
    pub rules: Vec<RuleEntry>,
}

/// Declarative schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaConfig {
    #[serde(default)]
    pub fields: Vec<FieldConfig>,
}

impl SchemaConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content)
            .map_err(|e| ConfigError::ParseError(format!("TOML parse error: {}", e)))
    }

    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(content)
            .map_err(|e| ConfigError::ParseError(format!("JSON parse error: {}", e)))
    }

    /// Load a `.toml` or `.json` file
    pub fn load_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let format = FileFormat::from_path(path)?;
        let content = fs::read_to_string(path)?;

        let config = match format {
            FileFormat::Json => Self::from_json_str(&content)?,
            FileFormat::Toml => Self::from_toml_str(&content)?,
        };
        debug!(
            target: "assay::config",
            "loaded {} field(s) from {:?}",
            config.fields.len(),
            path
        );
        Ok(config)
    }

    /// Construct every rule against `source`.
    pub fn build(&self, source: Arc<dyn MessageSource>) -> Result<Schema, ConfigError> {
        self.fields.iter().try_fold(Schema::new(), |schema, field| {
            let mut rules = FieldRules::for_member(&field.member);
            if let Some(display_name) = &field.display_name {
                rules = rules.display(display_name);
            }

            for entry in &field.rules {
                let rule = entry
                    .message(&source)
                    .and_then(|message| entry.kind.build(message))
                    .map_err(|error| ConfigError::RuleError {
                        member: field.member.clone(),
                        source: error,
                    })?;
                rules = rules.shared_rule(rule.into());
            }

            Ok(schema.with_field(rules))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Record, Validator};
    use assay_i18n::MessageBundle;

    const TOML: &str = r#"
        [[fields]]
        member = "Value"
        display_name = "Amount"

        [[fields.rules]]
        rule = "between"
        min = "Min"
        max = "Max"
        key = "Value_OutOfRange"

        [[fields]]
        member = "Tags"

        [[fields.rules]]
        rule = "max_count"
        max = 2
        key = "Tags_TooMany"

        [[fields.rules]]
        rule = "items_match"
        aggregate = true
        key = "Missing"
        fallback_message = "Bad tag"
        items = [{ rule = "max_length", length = 3 }]
    "#;

    fn source() -> Arc<dyn MessageSource> {
        Arc::new(
            MessageBundle::new()
                .with("Value_OutOfRange", "{field} is out of range.")
                .with("Tags_TooMany", "Too many tags."),
        )
    }

    #[test]
    fn test_parse_toml() {
        let config = SchemaConfig::from_toml_str(TOML).unwrap();

        assert_eq!(config.fields.len(), 2);
        assert_eq!(config.fields[0].display_name.as_deref(), Some("Amount"));
        assert_eq!(
            config.fields[0].rules[0].kind,
            RuleKind::Between {
                min: "Min".into(),
                max: "Max".into(),
                inclusive: true
            }
        );
        assert_eq!(config.fields[1].rules[1].fallback_message.as_deref(), Some("Bad tag"));
    }

    #[test]
    fn test_built_schema_validates() {
        let schema = SchemaConfig::from_toml_str(TOML).unwrap().build(source()).unwrap();
        let record = Record::new("Order")
            .with("Min", 10)
            .with("Max", 20)
            .with("Value", 25)
            .with("Tags", vec!["a", "long", "b", "longer"]);

        let errors = Validator::new().try_validate(&record, &schema);
        let messages: Vec<&str> = errors.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "Amount is out of range.",
                "Too many tags.",
                "Bad tag (item #2); Bad tag (item #4)"
            ]
        );
    }

    #[test]
    fn test_parse_json() {
        let json = r#"{
            "fields": [{
                "member": "Email",
                "rules": [
                    { "rule": "required", "key": "Email_Required" },
                    { "rule": "required_if", "dependent": "Contact", "expected": "email", "key": "Email_Required" },
                    { "rule": "range", "min": 1, "max": 2.5, "key": "X" }
                ]
            }]
        }"#;

        let config = SchemaConfig::from_json_str(json).unwrap();
        let rules = &config.fields[0].rules;
        assert_eq!(
            rules[0].kind,
            RuleKind::Required {
                allow_empty_strings: false
            }
        );
        assert!(matches!(rules[2].kind, RuleKind::Range { min: Bound::Int(1), .. }));
        assert_eq!(config.build(source()).unwrap().len(), 1);
    }

    #[test]
    fn test_invalid_arguments_fail_at_build() {
        let config = SchemaConfig::from_toml_str(
            r#"
            [[fields]]
            member = "Items"
            [[fields.rules]]
            rule = "min_count"
            min = -1
            key = "Items_TooFew"
            "#,
        )
        .unwrap();

        let err = config.build(source()).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::RuleError {
                source: RuleError::OutOfRange { .. },
                ..
            }
        ));
    }

    #[test]
    fn test_unknown_rule_is_parse_error() {
        let err = SchemaConfig::from_json_str(
            r#"{"fields": [{"member": "X", "rules": [{"rule": "telepathy", "key": "K"}]}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_file_format_detection() {
        assert_eq!(FileFormat::from_extension("TOML"), Some(FileFormat::Toml));
        assert_eq!(FileFormat::from_extension("yaml"), None);
        assert!(matches!(
            FileFormat::from_path(Path::new("schema.yaml")),
            Err(ConfigError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            FileFormat::from_path(Path::new("schema")),
            Err(ConfigError::LoadError(_))
        ));
    }
}
