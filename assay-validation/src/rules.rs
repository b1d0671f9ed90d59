// Validation rules builder

use crate::errors::RuleError;
use crate::traits::Rule;
use std::fmt;
use std::sync::Arc;

/// Rules attached to one member
#[derive(Clone)]
pub struct FieldRules {
    member: String,
    display_name: Option<String>,
    rules: Vec<Arc<dyn Rule>>,
}

impl FieldRules {
    /// Create new validation rules for a member
    pub fn for_member(member: impl Into<String>) -> Self {
        Self {
            member: member.into(),
            display_name: None,
            rules: Vec::new(),
        }
    }

    /// Name shown in messages instead of the member name
    pub fn display(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    /// Add a rule
    pub fn rule(mut self, rule: impl Rule + 'static) -> Self {
        self.rules.push(Arc::new(rule));
        self
    }

    /// Add an already shared rule
    pub fn shared_rule(mut self, rule: Arc<dyn Rule>) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn member(&self) -> &str {
        &self.member
    }

    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    pub fn rules(&self) -> &[Arc<dyn Rule>] {
        &self.rules
    }
}

impl fmt::Debug for FieldRules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldRules")
            .field("member", &self.member)
            .field("display_name", &self.display_name)
            .field("rules", &self.rules.iter().map(|r| r.name()).collect::<Vec<_>>())
            .finish()
    }
}

/// Ordered rules for every validated member of a type.
///
/// ```
/// use assay_i18n::MessageBundle;
/// use assay_validation::{MaxCount, MessageResource, Required, RuleError, Schema};
/// use std::sync::Arc;
///
/// # fn main() -> Result<(), RuleError> {
/// let source = Arc::new(
///     MessageBundle::new()
///         .with("Name_Required", "{field} is required.")
///         .with("Tags_TooMany", "Too many tags."),
/// );
/// let message = |key: &str| MessageResource::new(source.clone(), key);
///
/// let schema = Schema::builder()
///     .field("Name", |f| f.display("Full name").rule(Required::new(message("Name_Required").unwrap())))
///     .try_field("Tags", |f| Ok(f.rule(MaxCount::new(3, message("Tags_TooMany")?)?)))?;
///
/// assert_eq!(schema.len(), 2);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct Schema {
    fields: Vec<FieldRules>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> Self {
        Self::new()
    }

    /// Configure rules for a member
    pub fn field<F>(self, member: impl Into<String>, configure: F) -> Self
    where
        F: FnOnce(FieldRules) -> FieldRules,
    {
        self.with_field(configure(FieldRules::for_member(member)))
    }

    /// Configure rules whose construction can fail
    pub fn try_field<F>(self, member: impl Into<String>, configure: F) -> Result<Self, RuleError>
    where
        F: FnOnce(FieldRules) -> Result<FieldRules, RuleError>,
    {
        Ok(self.with_field(configure(FieldRules::for_member(member))?))
    }

    /// Add rules for a field, merging into an existing entry for the same member
    pub fn with_field(mut self, rules: FieldRules) -> Self {
        match self.fields.iter_mut().find(|f| f.member == rules.member) {
            Some(existing) => {
                if rules.display_name.is_some() {
                    existing.display_name = rules.display_name;
                }
                existing.rules.extend(rules.rules);
            }
            None => self.fields.push(rules),
        }
        self
    }

    pub fn fields(&self) -> &[FieldRules] {
        &self.fields
    }

    pub fn get(&self, member: &str) -> Option<&FieldRules> {
        self.fields.iter().find(|f| f.member == member)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
