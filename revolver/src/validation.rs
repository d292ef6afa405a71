//! Rule-based request validation
//!
//! A resource declares a list of [`Rule`]s. Before a create or update the submitted
//! parameters are checked against every rule; the first failure of each field is
//! recorded and the request is rejected with a 422 when anything failed.
//!
//! ```rust,ignore
//! use revolver::validation::Rule;
//!
//! fn rules() -> Vec<Rule> {
//!     vec![
//!         Rule::new("title").required().max_length(100).message("title is required"),
//!         Rule::new("views").number().min(0),
//!         Rule::new("status").choices(["draft", "published"]),
//!     ]
//! }
//! ```

use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// Validation error with field name and message
#[derive(Debug, Clone, Serialize)]
pub struct ValidationError {
    /// The field that failed validation
    pub field: String,
    /// Human-readable error message
    pub message: String,
}

impl ValidationError {
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Collection of validation errors, in rule order
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    #[must_use]
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    pub fn add(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    #[must_use]
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Message of the first failing field, shown to users as a hint.
    #[must_use]
    pub fn tips(&self) -> Option<&str> {
        self.errors.first().map(|e| e.message.as_str())
    }

    /// Field → message map used in the error envelope.
    #[must_use]
    pub fn to_map(&self) -> Map<String, Value> {
        self.errors
            .iter()
            .map(|e| (e.field.clone(), Value::String(e.message.clone())))
            .collect()
    }

    /// Convert to Result
    ///
    /// # Errors
    ///
    /// Returns `self` when at least one error was recorded.
    pub fn result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Validation failed with {} error(s):", self.errors.len())?;
        for error in &self.errors {
            write!(f, "\n  - {error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// How a rule interprets its value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RuleType {
    #[default]
    String,
    Number,
    Choices,
}

/// Custom check run after the built-in ones. Receives the raw value, if any.
pub type CustomValidator = Arc<dyn Fn(Option<&str>) -> bool + Send + Sync>;

/// A single field rule
#[derive(Clone, Default)]
pub struct Rule {
    pub name: String,
    pub required: bool,
    pub kind: RuleType,
    pub max_length: Option<usize>,
    pub min_length: Option<usize>,
    pub max: Option<i64>,
    pub min: Option<i64>,
    pub choices: Vec<String>,
    pub message: Option<String>,
    validator: Option<CustomValidator>,
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("required", &self.required)
            .field("kind", &self.kind)
            .field("max_length", &self.max_length)
            .field("min_length", &self.min_length)
            .field("max", &self.max)
            .field("min", &self.min)
            .field("choices", &self.choices)
            .field("message", &self.message)
            .field("validator", &self.validator.is_some())
            .finish()
    }
}

impl Rule {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    pub fn string(mut self) -> Self {
        self.kind = RuleType::String;
        self
    }

    #[must_use]
    pub fn number(mut self) -> Self {
        self.kind = RuleType::Number;
        self
    }

    /// Restrict the value to a fixed set. Switches the rule to [`RuleType::Choices`].
    #[must_use]
    pub fn choices<I, S>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.kind = RuleType::Choices;
        self.choices = choices.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn min(mut self, min: i64) -> Self {
        self.min = Some(min);
        self
    }

    #[must_use]
    pub fn max(mut self, max: i64) -> Self {
        self.max = Some(max);
        self
    }

    #[must_use]
    pub fn min_length(mut self, min_length: usize) -> Self {
        self.min_length = Some(min_length);
        self
    }

    #[must_use]
    pub fn max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }

    #[must_use]
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    #[must_use]
    pub fn validator<F>(mut self, validator: F) -> Self
    where
        F: Fn(Option<&str>) -> bool + Send + Sync + 'static,
    {
        self.validator = Some(Arc::new(validator));
        self
    }

    /// Require an email-shaped value. Absent values are left to [`Rule::required`].
    #[must_use]
    pub fn email(self) -> Self {
        self.validator(|value| value.is_none_or(|v| v.is_empty() || is_email(v)))
    }

    /// Check one value against this rule, returning the failure message.
    #[must_use]
    pub fn check(&self, value: Option<&str>) -> Option<String> {
        if self.required && value.is_none_or(str::is_empty) {
            return Some(self.message.clone().unwrap_or_else(|| "required".to_string()));
        }

        match self.kind {
            RuleType::String => {
                let len = value.unwrap_or_default().chars().count();
                if let Some(max) = self.max_length
                    && len > max
                {
                    return Some(format!("max_length {max}"));
                }
                if let Some(min) = self.min_length
                    && len < min
                {
                    return Some(format!("min_length {min}"));
                }
            }
            RuleType::Number => {
                let raw = value.filter(|v| !v.is_empty()).unwrap_or("0");
                let Ok(number) = raw.trim().parse::<i64>() else {
                    return Some("must be a number".to_string());
                };
                if let Some(max) = self.max
                    && number > max
                {
                    return Some(format!("max {max}"));
                }
                if let Some(min) = self.min
                    && number < min
                {
                    return Some(format!("min {min}"));
                }
            }
            RuleType::Choices => {
                if let Some(value) = value
                    && !self.choices.iter().any(|c| c == value)
                {
                    return Some(format!("choices is not in [{}]", self.choices.join(", ")));
                }
            }
        }

        if let Some(validator) = &self.validator
            && !validator(value)
        {
            return Some(
                self.message
                    .clone()
                    .unwrap_or_else(|| "custom validation failed".to_string()),
            );
        }

        None
    }
}

/// Render a submitted JSON value the way a form field would carry it.
#[must_use]
pub fn param_as_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}

/// Validate `params` against every rule.
///
/// # Errors
///
/// Returns every field that failed, first failure per field.
pub fn validate_rules(rules: &[Rule], params: &Map<String, Value>) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    for rule in rules {
        if errors.errors().iter().any(|error| error.field == rule.name) {
            continue;
        }
        let value = params.get(&rule.name).and_then(param_as_string);
        if let Some(message) = rule.check(value.as_deref()) {
            errors.add(ValidationError::new(&rule.name, message));
        }
    }
    errors.result()
}

/// Loose address check: one `@` with a non-empty local part and a dotted domain.
fn is_email(value: &str) -> bool {
    const MAX_EMAIL_LENGTH: usize = 255;

    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    value.len() <= MAX_EMAIL_LENGTH
        && !local.is_empty()
        && !domain.contains('@')
        && domain.split('.').count() > 1
        && domain.split('.').all(|part| !part.is_empty())
}
