//! Declarative request schemas and the validator.
//!
//! A [`ValidationSchema`] maps field names to [`FieldSchema`] constraint sets.
//! Schemas are built once, when routes are declared, and are immutable after
//! that. [`ValidationSchema::validate`] checks an untyped JSON value against
//! the schema and returns either the normalized value (defaults applied,
//! scalars coerced) or the list of [`Violation`]s.
//!
//! # Rules
//!
//! For every declared field, in declaration order:
//!
//! 1. Absent and required: `required` violation.
//! 2. Absent and optional with a default: the default is inserted.
//! 3. Present: coerce to the declared type, then check emptiness, length,
//!    range, allowed values, `alphanum` and pattern. Only the first failing
//!    constraint of a field is reported.
//!
//! Fields the schema does not declare are passed through unchanged.
//!
//! # Example
//!
//! ```
//! use kontakt_core::schema::{FieldSchema, ValidationSchema};
//! use serde_json::json;
//!
//! let schema = ValidationSchema::new()
//!     .field("text", FieldSchema::string().required())
//!     .field("pageNumber", FieldSchema::number().default_value(json!(1)));
//!
//! let outcome = schema.validate(&json!({ "text": "foo", "pageNumber": "3" }));
//! assert_eq!(
//!     outcome.into_result().unwrap(),
//!     json!({ "text": "foo", "pageNumber": 3 })
//! );
//! ```

use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// The part of a request a schema applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputSource {
    /// Path parameters.
    Params,
    /// Query string parameters.
    Query,
    /// Request body.
    Payload,
}

impl InputSource {
    /// Returns the lowercase name used in logs and error details.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Params => "params",
            Self::Query => "query",
            Self::Payload => "payload",
        }
    }
}

impl std::fmt::Display for InputSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The constraint a [`Violation`] reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Constraint {
    /// A required field was absent.
    Required,
    /// The value could not be coerced to the declared type.
    Type,
    /// A string field was empty.
    Empty,
    /// A string was shorter than the minimum length.
    MinLength,
    /// A string was longer than the maximum length.
    MaxLength,
    /// A number was below the minimum.
    Minimum,
    /// A number was above the maximum.
    Maximum,
    /// The value is not one of the allowed values.
    Enum,
    /// A string contained characters other than ASCII letters and digits.
    Alphanum,
    /// A string did not match the declared pattern.
    Pattern,
    /// The request body was not valid JSON.
    Json,
}

impl Constraint {
    /// Returns the snake_case constraint name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::Type => "type",
            Self::Empty => "empty",
            Self::MinLength => "min_length",
            Self::MaxLength => "max_length",
            Self::Minimum => "minimum",
            Self::Maximum => "maximum",
            Self::Enum => "enum",
            Self::Alphanum => "alphanum",
            Self::Pattern => "pattern",
            Self::Json => "json",
        }
    }
}

impl std::fmt::Display for Constraint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    /// Dotted path of the failing field (`""` for the value itself).
    pub path: String,
    /// The constraint that failed.
    pub constraint: Constraint,
    /// Human-readable description.
    pub message: String,
    /// The offending value, when one was present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl Violation {
    /// Creates a violation.
    #[must_use]
    pub fn new(
        path: impl Into<String>,
        constraint: Constraint,
        message: impl Into<String>,
        value: Option<Value>,
    ) -> Self {
        Self {
            path: path.into(),
            constraint,
            message: message.into(),
            value,
        }
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Result of validating a value against a schema.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationOutcome {
    /// The value passed; carries the normalized value.
    Valid(Value),
    /// The value failed; carries every per-field violation.
    Invalid(Vec<Violation>),
}

impl ValidationOutcome {
    /// Returns `true` for [`ValidationOutcome::Valid`].
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    /// Converts the outcome into a `Result`.
    pub fn into_result(self) -> Result<Value, Vec<Violation>> {
        match self {
            Self::Valid(value) => Ok(value),
            Self::Invalid(violations) => Err(violations),
        }
    }
}

/// Declared type of a field.
#[derive(Debug, Clone)]
pub enum FieldType {
    /// A string. Numbers and booleans are not converted to strings.
    String,
    /// An integer. Numeric strings are coerced.
    Integer,
    /// A number. Numeric strings are coerced.
    Number,
    /// A boolean. `"true"` / `"false"` are coerced.
    Boolean,
    /// A nested object validated against its own schema.
    Object(ValidationSchema),
    /// Anything; no type check.
    Any,
}

impl FieldType {
    /// Returns the type name used in messages and documentation.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Object(_) => "object",
            Self::Any => "any",
        }
    }
}

/// Constraint set for a single field.
///
/// Fields are optional unless [`FieldSchema::required`] is called.
#[derive(Debug, Clone)]
pub struct FieldSchema {
    field_type: FieldType,
    required: bool,
    description: Option<String>,
    min_length: Option<usize>,
    max_length: Option<usize>,
    minimum: Option<f64>,
    maximum: Option<f64>,
    allowed: Vec<Value>,
    alphanum: bool,
    pattern: Option<Regex>,
    allow_empty: bool,
    default: Option<Value>,
    example: Option<Value>,
}

impl FieldSchema {
    fn of(field_type: FieldType) -> Self {
        Self {
            field_type,
            required: false,
            description: None,
            min_length: None,
            max_length: None,
            minimum: None,
            maximum: None,
            allowed: Vec::new(),
            alphanum: false,
            pattern: None,
            allow_empty: false,
            default: None,
            example: None,
        }
    }

    /// A string field.
    #[must_use]
    pub fn string() -> Self {
        Self::of(FieldType::String)
    }

    /// An integer field.
    #[must_use]
    pub fn integer() -> Self {
        Self::of(FieldType::Integer)
    }

    /// A number field.
    #[must_use]
    pub fn number() -> Self {
        Self::of(FieldType::Number)
    }

    /// A boolean field.
    #[must_use]
    pub fn boolean() -> Self {
        Self::of(FieldType::Boolean)
    }

    /// A nested object field.
    #[must_use]
    pub fn object(schema: ValidationSchema) -> Self {
        Self::of(FieldType::Object(schema))
    }

    /// A field of any type.
    #[must_use]
    pub fn any() -> Self {
        Self::of(FieldType::Any)
    }

    /// Marks the field as required.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Sets a description for documentation.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the minimum string length, in characters.
    #[must_use]
    pub fn min_length(mut self, min: usize) -> Self {
        self.min_length = Some(min);
        self
    }

    /// Sets the maximum string length, in characters.
    #[must_use]
    pub fn max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    /// Sets the minimum numeric value (inclusive).
    #[must_use]
    pub fn minimum(mut self, min: f64) -> Self {
        self.minimum = Some(min);
        self
    }

    /// Sets the maximum numeric value (inclusive).
    #[must_use]
    pub fn maximum(mut self, max: f64) -> Self {
        self.maximum = Some(max);
        self
    }

    /// Restricts the field to the given values.
    #[must_use]
    pub fn one_of<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.allowed = values.into_iter().map(Into::into).collect();
        self
    }

    /// Restricts strings to ASCII letters and digits.
    #[must_use]
    pub fn alphanum(mut self) -> Self {
        self.alphanum = true;
        self
    }

    /// Requires strings to match the given pattern.
    #[must_use]
    pub fn pattern(mut self, pattern: Regex) -> Self {
        self.pattern = Some(pattern);
        self
    }

    /// Accepts the empty string.
    #[must_use]
    pub fn allow_empty(mut self) -> Self {
        self.allow_empty = true;
        self
    }

    /// Sets the value substituted when the field is absent.
    #[must_use]
    pub fn default_value(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    /// Sets an example value for documentation.
    #[must_use]
    pub fn example(mut self, value: Value) -> Self {
        self.example = Some(value);
        self
    }

    /// Returns the declared type.
    #[must_use]
    pub fn field_type(&self) -> &FieldType {
        &self.field_type
    }

    /// Returns whether the field is required.
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Returns the description, if any.
    #[must_use]
    pub fn description_text(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the length bounds.
    #[must_use]
    pub fn length_bounds(&self) -> (Option<usize>, Option<usize>) {
        (self.min_length, self.max_length)
    }

    /// Returns the numeric range.
    #[must_use]
    pub fn range(&self) -> (Option<f64>, Option<f64>) {
        (self.minimum, self.maximum)
    }

    /// Returns the allowed values (empty means unrestricted).
    #[must_use]
    pub fn allowed_values(&self) -> &[Value] {
        &self.allowed
    }

    /// Returns whether the `alphanum` constraint is set.
    #[must_use]
    pub fn is_alphanum(&self) -> bool {
        self.alphanum
    }

    /// Returns whether an empty string is accepted.
    #[must_use]
    pub fn allows_empty(&self) -> bool {
        self.allow_empty
    }

    /// Returns the pattern source, if any.
    #[must_use]
    pub fn pattern_source(&self) -> Option<&str> {
        self.pattern.as_ref().map(Regex::as_str)
    }

    /// Returns the default value, if any.
    #[must_use]
    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// Returns the example value, if any.
    #[must_use]
    pub fn example_value(&self) -> Option<&Value> {
        self.example.as_ref()
    }

    /// Checks a present value, returning the normalized value.
    ///
    /// Nested object fields may push several violations; scalar fields fail
    /// on their first broken constraint.
    fn check(&self, path: &str, value: &Value, violations: &mut Vec<Violation>) -> Option<Value> {
        let coerced = match self.coerce(path, value, violations)? {
            Coerced::Done(normalized) => return Some(normalized),
            Coerced::Scalar(normalized) => normalized,
        };

        match self.check_constraints(path, &coerced) {
            Ok(()) => Some(coerced),
            Err(violation) => {
                violations.push(violation);
                None
            }
        }
    }

    fn coerce(&self, path: &str, value: &Value, violations: &mut Vec<Violation>) -> Option<Coerced> {
        let coerced = match &self.field_type {
            FieldType::Any => Some(value.clone()),
            FieldType::String => value.as_str().map(|s| Value::String(s.to_string())),
            FieldType::Boolean => coerce_boolean(value),
            FieldType::Number => coerce_number(value),
            FieldType::Integer => coerce_integer(value),
            FieldType::Object(schema) => {
                let Some(object) = value.as_object() else {
                    violations.push(type_violation(path, "object", value));
                    return None;
                };
                let before = violations.len();
                let normalized = schema.validate_object(object, path, violations);
                return (violations.len() == before).then(|| Coerced::Done(Value::Object(normalized)));
            }
        };

        match coerced {
            Some(normalized) => Some(Coerced::Scalar(normalized)),
            None => {
                violations.push(type_violation(path, self.field_type.name(), value));
                None
            }
        }
    }

    fn check_constraints(&self, path: &str, value: &Value) -> Result<(), Violation> {
        let label = label(path);
        let offending = || Some(value.clone());

        if let Value::String(s) = value {
            if s.is_empty() && !self.allow_empty {
                return Err(Violation::new(
                    path,
                    Constraint::Empty,
                    format!("{label} is not allowed to be empty"),
                    offending(),
                ));
            }

            let length = s.chars().count();
            if let Some(min) = self.min_length {
                if length < min {
                    return Err(Violation::new(
                        path,
                        Constraint::MinLength,
                        format!("{label} length must be at least {min} characters long"),
                        offending(),
                    ));
                }
            }
            if let Some(max) = self.max_length {
                if length > max {
                    return Err(Violation::new(
                        path,
                        Constraint::MaxLength,
                        format!("{label} length must be less than or equal to {max} characters long"),
                        offending(),
                    ));
                }
            }
        }

        if let Some(n) = value.as_f64() {
            if let Some(min) = self.minimum {
                if n < min {
                    return Err(Violation::new(
                        path,
                        Constraint::Minimum,
                        format!("{label} must be greater than or equal to {min}"),
                        offending(),
                    ));
                }
            }
            if let Some(max) = self.maximum {
                if n > max {
                    return Err(Violation::new(
                        path,
                        Constraint::Maximum,
                        format!("{label} must be less than or equal to {max}"),
                        offending(),
                    ));
                }
            }
        }

        if !self.allowed.is_empty() && !self.allowed.contains(value) {
            let allowed = self
                .allowed
                .iter()
                .map(Value::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            return Err(Violation::new(
                path,
                Constraint::Enum,
                format!("{label} must be one of [{allowed}]"),
                offending(),
            ));
        }

        if let Value::String(s) = value {
            if self.alphanum && !s.chars().all(|c| c.is_ascii_alphanumeric()) {
                return Err(Violation::new(
                    path,
                    Constraint::Alphanum,
                    format!("{label} must only contain alpha-numeric characters"),
                    offending(),
                ));
            }
            if let Some(pattern) = &self.pattern {
                if !pattern.is_match(s) {
                    return Err(Violation::new(
                        path,
                        Constraint::Pattern,
                        format!("{label} fails to match the required pattern: {}", pattern.as_str()),
                        offending(),
                    ));
                }
            }
        }

        Ok(())
    }
}

enum Coerced {
    /// A scalar that still needs its constraints checked.
    Scalar(Value),
    /// A nested object that was fully validated.
    Done(Value),
}

/// Declarative schema for one part of a request.
///
/// Field order is preserved; violations are reported in declaration order.
#[derive(Debug, Clone, Default)]
pub struct ValidationSchema {
    fields: IndexMap<String, FieldSchema>,
}

impl ValidationSchema {
    /// Creates an empty schema, which accepts any object.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a field.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, schema: FieldSchema) -> Self {
        self.fields.insert(name.into(), schema);
        self
    }

    /// Returns the declared fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldSchema)> {
        self.fields.iter().map(|(name, schema)| (name.as_str(), schema))
    }

    /// Returns a declared field.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.get(name)
    }

    /// Returns `true` if no fields are declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Validates a value against this schema.
    ///
    /// `null` is treated as an empty object. Any other non-object value is a
    /// type violation at the root path.
    #[must_use]
    pub fn validate(&self, value: &Value) -> ValidationOutcome {
        let empty = Map::new();
        let object = match value {
            Value::Null => &empty,
            Value::Object(object) => object,
            other => {
                return ValidationOutcome::Invalid(vec![type_violation("", "object", other)]);
            }
        };

        let mut violations = Vec::new();
        let normalized = self.validate_object(object, "", &mut violations);

        if violations.is_empty() {
            ValidationOutcome::Valid(Value::Object(normalized))
        } else {
            ValidationOutcome::Invalid(violations)
        }
    }

    fn validate_object(
        &self,
        object: &Map<String, Value>,
        prefix: &str,
        violations: &mut Vec<Violation>,
    ) -> Map<String, Value> {
        let mut normalized = object.clone();

        for (name, field) in &self.fields {
            let path = if prefix.is_empty() {
                name.clone()
            } else {
                format!("{prefix}.{name}")
            };

            match object.get(name) {
                None => {
                    if field.required {
                        violations.push(Violation::new(
                            &path,
                            Constraint::Required,
                            format!("{} is required", label(&path)),
                            None,
                        ));
                    } else if let Some(default) = &field.default {
                        normalized.insert(name.clone(), default.clone());
                    }
                }
                Some(value) => {
                    if let Some(value) = field.check(&path, value, violations) {
                        normalized.insert(name.clone(), value);
                    }
                }
            }
        }

        normalized
    }
}

/// Validates `value` against an optional schema.
///
/// An absent schema accepts anything and returns the value unchanged.
#[must_use]
pub fn validate(schema: Option<&ValidationSchema>, value: &Value) -> ValidationOutcome {
    match schema {
        Some(schema) => schema.validate(value),
        None => ValidationOutcome::Valid(value.clone()),
    }
}

fn label(path: &str) -> String {
    if path.is_empty() {
        "\"value\"".to_string()
    } else {
        format!("\"{path}\"")
    }
}

fn type_violation(path: &str, expected: &str, value: &Value) -> Violation {
    Violation::new(
        path,
        Constraint::Type,
        format!("{} must be a {expected}", label(path)),
        Some(value.clone()),
    )
}

fn coerce_boolean(value: &Value) -> Option<Value> {
    match value {
        Value::Bool(_) => Some(value.clone()),
        Value::String(s) if s.eq_ignore_ascii_case("true") => Some(Value::Bool(true)),
        Value::String(s) if s.eq_ignore_ascii_case("false") => Some(Value::Bool(false)),
        _ => None,
    }
}

fn coerce_number(value: &Value) -> Option<Value> {
    match value {
        Value::Number(_) => Some(value.clone()),
        Value::String(s) => parse_number(s),
        _ => None,
    }
}

fn coerce_integer(value: &Value) -> Option<Value> {
    let number = coerce_number(value)?;
    if number.is_i64() || number.is_u64() {
        return Some(number);
    }
    let float = number.as_f64()?;
    if float.fract() == 0.0 && float >= i64::MIN as f64 && float <= i64::MAX as f64 {
        Some(Value::Number(Number::from(float as i64)))
    } else {
        None
    }
}

/// Parses a numeric string, preferring an integer representation so `"2"`
/// normalizes to `2` rather than `2.0`.
fn parse_number(s: &str) -> Option<Value> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(int) = trimmed.parse::<i64>() {
        return Some(Value::Number(Number::from(int)));
    }
    let float = trimmed.parse::<f64>().ok()?;
    if !float.is_finite() {
        return None;
    }
    if float.fract() == 0.0 && float.abs() < 9.007_199_254_740_992e15 {
        return Some(Value::Number(Number::from(float as i64)));
    }
    Number::from_f64(float).map(Value::Number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn greeting_params() -> ValidationSchema {
        ValidationSchema::new().field(
            "name",
            FieldSchema::string().alphanum().min_length(3).max_length(30),
        )
    }

    fn search_query() -> ValidationSchema {
        ValidationSchema::new()
            .field("text", FieldSchema::string().required())
            .field("pageNumber", FieldSchema::number().default_value(json!(1)))
            .field(
                "lang",
                FieldSchema::string().one_of(["pl", "gb"]).default_value(json!("pl")),
            )
    }

    fn contact_payload() -> ValidationSchema {
        ValidationSchema::new().field(
            "contact",
            FieldSchema::object(
                ValidationSchema::new()
                    .field("name", FieldSchema::string().required())
                    .field("surname", FieldSchema::string().required()),
            )
            .required(),
        )
    }

    fn violations(outcome: ValidationOutcome) -> Vec<Violation> {
        outcome.into_result().expect_err("expected violations")
    }

    #[test]
    fn test_absent_schema_accepts_anything() {
        let value = json!({ "anything": [1, 2, 3] });
        assert_eq!(validate(None, &value), ValidationOutcome::Valid(value));
    }

    #[test]
    fn test_defaults_are_applied() {
        let outcome = search_query().validate(&json!({ "text": "foo" }));
        assert_eq!(
            outcome,
            ValidationOutcome::Valid(json!({ "text": "foo", "pageNumber": 1, "lang": "pl" }))
        );
    }

    #[test]
    fn test_missing_required_field() {
        let found = violations(search_query().validate(&json!({})));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].path, "text");
        assert_eq!(found[0].constraint, Constraint::Required);
        assert!(found[0].value.is_none());
    }

    #[test]
    fn test_null_is_treated_as_empty_object() {
        let found = violations(search_query().validate(&Value::Null));
        assert_eq!(found[0].constraint, Constraint::Required);
    }

    #[test]
    fn test_non_object_root_is_type_violation() {
        let found = violations(search_query().validate(&json!("text")));
        assert_eq!(found[0].path, "");
        assert_eq!(found[0].constraint, Constraint::Type);
    }

    #[test]
    fn test_numeric_string_is_coerced() {
        let outcome = search_query().validate(&json!({ "text": "foo", "pageNumber": "7" }));
        let value = outcome.into_result().unwrap();
        assert_eq!(value["pageNumber"], json!(7));
    }

    #[test]
    fn test_fractional_string_is_coerced_to_float() {
        let outcome = search_query().validate(&json!({ "text": "foo", "pageNumber": "2.5" }));
        assert_eq!(outcome.into_result().unwrap()["pageNumber"], json!(2.5));
    }

    #[test]
    fn test_coercion_failure_is_type_violation() {
        let found = violations(search_query().validate(&json!({ "text": "foo", "pageNumber": "two" })));
        assert_eq!(found[0].path, "pageNumber");
        assert_eq!(found[0].constraint, Constraint::Type);
        assert_eq!(found[0].value, Some(json!("two")));
    }

    #[test]
    fn test_integer_rejects_fractions() {
        let schema = ValidationSchema::new().field("page", FieldSchema::integer());
        assert!(schema.validate(&json!({ "page": "4" })).is_valid());
        let found = violations(schema.validate(&json!({ "page": 4.5 })));
        assert_eq!(found[0].constraint, Constraint::Type);
    }

    #[test]
    fn test_boolean_coercion() {
        let schema = ValidationSchema::new().field("flag", FieldSchema::boolean());
        let value = schema.validate(&json!({ "flag": "TRUE" })).into_result().unwrap();
        assert_eq!(value["flag"], json!(true));
        assert!(!schema.validate(&json!({ "flag": "yes" })).is_valid());
    }

    #[test]
    fn test_string_does_not_accept_numbers() {
        let found = violations(greeting_params().validate(&json!({ "name": 12345 })));
        assert_eq!(found[0].constraint, Constraint::Type);
    }

    #[test]
    fn test_enum_constraint() {
        let found = violations(search_query().validate(&json!({ "text": "foo", "lang": "de" })));
        assert_eq!(found[0].path, "lang");
        assert_eq!(found[0].constraint, Constraint::Enum);
        assert!(found[0].message.contains("\"pl\""));
    }

    #[test]
    fn test_length_bounds() {
        let found = violations(greeting_params().validate(&json!({ "name": "ab" })));
        assert_eq!(found[0].constraint, Constraint::MinLength);

        let long = "a".repeat(31);
        let found = violations(greeting_params().validate(&json!({ "name": long })));
        assert_eq!(found[0].constraint, Constraint::MaxLength);

        assert!(greeting_params().validate(&json!({ "name": "abc" })).is_valid());
        assert!(greeting_params().validate(&json!({ "name": "a".repeat(30) })).is_valid());
    }

    #[test]
    fn test_first_failing_constraint_wins() {
        // Too short and not alphanumeric: only the length failure is reported.
        let found = violations(greeting_params().validate(&json!({ "name": "a-" })));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].constraint, Constraint::MinLength);
    }

    #[test]
    fn test_alphanum_constraint() {
        let found = violations(greeting_params().validate(&json!({ "name": "alice!" })));
        assert_eq!(found[0].constraint, Constraint::Alphanum);
    }

    #[test]
    fn test_pattern_constraint() {
        let schema = ValidationSchema::new().field(
            "code",
            FieldSchema::string().pattern(Regex::new(r"^[A-Z]{2}$").unwrap()),
        );
        assert!(schema.validate(&json!({ "code": "PL" })).is_valid());
        let found = violations(schema.validate(&json!({ "code": "pl" })));
        assert_eq!(found[0].constraint, Constraint::Pattern);
    }

    #[test]
    fn test_range_constraints() {
        let schema = ValidationSchema::new().field("n", FieldSchema::number().minimum(1.0).maximum(10.0));
        assert_eq!(violations(schema.validate(&json!({ "n": 0 })))[0].constraint, Constraint::Minimum);
        assert_eq!(violations(schema.validate(&json!({ "n": "11" })))[0].constraint, Constraint::Maximum);
        assert!(schema.validate(&json!({ "n": 10 })).is_valid());
    }

    #[test]
    fn test_empty_string_rejected_unless_allowed() {
        let schema = ValidationSchema::new().field("s", FieldSchema::string());
        assert_eq!(violations(schema.validate(&json!({ "s": "" })))[0].constraint, Constraint::Empty);

        let schema = ValidationSchema::new().field("s", FieldSchema::string().allow_empty());
        assert!(schema.validate(&json!({ "s": "" })).is_valid());
    }

    #[test]
    fn test_unknown_fields_pass_through() {
        let outcome = search_query().validate(&json!({ "text": "foo", "extra": { "deep": true } }));
        let value = outcome.into_result().unwrap();
        assert_eq!(value["extra"], json!({ "deep": true }));
    }

    #[test]
    fn test_one_violation_per_field_collected_across_fields() {
        let schema = ValidationSchema::new()
            .field("a", FieldSchema::string().required())
            .field("b", FieldSchema::number())
            .field("c", FieldSchema::string().min_length(2));
        let found = violations(schema.validate(&json!({ "b": "x", "c": "y" })));
        let paths: Vec<_> = found.iter().map(|v| v.path.as_str()).collect();
        assert_eq!(paths, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_nested_object_paths() {
        let found = violations(contact_payload().validate(&json!({ "contact": { "name": "Jan" } })));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].path, "contact.surname");
        assert_eq!(found[0].constraint, Constraint::Required);
    }

    #[test]
    fn test_nested_object_type() {
        let found = violations(contact_payload().validate(&json!({ "contact": "Jan Kowalski" })));
        assert_eq!(found[0].path, "contact");
        assert_eq!(found[0].constraint, Constraint::Type);
    }

    #[test]
    fn test_nested_object_valid() {
        let value = json!({ "contact": { "name": "Jan", "surname": "Kowalski" } });
        assert_eq!(contact_payload().validate(&value), ValidationOutcome::Valid(value));
    }

    #[test]
    fn test_missing_payload_reports_required_root_field() {
        let found = violations(contact_payload().validate(&Value::Null));
        assert_eq!(found[0].path, "contact");
        assert_eq!(found[0].constraint, Constraint::Required);
    }

    #[test]
    fn test_violation_serialization() {
        let violation = Violation::new("name", Constraint::MinLength, "too short", Some(json!("ab")));
        let json = serde_json::to_value(&violation).unwrap();
        assert_eq!(json["constraint"], "min_length");
        assert_eq!(json["value"], "ab");
    }

    proptest! {
        #[test]
        fn prop_validation_is_idempotent(
            text in "[a-z]{1,12}",
            page in proptest::option::of(0i64..10_000),
            lang in proptest::option::of(prop_oneof![Just("pl"), Just("gb")]),
        ) {
            let mut input = Map::new();
            input.insert("text".into(), json!(text));
            if let Some(page) = page {
                input.insert("pageNumber".into(), json!(page.to_string()));
            }
            if let Some(lang) = lang {
                input.insert("lang".into(), json!(lang));
            }

            let schema = search_query();
            let first = schema.validate(&Value::Object(input)).into_result().unwrap();
            let second = schema.validate(&first).into_result().unwrap();
            prop_assert_eq!(first, second);
        }

        #[test]
        fn prop_alphanumeric_names_within_bounds_are_valid(name in "[A-Za-z0-9]{3,30}") {
            let input = json!({ "name": name });
            prop_assert!(greeting_params().validate(&input).is_valid());
        }
    }
}
