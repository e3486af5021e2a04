//! # Field-Level Request Validation
//!
//! Structural validation of untyped JSON request bodies. Every request type
//! accepted at the HTTP boundary implements [`FromJsonPayload`] and reads its
//! fields through a [`PayloadReader`], which records *every* problem it finds
//! instead of stopping at the first one.
//!
//! ## Issue Shape
//!
//! Failures are reported as [`ValidationIssues`], serialized as:
//!
//! ```json
//! {
//!   "formErrors": ["..."],
//!   "fieldErrors": { "business_activities": ["Array must contain at least 1 element(s)"] }
//! }
//! ```
//!
//! Form errors describe the body as a whole (not an object, undecodable
//! JSON). Field errors are keyed by the top-level field name; problems in
//! nested values (array items, sub-objects) are reported under their
//! top-level field with a locating prefix.
//!
//! ## Why Not `#[derive(Deserialize)]`
//!
//! A derived `Deserialize` stops at the first field it cannot decode and
//! reports it as one flat message, so a body with three bad fields would
//! surface one of them. Reading from `serde_json::Value` keeps going past a
//! failure and attributes each problem to its field. The typed result is
//! still built only when no issue was recorded.
//!
//! ## Null Handling
//!
//! A JSON `null` for an optional field is treated as absent. For a required
//! field it is a type error.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Itemized validation failures for one request body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ValidationIssues {
    /// Problems with the body as a whole.
    pub form_errors: Vec<String>,
    /// Problems keyed by top-level field name.
    pub field_errors: BTreeMap<String, Vec<String>>,
}

impl ValidationIssues {
    /// An empty issue set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue set holding a single form-level error.
    pub fn form(message: impl Into<String>) -> Self {
        let mut issues = Self::new();
        issues.push_form(message);
        issues
    }

    /// Record a form-level error.
    pub fn push_form(&mut self, message: impl Into<String>) {
        self.form_errors.push(message.into());
    }

    /// Record an error against `field`.
    pub fn push_field(&mut self, field: &str, message: impl Into<String>) {
        self.field_errors
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    /// Errors recorded against `field`, if any.
    pub fn field(&self, field: &str) -> Option<&[String]> {
        self.field_errors.get(field).map(Vec::as_slice)
    }

    /// True when no problem was recorded.
    pub fn is_empty(&self) -> bool {
        self.form_errors.is_empty() && self.field_errors.is_empty()
    }

    /// Total number of recorded problems.
    pub fn len(&self) -> usize {
        self.form_errors.len() + self.field_errors.values().map(Vec::len).sum::<usize>()
    }
}

impl fmt::Display for ValidationIssues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = self.form_errors.clone();
        for (field, messages) in &self.field_errors {
            for message in messages {
                parts.push(format!("{field}: {message}"));
            }
        }
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for ValidationIssues {}

/// A request type that can be built from an untyped JSON body.
pub trait FromJsonPayload: Sized {
    /// Validate `value` and build the typed request, or report every issue found.
    fn from_json(value: &Value) -> Result<Self, ValidationIssues>;
}

/// Human-readable JSON type name used in type-mismatch messages.
pub fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Cursor over a JSON object body that accumulates issues as fields are read.
///
/// Each accessor returns `None` when the field is missing or invalid and
/// records the reason; callers collect the results and then call
/// [`PayloadReader::into_issues`] to decide whether the body passed.
#[derive(Debug)]
pub struct PayloadReader<'a> {
    object: &'a Map<String, Value>,
    issues: ValidationIssues,
}

impl<'a> PayloadReader<'a> {
    /// Start reading `value`, which must be a JSON object.
    pub fn new(value: &'a Value) -> Result<Self, ValidationIssues> {
        match value {
            Value::Object(object) => Ok(Self::over(object)),
            other => Err(ValidationIssues::form(format!(
                "Expected object, received {}",
                json_kind(other)
            ))),
        }
    }

    /// Start reading an already-unwrapped object (used for nested objects).
    pub fn over(object: &'a Map<String, Value>) -> Self {
        Self {
            object,
            issues: ValidationIssues::new(),
        }
    }

    /// Record an issue against `field`.
    pub fn issue(&mut self, field: &str, message: impl Into<String>) {
        self.issues.push_field(field, message);
    }

    fn present(&self, field: &str) -> Option<&'a Value> {
        self.object.get(field).filter(|v| !v.is_null())
    }

    fn required(&mut self, field: &str) -> Option<&'a Value> {
        match self.object.get(field) {
            None => {
                self.issue(field, "Required");
                None
            }
            Some(value) => Some(value),
        }
    }

    fn as_str(&mut self, field: &str, value: &'a Value) -> Option<&'a str> {
        match value {
            Value::String(s) => Some(s.as_str()),
            other => {
                self.issue(
                    field,
                    format!("Expected string, received {}", json_kind(other)),
                );
                None
            }
        }
    }

    /// Required string of at least one character. Whitespace counts.
    ///
    /// `empty_message` is reported when the string is empty.
    pub fn required_string(&mut self, field: &str, empty_message: &str) -> Option<String> {
        let value = self.required(field)?;
        let s = self.as_str(field, value)?;
        if s.is_empty() {
            self.issue(field, empty_message);
            return None;
        }
        Some(s.to_string())
    }

    /// Required string that may be empty.
    pub fn required_text(&mut self, field: &str) -> Option<String> {
        let value = self.required(field)?;
        self.as_str(field, value).map(str::to_string)
    }

    /// Optional string. When `non_empty` is set, an empty string is an issue.
    pub fn optional_string(&mut self, field: &str, non_empty: bool) -> Option<String> {
        let value = self.present(field)?;
        let s = self.as_str(field, value)?;
        if non_empty && s.is_empty() {
            self.issue(field, "String must contain at least 1 character(s)");
            return None;
        }
        Some(s.to_string())
    }

    /// Optional boolean.
    pub fn optional_bool(&mut self, field: &str) -> Option<bool> {
        match self.present(field)? {
            Value::Bool(b) => Some(*b),
            other => {
                self.issue(
                    field,
                    format!("Expected boolean, received {}", json_kind(other)),
                );
                None
            }
        }
    }

    /// Optional number constrained to the closed interval `[0, 1]`.
    pub fn optional_unit_interval(&mut self, field: &str) -> Option<f64> {
        let value = self.present(field)?;
        let Some(n) = value.as_f64() else {
            self.issue(
                field,
                format!("Expected number, received {}", json_kind(value)),
            );
            return None;
        };
        if n < 0.0 {
            self.issue(field, "Number must be greater than or equal to 0");
            return None;
        }
        if n > 1.0 {
            self.issue(field, "Number must be less than or equal to 1");
            return None;
        }
        Some(n)
    }

    /// Required non-empty array of non-empty strings.
    ///
    /// Every offending item is reported, prefixed with its index.
    pub fn required_string_list(&mut self, field: &str) -> Option<Vec<String>> {
        let value = self.required(field)?;
        let Value::Array(items) = value else {
            self.issue(
                field,
                format!("Expected array, received {}", json_kind(value)),
            );
            return None;
        };
        if items.is_empty() {
            self.issue(field, "Array must contain at least 1 element(s)");
            return None;
        }

        let mut out = Vec::with_capacity(items.len());
        let mut ok = true;
        for (i, item) in items.iter().enumerate() {
            match item {
                Value::String(s) if !s.is_empty() => out.push(s.clone()),
                Value::String(_) => {
                    ok = false;
                    self.issue(
                        field,
                        format!("[{i}]: String must contain at least 1 character(s)"),
                    );
                }
                other => {
                    ok = false;
                    self.issue(
                        field,
                        format!("[{i}]: Expected string, received {}", json_kind(other)),
                    );
                }
            }
        }
        ok.then_some(out)
    }

    fn parse_enum<T>(
        &mut self,
        field: &str,
        value: &'a Value,
        parse: fn(&str) -> Option<T>,
        expected: &[&str],
    ) -> Option<T> {
        let s = self.as_str(field, value)?;
        match parse(s) {
            Some(v) => Some(v),
            None => {
                let options = expected
                    .iter()
                    .map(|e| format!("'{e}'"))
                    .collect::<Vec<_>>()
                    .join(" | ");
                self.issue(
                    field,
                    format!("Invalid enum value. Expected {options}, received '{s}'"),
                );
                None
            }
        }
    }

    /// Required string drawn from a closed set.
    pub fn required_enum<T>(
        &mut self,
        field: &str,
        parse: fn(&str) -> Option<T>,
        expected: &[&str],
    ) -> Option<T> {
        let value = self.required(field)?;
        self.parse_enum(field, value, parse, expected)
    }

    /// Optional string drawn from a closed set.
    pub fn optional_enum<T>(
        &mut self,
        field: &str,
        parse: fn(&str) -> Option<T>,
        expected: &[&str],
    ) -> Option<T> {
        let value = self.present(field)?;
        self.parse_enum(field, value, parse, expected)
    }

    /// Optional nested object.
    pub fn optional_object(&mut self, field: &str) -> Option<&'a Map<String, Value>> {
        match self.present(field)? {
            Value::Object(map) => Some(map),
            other => {
                self.issue(
                    field,
                    format!("Expected object, received {}", json_kind(other)),
                );
                None
            }
        }
    }

    /// Record a form issue for every key outside `allowed`.
    pub fn reject_unknown_keys(&mut self, allowed: &[&str]) {
        let unknown: Vec<String> = self
            .object
            .keys()
            .filter(|k| !allowed.contains(&k.as_str()))
            .map(|k| format!("'{k}'"))
            .collect();
        if !unknown.is_empty() {
            self.issues.push_form(format!(
                "Unrecognized key(s) in object: {}",
                unknown.join(", ")
            ));
        }
    }

    /// Fold the issues of a nested reader into `field` of this one.
    pub fn absorb(&mut self, field: &str, nested: ValidationIssues) {
        for message in nested.form_errors {
            self.issue(field, message);
        }
        for (sub, messages) in nested.field_errors {
            for message in messages {
                self.issue(field, format!("{sub}: {message}"));
            }
        }
    }

    /// Finish reading and hand back everything recorded.
    pub fn into_issues(self) -> ValidationIssues {
        self.issues
    }
}
