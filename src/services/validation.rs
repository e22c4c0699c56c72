use serde_json::{Map, Value};

use crate::error::{ApiError, FieldErrors};

const REQUIRED: &str = "This field is required.";
const NOT_NULL: &str = "This field may not be null.";
const NOT_BLANK: &str = "This field may not be blank.";
const NOT_STRING: &str = "Not a valid string.";

/// Collects field errors for one request payload so that every problem is
/// reported at once, keyed by field.
pub struct Validator<'a> {
    fields: &'a Map<String, Value>,
    errors: FieldErrors,
}

impl<'a> Validator<'a> {
    pub fn new(payload: &'a Value) -> Result<Self, ApiError> {
        match payload {
            Value::Object(fields) => Ok(Self { fields, errors: FieldErrors::new() }),
            other => Err(ApiError::field_error(
                "non_field_errors",
                format!("Invalid data. Expected a dictionary, but got {}.", json_type_name(other)),
            )),
        }
    }

    pub fn error(&mut self, field: &str, message: impl Into<String>) {
        self.errors.entry(field.to_string()).or_default().push(message.into());
    }

    /// Non-blank string field. Returns `None` when absent (and records an
    /// error if `required`) or invalid.
    pub fn text(&mut self, field: &str, required: bool) -> Option<String> {
        match self.fields.get(field) {
            None => {
                if required {
                    self.error(field, REQUIRED);
                }
                None
            }
            Some(Value::Null) => {
                self.error(field, NOT_NULL);
                None
            }
            Some(Value::String(s)) if s.trim().is_empty() => {
                self.error(field, NOT_BLANK);
                None
            }
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => {
                self.error(field, NOT_STRING);
                None
            }
        }
    }

    /// Nullable string field: `None` when absent, `Some(None)` when null or empty.
    pub fn nullable_string(&mut self, field: &str) -> Option<Option<String>> {
        match self.fields.get(field)? {
            Value::Null => Some(None),
            Value::String(s) if s.is_empty() => Some(None),
            Value::String(s) => Some(Some(s.clone())),
            _ => {
                self.error(field, NOT_STRING);
                None
            }
        }
    }

    /// Nullable primary-key reference: integers or numeric strings (form posts).
    pub fn nullable_pk(&mut self, field: &str) -> Option<Option<i64>> {
        match self.fields.get(field)? {
            Value::Null => Some(None),
            Value::String(s) if s.is_empty() => Some(None),
            Value::Number(n) if n.is_i64() => Some(n.as_i64()),
            Value::String(s) => match s.trim().parse::<i64>() {
                Ok(pk) => Some(Some(pk)),
                Err(_) => {
                    self.error(field, "Incorrect type. Expected pk value, received str.");
                    None
                }
            },
            other => {
                self.error(
                    field,
                    format!("Incorrect type. Expected pk value, received {}.", json_type_name(other)),
                );
                None
            }
        }
    }

    /// Fail with a 400 if anything was recorded
    pub fn finish(self) -> Result<(), ApiError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::validation_error(self.errors))
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "int",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}
