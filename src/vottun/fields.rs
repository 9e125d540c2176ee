// src/vottun/fields.rs

use serde::Serialize;
use serde_json::{Map, Value};

use crate::vottun::models::FieldEditError;

/// How a parameter is edited and parsed back, derived from its default value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Number,
    Boolean,
    Sequence,
    Object,
    Text,
}

impl FieldKind {
    /// Picks the kind for a default value. Null falls back to text.
    pub fn of(default: &Value) -> Self {
        match default {
            Value::Number(_) => FieldKind::Number,
            Value::Bool(_) => FieldKind::Boolean,
            Value::Array(_) => FieldKind::Sequence,
            Value::Object(_) => FieldKind::Object,
            Value::String(_) | Value::Null => FieldKind::Text,
        }
    }

    /// Parses user input for a field of this kind.
    pub fn parse(&self, field: &str, raw: &str) -> Result<Value, FieldEditError> {
        let input = raw.trim();
        match self {
            FieldKind::Number => parse_number(input).ok_or_else(|| FieldEditError::InvalidFieldValue {
                field: field.to_string(),
                reason: format!("'{}' is not a number", input),
            }),
            FieldKind::Boolean => match input.to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" | "on" => Ok(Value::Bool(true)),
                "false" | "0" | "no" | "off" => Ok(Value::Bool(false)),
                _ => Err(FieldEditError::InvalidFieldValue {
                    field: field.to_string(),
                    reason: format!("'{}' is not a boolean", input),
                }),
            },
            FieldKind::Sequence => {
                if input.is_empty() {
                    return Ok(Value::Array(Vec::new()));
                }
                Ok(Value::Array(
                    input
                        .split(',')
                        .map(|item| Value::String(item.trim().to_string()))
                        .collect(),
                ))
            }
            FieldKind::Object => {
                serde_json::from_str::<Value>(input).map_err(|e| FieldEditError::InvalidFieldValue {
                    field: field.to_string(),
                    reason: format!("invalid JSON: {}", e),
                })
            }
            // Text keeps surrounding whitespace as typed.
            FieldKind::Text => Ok(Value::String(raw.to_string())),
        }
    }

    /// Renders a value the way it is shown for editing.
    pub fn render(&self, value: &Value) -> String {
        match (self, value) {
            (FieldKind::Sequence, Value::Array(items)) => items
                .iter()
                .map(scalar_text)
                .collect::<Vec<_>>()
                .join(", "),
            (FieldKind::Object, v) => {
                serde_json::to_string_pretty(v).unwrap_or_else(|_| v.to_string())
            }
            (_, v) => scalar_text(v),
        }
    }
}

fn parse_number(input: &str) -> Option<Value> {
    if let Ok(i) = input.parse::<i64>() {
        return Some(Value::from(i));
    }
    if let Ok(u) = input.parse::<u64>() {
        return Some(Value::from(u));
    }
    input
        .parse::<f64>()
        .ok()
        .and_then(serde_json::Number::from_f64)
        .map(Value::Number)
}

/// Strings verbatim, everything else as JSON text.
pub fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// One editable parameter of an endpoint, with its kind resolved at load time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSpec {
    pub name: String,
    pub kind: FieldKind,
    pub default: Value,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, default: Value) -> Self {
        let kind = FieldKind::of(&default);
        Self {
            name: name.into(),
            kind,
            default,
        }
    }

    /// Human label: first letter upper-cased, camelCase split on capitals.
    pub fn label(&self) -> String {
        let mut label = String::with_capacity(self.name.len() + 4);
        for (i, c) in self.name.chars().enumerate() {
            if i == 0 {
                label.extend(c.to_uppercase());
            } else if c.is_ascii_uppercase() {
                label.push(' ');
                label.push(c);
            } else {
                label.push(c);
            }
        }
        label
    }
}

/// Builds the ordered field list of a template object.
pub fn fields_from_template(template: &Map<String, Value>) -> Vec<FieldSpec> {
    template
        .iter()
        .map(|(name, default)| FieldSpec::new(name.clone(), default.clone()))
        .collect()
}
