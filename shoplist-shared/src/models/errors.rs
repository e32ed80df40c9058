use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Error body carrying a single human-readable `detail`, as the API returns
/// for authentication, permission, and not-found failures.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub detail: String,
    /// Machine-readable code, when the server provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ErrorResponse {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
            code: None,
        }
    }
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) => write!(f, "{} ({code})", self.detail),
            None => f.write_str(&self.detail),
        }
    }
}

impl std::error::Error for ErrorResponse {}

/// Field-level validation messages keyed by field name.
///
/// Form-wide messages arrive under `non_field_errors`.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct FieldErrors(pub BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub const NON_FIELD: &'static str = "non_field_errors";

    /// Interpret a validation body.
    ///
    /// Returns `None` unless the body is an object with at least one field
    /// entry. A body with a string `detail` is an [`ErrorResponse`] envelope,
    /// so its siblings (`code`, `messages`) are never read as fields.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        if object.get("detail").is_some_and(Value::is_string) {
            return None;
        }
        let fields: BTreeMap<String, Vec<String>> = object
            .iter()
            .filter(|(field, _)| field.as_str() != "detail")
            .map(|(field, messages)| (field.clone(), flatten_messages(messages)))
            .collect();
        if fields.is_empty() {
            None
        } else {
            Some(Self(fields))
        }
    }

    /// Messages recorded for `field`.
    #[must_use]
    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.0.iter()
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            first = false;
            if field == Self::NON_FIELD {
                write!(f, "{}", messages.join(" "))?;
            } else {
                write!(f, "{field}: {}", messages.join(" "))?;
            }
        }
        Ok(())
    }
}

fn flatten_messages(value: &Value) -> Vec<String> {
    match value {
        Value::String(message) => vec![message.clone()],
        Value::Array(items) => items.iter().flat_map(flatten_messages).collect(),
        Value::Object(nested) => nested
            .iter()
            .flat_map(|(key, inner)| {
                flatten_messages(inner)
                    .into_iter()
                    .map(move |message| format!("{key}: {message}"))
            })
            .collect(),
        Value::Null => Vec::new(),
        other => vec![other.to_string()],
    }
}
