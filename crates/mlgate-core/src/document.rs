//! Partial, schema-less document model.
//!
//! A [`Document`] wraps a parsed manifest whose root is guaranteed to be a
//! mapping. Everything below the root is open: any field may be missing, and
//! lookups never fail. A lookup yields a [`Field`], which keeps "absent" apart
//! from "present" (including present-but-`null`), and the typed accessors on
//! [`Field`] yield a [`Typed`], which additionally reports a type mismatch
//! without conflating it with absence.

use std::path::Path;

use serde_json::{Map, Value};

use crate::error::InputError;

/// Serialization format of a raw document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
}

impl DocumentFormat {
    /// `.json` files are JSON; everything else is treated as YAML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Yaml,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Yaml => "yaml",
        }
    }
}

/// Short name of a value's kind, used in messages and errors.
pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "mapping",
    }
}

/// An immutable manifest whose root is a mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    root: Value,
}

impl Document {
    /// Wrap an already-parsed value.
    ///
    /// # Errors
    ///
    /// `InputError::NotAnObject` if the root is not a mapping.
    pub fn from_value(root: Value) -> Result<Self, InputError> {
        if root.is_object() {
            Ok(Self { root })
        } else {
            Err(InputError::NotAnObject {
                found: value_kind(&root),
            })
        }
    }

    /// Parse raw text in the given format.
    pub fn parse(text: &str, format: DocumentFormat) -> Result<Self, InputError> {
        let root: Value = match format {
            DocumentFormat::Json => {
                serde_json::from_str(text).map_err(|e| InputError::Parse {
                    format: format.as_str(),
                    message: e.to_string(),
                })?
            }
            DocumentFormat::Yaml => {
                serde_yaml::from_str(text).map_err(|e| InputError::Parse {
                    format: format.as_str(),
                    message: e.to_string(),
                })?
            }
        };
        Self::from_value(root)
    }

    pub fn parse_json(text: &str) -> Result<Self, InputError> {
        Self::parse(text, DocumentFormat::Json)
    }

    pub fn parse_yaml(text: &str) -> Result<Self, InputError> {
        Self::parse(text, DocumentFormat::Yaml)
    }

    pub fn root(&self) -> &Value {
        &self.root
    }

    /// Look up a dotted path such as `spec.metrics.accuracy`.
    ///
    /// Use [`Document::path`] when a key itself contains dots
    /// (e.g. `prometheus.io/scrape`).
    pub fn get(&self, dotted: &str) -> Field<'_> {
        dotted
            .split('.')
            .fold(Field::Present(&self.root), |field, key| field.get(key))
    }

    /// Look up a path given as explicit segments.
    pub fn path(&self, segments: &[&str]) -> Field<'_> {
        segments
            .iter()
            .fold(Field::Present(&self.root), |field, key| field.get(key))
    }
}

/// Outcome of a total path lookup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Field<'a> {
    Absent,
    Present(&'a Value),
}

/// Outcome of a typed read on a [`Field`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Typed<T> {
    Absent,
    Value(T),
    Mismatch { found: &'static str },
}

impl<T> Typed<T> {
    pub fn ok(self) -> Option<T> {
        match self {
            Typed::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Typed::Absent)
    }
}

impl<'a> From<&'a Value> for Field<'a> {
    fn from(value: &'a Value) -> Self {
        Field::Present(value)
    }
}

impl<'a> Field<'a> {
    pub fn is_present(self) -> bool {
        matches!(self, Field::Present(_))
    }

    pub fn is_absent(self) -> bool {
        matches!(self, Field::Absent)
    }

    pub fn value(self) -> Option<&'a Value> {
        match self {
            Field::Present(v) => Some(v),
            Field::Absent => None,
        }
    }

    /// Descend into a mapping key. Anything that is not a mapping, or a
    /// mapping without the key, yields `Absent`.
    pub fn get(self, key: &str) -> Field<'a> {
        match self {
            Field::Present(Value::Object(map)) => match map.get(key) {
                Some(v) => Field::Present(v),
                None => Field::Absent,
            },
            _ => Field::Absent,
        }
    }

    fn typed<T>(self, read: impl FnOnce(&'a Value) -> Option<T>) -> Typed<T> {
        match self {
            Field::Absent => Typed::Absent,
            Field::Present(v) => match read(v) {
                Some(t) => Typed::Value(t),
                None => Typed::Mismatch {
                    found: value_kind(v),
                },
            },
        }
    }

    pub fn number(self) -> Typed<f64> {
        self.typed(Value::as_f64)
    }

    pub fn str(self) -> Typed<&'a str> {
        self.typed(Value::as_str)
    }

    pub fn bool(self) -> Typed<bool> {
        self.typed(Value::as_bool)
    }

    pub fn list(self) -> Typed<&'a [Value]> {
        self.typed(|v| v.as_array().map(Vec::as_slice))
    }

    pub fn map(self) -> Typed<&'a Map<String, Value>> {
        self.typed(Value::as_object)
    }

    /// Present and literally `true`.
    pub fn is_true(self) -> bool {
        matches!(self, Field::Present(Value::Bool(true)))
    }

    /// Absent or literally `false`. Any other present value counts as set.
    pub fn is_falsy(self) -> bool {
        matches!(self, Field::Absent | Field::Present(Value::Bool(false)))
    }

    /// Items of a list field; absent or non-list fields yield no items.
    pub fn items(self) -> impl Iterator<Item = Field<'a>> {
        self.list()
            .ok()
            .unwrap_or_default()
            .iter()
            .map(Field::Present)
    }
}
