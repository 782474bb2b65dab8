//! Core value types shared between the host and providers
//!
//! Configuration and state travel as [`DynamicValue`]s: schemaless trees
//! the host encodes as msgpack. Always go through the typed accessors
//! rather than matching on [`Dynamic`] directly.

use crate::error::{Result, TfplugError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A host-supplied value of any type.
///
/// `Unknown` marks a value the host has not computed yet (it only occurs
/// during planning); `Null` is an explicit absence.
#[derive(Debug, Clone, PartialEq)]
pub enum Dynamic {
    Null,
    Bool(bool),
    /// All numbers are f64 to match the host's type system
    Number(f64),
    String(String),
    /// Ordered, allows duplicates
    List(Vec<Dynamic>),
    Map(HashMap<String, Dynamic>),
    Unknown,
}

const UNKNOWN_SENTINEL: &str = "__unknown__";

impl Serialize for Dynamic {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Dynamic::Null => serializer.serialize_unit(),
            Dynamic::Bool(b) => serializer.serialize_bool(*b),
            Dynamic::Number(n) => serializer.serialize_f64(*n),
            Dynamic::String(s) => serializer.serialize_str(s),
            Dynamic::List(l) => l.serialize(serializer),
            Dynamic::Map(m) => m.serialize(serializer),
            Dynamic::Unknown => serializer.serialize_str(UNKNOWN_SENTINEL),
        }
    }
}

impl<'de> Deserialize<'de> for Dynamic {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::{self, Visitor};
        use std::fmt;

        struct DynamicVisitor;

        impl<'de> Visitor<'de> for DynamicVisitor {
            type Value = Dynamic;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a dynamic value")
            }

            fn visit_unit<E: de::Error>(self) -> std::result::Result<Dynamic, E> {
                Ok(Dynamic::Null)
            }

            fn visit_none<E: de::Error>(self) -> std::result::Result<Dynamic, E> {
                Ok(Dynamic::Null)
            }

            fn visit_bool<E: de::Error>(self, value: bool) -> std::result::Result<Dynamic, E> {
                Ok(Dynamic::Bool(value))
            }

            fn visit_i64<E: de::Error>(self, value: i64) -> std::result::Result<Dynamic, E> {
                Ok(Dynamic::Number(value as f64))
            }

            fn visit_u64<E: de::Error>(self, value: u64) -> std::result::Result<Dynamic, E> {
                Ok(Dynamic::Number(value as f64))
            }

            fn visit_f64<E: de::Error>(self, value: f64) -> std::result::Result<Dynamic, E> {
                Ok(Dynamic::Number(value))
            }

            fn visit_str<E: de::Error>(self, value: &str) -> std::result::Result<Dynamic, E> {
                if value == UNKNOWN_SENTINEL {
                    Ok(Dynamic::Unknown)
                } else {
                    Ok(Dynamic::String(value.to_string()))
                }
            }

            fn visit_seq<V>(self, mut seq: V) -> std::result::Result<Dynamic, V::Error>
            where
                V: de::SeqAccess<'de>,
            {
                let mut vec = Vec::new();
                while let Some(elem) = seq.next_element()? {
                    vec.push(elem);
                }
                Ok(Dynamic::List(vec))
            }

            fn visit_map<V>(self, mut map: V) -> std::result::Result<Dynamic, V::Error>
            where
                V: de::MapAccess<'de>,
            {
                let mut values = HashMap::new();
                while let Some((key, value)) = map.next_entry()? {
                    values.insert(key, value);
                }
                Ok(Dynamic::Map(values))
            }
        }

        deserializer.deserialize_any(DynamicVisitor)
    }
}

/// The unit of exchange with the host: a [`Dynamic`] tree plus its
/// encoding/decoding and typed path access.
#[derive(Debug, Clone, PartialEq)]
pub struct DynamicValue {
    pub value: Dynamic,
}

impl DynamicValue {
    pub fn new(value: Dynamic) -> Self {
        Self { value }
    }

    /// An empty object, the usual starting point for building state.
    pub fn empty_object() -> Self {
        Self {
            value: Dynamic::Map(HashMap::new()),
        }
    }

    pub fn null() -> Self {
        Self {
            value: Dynamic::Null,
        }
    }

    pub fn unknown() -> Self {
        Self {
            value: Dynamic::Unknown,
        }
    }

    /// The host exchanges values as msgpack; a null value is zero bytes.
    pub fn encode_msgpack(&self) -> Result<Vec<u8>> {
        match &self.value {
            Dynamic::Null => Ok(vec![]),
            Dynamic::Map(map) => rmp_serde::encode::to_vec(map)
                .map_err(|e| TfplugError::Encoding(format!("msgpack encoding failed: {}", e))),
            _ => rmp_serde::encode::to_vec(&self.value)
                .map_err(|e| TfplugError::Encoding(format!("msgpack encoding failed: {}", e))),
        }
    }

    pub fn decode_msgpack(data: &[u8]) -> Result<Self> {
        if data.is_empty() {
            return Ok(Self::null());
        }

        match rmp_serde::decode::from_slice::<HashMap<String, Dynamic>>(data) {
            Ok(map) => Ok(Self {
                value: Dynamic::Map(map),
            }),
            Err(_) => rmp_serde::decode::from_slice::<Dynamic>(data)
                .map(|value| Self { value })
                .map_err(|e| TfplugError::Decoding(format!("msgpack decoding failed: {}", e))),
        }
    }

    pub fn encode_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(&self.value)
            .map_err(|e| TfplugError::Encoding(format!("json encoding failed: {}", e)))
    }

    pub fn decode_json(data: &[u8]) -> Result<Self> {
        let value = serde_json::from_slice(data)
            .map_err(|e| TfplugError::Decoding(format!("json decoding failed: {}", e)))?;
        Ok(Self { value })
    }

    pub fn get_string(&self, path: &AttributePath) -> Result<String> {
        match self.navigate(path)? {
            Dynamic::String(s) => Ok(s.clone()),
            other => Err(type_mismatch("string", other)),
        }
    }

    pub fn get_number(&self, path: &AttributePath) -> Result<f64> {
        match self.navigate(path)? {
            Dynamic::Number(n) => Ok(*n),
            other => Err(type_mismatch("number", other)),
        }
    }

    pub fn get_bool(&self, path: &AttributePath) -> Result<bool> {
        match self.navigate(path)? {
            Dynamic::Bool(b) => Ok(*b),
            other => Err(type_mismatch("bool", other)),
        }
    }

    pub fn get_list(&self, path: &AttributePath) -> Result<Vec<Dynamic>> {
        match self.navigate(path)? {
            Dynamic::List(l) => Ok(l.clone()),
            other => Err(type_mismatch("list", other)),
        }
    }

    /// Convenience accessor for the common list-of-strings attribute.
    pub fn get_string_list(&self, path: &AttributePath) -> Result<Vec<String>> {
        self.get_list(path)?
            .into_iter()
            .map(|elem| match elem {
                Dynamic::String(s) => Ok(s),
                other => Err(type_mismatch("string", &other)),
            })
            .collect()
    }

    pub fn get_map(&self, path: &AttributePath) -> Result<HashMap<String, Dynamic>> {
        match self.navigate(path)? {
            Dynamic::Map(m) => Ok(m.clone()),
            other => Err(type_mismatch("map", other)),
        }
    }

    pub fn set_string(&mut self, path: &AttributePath, value: String) -> Result<()> {
        self.set_value(path, Dynamic::String(value))
    }

    pub fn set_number(&mut self, path: &AttributePath, value: f64) -> Result<()> {
        self.set_value(path, Dynamic::Number(value))
    }

    pub fn set_bool(&mut self, path: &AttributePath, value: bool) -> Result<()> {
        self.set_value(path, Dynamic::Bool(value))
    }

    pub fn set_list(&mut self, path: &AttributePath, value: Vec<Dynamic>) -> Result<()> {
        self.set_value(path, Dynamic::List(value))
    }

    pub fn set_string_list(&mut self, path: &AttributePath, values: Vec<String>) -> Result<()> {
        self.set_value(
            path,
            Dynamic::List(values.into_iter().map(Dynamic::String).collect()),
        )
    }

    pub fn set_null(&mut self, path: &AttributePath) -> Result<()> {
        self.set_value(path, Dynamic::Null)
    }

    pub fn is_null(&self) -> bool {
        matches!(self.value, Dynamic::Null)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self.value, Dynamic::Unknown)
    }

    /// Whether the value at `path` is absent, null, or unknown.
    pub fn is_null_or_unknown(&self, path: &AttributePath) -> bool {
        match self.navigate(path) {
            Ok(Dynamic::Null) | Ok(Dynamic::Unknown) | Err(_) => true,
            Ok(_) => false,
        }
    }

    /// Whether the value at `path` is unknown (not yet computed by the host).
    pub fn is_unknown_at(&self, path: &AttributePath) -> bool {
        matches!(self.navigate(path), Ok(Dynamic::Unknown))
    }

    /// Mark a computed value as unknown during planning.
    pub fn mark_unknown(&mut self, path: &AttributePath) -> Result<()> {
        self.set_value(path, Dynamic::Unknown)
    }

    /// The value at `path`, or `Null` when absent.
    pub fn get(&self, path: &AttributePath) -> Dynamic {
        self.navigate(path).cloned().unwrap_or(Dynamic::Null)
    }

    pub fn set_value(&mut self, path: &AttributePath, new_value: Dynamic) -> Result<()> {
        if path.steps.is_empty() {
            self.value = new_value;
            return Ok(());
        }

        if !matches!(self.value, Dynamic::Map(_)) {
            self.value = Dynamic::Map(HashMap::new());
        }

        let mut current = &mut self.value;
        let last_idx = path.steps.len() - 1;

        for (idx, step) in path.steps.iter().enumerate() {
            let at_end = idx == last_idx;
            match (current, step) {
                (Dynamic::Map(m), AttributePathStep::AttributeName(name))
                | (Dynamic::Map(m), AttributePathStep::ElementKeyString(name)) => {
                    if at_end {
                        m.insert(name.clone(), new_value);
                        return Ok(());
                    }
                    current =
                        m.entry(name.clone())
                            .or_insert_with(|| match path.steps.get(idx + 1) {
                                Some(AttributePathStep::ElementKeyInt(_)) => {
                                    Dynamic::List(Vec::new())
                                }
                                _ => Dynamic::Map(HashMap::new()),
                            });
                }
                (Dynamic::List(l), AttributePathStep::ElementKeyInt(i)) => {
                    let i = *i as usize;
                    if i >= l.len() {
                        return Err(TfplugError::Custom(format!(
                            "list index {} out of bounds",
                            i
                        )));
                    }
                    if at_end {
                        l[i] = new_value;
                        return Ok(());
                    }
                    current = &mut l[i];
                }
                _ => return Err(TfplugError::Custom("invalid path navigation".to_string())),
            }
        }

        unreachable!("loop always returns on the final step")
    }

    fn navigate<'a>(&'a self, path: &AttributePath) -> Result<&'a Dynamic> {
        let mut current = &self.value;

        for step in &path.steps {
            current = match (current, step) {
                (Dynamic::Map(m), AttributePathStep::AttributeName(name))
                | (Dynamic::Map(m), AttributePathStep::ElementKeyString(name)) => {
                    m.get(name).ok_or_else(|| {
                        TfplugError::Custom(format!("attribute '{}' not found", name))
                    })?
                }
                (Dynamic::List(l), AttributePathStep::ElementKeyInt(idx)) => {
                    l.get(*idx as usize).ok_or_else(|| {
                        TfplugError::Custom(format!("list index {} out of bounds", idx))
                    })?
                }
                _ => return Err(TfplugError::Custom("invalid path navigation".to_string())),
            };
        }

        Ok(current)
    }
}

fn type_mismatch(expected: &str, actual: &Dynamic) -> TfplugError {
    TfplugError::TypeMismatch {
        expected: expected.to_string(),
        actual: type_name(actual).to_string(),
    }
}

fn type_name(value: &Dynamic) -> &'static str {
    match value {
        Dynamic::Null => "null",
        Dynamic::Bool(_) => "bool",
        Dynamic::Number(_) => "number",
        Dynamic::String(_) => "string",
        Dynamic::List(_) => "list",
        Dynamic::Map(_) => "map",
        Dynamic::Unknown => "unknown",
    }
}

/// Path to an attribute inside a [`DynamicValue`].
#[derive(Debug, Clone, PartialEq)]
pub struct AttributePath {
    pub steps: Vec<AttributePathStep>,
}

impl AttributePath {
    pub fn new(name: &str) -> Self {
        Self {
            steps: vec![AttributePathStep::AttributeName(name.to_string())],
        }
    }

    pub fn root() -> Self {
        Self { steps: Vec::new() }
    }

    pub fn attribute(mut self, name: &str) -> Self {
        self.steps
            .push(AttributePathStep::AttributeName(name.to_string()));
        self
    }

    pub fn index(mut self, idx: i64) -> Self {
        self.steps.push(AttributePathStep::ElementKeyInt(idx));
        self
    }

    pub fn key(mut self, key: &str) -> Self {
        self.steps
            .push(AttributePathStep::ElementKeyString(key.to_string()));
        self
    }
}

impl std::fmt::Display for AttributePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (idx, step) in self.steps.iter().enumerate() {
            match step {
                AttributePathStep::AttributeName(name) => {
                    if idx > 0 {
                        write!(f, ".")?;
                    }
                    write!(f, "{}", name)?;
                }
                AttributePathStep::ElementKeyString(key) => write!(f, "[\"{}\"]", key)?,
                AttributePathStep::ElementKeyInt(i) => write!(f, "[{}]", i)?,
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttributePathStep {
    AttributeName(String),
    ElementKeyString(String),
    ElementKeyInt(i64),
}

/// A warning or error reported to the host's diagnostics channel.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: DiagnosticSeverity,
    pub summary: String,
    pub detail: String,
    pub attribute: Option<AttributePath>,
}

impl Diagnostic {
    pub fn error(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            severity: DiagnosticSeverity::Error,
            summary: summary.into(),
            detail: detail.into(),
            attribute: None,
        }
    }

    pub fn warning(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            severity: DiagnosticSeverity::Warning,
            summary: summary.into(),
            detail: detail.into(),
            attribute: None,
        }
    }

    pub fn with_attribute(mut self, path: AttributePath) -> Self {
        self.attribute = Some(path);
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == DiagnosticSeverity::Error
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DiagnosticSeverity {
    Error,
    Warning,
}

/// True when any diagnostic in the slice is an error.
pub fn has_errors(diagnostics: &[Diagnostic]) -> bool {
    diagnostics.iter().any(Diagnostic::is_error)
}
