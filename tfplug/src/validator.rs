//! Attribute validators
//!
//! Validators run against configuration values during planning, before
//! any remote call is made.

use crate::types::{AttributePath, Diagnostic, Dynamic};

pub trait Validator: Send + Sync {
    /// Human-readable description
    fn description(&self) -> String;

    fn validate(&self, value: &Dynamic, path: &AttributePath, diagnostics: &mut Vec<Diagnostic>);
}

/// Requires string values to match a regular expression.
pub struct StringPatternValidator {
    pub pattern: regex::Regex,
    pub description: String,
}

impl StringPatternValidator {
    pub fn new(pattern: &str, description: &str) -> Self {
        Self {
            pattern: regex::Regex::new(pattern).expect("invalid validator pattern"),
            description: description.to_string(),
        }
    }
}

impl Validator for StringPatternValidator {
    fn description(&self) -> String {
        self.description.clone()
    }

    fn validate(&self, value: &Dynamic, path: &AttributePath, diagnostics: &mut Vec<Diagnostic>) {
        if let Dynamic::String(s) = value {
            if !self.pattern.is_match(s) {
                diagnostics.push(
                    Diagnostic::error(
                        format!("Invalid value for {}", path),
                        format!("'{}' must be {}", s, self.description),
                    )
                    .with_attribute(path.clone()),
                );
            }
        }
    }
}

/// Bounds the length of string values.
pub struct StringLengthValidator {
    pub min: Option<usize>,
    pub max: Option<usize>,
}

impl Validator for StringLengthValidator {
    fn description(&self) -> String {
        match (self.min, self.max) {
            (Some(min), Some(max)) => format!("a string between {} and {} characters", min, max),
            (Some(min), None) => format!("a string of at least {} characters", min),
            (None, Some(max)) => format!("a string of at most {} characters", max),
            (None, None) => "a string".to_string(),
        }
    }

    fn validate(&self, value: &Dynamic, path: &AttributePath, diagnostics: &mut Vec<Diagnostic>) {
        if let Dynamic::String(s) = value {
            let out_of_bounds = self.min.is_some_and(|min| s.len() < min)
                || self.max.is_some_and(|max| s.len() > max);
            if out_of_bounds {
                diagnostics.push(
                    Diagnostic::error(
                        format!("Invalid value for {}", path),
                        format!("expected {}, got length {}", self.description(), s.len()),
                    )
                    .with_attribute(path.clone()),
                );
            }
        }
    }
}
