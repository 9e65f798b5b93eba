//! Declared parameter schemas for tools, and the single validator that
//! every tool call goes through.

use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamKind {
    String,
    Number,
    Boolean,
    /// A string restricted to a literal set (case-sensitive).
    Enum,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Constraint {
    /// Number strictly greater than zero.
    Positive,
    /// String with at least one character and no surrounding whitespace.
    NonEmpty,
}

#[derive(Debug, Clone, Serialize)]
pub struct ParamSpec {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub kind: ParamKind,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(rename = "enum", skip_serializing_if = "no_values")]
    pub values: &'static [&'static str],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub constraint: Option<Constraint>,
    pub description: &'static str,
}

impl ParamSpec {
    fn new(name: &'static str, kind: ParamKind) -> Self {
        Self {
            name,
            kind,
            required: true,
            default: None,
            values: &[],
            constraint: None,
            description: "",
        }
    }

    pub fn string(name: &'static str) -> Self {
        Self::new(name, ParamKind::String)
    }

    pub fn number(name: &'static str) -> Self {
        Self::new(name, ParamKind::Number)
    }

    pub fn boolean(name: &'static str) -> Self {
        Self::new(name, ParamKind::Boolean)
    }

    pub fn one_of(name: &'static str, values: &'static [&'static str]) -> Self {
        Self {
            values,
            ..Self::new(name, ParamKind::Enum)
        }
    }

    /// Marks the parameter optional; the default is filled in during validation.
    pub fn with_default(mut self, default: Value) -> Self {
        self.required = false;
        self.default = Some(default);
        self
    }

    pub fn positive(mut self) -> Self {
        self.constraint = Some(Constraint::Positive);
        self
    }

    pub fn non_empty(mut self) -> Self {
        self.constraint = Some(Constraint::NonEmpty);
        self
    }

    pub fn describe(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    fn check(&self, value: &Value) -> Result<(), String> {
        match self.kind {
            ParamKind::String => {
                let text = value.as_str().ok_or("must be a string")?;
                if self.constraint == Some(Constraint::NonEmpty) {
                    if text.trim().is_empty() {
                        return Err("must not be empty".to_string());
                    }
                    if text.trim() != text {
                        return Err("must not have leading or trailing whitespace".to_string());
                    }
                }
            }
            ParamKind::Number => {
                let number = value.as_f64().ok_or("must be a number")?;
                if self.constraint == Some(Constraint::Positive) && number <= 0.0 {
                    return Err("must be greater than 0".to_string());
                }
            }
            ParamKind::Boolean => {
                value.as_bool().ok_or("must be a boolean")?;
            }
            ParamKind::Enum => {
                let literal = value.as_str();
                if !literal.is_some_and(|l| self.values.iter().any(|v| *v == l)) {
                    return Err(format!("must be one of {}", self.values.join(", ")));
                }
            }
        }
        Ok(())
    }
}

fn no_values(values: &&'static [&'static str]) -> bool {
    values.is_empty()
}

/// Ordered parameter list of a single tool.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct ParameterSchema {
    params: Vec<ParamSpec>,
}

impl ParameterSchema {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(params: Vec<ParamSpec>) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Validates `args` and returns a copy with defaults applied.
    ///
    /// All violations are collected before returning so a caller sees every
    /// offending field at once. Explicit `null` counts as absent.
    pub fn validate(&self, args: &Map<String, Value>) -> Result<Map<String, Value>, SchemaError> {
        let mut violations = Vec::new();

        for key in args.keys() {
            if !self.params.iter().any(|p| p.name == key.as_str()) {
                violations.push(FieldViolation::new(key.clone(), "unknown field"));
            }
        }

        let mut out = Map::new();
        for param in &self.params {
            match args.get(param.name).filter(|v| !v.is_null()) {
                Some(value) => match param.check(value) {
                    Ok(()) => {
                        out.insert(param.name.to_string(), value.clone());
                    }
                    Err(reason) => violations.push(FieldViolation::new(param.name, reason)),
                },
                None => match &param.default {
                    Some(default) => {
                        out.insert(param.name.to_string(), default.clone());
                    }
                    None if param.required => {
                        violations.push(FieldViolation::new(param.name, "is required"));
                    }
                    None => {}
                },
            }
        }

        if violations.is_empty() {
            Ok(out)
        } else {
            Err(SchemaError { violations })
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: String,
    pub reason: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("{}", join_violations(.violations))]
pub struct SchemaError {
    pub violations: Vec<FieldViolation>,
}

impl SchemaError {
    pub fn single(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            violations: vec![FieldViolation::new(field, reason)],
        }
    }

    pub fn fields(&self) -> Vec<String> {
        self.violations.iter().map(|v| v.field.clone()).collect()
    }
}

fn join_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
