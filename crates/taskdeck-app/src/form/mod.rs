//! Form state: field values, touched set, and per-field validity
//!
//! Validity is recomputed on every change. Errors are only shown for touched
//! fields; a rejected submit touches every field.

pub mod schema;

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use thiserror::Error;

pub use schema::{FieldRule, FieldSpec, FormSchema, ProjectSchema, TaskSchema};

/// Why a field value is invalid
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("is required")]
    Required,

    #[error("must be at least {min} characters")]
    TooShort { min: usize },

    #[error("is not an allowed value")]
    NotAllowed,

    #[error("is not a valid id")]
    InvalidId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validity {
    Valid,
    Invalid(FieldError),
}

impl Validity {
    pub fn is_valid(&self) -> bool {
        matches!(self, Validity::Valid)
    }

    pub fn error(&self) -> Option<&FieldError> {
        match self {
            Validity::Valid => None,
            Validity::Invalid(e) => Some(e),
        }
    }
}

/// Form-level failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("unknown field: {0}")]
    UnknownField(String),

    #[error("invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

/// One field as presented to the render layer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldView {
    pub name: &'static str,
    pub label: &'static str,
    pub value: String,
    pub touched: bool,
    pub valid: bool,
    /// Present only once the field has been touched
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Values, touched flags, and validity for a fixed set of fields
#[derive(Debug, Clone)]
pub struct FormState {
    fields: &'static [FieldSpec],
    values: BTreeMap<&'static str, String>,
    touched: BTreeSet<&'static str>,
    validity: BTreeMap<&'static str, Validity>,
    pub submitting: bool,
    pub submit_error: Option<String>,
}

impl FormState {
    /// Create a form with every field empty except `defaults`
    pub fn new(fields: &'static [FieldSpec], defaults: &[(&'static str, String)]) -> Self {
        let mut form = Self {
            fields,
            values: fields.iter().map(|f| (f.name, String::new())).collect(),
            touched: BTreeSet::new(),
            validity: BTreeMap::new(),
            submitting: false,
            submit_error: None,
        };
        for (name, value) in defaults {
            form.values.insert(*name, value.clone());
        }
        form.validate_all();
        form
    }

    fn spec(&self, name: &str) -> Result<&'static FieldSpec, FormError> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .ok_or_else(|| FormError::UnknownField(name.to_string()))
    }

    /// Set a field's value and revalidate it
    pub fn set(&mut self, name: &str, value: impl Into<String>) -> Result<(), FormError> {
        let spec = self.spec(name)?;
        let value = value.into();
        self.validity.insert(spec.name, spec.validate(&value));
        self.values.insert(spec.name, value);
        Ok(())
    }

    /// Mark a field touched (blur) without changing its value
    pub fn touch(&mut self, name: &str) -> Result<(), FormError> {
        let spec = self.spec(name)?;
        self.touched.insert(spec.name);
        Ok(())
    }

    pub fn touch_all(&mut self) {
        self.touched.extend(self.fields.iter().map(|f| f.name));
    }

    /// Replace every value present in `values` and clear touched flags
    pub fn seed(&mut self, values: &[(&'static str, String)]) {
        for (name, value) in values {
            if self.values.contains_key(name) {
                self.values.insert(*name, value.clone());
            }
        }
        self.touched.clear();
        self.validate_all();
    }

    pub fn validate_all(&mut self) {
        for spec in self.fields {
            let value = self.values.get(spec.name).map(String::as_str).unwrap_or("");
            self.validity.insert(spec.name, spec.validate(value));
        }
    }

    pub fn is_valid(&self) -> bool {
        self.validity.values().all(Validity::is_valid)
    }

    pub fn value(&self, name: &str) -> &str {
        self.values.get(name).map(String::as_str).unwrap_or("")
    }

    /// Value with blank collapsed to `None`
    pub fn optional(&self, name: &str) -> Option<String> {
        let value = self.value(name);
        if value.trim().is_empty() {
            None
        } else {
            Some(value.to_string())
        }
    }

    pub fn is_touched(&self, name: &str) -> bool {
        self.touched.contains(name)
    }

    pub fn validity(&self, name: &str) -> Option<&Validity> {
        self.validity.get(name)
    }

    pub fn fields(&self) -> &'static [FieldSpec] {
        self.fields
    }

    /// Render-ready view of every field, in declaration order
    pub fn field_views(&self) -> Vec<FieldView> {
        self.fields
            .iter()
            .map(|spec| {
                let validity = self.validity.get(spec.name);
                let touched = self.is_touched(spec.name);
                FieldView {
                    name: spec.name,
                    label: spec.label,
                    value: self.value(spec.name).to_string(),
                    touched,
                    valid: validity.map_or(true, Validity::is_valid),
                    error: validity
                        .and_then(Validity::error)
                        .filter(|_| touched)
                        .map(|e| format!("{} {}", spec.label, e)),
                }
            })
            .collect()
    }
}
