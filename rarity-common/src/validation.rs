//! Validation error reporting
//!
//! [`ValidationReporter`] collects structural failures found while checking a
//! collection, keyed by token id, and prints them in insertion order. One
//! reporter is created per validation run and dropped afterwards.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Write;
use tracing::warn;

/// Message attached to a single failing field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub message: String,
}

/// Per-field messages for one failing document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    pub errors: BTreeMap<String, FieldError>,
}

impl ValidationError {
    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.insert(
            field.into(),
            FieldError {
                message: message.into(),
            },
        );
    }

    pub fn message(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(|e| e.message.as_str())
    }
}

/// A document that failed validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationFailure {
    pub token_id: String,
    /// Failing field names, in report order
    pub keys: Vec<String>,
    pub validation_error: ValidationError,
}

/// Ordered accumulator of validation failures
#[derive(Debug, Default)]
pub struct ValidationReporter {
    errors: Vec<ValidationFailure>,
}

impl ValidationReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one failure
    pub fn add_error(&mut self, failure: ValidationFailure) -> bool {
        self.errors.push(failure);
        true
    }

    /// Replace every stored failure
    pub fn store_errors(&mut self, failures: Vec<ValidationFailure>) -> bool {
        self.errors = failures;
        true
    }

    pub fn get_errors(&self) -> &[ValidationFailure] {
        &self.errors
    }

    pub fn has_error(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Write a human-readable report of every failure to `out`
    pub fn print_errors<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        if self.errors.is_empty() {
            writeln!(out, "⚠️ No error stored ⚠️")?;
            return Ok(());
        }

        warn!(count = self.errors.len(), "Validation failures recorded");

        for failure in &self.errors {
            writeln!(
                out,
                "❗ Validation error occurred for token #{} ❗",
                failure.token_id
            )?;
            for key in &failure.keys {
                if let Some(message) = failure.validation_error.message(key) {
                    writeln!(out, "❗ {} ❗", message)?;
                }
            }
            writeln!(out)?;
        }

        Ok(())
    }
}
