//! Payload validation and normalization for full-snapshot writes.
//!
//! # Responsibility
//! - Reject payloads whose top-level shape is wrong before any mutation.
//! - Normalize lenient client input into flat rows ready for insertion.
//!
//! # Invariants
//! - Shape errors (`ValidationError`) are fatal; per-item hygiene problems
//!   (non-object entries, blank task text) only drop the offending item.

pub(crate) mod coerce;
pub mod plan;

use std::error::Error;
use std::fmt::{Display, Formatter};

pub use plan::ReplacePlan;

/// Maximum number of characters of an offending value echoed in errors.
const MAX_ECHOED_VALUE_CHARS: usize = 40;

/// Payload shape error raised before the store is touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Top-level payload is not a JSON object.
    PayloadNotObject,
    /// `standard` or `groups` is missing or not an array.
    MissingArray(&'static str),
    /// Group `duration` is present but is not an object.
    InvalidDuration { group_index: usize },
    /// A numeric group field cannot be coerced to an integer.
    NotAnInteger {
        group_index: usize,
        field: &'static str,
        value: String,
    },
    /// A duration component is below zero.
    NegativeDuration {
        group_index: usize,
        field: &'static str,
        value: i64,
    },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PayloadNotObject => write!(
                f,
                "Payload must be an object providing \"standard\" and \"groups\" arrays"
            ),
            Self::MissingArray(field) => write!(
                f,
                "Payload must provide \"standard\" and \"groups\" arrays (`{field}` is missing or not an array)"
            ),
            Self::InvalidDuration { group_index } => {
                write!(f, "groups[{group_index}].duration must be an object")
            }
            Self::NotAnInteger {
                group_index,
                field,
                value,
            } => write!(
                f,
                "groups[{group_index}].{field} must be an integer, got {value}"
            ),
            Self::NegativeDuration {
                group_index,
                field,
                value,
            } => write!(
                f,
                "groups[{group_index}].{field} must not be negative, got {value}"
            ),
        }
    }
}

impl Error for ValidationError {}

fn echo_value(value: &serde_json::Value) -> String {
    let rendered = value.to_string();
    let mut echoed = rendered
        .chars()
        .take(MAX_ECHOED_VALUE_CHARS)
        .collect::<String>();
    if rendered.chars().count() > MAX_ECHOED_VALUE_CHARS {
        echoed.push_str("...");
    }
    echoed
}
