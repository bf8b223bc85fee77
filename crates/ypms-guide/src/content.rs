//! Loosely-typed step `content` accessors.
//!
//! A step's `content` shape depends on its `type` (string, list of strings,
//! or object) per `spec.md` §4.4, so steps carry it as a raw [`sonic_rs::Value`]
//! and pull out what they need through these helpers rather than a fixed
//! `#[derive(Deserialize)]` struct.

use ypms_core::{Error, Result};

/// Read `content` as a single string.
pub fn as_str<'a>(content: &'a sonic_rs::Value, step_type: &str) -> Result<&'a str> {
    content
        .as_str()
        .ok_or_else(|| Error::validation(format!("{step_type} step content must be a string")))
}

/// Read a required string field out of an object-shaped `content`.
pub fn field_str<'a>(content: &'a sonic_rs::Value, field: &str, step_type: &str) -> Result<&'a str> {
    content
        .get(field)
        .and_then(|v| v.as_str())
        .ok_or_else(|| Error::validation(format!("{step_type} step content.{field} must be a string")))
}
