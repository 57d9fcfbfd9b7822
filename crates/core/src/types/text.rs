//! Loosely-typed text fields coming from the browser.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// A text value that may arrive as a JSON string or a JSON number.
///
/// PO numbers and tracking numbers are typed into numeric inputs on some
/// stations and free-text inputs on others.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct LooseString(String);

impl LooseString {
    /// Wrap an owned string.
    #[must_use]
    pub const fn new(value: String) -> Self {
        Self(value)
    }

    /// Borrow the text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the value is empty after trimming.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for LooseString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LooseString {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl<'de> Deserialize<'de> for LooseString {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(serde_json::Number),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(text) => Self(text),
            Raw::Number(number) => Self(number.to_string()),
        })
    }
}

/// An order name as shown in Shopify admin (`#1001`).
///
/// Scanners read the bare number off the packing slip, so the leading `#`
/// is added when missing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct OrderName(String);

impl OrderName {
    /// Normalize a scanned or typed order name.
    #[must_use]
    pub fn normalize(raw: &str) -> Self {
        if raw.starts_with('#') {
            Self(raw.to_string())
        } else {
            Self(format!("#{raw}"))
        }
    }

    /// Borrow the normalized name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
