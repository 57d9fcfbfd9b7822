//! Business rules derived from Shopify tags.
//!
//! Staff encode warehouse hints as tags: orders carry `parcel_count_<n>` and
//! customers carry `delivery` or `pickup`.

use serde::{Deserialize, Deserializer, Serialize};

const PARCEL_COUNT_PREFIX: &str = "parcel_count_";

/// Extract the parcel count from an order's comma-separated tag string.
///
/// Tags are trimmed and lower-cased; only the first tag of the exact form
/// `parcel_count_<digits>` is considered. Returns `None` when no tag matches
/// or that tag's digits overflow.
#[must_use]
pub fn parcel_count_from_tags(tags: &str) -> Option<u64> {
    let tag = tags
        .split(',')
        .map(|tag| tag.trim().to_lowercase())
        .find(|tag| {
            tag.strip_prefix(PARCEL_COUNT_PREFIX).is_some_and(|digits| {
                !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
            })
        })?;

    tag.strip_prefix(PARCEL_COUNT_PREFIX)?.parse().ok()
}

/// How a customer receives their goods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMethod {
    /// Courier delivery (`delivery` tag).
    Deliver,
    /// Collected from the warehouse (`pickup` tag).
    Pickup,
}

impl DeliveryMethod {
    /// Derive the delivery method from a customer's tags (case-insensitive).
    ///
    /// `pickup` takes precedence over `delivery` when both are present.
    #[must_use]
    pub fn from_tags<S: AsRef<str>>(tags: &[S]) -> Option<Self> {
        let has = |wanted: &str| {
            tags.iter()
                .any(|tag| tag.as_ref().trim().eq_ignore_ascii_case(wanted))
        };

        if has("pickup") {
            Some(Self::Pickup)
        } else if has("delivery") {
            Some(Self::Deliver)
        } else {
            None
        }
    }
}

/// A tag list that Shopify may render as an array or a comma-separated string.
///
/// The REST Admin API returns customer tags as `"a, b"` while webhook and
/// GraphQL payloads use `["a", "b"]`; both deserialize to the same list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TagList(Vec<String>);

impl TagList {
    /// Borrow the individual tags.
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl<'de> Deserialize<'de> for TagList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            List(Vec<serde_json::Value>),
            Joined(String),
            Missing(()),
        }

        let tags = match Raw::deserialize(deserializer)? {
            Raw::List(values) => values
                .into_iter()
                .map(|value| match value {
                    serde_json::Value::String(s) => s,
                    other => other.to_string(),
                })
                .collect(),
            Raw::Joined(joined) => joined
                .split(',')
                .map(str::trim)
                .filter(|tag| !tag.is_empty())
                .map(String::from)
                .collect(),
            Raw::Missing(()) => Vec::new(),
        };

        Ok(Self(tags))
    }
}
