//! Line item quantities.
//!
//! Like ids, quantities come from `<input>` values and may arrive as JSON
//! numbers or numeric strings.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// A non-negative item count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Quantity(u32);

impl Quantity {
    /// Create a quantity.
    #[must_use]
    pub const fn new(count: u32) -> Self {
        Self(count)
    }

    /// Get the count.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Zero becomes one; Shopify rejects empty lines.
    #[must_use]
    pub const fn at_least_one(self) -> Self {
        if self.0 == 0 { Self(1) } else { self }
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for Quantity {
    fn from(count: u32) -> Self {
        Self(count)
    }
}

impl<'de> Deserialize<'de> for Quantity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct QuantityVisitor;

        impl serde::de::Visitor<'_> for QuantityVisitor {
            type Value = Quantity;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a whole quantity or a numeric string")
            }

            fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<Quantity, E> {
                u32::try_from(v)
                    .map(Quantity)
                    .map_err(|_| E::custom(format!("quantity out of range: {v}")))
            }

            fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<Quantity, E> {
                u32::try_from(v)
                    .map(Quantity)
                    .map_err(|_| E::custom(format!("quantity out of range: {v}")))
            }

            fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<Quantity, E> {
                v.trim()
                    .parse::<u32>()
                    .map(Quantity)
                    .map_err(|_| E::custom(format!("invalid quantity: {v:?}")))
            }
        }

        deserializer.deserialize_any(QuantityVisitor)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_quantity_from_number_or_string() {
        let from_number: Quantity = serde_json::from_value(json!(2)).unwrap();
        let from_string: Quantity = serde_json::from_value(json!(" 2 ")).unwrap();
        assert_eq!(from_number, Quantity::new(2));
        assert_eq!(from_string, from_number);
    }

    #[test]
    fn test_quantity_rejects_garbage() {
        assert!(serde_json::from_value::<Quantity>(json!("two")).is_err());
        assert!(serde_json::from_value::<Quantity>(json!(-1)).is_err());
        assert!(serde_json::from_value::<Quantity>(json!(1.5)).is_err());
    }

    #[test]
    fn test_quantity_zero_becomes_one() {
        assert_eq!(Quantity::new(0).at_least_one(), Quantity::new(1));
        assert_eq!(Quantity::new(4).at_least_one(), Quantity::new(4));
    }

    #[test]
    fn test_quantity_serializes_as_number() {
        assert_eq!(serde_json::to_value(Quantity::new(3)).unwrap(), json!(3));
    }
}
