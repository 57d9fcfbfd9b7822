//! Core types for the scan station.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod price;
pub mod quantity;
pub mod tags;
pub mod text;

pub use id::*;
pub use price::Price;
pub use quantity::Quantity;
pub use tags::{DeliveryMethod, TagList, parcel_count_from_tags};
pub use text::{LooseString, OrderName};
