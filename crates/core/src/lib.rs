//! Scan Station Core - Shared domain types.
//!
//! This crate provides the types shared by the scan station proxy:
//! - `scan-station` - HTTP proxy between the warehouse UI and its upstreams
//! - `integration-tests` - End-to-end tests of the proxy router
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients. Everything here can be unit tested without a runtime.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, prices, quantities, loose text, order names and tags

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
