//! Juniper Core - Shared types library.
//!
//! This crate provides common types used across all Juniper components:
//! - `storefront` - Headless storefront service and core logic
//! - `cli` - Command-line tools for catalog maintenance
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no
//! platform access. This keeps it lightweight and allows it to be used
//! anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, price ranges,
//!   and emails

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
