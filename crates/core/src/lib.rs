//! Foodcart Core - Shared types library.
//!
//! This crate provides common types used across all Foodcart components:
//! - `server` - HTTP backend for order intake and fulfillment planning
//! - `cli` - Command-line tools for migrations and management
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, phone numbers, and order
//!   lifecycle enums

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
