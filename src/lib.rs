//! Storefront Backend API
//!
//! Layered self-hosted e-commerce backend.
//!
//! ## Features
//! - Product catalog and categories
//! - Per-user carts with merge-on-add
//! - Order placement with price snapshotting
//! - Hosted-checkout payment reconciliation
//! - Soft-delete persistence with a unit-of-work commit point

pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod services;
pub mod store;

#[cfg(test)]
pub(crate) mod test_utils;

pub use error::{Error, Result};
