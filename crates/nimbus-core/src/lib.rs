//! # Nimbus Core
//!
//! The domain layer of the user-management service.
//! This crate contains the data shapes and provider ports with zero
//! infrastructure dependencies. The service owns no state of its own;
//! everything here describes what we send to and read back from the
//! external identity/storage provider.

pub mod domain;
pub mod error;
pub mod ports;

pub use error::StoreError;
