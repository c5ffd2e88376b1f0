//! # Nimbus Supabase
//!
//! Concrete implementations of the ports defined in `nimbus-core`, backed
//! by the Supabase platform: GoTrue for authentication, PostgREST for row
//! storage. Every call is a single-shot HTTP request; there is no retry,
//! caching, or timeout layer in this crate.

pub mod client;
pub mod config;
pub mod rows;
pub mod wire;

pub use client::SupabaseClient;
pub use config::{ConfigError, SupabaseConfig};
