//! Storage-port error types.

use thiserror::Error;

/// Errors surfaced by the provider's table operations.
///
/// Two categories: the provider acknowledged the operation but reported
/// that it did not apply (`Rejected` - a client-attributable failure),
/// or the call itself failed in transport, status, or payload shape
/// (`Provider`).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    Rejected(String),

    #[error("storage call failed: {0}")]
    Provider(String),
}
