//! Common types, message protocol, and errors shared across `tab-vault` crates.

pub mod error;
pub mod protocol;
pub mod session;

pub use error::ServiceError;
