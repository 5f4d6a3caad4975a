//! Local HTTP message channel.
//!
//! # Responsibilities
//! - Define the Axum router with the message and health routes.
//! - Inject shared application state (`AppState`) into handlers.
//! - Translate [`common::ServiceError`] into status codes and error bodies.

pub mod handlers;
pub mod router;
pub mod state;
