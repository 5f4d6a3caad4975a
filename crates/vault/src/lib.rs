//! `vault` — background service that owns the session key and encrypts tab
//! sessions into portable envelopes.

pub mod codec;
pub mod config;
pub mod crypto;
pub mod key;
pub mod server;
pub mod service;
pub mod telemetry;
