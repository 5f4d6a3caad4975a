//! HTTP/1 client for the vault message channel.
//!
//! Each call opens one connection, sends a single [`Message`] to
//! `POST /message` and waits for the reply. There is no timeout and no
//! retry; a hung vault hangs the caller.

use anyhow::{bail, Context, Result};
use common::protocol::{ErrorResponse, Message};
use http_body_util::{BodyExt, Full};
use hyper::{body::Bytes, header, Method, Request, StatusCode};
use hyper_util::rt::TokioIo;
use tokio::net::TcpStream;
use tracing::debug;

/// Sends messages to a running vault.
#[derive(Debug, Clone)]
pub struct VaultClient {
    addr: String,
}

impl VaultClient {
    /// Target the vault listening at `addr` (`host:port`).
    pub fn new(addr: impl Into<String>) -> Self {
        Self { addr: addr.into() }
    }

    /// Ask the vault to encrypt `plain_text`; returns the envelope.
    pub async fn encrypt(&self, plain_text: &str) -> Result<String> {
        self.send(&Message::Encrypt {
            plain_text: plain_text.to_owned(),
        })
        .await
    }

    /// Ask the vault to decrypt `cipher_text`; returns the plaintext.
    pub async fn decrypt(&self, cipher_text: &str) -> Result<String> {
        self.send(&Message::Decrypt {
            cipher_text: cipher_text.to_owned(),
        })
        .await
    }

    /// Send one message and return the response text.
    ///
    /// # Errors
    ///
    /// Fails if the vault is unreachable, or if it rejects the message; the
    /// vault's error code and message are included in the error.
    pub async fn send(&self, message: &Message) -> Result<String> {
        let body = serde_json::to_vec(message).context("failed to serialise message")?;

        let stream = TcpStream::connect(&self.addr)
            .await
            .with_context(|| format!("failed to connect to vault at {}", self.addr))?;
        let (mut sender, conn) = hyper::client::conn::http1::handshake(TokioIo::new(stream))
            .await
            .context("HTTP handshake with vault failed")?;
        tokio::spawn(async move {
            if let Err(e) = conn.await {
                debug!(error = %e, "vault connection closed with error");
            }
        });

        let req = Request::builder()
            .method(Method::POST)
            .uri("/message")
            .header(header::HOST, self.addr.as_str())
            .header(header::CONTENT_TYPE, "application/json")
            .body(Full::new(Bytes::from(body)))
            .context("failed to build vault request")?;

        let resp = sender
            .send_request(req)
            .await
            .context("vault request failed")?;
        let status = resp.status();
        let bytes = resp
            .into_body()
            .collect()
            .await
            .context("failed to read vault response")?
            .to_bytes();
        debug!(command = message.command(), %status, len = bytes.len(), "vault replied");

        if status == StatusCode::OK {
            return serde_json::from_slice(&bytes).context("vault response is not a JSON string");
        }
        match serde_json::from_slice::<ErrorResponse>(&bytes) {
            Ok(err) => bail!(
                "vault rejected {} ({status}): {}: {}",
                message.command(),
                err.code,
                err.message
            ),
            Err(_) => bail!("vault rejected {} with status {status}", message.command()),
        }
    }
}
