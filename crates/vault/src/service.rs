//! Transport-independent message handling for the background service.
//!
//! [`MessageService::handle`] takes one typed [`Message`] and returns the
//! response text or the error to reject it with. HTTP lives in
//! [`crate::server`]; nothing here knows about it.

use common::{protocol::Message, ServiceError};
use tracing::{debug, error, warn};

use crate::codec::Codec;

/// Dispatches `encrypt` / `decrypt` messages to the [`Codec`].
#[derive(Clone, Debug)]
pub struct MessageService {
    codec: Codec,
}

impl MessageService {
    /// Wrap `codec` in a message dispatcher.
    pub fn new(codec: Codec) -> Self {
        Self { codec }
    }

    /// Whether requests can currently be served.
    pub fn is_ready(&self) -> bool {
        self.codec.keys().is_ready()
    }

    /// Handle a single request.
    ///
    /// Failures are logged here and returned unchanged; nothing is retried.
    ///
    /// # Errors
    ///
    /// Propagates the [`ServiceError`] from the codec.
    pub fn handle(&self, message: Message) -> Result<String, ServiceError> {
        debug!(command = message.command(), "handling message");
        match message {
            Message::Encrypt { plain_text } => self
                .codec
                .encrypt(&plain_text)
                .inspect_err(|e| error!(error = %e, "error encrypting data")),
            Message::Decrypt { cipher_text } => self
                .codec
                .decrypt(&cipher_text)
                .inspect_err(|e| warn!(error = %e, "error decrypting data")),
        }
    }
}
