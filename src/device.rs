use crate::error::TransportError;

/// A source of raw event tokens, read on the listener thread.
pub trait Device {
    /// Wait for the next token.
    ///
    /// `Ok(None)` means nothing arrived within the source's read timeout, so
    /// the caller can check for shutdown. [`TransportError::Closed`] ends the
    /// stream cleanly; other errors are fatal to the listener.
    fn next_token(&mut self) -> Result<Option<String>, TransportError>;
    fn name(&self) -> &str;
    fn id(&self) -> &str;
}
