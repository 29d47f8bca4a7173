//! Error types for the chat relay
//!
//! Defines application-level errors and message send errors.
//! Uses thiserror for ergonomic error definitions.

use thiserror::Error;

/// Application-level errors
///
/// Connection-local failures end only the affected connection;
/// `Listener` is the one error that stops the server.
#[derive(Debug, Error)]
pub enum AppError {
    /// IO error on a single connection
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The listening endpoint is unusable (fatal)
    #[error("Listener error: {0}")]
    Listener(#[source] std::io::Error),

    /// Channel send error (fatal - the registry actor is gone)
    #[error("Channel send error")]
    ChannelSend,

    /// The registry actor dropped a reply before answering
    #[error("Channel receive error")]
    ChannelRecv,
}

/// Message send errors
///
/// Occurs when a line cannot be queued for a recipient.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SendError {
    /// The receiving end of the channel has been closed
    #[error("Channel closed")]
    ChannelClosed,
}
