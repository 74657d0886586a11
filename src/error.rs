//! Error types for port setup, relaying and configuration.

use thiserror::Error;

/// Misuse of a [`Relay`](crate::general::relay::Relay) lifecycle.
///
/// These are integration bugs in the orchestration layer, never caused by
/// the MIDI stream itself.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayError {
    #[error("not subscribed to an input yet")]
    NotAttached,

    #[error("already disconnected")]
    AlreadyDisconnected,

    #[error("message delivered to a disconnected relay")]
    Disconnected,
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("MIDI init error: {0}")]
    MidiInit(String),

    #[error("MIDI connect error: {0}")]
    MidiConnect(String),

    #[error("{0}")]
    Send(String),

    #[error("no {0} port found")]
    NoPorts(&'static str),

    #[error("port '{0}' not found")]
    PortNotFound(String),

    #[error("invalid {0} port selected")]
    InvalidSelection(&'static str),

    #[error("relay error: {0}")]
    Relay(#[from] RelayError),
}

impl From<midir::InitError> for Error {
    fn from(e: midir::InitError) -> Self {
        Error::MidiInit(e.to_string())
    }
}

impl<T> From<midir::ConnectError<T>> for Error {
    fn from(e: midir::ConnectError<T>) -> Self {
        Error::MidiConnect(e.to_string())
    }
}

impl From<midir::SendError> for Error {
    fn from(e: midir::SendError) -> Self {
        Error::Send(e.to_string())
    }
}

impl From<midir::PortInfoError> for Error {
    fn from(e: midir::PortInfoError) -> Self {
        Error::MidiInit(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
