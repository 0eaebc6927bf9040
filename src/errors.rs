use thiserror::Error;

/// Errors surfaced by the host/widget refresh protocol and the persisted settings.
///
/// Missing hashes, stale settings entries, out-of-range scroll positions and
/// conflicting track bounds are recovered locally and never show up here.
#[derive(Debug, Error)]
pub enum Error {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    /// A frame was truncated or carried a value the peer could not interpret.
    #[error("malformed frame: {0}")]
    Protocol(String),
    #[error("unexpected opcode {0:#04x}")]
    UnexpectedOpcode(u8),
    #[error("frame of {0} bytes exceeds the protocol limit")]
    FrameTooLarge(u64),
    #[error("failed to encode message: {0}")]
    Encode(#[from] rmp_serde::encode::Error),
    #[error("failed to decode message: {0}")]
    Decode(#[from] rmp_serde::decode::Error),
    #[error("settings file: {0}")]
    Settings(#[from] serde_json::Error),
    /// The widget process could not be launched or went away.
    #[error("widget process: {0}")]
    Process(String),
}

impl Error {
    /// Returns true for errors after which the connection is unusable and the
    /// widget process has to be restarted.
    pub fn is_fatal_protocol(&self) -> bool {
        match self {
            Error::Io(_)
            | Error::Protocol(_)
            | Error::UnexpectedOpcode(_)
            | Error::FrameTooLarge(_)
            | Error::Decode(_)
            | Error::Process(_) => true,
            Error::Encode(_) | Error::Settings(_) => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
