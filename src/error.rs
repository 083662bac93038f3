//! Error types for the channel views exporter

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Session is locked by another process, wait for it to finish and try again")]
    SessionLocked,

    #[error("Failed to acquire session lock: {0}")]
    LockError(String),

    #[error("Failed to open session: {0}")]
    SessionError(String),

    #[error("Telegram API error: {0}")]
    TelegramError(String),

    #[error("Flood wait: retry after {seconds}s")]
    FloodWait { seconds: u64 },

    #[error("Telegram request timed out")]
    Timeout,

    #[error("Sign up required for {0}: register the number with an official app first")]
    SignUpRequired(String),

    #[error("Channel @{0} not found")]
    ChannelNotFound(String),

    #[error("@{name} is a {kind}, not a broadcast channel")]
    NotAChannel { name: String, kind: &'static str },

    #[error("Cannot write to {path}: {source}")]
    Output {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Classify an RPC error returned by Telegram.
    ///
    /// `FLOOD_WAIT_X` style errors carry their wait in `value`; the server
    /// timeout is reported as code -503.
    pub fn from_rpc(code: i32, name: &str, value: Option<u32>, message: String) -> Self {
        if name.starts_with("FLOOD_") {
            if let Some(seconds) = value {
                return Error::FloodWait {
                    seconds: u64::from(seconds),
                };
            }
        }
        if code == -503 || name.eq_ignore_ascii_case("TIMEOUT") {
            return Error::Timeout;
        }
        Error::TelegramError(message)
    }

    /// Whether the history fetcher may retry the request that produced this error.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::FloodWait { .. } | Error::Timeout)
    }
}

impl From<grammers_client::InvocationError> for Error {
    fn from(err: grammers_client::InvocationError) -> Self {
        match &err {
            grammers_client::InvocationError::Rpc(rpc) => {
                Error::from_rpc(rpc.code, &rpc.name, rpc.value, err.to_string())
            }
            _ => Error::TelegramError(err.to_string()),
        }
    }
}
