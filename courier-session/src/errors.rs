//! Error taxonomy for request completion.
//!
//! Expected protocol failures are values, not panics: each request resolves
//! with a `Result<_, RequestError>`, and the resend scheduler inspects server
//! errors to pick a backoff before anything reaches the caller.

use std::{fmt, io};

// ─── RpcError ─────────────────────────────────────────────────────────────────

/// An error status the server attached to a response.
///
/// The message text is kept raw; classification helpers below read the parts
/// the scheduler cares about.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RpcError {
    /// Status code. 500 and negative codes are internal failures.
    pub code: i32,
    /// Raw error text, e.g. `"FLOOD_WAIT_30"`.
    pub message: String,
}

impl fmt::Display for RpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rpc error {}: {}", self.code, self.message)
    }
}

impl std::error::Error for RpcError {}

impl RpcError {
    /// Status code used when a download request runs out of retries.
    pub const RETRY_LIMIT_CODE: i32 = -123;

    /// Wrap a raw status code and error text from the wire.
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }

    /// The error that resolves a request whose retry budget ran out.
    pub fn retry_limit() -> Self {
        Self::new(Self::RETRY_LIMIT_CODE, "RETRY_LIMIT")
    }

    /// Internal server failures; retried silently with a growing backoff.
    pub fn is_transient(&self) -> bool {
        self.code == 500 || self.code < 0
    }

    /// Seconds to stay off the wire after a rate-limit rejection.
    ///
    /// Takes the number advertised in `FLOOD_WAIT_N`; a 420 without a usable
    /// number still waits the 2-second floor.
    pub fn flood_wait_seconds(&self) -> Option<i32> {
        if self.code != 420 {
            return None;
        }
        let advertised = self
            .message
            .find("FLOOD_WAIT_")
            .map(|idx| &self.message[idx + "FLOOD_WAIT_".len()..])
            .and_then(|rest| {
                let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
                digits.parse::<i32>().ok()
            });
        Some(match advertised {
            Some(wait) if wait > 0 => wait,
            _ => 2,
        })
    }

    /// A message this request depended on was never processed by the peer.
    pub fn is_msg_wait_failed(&self) -> bool {
        self.code == 400 && self.message.contains("MSG_WAIT_FAILED")
    }
}

// ─── RequestError ─────────────────────────────────────────────────────────────

/// Why a request failed to complete.
#[derive(Debug)]
pub enum RequestError {
    /// The server rejected the request.
    Rpc(RpcError),
    /// Network / I/O failure while the request was in flight.
    Network(io::Error),
    /// The owning connection shut down before a response arrived.
    Dropped,
    /// The caller cancelled the request.
    Cancelled,
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rpc(e) => write!(f, "{e}"),
            Self::Network(e) => write!(f, "network error: {e}"),
            Self::Dropped => write!(f, "request dropped"),
            Self::Cancelled => write!(f, "request cancelled"),
        }
    }
}

impl std::error::Error for RequestError {}

impl From<io::Error> for RequestError {
    fn from(e: io::Error) -> Self {
        Self::Network(e)
    }
}

impl RequestError {
    /// The server error inside, if that is what this is.
    pub fn rpc(&self) -> Option<&RpcError> {
        match self {
            Self::Rpc(e) => Some(e),
            _ => None,
        }
    }
}
