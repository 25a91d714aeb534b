//! Session and request bookkeeping for the courier protocol core.
//!
//! This crate handles:
//! * Session identity, sequence numbering and duplicate suppression
//! * Acknowledgment batching into wire-ready confirmation envelopes
//! * Outbound request classification, retry bookkeeping and response matching
//!
//! All state here is owned by a single connection-management task; nothing
//! blocks on I/O or sleeps. The resend scheduler only renders verdicts;
//! transports and timers are the caller's business.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod confirm;
pub mod errors;
pub mod message;
pub mod request;
pub mod retry;
pub mod session;

pub use confirm::{MsgsAck, build_confirmation};
pub use errors::{RequestError, RpcError};
pub use message::{Envelope, MessageIdGenerator};
pub use request::{RequestDescriptor, RequestFlags, RequestState};
pub use retry::{ErrorDisposition, apply_server_error, due_for_resend, note_unanswered};
pub use session::SessionContext;
