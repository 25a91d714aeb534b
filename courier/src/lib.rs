//! # courier — session & authentication core
//!
//! The protocol-critical heart of a messaging client, split in two focused
//! sub-crates and re-exported here for convenience:
//!
//! | Sub-crate         | Role                                                  |
//! |-------------------|-------------------------------------------------------|
//! | `courier-crypto`  | Key derivation, SRP password proofs, prime checks     |
//! | `courier-session` | Session ids, sequence numbers, acks, request tracking |
//!
//! ## Quick start
//!
//! ```rust
//! use courier::session::{SessionContext, MessageIdGenerator, build_confirmation};
//!
//! let mut ctx = SessionContext::new();
//! let mut ids = MessageIdGenerator::new(0);
//!
//! // Transport hands us an incoming message id…
//! ctx.mark_processed(0x5192_0000_0000_0000);
//! ctx.queue_ack(0x5192_0000_0000_0000);
//!
//! // …and periodically we flush an acknowledgment envelope back.
//! let envelope = build_confirmation(&mut ctx, &mut ids).unwrap();
//! assert_eq!(envelope.seq_no & 1, 0);
//! ```
//!
//! Transports, timers and the connection manager live outside this crate:
//! everything here is already-available bytes and bookkeeping.

#![deny(unsafe_code)]
#![warn(missing_docs)]

/// Re-export of [`courier_crypto`] — key derivation, SRP, prime checks.
pub use courier_crypto as crypto;

/// Re-export of [`courier_session`] — session, request and ack bookkeeping.
pub use courier_session as session;
