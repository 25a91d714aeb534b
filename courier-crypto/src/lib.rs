//! Cryptographic core for the courier session layer.
//!
//! Provides:
//! - SHA-1 / SHA-256 hash macros
//! - Fixed 256-byte big-integer encoding and XOR helpers
//! - Primality and generator sanity checks (Miller–Rabin)
//! - Per-message AES key/IV derivation (v1 legacy and v2 schedules)
//! - The SRP password-proof exchange
//!
//! Everything here is a pure function of its inputs (the SRP entry point and
//! Miller–Rabin draw randomness but keep no state) and safe to call from any
//! thread or offload to a blocking pool.

#![deny(unsafe_code)]

pub mod bigint;
mod message_key;
mod sha;
pub mod srp;

pub use bigint::{is_good_ga_and_gb, is_good_prime, is_probable_prime, pad256, xor32};
pub use message_key::{Direction, KeyVersion, MessageKeys, derive_keys};
pub use srp::{PasswordAlgo, SrpCheck, derive_x, start_check};
