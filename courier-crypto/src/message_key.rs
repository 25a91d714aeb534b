//! Per-message AES key/IV derivation from the shared secret and message key.
//!
//! Two schedules exist on the wire: the current SHA-256 one (v2) and the
//! legacy SHA-1 one (v1). Byte offsets are a wire contract with the peer and
//! must not change.

use crate::{sha1, sha256};

/// Which way the message travels; selects the byte offset into the secret.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Direction {
    /// Client to server.
    Outgoing,
    /// Server to client.
    Incoming,
}

impl Direction {
    fn x(self) -> usize {
        match self {
            Direction::Outgoing => 0,
            Direction::Incoming => 8,
        }
    }
}

/// Derivation schedule version.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum KeyVersion {
    /// Legacy SHA-1 schedule.
    V1,
    /// Current SHA-256 schedule.
    V2,
}

/// A derived AES-256 key/IV pair.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MessageKeys {
    /// 256-bit AES key.
    pub aes_key: [u8; 32],
    /// 256-bit AES IV.
    pub aes_iv: [u8; 32],
}

/// Derive the AES key/IV pair for one message.
///
/// `shared_secret` is the long-lived 256-byte secret from the handshake and
/// `msg_key` the 16-byte tag binding the key material to this message.
/// Returns `None` when no shared secret is present yet, meaning "no
/// encryption available" rather than an error. Callers must pass full-length
/// inputs; short buffers are a contract violation.
pub fn derive_keys(
    shared_secret: &[u8],
    msg_key: &[u8; 16],
    direction: Direction,
    version: KeyVersion,
) -> Option<MessageKeys> {
    if shared_secret.is_empty() {
        return None;
    }
    let x = direction.x();
    Some(match version {
        KeyVersion::V2 => derive_v2(shared_secret, msg_key, x),
        KeyVersion::V1 => derive_v1(shared_secret, msg_key, x),
    })
}

fn derive_v2(secret: &[u8], msg_key: &[u8; 16], x: usize) -> MessageKeys {
    let sha_a = sha256!(msg_key, &secret[x..x + 36]);
    let sha_b = sha256!(&secret[40 + x..76 + x], msg_key);

    let mut aes_key = [0u8; 32];
    aes_key[..8].copy_from_slice(&sha_a[..8]);
    aes_key[8..24].copy_from_slice(&sha_b[8..24]);
    aes_key[24..].copy_from_slice(&sha_a[24..]);

    let mut aes_iv = [0u8; 32];
    aes_iv[..8].copy_from_slice(&sha_b[..8]);
    aes_iv[8..24].copy_from_slice(&sha_a[8..24]);
    aes_iv[24..].copy_from_slice(&sha_b[24..]);

    MessageKeys { aes_key, aes_iv }
}

fn derive_v1(secret: &[u8], msg_key: &[u8; 16], x: usize) -> MessageKeys {
    let sha_a = sha1!(msg_key, &secret[x..x + 32]);
    let sha_b = sha1!(&secret[32 + x..48 + x], msg_key, &secret[48 + x..64 + x]);
    let sha_c = sha1!(&secret[64 + x..96 + x], msg_key);
    let sha_d = sha1!(msg_key, &secret[96 + x..128 + x]);

    let mut aes_key = [0u8; 32];
    aes_key[..8].copy_from_slice(&sha_a[..8]);
    aes_key[8..20].copy_from_slice(&sha_b[8..20]);
    aes_key[20..].copy_from_slice(&sha_c[4..16]);

    let mut aes_iv = [0u8; 32];
    aes_iv[..12].copy_from_slice(&sha_a[8..20]);
    aes_iv[12..20].copy_from_slice(&sha_b[..8]);
    aes_iv[20..24].copy_from_slice(&sha_c[16..20]);
    aes_iv[24..].copy_from_slice(&sha_d[..8]);

    MessageKeys { aes_key, aes_iv }
}
