//! Outbound envelopes and message-id allocation.

use std::time::{SystemTime, UNIX_EPOCH};

/// A framed outbound unit: allocated message id, sequence number and the
/// serialized payload, ready for the transport layer.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Envelope {
    /// Unique 64-bit message id.
    pub msg_id: i64,
    /// Session-scoped sequence number (low bit = content-bearing).
    pub seq_no: i32,
    /// Serialized payload.
    pub body: Vec<u8>,
}

/// Allocates time-based 64-bit message ids.
///
/// The upper 32 bits carry server-corrected Unix seconds, the lower bits a
/// sub-second component shifted so the two least significant bits stay zero,
/// as the peer requires for client messages. Ids are strictly monotonic even
/// across clock stalls.
pub struct MessageIdGenerator {
    last_id: i64,
    /// Clock skew in seconds vs. the server.
    pub time_offset: i32,
}

impl MessageIdGenerator {
    /// Create a generator with the given server clock skew.
    pub fn new(time_offset: i32) -> Self {
        Self { last_id: 0, time_offset }
    }

    /// Allocate the next message id.
    pub fn next_id(&mut self) -> i64 {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        let secs = (now.as_secs() as i32).wrapping_add(self.time_offset) as u32 as u64;
        let nanos = now.subsec_nanos() as u64;
        let mut id = ((secs << 32) | (nanos << 2)) as i64;
        if self.last_id >= id {
            id = self.last_id + 4;
        }
        self.last_id = id;
        id
    }
}

impl Default for MessageIdGenerator {
    fn default() -> Self {
        Self::new(0)
    }
}
