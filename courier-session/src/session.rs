//! Per-connection session state.

use std::collections::{HashSet, VecDeque};

/// Most recently seen message ids kept for duplicate suppression.
const MAX_PROCESSED_IDS: usize = 1224;
/// How many of the oldest ids are dropped in one eviction pass.
const EVICTION_BATCH: usize = 225;

/// Session identity, sequence numbering and message-id bookkeeping for one
/// logical connection.
///
/// Owned by a single connection-management task; none of this is safe for
/// unsynchronized concurrent mutation. The transport layer feeds incoming
/// message ids through [`SessionContext::is_processed`] /
/// [`SessionContext::mark_processed`] and queues acknowledgments with
/// [`SessionContext::queue_ack`]; see [`crate::confirm::build_confirmation`]
/// for flushing those acks back out.
pub struct SessionContext {
    session_id: i64,
    sequence: i32,
    processed_message_ids: VecDeque<i64>,
    pending_acks: Vec<i64>,
    processed_session_changes: HashSet<i64>,
}

impl SessionContext {
    /// Create a context with a fresh random session id.
    pub fn new() -> Self {
        Self {
            session_id: generate_session_id(),
            sequence: 0,
            processed_message_ids: VecDeque::new(),
            pending_acks: Vec::new(),
            processed_session_changes: HashSet::new(),
        }
    }

    /// The current 64-bit session id.
    pub fn session_id(&self) -> i64 {
        self.session_id
    }

    /// Replace the session id and drop all per-session state.
    ///
    /// The peer's view of message ordering is void after this call; message
    /// ids allocated under the old session must not be reused.
    pub fn recreate_session(&mut self) {
        self.session_id = generate_session_id();
        self.sequence = 0;
        self.processed_message_ids.clear();
        self.pending_acks.clear();
        self.processed_session_changes.clear();
        log::debug!("session recreated, new id 0x{:x}", self.session_id as u64);
    }

    /// Allocate the next sequence number.
    ///
    /// Returns `counter * 2 + increment`; the counter advances only for
    /// content-bearing messages (`increment == true`). The low bit is how the
    /// peer tells state-affecting messages from passive ones (acks, pings)
    /// and must be preserved exactly.
    pub fn generate_seq_no(&mut self, increment: bool) -> i32 {
        let value = self.sequence * 2 + i32::from(increment);
        if increment {
            self.sequence += 1;
        }
        value
    }

    /// Whether `msg_id` was already handed to [`Self::mark_processed`].
    ///
    /// Bounded memory means a sufficiently old duplicate can be re-accepted;
    /// acceptable within a session's lifetime.
    pub fn is_processed(&self, msg_id: i64) -> bool {
        self.processed_message_ids.contains(&msg_id)
    }

    /// Record `msg_id` as processed, evicting the oldest ids in a batch once
    /// the cap is exceeded.
    pub fn mark_processed(&mut self, msg_id: i64) {
        self.processed_message_ids.push_back(msg_id);
        if self.processed_message_ids.len() > MAX_PROCESSED_IDS {
            self.processed_message_ids.drain(..EVICTION_BATCH);
        }
    }

    /// Queue `msg_id` for acknowledgment to the peer. Idempotent.
    pub fn queue_ack(&mut self, msg_id: i64) {
        if !self.pending_acks.contains(&msg_id) {
            self.pending_acks.push(msg_id);
        }
    }

    /// Whether any acknowledgments are waiting to be flushed.
    pub fn has_pending_acks(&self) -> bool {
        !self.pending_acks.is_empty()
    }

    /// Atomically drain the pending-acknowledgment set.
    pub(crate) fn take_pending_acks(&mut self) -> Vec<i64> {
        std::mem::take(&mut self.pending_acks)
    }

    /// Whether the peer's session-change notification `msg_id` was applied.
    pub fn is_session_change_processed(&self, msg_id: i64) -> bool {
        self.processed_session_changes.contains(&msg_id)
    }

    /// Record a peer session-change notification as applied.
    pub fn mark_session_change_processed(&mut self, msg_id: i64) {
        self.processed_session_changes.insert(msg_id);
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new()
    }
}

fn generate_session_id() -> i64 {
    let mut rnd = [0u8; 8];
    getrandom::getrandom(&mut rnd).expect("getrandom failed");
    let id = i64::from_le_bytes(rnd);
    // Tag the high 16 bits in debug builds so session churn stands out in
    // packet dumps.
    #[cfg(debug_assertions)]
    let id = (id & 0x0000_ffff_ffff_ffff) | (0xabcd_i64 << 48);
    id
}
