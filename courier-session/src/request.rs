//! Outbound request bookkeeping.
//!
//! A [`RequestDescriptor`] is one unit of outbound work. The connection
//! manager drives every transition: it assigns running message ids on each
//! transmit and marks completion when a matching response or terminal error
//! arrives. This module only holds the state and the matching predicate; the
//! resend timing decisions live in [`crate::retry`].

use std::ops::{BitAnd, BitOr, BitOrAssign};

/// Classification flags for a request.
///
/// Exactly one of [`GENERIC`](Self::GENERIC),
/// [`DOWNLOAD_MEDIA`](Self::DOWNLOAD_MEDIA) or
/// [`UPLOAD_MEDIA`](Self::UPLOAD_MEDIA) should be set; that bit picks the
/// transport the request rides on.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct RequestFlags(u32);

impl RequestFlags {
    /// Ordinary RPC traffic.
    pub const GENERIC: Self = Self(1);
    /// Media download traffic.
    pub const DOWNLOAD_MEDIA: Self = Self(2);
    /// Media upload traffic.
    pub const UPLOAD_MEDIA: Self = Self(4);
    /// May run on a datacenter we hold no authorization for.
    pub const ENABLE_UNAUTHORIZED: Self = Self(8);
    /// Surface server errors instead of silently retrying.
    pub const FAIL_ON_SERVER_ERRORS: Self = Self(16);
    /// Payload may be gzip-compressed on the wire.
    pub const CAN_COMPRESS: Self = Self(32);
    /// Rides the push (notification) connection.
    pub const PUSH: Self = Self(64);
    /// May be sent before the user is logged in.
    pub const WITHOUT_LOGIN: Self = Self(128);
    /// May be redirected to another datacenter on failure.
    pub const TRY_DIFFERENT_DC: Self = Self(256);
    /// Download that bypasses the queue limits.
    pub const FORCE_DOWNLOAD: Self = Self(512);

    /// Bits that select the transport connection.
    pub const TRANSPORT_MASK: Self = Self(1 | 2 | 4);

    /// An empty flag set.
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Whether every bit of `other` is set.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// The transport-routing bits only.
    pub const fn transport(self) -> Self {
        Self(self.0 & Self::TRANSPORT_MASK.0)
    }

    /// The raw bitmask.
    pub const fn bits(self) -> u32 {
        self.0
    }
}

impl BitOr for RequestFlags {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for RequestFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for RequestFlags {
    type Output = Self;
    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

/// Lifecycle of a request.
///
/// `Created → Transmitted → {Completed | Cancelled | AwaitingRetry}`, with
/// `AwaitingRetry → Transmitted` on each resend.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RequestState {
    /// Built but never sent.
    Created,
    /// On the wire, waiting for a response.
    Transmitted,
    /// Failed transiently; the manager will resend it.
    AwaitingRetry,
    /// Response or terminal error delivered.
    Completed,
    /// Cancelled by the caller. Advisory: an already-transmitted wire message
    /// is not retracted and a late response must still be matched and
    /// discarded.
    Cancelled,
}

impl RequestState {
    fn is_terminal(self) -> bool {
        matches!(self, RequestState::Completed | RequestState::Cancelled)
    }
}

/// Bookkeeping for one outbound request across its retries.
pub struct RequestDescriptor {
    /// Classification flags.
    pub flags: RequestFlags,
    /// Serialized request payload.
    pub payload: Vec<u8>,
    /// Resend attempts so far; counted by [`crate::retry::due_for_resend`].
    pub retry_count: u32,
    /// Wall-clock second of the last peer-prompted resend; maintained by
    /// [`crate::retry::note_unanswered`].
    pub last_resend_time: i32,
    /// Wall-clock second of the latest transmission.
    pub start_time: i32,
    /// Earliest wall-clock second the next transmission may happen.
    pub min_start_time: i32,
    /// Internal server failures seen; sets the backoff growth.
    pub server_failure_count: u32,
    /// Advertised flood wait currently in force, 0 when none.
    pub failed_by_flood_wait: i32,
    state: RequestState,
    running_msg_id: i64,
    running_seq_no: i32,
    running_datacenter_id: u32,
    responds_to: Vec<i64>,
}

impl RequestDescriptor {
    /// Wrap a serialized payload in a fresh descriptor.
    pub fn new(payload: Vec<u8>, flags: RequestFlags) -> Self {
        Self {
            flags,
            payload,
            retry_count: 0,
            last_resend_time: 0,
            start_time: 0,
            min_start_time: 0,
            server_failure_count: 0,
            failed_by_flood_wait: 0,
            state: RequestState::Created,
            running_msg_id: 0,
            running_seq_no: 0,
            running_datacenter_id: 0,
            responds_to: Vec::new(),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> RequestState {
        self.state
    }

    /// The message id of the latest transmission, 0 before the first.
    pub fn running_msg_id(&self) -> i64 {
        self.running_msg_id
    }

    /// The sequence number of the latest transmission.
    pub fn running_seq_no(&self) -> i32 {
        self.running_seq_no
    }

    /// The datacenter the latest transmission went to.
    pub fn running_datacenter_id(&self) -> u32 {
        self.running_datacenter_id
    }

    /// Record a transmit attempt at wall-clock second `now`.
    ///
    /// The previous running message id, if any, is kept so that a late
    /// response to a stale transmission still resolves this request.
    pub fn on_transmit(&mut self, msg_id: i64, seq_no: i32, datacenter_id: u32, now: i32) {
        if self.running_msg_id != 0 && !self.responds_to.contains(&self.running_msg_id) {
            self.responds_to.push(self.running_msg_id);
        }
        self.running_msg_id = msg_id;
        self.running_seq_no = seq_no;
        self.running_datacenter_id = datacenter_id;
        self.start_time = now;
        self.state = RequestState::Transmitted;
    }

    /// Whether a response addressed to `msg_id` belongs to this request,
    /// under the current or any previous transmission.
    pub fn responds_to_message_id(&self, msg_id: i64) -> bool {
        msg_id == self.running_msg_id || self.responds_to.contains(&msg_id)
    }

    /// Mark the request completed. Returns `true` only for the call that
    /// performed the transition, so a response matched against two of this
    /// request's message ids is delivered exactly once.
    pub fn complete(&mut self) -> bool {
        if self.state.is_terminal() {
            return false;
        }
        self.state = RequestState::Completed;
        true
    }

    /// Cancel the request. No-op once terminal.
    pub fn cancel(&mut self) {
        if !self.state.is_terminal() {
            self.state = RequestState::Cancelled;
        }
    }

    /// Park the request for the resend scheduler. No-op once terminal.
    pub fn park_for_retry(&mut self) {
        if !self.state.is_terminal() {
            self.state = RequestState::AwaitingRetry;
        }
    }
}
