//! Acknowledgment batching: turns the pending-ack set into a wire message.

use crate::message::{Envelope, MessageIdGenerator};
use crate::session::SessionContext;

/// The acknowledgment payload: every message id the peer is being told we
/// received.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MsgsAck {
    /// Acknowledged message ids, oldest first.
    pub msg_ids: Vec<i64>,
}

impl MsgsAck {
    /// Wire constructor id of the ack payload.
    pub const CONSTRUCTOR_ID: u32 = 0x62d6_b459;
    /// Wire constructor id of the generic vector container.
    const VECTOR_ID: u32 = 0x1cb5_c415;

    /// Serialize to the wire layout:
    ///
    /// ```text
    /// constructor:int  vector:int  count:int  msg_ids:long*
    /// ```
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(4 + 4 + 4 + 8 * self.msg_ids.len());
        buf.extend(Self::CONSTRUCTOR_ID.to_le_bytes());
        buf.extend(Self::VECTOR_ID.to_le_bytes());
        buf.extend((self.msg_ids.len() as u32).to_le_bytes());
        for id in &self.msg_ids {
            buf.extend(id.to_le_bytes());
        }
        buf
    }
}

/// Flush the session's pending acknowledgments into an outbound envelope.
///
/// Returns `None` when nothing is pending. Otherwise the pending set is
/// drained atomically and the envelope carries a fresh message id with a
/// non-incrementing (meta) sequence number.
pub fn build_confirmation(
    ctx: &mut SessionContext,
    msg_ids: &mut MessageIdGenerator,
) -> Option<Envelope> {
    if !ctx.has_pending_acks() {
        return None;
    }
    let ack = MsgsAck { msg_ids: ctx.take_pending_acks() };
    log::debug!("confirming {} message id(s)", ack.msg_ids.len());
    Some(Envelope {
        msg_id: msg_ids.next_id(),
        seq_no: ctx.generate_seq_no(false),
        body: ack.to_bytes(),
    })
}
