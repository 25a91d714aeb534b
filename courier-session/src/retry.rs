//! Resend scheduling over [`RequestDescriptor`] bookkeeping.
//!
//! Nothing here sleeps or spawns timers. The connection manager calls in
//! with wall-clock seconds (after a server error, on each queue sweep, or
//! when the peer reports an unanswered message) and acts on the verdicts.

use crate::errors::{RequestError, RpcError};
use crate::request::{RequestDescriptor, RequestFlags, RequestState};

/// Seconds a resend stays suppressed after the previous one.
const RESEND_WINDOW_SECS: i32 = 60;

/// Backoff cap in seconds for repeated internal server failures.
const MAX_SERVER_FAILURE_BACKOFF: u32 = 10;

/// Retry budgets for media downloads.
const DOWNLOAD_RETRY_MAX: u32 = 6;
const DOWNLOAD_RETRY_MAX_FORCED: u32 = 10;
const DOWNLOAD_RETRY_MAX_FLOODED: u32 = 1;

/// What to do with a request after the server rejected it.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorDisposition {
    /// Parked; [`due_for_resend`] releases it once its backoff expires.
    Parked,
    /// Not retryable here; deliver the error to the caller.
    Surface,
}

/// React to a server error for `req` at wall-clock second `now`.
///
/// Internal failures (code 500 or negative) back off by one second per prior
/// failure, capped at 10 seconds. Rate limits (code 420)
/// park the request for the advertised flood wait. `MSG_WAIT_FAILED`
/// re-queues after one second. Anything else is surfaced, as is every error
/// on a [`FAIL_ON_SERVER_ERRORS`](RequestFlags::FAIL_ON_SERVER_ERRORS)
/// request.
pub fn apply_server_error(
    req: &mut RequestDescriptor,
    error: &RpcError,
    now: i32,
) -> ErrorDisposition {
    if req.flags.contains(RequestFlags::FAIL_ON_SERVER_ERRORS) {
        return ErrorDisposition::Surface;
    }
    if error.is_transient() {
        req.min_start_time =
            req.start_time + req.server_failure_count.min(MAX_SERVER_FAILURE_BACKOFF) as i32;
        req.server_failure_count += 1;
    } else if let Some(wait) = error.flood_wait_seconds() {
        log::debug!("{error}; request off the wire for {wait}s");
        req.failed_by_flood_wait = wait;
        req.start_time = 0;
        req.min_start_time = now + wait;
    } else if error.is_msg_wait_failed() {
        req.start_time = 0;
        req.min_start_time = now + 1;
    } else {
        return ErrorDisposition::Surface;
    }
    req.park_for_retry();
    ErrorDisposition::Parked
}

/// Whether `req` should go back on the wire at wall-clock second `now`.
///
/// A transmission is overdue once unanswered for longer than its transport
/// timeout and its backoff window has passed. Each `true` verdict counts as
/// one retry; media downloads that exhaust their budget resolve with a
/// `RETRY_LIMIT` error instead.
pub fn due_for_resend(req: &mut RequestDescriptor, now: i32) -> Result<bool, RequestError> {
    if matches!(req.state(), RequestState::Completed | RequestState::Cancelled) {
        return Ok(false);
    }
    let max_timeout = if req.flags.transport() == RequestFlags::GENERIC { 8 } else { 30 };
    if (now - req.start_time).abs() <= max_timeout {
        return Ok(false);
    }
    let window_open = now >= req.min_start_time
        || (req.failed_by_flood_wait != 0 && req.min_start_time - now > req.failed_by_flood_wait)
        || (req.failed_by_flood_wait == 0
            && (now - req.min_start_time).abs() >= RESEND_WINDOW_SECS);
    if !window_open {
        return Ok(false);
    }
    req.retry_count += 1;
    if req.flags.contains(RequestFlags::DOWNLOAD_MEDIA) {
        let budget = if req.flags.contains(RequestFlags::FORCE_DOWNLOAD) {
            DOWNLOAD_RETRY_MAX_FORCED
        } else if req.failed_by_flood_wait != 0 {
            DOWNLOAD_RETRY_MAX_FLOODED
        } else {
            DOWNLOAD_RETRY_MAX
        };
        if req.retry_count >= budget {
            log::debug!("download request out of retries after {} attempts", req.retry_count);
            return Err(RequestError::Rpc(RpcError::retry_limit()));
        }
    }
    Ok(true)
}

/// The peer reported it is still waiting on this request.
///
/// Returns `true` when the request should actually be retransmitted, at most
/// once per 60-second window; later notices inside the window only warrant
/// an acknowledgment.
pub fn note_unanswered(req: &mut RequestDescriptor, now: i32) -> bool {
    if matches!(req.state(), RequestState::Completed | RequestState::Cancelled) {
        return false;
    }
    if req.last_resend_time == 0 || (now - req.last_resend_time).abs() >= RESEND_WINDOW_SECS {
        req.last_resend_time = now;
        true
    } else {
        false
    }
}
