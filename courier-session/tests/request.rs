use courier_session::retry::{self, ErrorDisposition};
use courier_session::{RequestDescriptor, RequestFlags, RequestState, RpcError};

#[test]
fn transport_mask_selects_routing_bits() {
    let flags = RequestFlags::GENERIC | RequestFlags::CAN_COMPRESS | RequestFlags::WITHOUT_LOGIN;
    assert_eq!(flags.transport(), RequestFlags::GENERIC);
    assert!(flags.contains(RequestFlags::CAN_COMPRESS));
    assert!(!flags.contains(RequestFlags::PUSH));

    let media = RequestFlags::DOWNLOAD_MEDIA | RequestFlags::FORCE_DOWNLOAD;
    assert_eq!(media.transport(), RequestFlags::DOWNLOAD_MEDIA);
}

#[test]
fn late_response_to_stale_transmission_still_matches() {
    let mut req = RequestDescriptor::new(vec![1, 2, 3], RequestFlags::GENERIC);
    assert_eq!(req.state(), RequestState::Created);

    req.on_transmit(1000, 1, 2, 60);
    req.park_for_retry();
    req.on_transmit(2000, 3, 2, 120);

    assert!(req.responds_to_message_id(1000));
    assert!(req.responds_to_message_id(2000));
    assert!(!req.responds_to_message_id(3000));
}

#[test]
fn completion_is_exactly_once() {
    let mut req = RequestDescriptor::new(vec![], RequestFlags::GENERIC);
    req.on_transmit(1000, 1, 0, 0);
    req.on_transmit(2000, 3, 0, 0);

    // Responses arrive for both the stale and the current message id; only
    // the first one delivers.
    assert!(req.responds_to_message_id(1000));
    assert!(req.complete());
    assert!(req.responds_to_message_id(2000));
    assert!(!req.complete());
    assert_eq!(req.state(), RequestState::Completed);
}

#[test]
fn cancellation_is_terminal() {
    let mut req = RequestDescriptor::new(vec![], RequestFlags::GENERIC);
    req.on_transmit(1000, 1, 0, 0);
    req.cancel();
    assert_eq!(req.state(), RequestState::Cancelled);
    assert!(!req.complete());
    // Late responses must still match so the caller can discard them.
    assert!(req.responds_to_message_id(1000));
}

#[test]
fn rpc_error_classification() {
    let flood = RpcError::new(420, "FLOOD_WAIT_30");
    assert_eq!(flood.flood_wait_seconds(), Some(30));
    // Rate limits without a usable number still get the 2-second floor.
    assert_eq!(RpcError::new(420, "FLOOD_WAIT_").flood_wait_seconds(), Some(2));
    assert_eq!(RpcError::new(420, "SLOWMODE_WAIT_9").flood_wait_seconds(), Some(2));
    assert_eq!(RpcError::new(400, "FLOOD_WAIT_30").flood_wait_seconds(), None);

    assert!(RpcError::new(500, "INTERNAL").is_transient());
    assert!(RpcError::new(-404, "").is_transient());
    assert!(!RpcError::new(400, "PASSWORD_HASH_INVALID").is_transient());

    assert!(RpcError::new(400, "MSG_WAIT_FAILED").is_msg_wait_failed());
    assert!(!RpcError::new(500, "MSG_WAIT_FAILED").is_msg_wait_failed());
}

#[test]
fn flood_wait_parks_until_the_window_opens() {
    let mut req = RequestDescriptor::new(vec![], RequestFlags::GENERIC);
    req.on_transmit(1000, 1, 0, 10_000);

    let err = RpcError::new(420, "FLOOD_WAIT_30");
    assert_eq!(retry::apply_server_error(&mut req, &err, 10_000), ErrorDisposition::Parked);
    assert_eq!(req.state(), RequestState::AwaitingRetry);
    assert_eq!(req.failed_by_flood_wait, 30);
    assert_eq!(req.min_start_time, 10_030);

    // Overdue, but still inside the flood window.
    assert!(!retry::due_for_resend(&mut req, 10_020).unwrap());
    assert_eq!(req.retry_count, 0);

    // Window open.
    assert!(retry::due_for_resend(&mut req, 10_030).unwrap());
    assert_eq!(req.retry_count, 1);
}

#[test]
fn transient_server_failures_back_off_incrementally() {
    let mut req = RequestDescriptor::new(vec![], RequestFlags::GENERIC);
    req.on_transmit(1000, 1, 0, 500);

    let err = RpcError::new(500, "INTERNAL");
    assert_eq!(retry::apply_server_error(&mut req, &err, 500), ErrorDisposition::Parked);
    // First failure retries without extra delay; each later one adds a second.
    assert_eq!(req.min_start_time, 500);
    assert_eq!(req.server_failure_count, 1);

    retry::apply_server_error(&mut req, &err, 501);
    assert_eq!(req.min_start_time, 501);
    assert_eq!(req.server_failure_count, 2);
}

#[test]
fn fail_on_server_errors_surfaces_everything() {
    let flags = RequestFlags::GENERIC | RequestFlags::FAIL_ON_SERVER_ERRORS;
    let mut req = RequestDescriptor::new(vec![], flags);
    req.on_transmit(1000, 1, 0, 0);

    let err = RpcError::new(420, "FLOOD_WAIT_5");
    assert_eq!(retry::apply_server_error(&mut req, &err, 0), ErrorDisposition::Surface);
    assert_eq!(req.state(), RequestState::Transmitted);
}

#[test]
fn permanent_errors_surface() {
    let mut req = RequestDescriptor::new(vec![], RequestFlags::GENERIC);
    req.on_transmit(1000, 1, 0, 0);

    let err = RpcError::new(400, "PASSWORD_HASH_INVALID");
    assert_eq!(retry::apply_server_error(&mut req, &err, 0), ErrorDisposition::Surface);
}

#[test]
fn download_retry_budget_is_finite() {
    let mut req = RequestDescriptor::new(vec![], RequestFlags::DOWNLOAD_MEDIA);
    req.on_transmit(1000, 1, 0, 0);

    let mut now = 100;
    loop {
        match retry::due_for_resend(&mut req, now) {
            Ok(true) => {
                req.on_transmit(i64::from(now), 1, 0, now);
                now += 100;
            }
            Ok(false) => panic!("request stalled before exhausting its budget"),
            Err(err) => {
                let rpc = err.rpc().expect("retry exhaustion resolves as an rpc error");
                assert_eq!(rpc.code, RpcError::RETRY_LIMIT_CODE);
                assert_eq!(req.retry_count, 6);
                break;
            }
        }
    }
}

#[test]
fn unanswered_notices_resend_at_most_once_per_window() {
    let mut req = RequestDescriptor::new(vec![], RequestFlags::GENERIC);
    req.on_transmit(1000, 1, 0, 5_000);

    assert!(retry::note_unanswered(&mut req, 5_010));
    assert_eq!(req.last_resend_time, 5_010);
    // Another notice inside the 60-second window only warrants an ack.
    assert!(!retry::note_unanswered(&mut req, 5_030));
    assert!(retry::note_unanswered(&mut req, 5_070));

    req.complete();
    assert!(!retry::note_unanswered(&mut req, 9_999));
}

#[test]
fn terminal_requests_are_never_due() {
    let mut req = RequestDescriptor::new(vec![], RequestFlags::GENERIC);
    req.on_transmit(1000, 1, 0, 0);
    req.complete();
    assert!(!retry::due_for_resend(&mut req, 1_000_000).unwrap());
    assert_eq!(req.retry_count, 0);
}
