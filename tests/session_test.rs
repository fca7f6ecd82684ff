use order_tracker::config::TrackerConfig;
use order_tracker::gateway::mock::MockGateway;
use order_tracker::gateway::GatewayError;
use order_tracker::model::{OrderId, OrderLine, OrderRequest, OrderStatus, OrderView};
use order_tracker::session::{OrderTrackingSession, SessionPhase, TrackingError};
use order_tracker::status::{progress_index, Progress, StepState};
use std::time::Duration;
use tokio::time::sleep;

const INTERVAL: Duration = Duration::from_millis(2000);
const SETTLE: Duration = Duration::from_millis(10);

fn request() -> OrderRequest {
    OrderRequest::new(102, "456 Pine St", vec![OrderLine::new(1000, 1)])
}

fn view(id: u64, status: OrderStatus) -> OrderView {
    OrderView {
        id: OrderId(id),
        customer_id: 102,
        delivery_address: "456 Pine St".into(),
        status,
        items: vec![],
    }
}

fn status_of(session: &OrderTrackingSession) -> Option<OrderStatus> {
    session.snapshot().current_view.map(|view| view.status)
}

/// Submit accepted with RECEIVED: the session tracks the order and polls right away.
#[tokio::test(start_paused = true)]
async fn test_submit_starts_tracking() {
    let mock = MockGateway::new();
    mock.expect_submit().return_ok(view(77, OrderStatus::Received));
    mock.expect_fetch(OrderId(77)).return_ok(view(77, OrderStatus::Received));

    let session = OrderTrackingSession::spawn(mock.gateway(), TrackerConfig::default());
    let accepted = session.submit(request()).await.expect("submit failed");
    assert_eq!(accepted.id, OrderId(77));

    let snapshot = session.snapshot();
    assert_eq!(snapshot.phase, SessionPhase::Tracking);
    assert!(snapshot.is_polling);
    assert_eq!(snapshot.last_error, None);
    assert_eq!(progress_index(&accepted.status), Some(0));

    let Some(Progress::Steps(steps)) = session.progress() else {
        panic!("expected progress steps");
    };
    assert_eq!(steps[0].state, StepState::Current);
    assert_eq!(steps[0].caption, Some("In Progress..."));

    sleep(SETTLE).await;
    assert_eq!(mock.fetch_calls(), vec![OrderId(77)]);
    assert_eq!(mock.submit_calls(), vec![request()]);
    mock.verify();
}

/// A tick reporting SCHEDULED_FOR_DELIVERY ends tracking.
#[tokio::test(start_paused = true)]
async fn test_scheduled_for_delivery_is_terminal() {
    let mock = MockGateway::new();
    mock.expect_submit().return_ok(view(77, OrderStatus::Received));
    mock.expect_fetch(OrderId(77)).return_ok(view(77, OrderStatus::StockReserved));
    mock.expect_fetch(OrderId(77)).return_ok(view(77, OrderStatus::ScheduledForDelivery));

    let session = OrderTrackingSession::spawn(mock.gateway(), TrackerConfig::default());
    session.submit(request()).await.unwrap();

    sleep(SETTLE).await;
    assert_eq!(status_of(&session), Some(OrderStatus::StockReserved));
    assert_eq!(session.snapshot().phase, SessionPhase::Tracking);

    sleep(INTERVAL).await;
    let snapshot = session.snapshot();
    assert_eq!(snapshot.phase, SessionPhase::Terminal);
    assert!(!snapshot.is_polling);
    assert_eq!(status_of(&session), Some(OrderStatus::ScheduledForDelivery));

    // no further ticks once terminal
    sleep(INTERVAL * 5).await;
    assert_eq!(mock.fetch_calls().len(), 2);
    mock.verify();
}

/// A tick reporting FAILED ends tracking and maps to the failure branch.
#[tokio::test(start_paused = true)]
async fn test_failed_status_is_terminal() {
    let mock = MockGateway::new();
    mock.expect_submit().return_ok(view(77, OrderStatus::Received));
    mock.expect_fetch(OrderId(77)).return_ok(view(77, OrderStatus::Failed));

    let session = OrderTrackingSession::spawn(mock.gateway(), TrackerConfig::default());
    session.submit(request()).await.unwrap();

    let settled = tokio::time::timeout(Duration::from_secs(10), session.settled())
        .await
        .expect("session never settled")
        .unwrap();
    assert_eq!(settled.phase, SessionPhase::Terminal);
    assert!(!settled.is_polling);
    assert_eq!(settled.progress(), Some(Progress::Failed));
    assert_eq!(session.progress(), Some(Progress::Failed));

    sleep(INTERVAL * 3).await;
    assert_eq!(mock.fetch_calls().len(), 1);
    mock.verify();
}

/// A network error on a tick keeps the last view and the schedule.
#[tokio::test(start_paused = true)]
async fn test_poll_failure_keeps_tracking() {
    let mock = MockGateway::new();
    mock.expect_submit().return_ok(view(77, OrderStatus::Received));
    mock.expect_fetch(OrderId(77)).return_ok(view(77, OrderStatus::Received));
    mock.expect_fetch(OrderId(77))
        .return_err(GatewayError::Transport("connection reset".into()));
    mock.expect_fetch(OrderId(77)).return_ok(view(77, OrderStatus::StockReserved));

    let session = OrderTrackingSession::spawn(mock.gateway(), TrackerConfig::default());
    session.submit(request()).await.unwrap();

    sleep(INTERVAL + SETTLE).await;
    let snapshot = session.snapshot();
    assert_eq!(snapshot.phase, SessionPhase::Tracking);
    assert!(snapshot.is_polling);
    assert_eq!(snapshot.consecutive_poll_failures, 1);
    assert_eq!(snapshot.last_error, None);
    assert_eq!(status_of(&session), Some(OrderStatus::Received));

    // the next tick still happens on schedule
    sleep(INTERVAL).await;
    let snapshot = session.snapshot();
    assert_eq!(snapshot.consecutive_poll_failures, 0);
    assert_eq!(status_of(&session), Some(OrderStatus::StockReserved));
    assert_eq!(mock.fetch_calls().len(), 3);
    mock.verify();
}

/// An order that is already terminal when submitted is never polled.
#[tokio::test(start_paused = true)]
async fn test_terminal_on_submit_never_polls() {
    let mock = MockGateway::new();
    mock.expect_submit().return_ok(view(77, OrderStatus::ScheduledForDelivery));

    let session = OrderTrackingSession::spawn(mock.gateway(), TrackerConfig::default());
    session.submit(request()).await.unwrap();

    let snapshot = session.snapshot();
    assert_eq!(snapshot.phase, SessionPhase::Terminal);
    assert!(!snapshot.is_polling);

    sleep(INTERVAL * 3).await;
    assert!(mock.fetch_calls().is_empty());
    mock.verify();
}

/// A terminal status on the immediate first tick prevents a second tick.
#[tokio::test(start_paused = true)]
async fn test_terminal_first_tick_prevents_second() {
    let mock = MockGateway::new();
    mock.expect_submit().return_ok(view(77, OrderStatus::Received));
    mock.expect_fetch(OrderId(77)).return_ok(view(77, OrderStatus::ScheduledForDelivery));

    let session = OrderTrackingSession::spawn(mock.gateway(), TrackerConfig::default());
    session.submit(request()).await.unwrap();

    sleep(INTERVAL * 3).await;
    assert_eq!(mock.fetch_calls(), vec![OrderId(77)]);
    assert_eq!(session.snapshot().phase, SessionPhase::Terminal);
    mock.verify();
}

#[tokio::test(start_paused = true)]
async fn test_submission_error_sets_last_error() {
    let mock = MockGateway::new();
    mock.expect_submit().return_err(GatewayError::Status {
        status: 500,
        reason: "Internal Server Error".into(),
    });

    let session = OrderTrackingSession::spawn(mock.gateway(), TrackerConfig::default());
    let result = session.submit(request()).await;
    assert_eq!(
        result,
        Err(TrackingError::Submission(GatewayError::Status {
            status: 500,
            reason: "Internal Server Error".into(),
        }))
    );

    let snapshot = session.snapshot();
    assert_eq!(snapshot.phase, SessionPhase::Terminal);
    assert_eq!(snapshot.current_view, None);
    assert!(!snapshot.is_polling);
    assert_eq!(snapshot.last_error.as_deref(), Some("HTTP 500: Internal Server Error"));

    sleep(INTERVAL * 2).await;
    assert!(mock.fetch_calls().is_empty());
    mock.verify();
}

/// A failed re-submit clears the view of the previous order and stops polling it.
#[tokio::test(start_paused = true)]
async fn test_failed_resubmit_clears_stale_view() {
    let mock = MockGateway::new();
    mock.expect_submit().return_ok(view(1, OrderStatus::Received));
    mock.expect_fetch(OrderId(1)).return_ok(view(1, OrderStatus::Received));
    mock.expect_submit()
        .return_err(GatewayError::Transport("connection refused".into()));

    let session = OrderTrackingSession::spawn(mock.gateway(), TrackerConfig::default());
    session.submit(request()).await.unwrap();
    sleep(SETTLE).await;

    let result = session.submit(request()).await;
    assert!(matches!(result, Err(TrackingError::Submission(_))));

    let snapshot = session.snapshot();
    assert_eq!(snapshot.current_view, None);
    assert!(snapshot.last_error.unwrap().contains("connection refused"));

    sleep(INTERVAL * 3).await;
    assert_eq!(mock.fetch_calls(), vec![OrderId(1)]);
    assert_eq!(mock.submit_calls().len(), 2);
    mock.verify();
}

#[tokio::test(start_paused = true)]
async fn test_response_without_id_is_a_submission_error() {
    let mock = MockGateway::new();
    mock.expect_submit().return_ok(view(0, OrderStatus::Received));

    let session = OrderTrackingSession::spawn(mock.gateway(), TrackerConfig::default());
    let result = session.submit(request()).await;
    assert!(matches!(
        result,
        Err(TrackingError::Submission(GatewayError::MalformedResponse(_)))
    ));
    assert!(!session.snapshot().is_polling);

    sleep(INTERVAL).await;
    assert!(mock.fetch_calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_invalid_request_never_reaches_gateway() {
    let mock = MockGateway::new();
    let session = OrderTrackingSession::spawn(mock.gateway(), TrackerConfig::default());

    let result = session
        .submit(OrderRequest::new(102, "456 Pine St", vec![]))
        .await;
    assert!(matches!(result, Err(TrackingError::InvalidRequest(_))));
    assert_eq!(session.snapshot().phase, SessionPhase::Idle);
    assert!(mock.submit_calls().is_empty());
    mock.verify();
}

/// Submitting a new order right after the first produces no further ticks for the first.
#[tokio::test(start_paused = true)]
async fn test_resubmit_abandons_previous_order() {
    let mock = MockGateway::new();
    mock.expect_submit().return_ok(view(1, OrderStatus::Received));
    mock.expect_fetch(OrderId(1)).return_ok(view(1, OrderStatus::Received));
    mock.expect_submit().return_ok(view(2, OrderStatus::Received));
    mock.expect_fetch(OrderId(2)).return_ok(view(2, OrderStatus::Received));
    mock.expect_fetch(OrderId(2)).return_ok(view(2, OrderStatus::StockReserved));

    let session = OrderTrackingSession::spawn(mock.gateway(), TrackerConfig::default());
    session.submit(request()).await.unwrap();
    session.submit(request()).await.unwrap();

    sleep(INTERVAL + SETTLE).await;

    let calls = mock.fetch_calls();
    let first_for_two = calls.iter().position(|id| *id == OrderId(2)).unwrap();
    assert!(calls[first_for_two..].iter().all(|id| *id == OrderId(2)));
    assert!(calls.iter().filter(|id| **id == OrderId(1)).count() <= 1);

    let current = session.snapshot().current_view.unwrap();
    assert_eq!(current.id, OrderId(2));
    assert_eq!(current.status, OrderStatus::StockReserved);
}

/// A slower, older response that lands after a newer one is dropped.
#[tokio::test(start_paused = true)]
async fn test_stale_overlapping_response_is_discarded() {
    let mock = MockGateway::new();
    mock.expect_submit().return_ok(view(77, OrderStatus::Received));
    mock.expect_fetch(OrderId(77))
        .after(Duration::from_millis(3000))
        .return_ok(view(77, OrderStatus::Received));
    mock.expect_fetch(OrderId(77)).return_ok(view(77, OrderStatus::StockReserved));

    let config = TrackerConfig::default().with_request_timeout(Duration::from_secs(5));
    let session = OrderTrackingSession::spawn(mock.gateway(), config);
    session.submit(request()).await.unwrap();

    sleep(Duration::from_millis(2500)).await;
    assert_eq!(status_of(&session), Some(OrderStatus::StockReserved));

    // the first fetch completes at 3000ms and must not roll the view back
    sleep(Duration::from_millis(1000)).await;
    assert_eq!(status_of(&session), Some(OrderStatus::StockReserved));
}

/// A submit arriving while another is in flight wins; the older caller is told so.
#[tokio::test(start_paused = true)]
async fn test_concurrent_submit_supersedes() {
    let mock = MockGateway::new();
    mock.expect_submit()
        .after(Duration::from_millis(1000))
        .return_ok(view(1, OrderStatus::Received));
    mock.expect_submit().return_ok(view(2, OrderStatus::Received));
    mock.expect_fetch(OrderId(2)).return_ok(view(2, OrderStatus::Received));

    let session = OrderTrackingSession::spawn(mock.gateway(), TrackerConfig::default());
    let first = tokio::spawn({
        let session = session.clone();
        async move { session.submit(request()).await }
    });
    sleep(SETTLE).await;
    assert_eq!(session.snapshot().phase, SessionPhase::Submitting);

    let second = session.submit(request()).await.unwrap();
    assert_eq!(second.id, OrderId(2));
    assert_eq!(first.await.unwrap(), Err(TrackingError::Superseded));

    sleep(Duration::from_millis(1500)).await;
    assert_eq!(session.snapshot().current_view.unwrap().id, OrderId(2));
    assert_eq!(mock.submit_calls().len(), 2);
    assert_eq!(mock.fetch_calls(), vec![OrderId(2)]);
    mock.verify();
}

#[tokio::test(start_paused = true)]
async fn test_failure_bound_abandons_polling() {
    let mock = MockGateway::new();
    mock.expect_submit().return_ok(view(77, OrderStatus::Received));
    for _ in 0..2 {
        mock.expect_fetch(OrderId(77))
            .return_err(GatewayError::Transport("connection refused".into()));
    }

    let config = TrackerConfig::default().with_max_consecutive_poll_failures(2);
    let session = OrderTrackingSession::spawn(mock.gateway(), config);
    session.submit(request()).await.unwrap();

    sleep(INTERVAL + SETTLE).await;
    let snapshot = session.snapshot();
    assert_eq!(snapshot.phase, SessionPhase::Terminal);
    assert!(!snapshot.is_polling);
    assert_eq!(snapshot.current_view.unwrap().status, OrderStatus::Received);
    assert!(snapshot
        .last_error
        .unwrap()
        .starts_with("polling abandoned after 2 consecutive failures"));

    sleep(INTERVAL * 3).await;
    assert_eq!(mock.fetch_calls().len(), 2);
    mock.verify();
}

#[tokio::test(start_paused = true)]
async fn test_stop_is_final_and_idempotent() {
    let mock = MockGateway::new();
    mock.expect_submit().return_ok(view(77, OrderStatus::Received));
    mock.expect_fetch(OrderId(77)).return_ok(view(77, OrderStatus::StockReserved));

    let session = OrderTrackingSession::spawn(mock.gateway(), TrackerConfig::default());
    session.submit(request()).await.unwrap();
    sleep(SETTLE).await;

    session.stop().await.unwrap();
    session.stop().await.unwrap();

    let snapshot = session.snapshot();
    assert_eq!(snapshot.phase, SessionPhase::Terminal);
    assert!(!snapshot.is_polling);
    assert_eq!(snapshot.last_error, None);
    assert_eq!(status_of(&session), Some(OrderStatus::StockReserved));

    sleep(INTERVAL * 3).await;
    assert_eq!(mock.fetch_calls().len(), 1);
    mock.verify();
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_stops_polling() {
    let mock = MockGateway::new();
    mock.expect_submit().return_ok(view(77, OrderStatus::Received));
    mock.expect_fetch(OrderId(77)).return_ok(view(77, OrderStatus::Received));

    let session = OrderTrackingSession::spawn(mock.gateway(), TrackerConfig::default());
    session.submit(request()).await.unwrap();
    sleep(SETTLE).await;

    session.shutdown().await.unwrap();
    assert!(!session.snapshot().is_polling);

    sleep(INTERVAL * 3).await;
    assert_eq!(mock.fetch_calls().len(), 1);
    assert_eq!(
        session.submit(request()).await,
        Err(TrackingError::SessionClosed)
    );
}

#[tokio::test(start_paused = true)]
async fn test_dropping_last_handle_tears_down() {
    let mock = MockGateway::new();
    mock.expect_submit().return_ok(view(77, OrderStatus::Received));
    mock.expect_fetch(OrderId(77)).return_ok(view(77, OrderStatus::Received));

    let session = OrderTrackingSession::spawn(mock.gateway(), TrackerConfig::default());
    let mut observer = session.subscribe();
    session.submit(request()).await.unwrap();
    drop(session);

    sleep(INTERVAL * 3).await;
    assert!(mock.fetch_calls().len() <= 1);
    assert!(!observer.borrow_and_update().is_polling);
}

/// A zero poll interval still produces the immediate fetch instead of wedging the session.
#[tokio::test(start_paused = true)]
async fn test_zero_poll_interval_still_tracks() {
    let mock = MockGateway::new();
    mock.expect_submit().return_ok(view(77, OrderStatus::Received));
    mock.expect_fetch(OrderId(77)).return_ok(view(77, OrderStatus::ScheduledForDelivery));

    let config = TrackerConfig {
        poll_interval: Duration::ZERO,
        ..TrackerConfig::default()
    };
    let session = OrderTrackingSession::spawn(mock.gateway(), config);
    session.submit(request()).await.unwrap();

    let settled = tokio::time::timeout(Duration::from_secs(5), session.settled())
        .await
        .expect("session never settled")
        .unwrap();
    assert!(!settled.is_polling);
    assert_eq!(status_of(&session), Some(OrderStatus::ScheduledForDelivery));
    assert!(!mock.fetch_calls().is_empty());
}

/// After a new submit returns, `settled` waits for the new order rather than the finished one.
#[tokio::test(start_paused = true)]
async fn test_settled_follows_the_latest_order() {
    let mock = MockGateway::new();
    mock.expect_submit().return_ok(view(1, OrderStatus::ScheduledForDelivery));
    mock.expect_submit().return_ok(view(2, OrderStatus::Received));
    mock.expect_fetch(OrderId(2)).return_ok(view(2, OrderStatus::StockReserved));
    mock.expect_fetch(OrderId(2)).return_ok(view(2, OrderStatus::Failed));

    let session = OrderTrackingSession::spawn(mock.gateway(), TrackerConfig::default());
    session.submit(request()).await.unwrap();
    let first = session.settled().await.unwrap();
    assert_eq!(first.current_view.unwrap().id, OrderId(1));

    session.submit(request()).await.unwrap();
    let second = tokio::time::timeout(INTERVAL * 5, session.settled())
        .await
        .expect("second order never settled")
        .unwrap();
    let current = second.current_view.unwrap();
    assert_eq!(current.id, OrderId(2));
    assert_eq!(current.status, OrderStatus::Failed);
    mock.verify();
}

