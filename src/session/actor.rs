//! # Tracking Actor
//!
//! The task that owns all session state.
//!
//! **Concurrency Model**:
//! The actor handles its mailbox and its internal events one at a time, so the
//! snapshot, the pending submission and the polling controller need no locks.
//! Everything that suspends (the submit call, each status fetch) runs in a
//! spawned task and reports back as a [`SessionEvent`] tagged with the ticket or
//! generation that issued it. Between two events the state is always coherent.

use crate::config::TrackerConfig;
use crate::gateway::{GatewayError, OrderGateway};
use crate::model::{OrderId, OrderRequest, OrderView};
use crate::polling::{PollingController, TickOutcome};
use crate::session::{OrderTrackingSession, SessionPhase, TrackingError, TrackingSnapshot};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, error, info, warn};

/// Type alias for the one-shot response channel used by the actor.
pub type Response<T> = oneshot::Sender<Result<T, TrackingError>>;

/// Requests sent by [`OrderTrackingSession`] handles.
#[derive(Debug)]
pub enum SessionRequest {
    Submit {
        request: OrderRequest,
        respond_to: Response<OrderView>,
    },
    Stop {
        respond_to: Response<()>,
    },
    Shutdown {
        respond_to: Response<()>,
    },
}

/// Completions of work the actor spawned.
#[derive(Debug)]
pub enum SessionEvent {
    Submitted {
        ticket: u64,
        result: Result<OrderView, GatewayError>,
    },
    Tick(TickOutcome),
}

struct PendingSubmit {
    ticket: u64,
    respond_to: Response<OrderView>,
}

pub struct TrackingActor {
    receiver: mpsc::Receiver<SessionRequest>,
    events: mpsc::UnboundedReceiver<SessionEvent>,
    event_sender: mpsc::UnboundedSender<SessionEvent>,
    gateway: Arc<dyn OrderGateway>,
    poller: PollingController,
    config: TrackerConfig,
    state: watch::Sender<TrackingSnapshot>,
    snapshot: TrackingSnapshot,
    pending_submit: Option<PendingSubmit>,
    next_ticket: u64,
    // highest tick sequence applied in the current generation
    last_sequence: u64,
}

impl TrackingActor {
    pub fn new(
        buffer_size: usize,
        gateway: Arc<dyn OrderGateway>,
        config: TrackerConfig,
    ) -> (Self, OrderTrackingSession) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let (event_sender, events) = mpsc::unbounded_channel();
        let (state, observer) = watch::channel(TrackingSnapshot::default());
        let poller = PollingController::new(gateway.clone(), config.effective_request_timeout());

        let actor = Self {
            receiver,
            events,
            event_sender,
            gateway,
            poller,
            config,
            state,
            snapshot: TrackingSnapshot::default(),
            pending_submit: None,
            next_ticket: 0,
            last_sequence: 0,
        };
        let session = OrderTrackingSession::new(sender, observer);
        (actor, session)
    }

    /// Runs the actor's event loop until shutdown or until every handle is dropped.
    pub async fn run(mut self) {
        info!("Tracking session started");

        loop {
            tokio::select! {
                biased;
                request = self.receiver.recv() => match request {
                    Some(SessionRequest::Submit { request, respond_to }) => {
                        self.handle_submit(request, respond_to);
                    }
                    Some(SessionRequest::Stop { respond_to }) => {
                        self.handle_stop();
                        let _ = respond_to.send(Ok(()));
                    }
                    Some(SessionRequest::Shutdown { respond_to }) => {
                        self.teardown();
                        let _ = respond_to.send(Ok(()));
                        return;
                    }
                    None => break,
                },
                Some(event) = self.events.recv() => match event {
                    SessionEvent::Submitted { ticket, result } => self.handle_submitted(ticket, result),
                    SessionEvent::Tick(outcome) => self.handle_tick(outcome),
                },
            }
        }

        self.teardown();
    }

    fn handle_submit(&mut self, request: OrderRequest, respond_to: Response<OrderView>) {
        debug!(?request, "Submit");
        if let Err(reason) = request.validate() {
            warn!(error = %reason, "Rejected order request");
            let _ = respond_to.send(Err(TrackingError::InvalidRequest(reason)));
            return;
        }

        if let Some(previous) = self.pending_submit.take() {
            debug!(ticket = previous.ticket, "Superseding pending submission");
            let _ = previous.respond_to.send(Err(TrackingError::Superseded));
        }
        self.poller.stop();
        self.last_sequence = 0;
        self.snapshot = TrackingSnapshot {
            phase: SessionPhase::Submitting,
            ..TrackingSnapshot::default()
        };
        self.publish();

        self.next_ticket += 1;
        let ticket = self.next_ticket;
        self.pending_submit = Some(PendingSubmit { ticket, respond_to });

        let gateway = self.gateway.clone();
        let events = self.event_sender.clone();
        tokio::spawn(async move {
            let result = gateway.submit_order(&request).await;
            let _ = events.send(SessionEvent::Submitted { ticket, result });
        });
        info!(ticket, "Order submitted to gateway");
    }

    fn handle_submitted(&mut self, ticket: u64, result: Result<OrderView, GatewayError>) {
        let pending = match self.pending_submit.take() {
            Some(pending) if pending.ticket == ticket => pending,
            other => {
                self.pending_submit = other;
                debug!(ticket, "Discarding stale submission result");
                return;
            }
        };

        let result = result.and_then(|view| {
            if view.id.0 == 0 {
                Err(GatewayError::MalformedResponse(
                    "response carries no order id".to_string(),
                ))
            } else {
                Ok(view)
            }
        });

        match result {
            Ok(view) => {
                let order_id = view.id;
                if view.status.is_terminal() {
                    info!(%order_id, status = %view.status, "Order already terminal on submit");
                    self.snapshot.phase = SessionPhase::Terminal;
                } else {
                    info!(%order_id, status = %view.status, "Order accepted");
                    self.snapshot.phase = SessionPhase::Tracking;
                    self.start_polling(order_id);
                }
                self.snapshot.current_view = Some(view.clone());
                self.publish();
                let _ = pending.respond_to.send(Ok(view));
            }
            Err(e) => {
                error!(error = %e, "Order submission failed");
                self.snapshot.phase = SessionPhase::Terminal;
                self.snapshot.current_view = None;
                self.snapshot.last_error = Some(e.to_string());
                self.publish();
                let _ = pending.respond_to.send(Err(TrackingError::Submission(e)));
            }
        }
    }

    fn start_polling(&mut self, order_id: OrderId) {
        let events = self.event_sender.clone();
        self.poller.start(
            order_id,
            move |outcome| {
                let _ = events.send(SessionEvent::Tick(outcome));
            },
            self.config.poll_interval,
        );
        self.last_sequence = 0;
        self.snapshot.is_polling = true;
    }

    fn handle_tick(&mut self, outcome: TickOutcome) {
        let order_id = outcome.order_id;
        if !self.poller.is_running() || outcome.generation != self.poller.generation() {
            debug!(%order_id, generation = outcome.generation, "Discarding tick from a stopped schedule");
            return;
        }
        if outcome.sequence <= self.last_sequence {
            debug!(%order_id, sequence = outcome.sequence, "Discarding out-of-order tick");
            return;
        }

        match outcome.result {
            Ok(view) => {
                self.last_sequence = outcome.sequence;
                self.snapshot.consecutive_poll_failures = 0;

                let changed = self
                    .snapshot
                    .current_view
                    .as_ref()
                    .map_or(true, |current| current.status != view.status);
                if changed {
                    info!(%order_id, status = %view.status, "Order status changed");
                }

                let terminal = view.status.is_terminal();
                self.snapshot.current_view = Some(view);
                if terminal {
                    self.poller.stop();
                    self.snapshot.is_polling = false;
                    self.snapshot.phase = SessionPhase::Terminal;
                    info!(%order_id, "Order reached a terminal status");
                }
            }
            Err(e) => {
                self.snapshot.consecutive_poll_failures += 1;
                let failures = self.snapshot.consecutive_poll_failures;
                warn!(%order_id, failures, error = %e, "Poll failed, keeping last view");

                if let Some(limit) = self.config.max_consecutive_poll_failures {
                    if failures >= limit {
                        error!(%order_id, failures, "Abandoning polling");
                        self.poller.stop();
                        self.snapshot.is_polling = false;
                        self.snapshot.phase = SessionPhase::Terminal;
                        self.snapshot.last_error = Some(format!(
                            "polling abandoned after {failures} consecutive failures: {e}"
                        ));
                    }
                }
            }
        }

        self.publish();
    }

    fn handle_stop(&mut self) {
        if !self.poller.is_running() {
            debug!("Stop requested while not polling");
            return;
        }
        self.poller.stop();
        self.snapshot.is_polling = false;
        if self.snapshot.phase == SessionPhase::Tracking {
            self.snapshot.phase = SessionPhase::Terminal;
        }
        self.publish();
        info!("Tracking stopped on request");
    }

    fn teardown(&mut self) {
        self.poller.stop();
        if let Some(pending) = self.pending_submit.take() {
            let _ = pending.respond_to.send(Err(TrackingError::SessionClosed));
        }
        if self.snapshot.is_polling {
            self.snapshot.is_polling = false;
            self.publish();
        }
        info!(phase = ?self.snapshot.phase, "Tracking session shut down");
    }

    fn publish(&self) {
        self.state.send_replace(self.snapshot.clone());
    }
}
