use crate::config::TrackerConfig;
use crate::gateway::OrderGateway;
use crate::model::{OrderRequest, OrderView};
use crate::session::actor::{SessionRequest, TrackingActor};
use crate::session::{TrackingError, TrackingSnapshot};
use crate::status::Progress;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, instrument};

const MAILBOX_SIZE: usize = 32;

/// Handle to a running tracking session.
///
/// Cloning the handle is cheap; every clone talks to the same actor. The actor
/// shuts down on [`OrderTrackingSession::shutdown`] or when the last handle is dropped,
/// and in both cases stops polling before it exits.
#[derive(Clone)]
pub struct OrderTrackingSession {
    sender: mpsc::Sender<SessionRequest>,
    state: watch::Receiver<TrackingSnapshot>,
}

impl OrderTrackingSession {
    pub(crate) fn new(
        sender: mpsc::Sender<SessionRequest>,
        state: watch::Receiver<TrackingSnapshot>,
    ) -> Self {
        Self { sender, state }
    }

    /// Spawns the session actor on the current Tokio runtime and returns its handle.
    pub fn spawn(gateway: Arc<dyn OrderGateway>, config: TrackerConfig) -> Self {
        let (actor, session) = TrackingActor::new(MAILBOX_SIZE, gateway, config);
        tokio::spawn(actor.run());
        session
    }

    /// Submits `request` and, once the service accepts it, starts tracking it.
    ///
    /// Resets the session first: any previous order stops being polled and the
    /// previous view and error are cleared. Resolves with the service's first view.
    ///
    /// # Errors
    /// - [`TrackingError::InvalidRequest`] if the request fails validation (state untouched)
    /// - [`TrackingError::Submission`] if the service call failed
    /// - [`TrackingError::Superseded`] if another submit replaced this one first
    #[instrument(skip(self, request))]
    pub async fn submit(&self, request: OrderRequest) -> Result<OrderView, TrackingError> {
        debug!(?request, "submit called");
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(SessionRequest::Submit { request, respond_to })
            .await
            .map_err(|_| TrackingError::SessionClosed)?;
        response.await.map_err(|_| TrackingError::SessionClosed)?
    }

    /// Stops polling the current order. A no-op when nothing is being polled.
    #[instrument(skip(self))]
    pub async fn stop(&self) -> Result<(), TrackingError> {
        debug!("Sending request");
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(SessionRequest::Stop { respond_to })
            .await
            .map_err(|_| TrackingError::SessionClosed)?;
        response.await.map_err(|_| TrackingError::SessionClosed)?
    }

    /// Tears the session down and waits until polling has stopped.
    #[instrument(skip(self))]
    pub async fn shutdown(&self) -> Result<(), TrackingError> {
        debug!("Sending request");
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(SessionRequest::Shutdown { respond_to })
            .await
            .map_err(|_| TrackingError::SessionClosed)?;
        response.await.map_err(|_| TrackingError::SessionClosed)?
    }

    /// Latest published state.
    pub fn snapshot(&self) -> TrackingSnapshot {
        self.state.borrow().clone()
    }

    /// Receiver notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<TrackingSnapshot> {
        self.state.clone()
    }

    /// Progress projection of the current view.
    pub fn progress(&self) -> Option<Progress> {
        self.state.borrow().progress()
    }

    /// Waits until the session reaches [`SessionPhase::Terminal`](crate::session::SessionPhase::Terminal).
    ///
    /// Resolves immediately when the session is already terminal, including a
    /// terminal state left over from a previous order. To wait for a new order,
    /// call this after its `submit` has returned.
    pub async fn settled(&self) -> Result<TrackingSnapshot, TrackingError> {
        let mut state = self.state.clone();
        let snapshot = state
            .wait_for(TrackingSnapshot::is_terminal)
            .await
            .map_err(|_| TrackingError::SessionClosed)?;
        Ok(snapshot.clone())
    }
}
