//! Session Lifecycle Controller
//!
//! A single task owns the [`SessionState`] and processes events one at a
//! time: each event is reduced and its effects executed before the next one
//! is taken off the queue. Slow work (the initialization call, the abort
//! prompt, display transitions) runs elsewhere and re-enters as events.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{mpsc, oneshot};

use checkout_core::{
    Effect, Event, SessionInitializer, SessionRequest, SessionSnapshot, SessionState, reduce,
};

use crate::config::ControllerConfig;
use crate::display::{DisplaySurface, Transition};
use crate::host::HostCallbacks;

/// Message on the controller queue
#[derive(Debug)]
pub(crate) enum Command {
    Event(Event),
    Snapshot(oneshot::Sender<SessionSnapshot>),
    Shutdown,
}

/// Owner of the session state; runs until shut down or every handle is dropped
pub struct Controller {
    initializer: Arc<dyn SessionInitializer>,
    display: Arc<dyn DisplaySurface>,
    host: Arc<dyn HostCallbacks>,
    tx: mpsc::WeakUnboundedSender<Command>,
}

impl Controller {
    /// Start a controller on the current tokio runtime
    pub fn spawn(
        initializer: Arc<dyn SessionInitializer>,
        display: Arc<dyn DisplaySurface>,
        host: Arc<dyn HostCallbacks>,
        request: SessionRequest,
        config: ControllerConfig,
    ) -> ControllerHandle {
        let (tx, rx) = mpsc::unbounded_channel();
        let controller = Self {
            initializer,
            display,
            host,
            tx: tx.downgrade(),
        };
        let state = SessionState::new(request, config.policy());

        tracing::debug!(initializer = %controller.initializer.name(), "Starting checkout controller");
        tokio::spawn(controller.run(state, rx));

        ControllerHandle { tx }
    }

    async fn run(self, mut state: SessionState, mut rx: mpsc::UnboundedReceiver<Command>) {
        while let Some(command) = rx.recv().await {
            match command {
                Command::Event(event) => state = self.dispatch(state, event),
                Command::Snapshot(reply) => {
                    let _ = reply.send(state.snapshot());
                }
                Command::Shutdown => break,
            }
        }

        // Cancel whatever is still in flight
        self.dispatch(state, Event::Teardown);
        tracing::debug!("Checkout controller stopped");
    }

    fn dispatch(&self, state: SessionState, event: Event) -> SessionState {
        let before = state.phase();
        let (next, effects) = reduce(state, event);
        if next.phase() != before {
            tracing::debug!(from = %before, to = %next.phase(), "Session phase changed");
        }
        for effect in effects {
            self.execute(effect);
        }
        next
    }

    fn execute(&self, effect: Effect) {
        match effect {
            Effect::NotifyWillInitialize => self.host.on_will_initialize(),
            Effect::Initialize {
                attempt,
                request,
                token,
            } => {
                let Some(tx) = self.tx.upgrade() else { return };
                let initializer = Arc::clone(&self.initializer);
                tokio::spawn(async move {
                    let result = initializer.initialize(&request, &token).await;
                    let event = Event::InitializationFinished {
                        attempt,
                        result,
                        now: Utc::now(),
                    };
                    // A stopped controller no longer cares about the result
                    let _ = tx.send(Command::Event(event));
                });
            }
            Effect::NotifyDidInitialize => self.host.on_did_initialize(),
            Effect::NotifyInitializeError(error) => self.host.on_initialize_error(&error),
            Effect::Show { url } => {
                if let Some(done) = self.transition(Event::ShowFinished) {
                    self.display.show(&url, done);
                }
            }
            Effect::Hide => {
                if let Some(done) = self.transition(Event::HideFinished) {
                    self.display.hide(done);
                }
            }
            Effect::Reload => self.display.reload(),
            Effect::Cancel(token) => token.cancel(),
            Effect::ConfirmAbort => {
                let Some(tx) = self.tx.upgrade() else { return };
                let host = Arc::clone(&self.host);
                tokio::spawn(async move {
                    let event = if host.confirm_abort().await {
                        Event::AbortConfirmed
                    } else {
                        Event::AbortDeclined
                    };
                    let _ = tx.send(Command::Event(event));
                });
            }
            Effect::NotifyAbort => self.host.on_abort(),
            Effect::NotifyComplete(outcome) => self.host.on_complete(&outcome),
            Effect::NotifyRedirectError(error) => self.host.on_redirect_error(&error),
        }
    }

    fn transition(&self, event: Event) -> Option<Transition> {
        self.tx.upgrade().map(|tx| Transition::new(tx, event))
    }
}

/// Cloneable front door to a running [`Controller`]
///
/// Entry points never fail: once the controller has stopped, events are
/// logged and dropped.
#[derive(Clone, Debug)]
pub struct ControllerHandle {
    tx: mpsc::UnboundedSender<Command>,
}

impl ControllerHandle {
    /// Start (or reopen) the checkout
    pub fn begin(&self) {
        self.send(Event::Begin { now: Utc::now() });
    }

    /// Forward a navigation event from the display
    pub fn navigated(&self, location: impl Into<String>) {
        self.send(Event::Navigated(location.into()));
    }

    /// User asked to leave the embedded browser; the host is prompted first
    pub fn abort(&self) {
        self.send(Event::AbortRequested);
    }

    /// Hide the display, then reset
    pub fn dismiss(&self) {
        self.send(Event::Dismiss);
    }

    /// Reload the displayed page (e.g. after a load error)
    pub fn reload(&self) {
        self.send(Event::Reload);
    }

    /// Supply a new session request
    pub fn update_request(&self, request: SessionRequest) {
        self.send(Event::RequestChanged(request));
    }

    /// Current state, or `None` once the controller has stopped
    pub async fn snapshot(&self) -> Option<SessionSnapshot> {
        let (reply, rx) = oneshot::channel();
        self.tx.send(Command::Snapshot(reply)).ok()?;
        rx.await.ok()
    }

    /// Cancel any in-flight initialization and stop the controller
    pub fn shutdown(&self) {
        if self.tx.send(Command::Shutdown).is_err() {
            tracing::debug!("Controller already stopped");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    fn send(&self, event: Event) {
        if self.tx.send(Command::Event(event)).is_err() {
            tracing::warn!("Checkout controller has stopped, event dropped");
        }
    }
}
