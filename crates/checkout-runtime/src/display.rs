//! Display Collaborator
//!
//! The embedded browser surface. The controller only tells it to show, hide
//! or reload; the surface reports navigations through
//! [`crate::ControllerHandle::navigated`] and transition completion through
//! the [`Transition`] it was handed.

use tokio::sync::mpsc;

use checkout_core::{Event, Url};

use crate::controller::Command;

/// In-app browser surface driven by the controller
pub trait DisplaySurface: Send + Sync {
    /// Load `url` and start the show transition
    fn show(&self, url: &Url, done: Transition);

    /// Start the hide transition
    fn hide(&self, done: Transition);

    /// Reload the current page
    fn reload(&self);
}

/// Completion handle for a show/hide transition
///
/// Call [`Transition::complete`] once the animation has finished. Dropping it
/// without completing leaves the controller waiting in its closing state.
#[derive(Debug)]
#[must_use = "the controller waits for the transition to complete"]
pub struct Transition {
    tx: mpsc::UnboundedSender<Command>,
    event: Event,
}

impl Transition {
    pub(crate) fn new(tx: mpsc::UnboundedSender<Command>, event: Event) -> Self {
        Self { tx, event }
    }

    pub fn complete(self) {
        if self.tx.send(Command::Event(self.event)).is_err() {
            tracing::debug!("Controller stopped before transition completed");
        }
    }
}
