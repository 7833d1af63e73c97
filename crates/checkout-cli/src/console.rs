//! Console display and host
//!
//! Stands in for the in-app browser: the hosted link is printed, and the
//! operator pastes back the locations the browser navigates to.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};

use checkout_core::{CheckoutError, Url};
use checkout_runtime::{DisplaySurface, HostCallbacks, InitializationError, RedirectOutcome, Transition};

/// How the checkout ended
#[derive(Debug)]
pub enum Finished {
    Completed(RedirectOutcome),
    Aborted,
    Failed(InitializationError),
    Malformed(CheckoutError),
}

/// Pending yes/no answer for the abort prompt
pub type PromptSlot = Arc<Mutex<Option<oneshot::Sender<bool>>>>;

/// Prints instead of rendering
pub struct ConsoleDisplay;

impl DisplaySurface for ConsoleDisplay {
    fn show(&self, url: &Url, done: Transition) {
        println!();
        println!("Open this link to pay:");
        println!("  {url}");
        println!();
        println!("Paste each location the browser visits, or type 'abort' / 'reload'.");
        done.complete();
    }

    fn hide(&self, done: Transition) {
        println!("Checkout closed.");
        done.complete();
    }

    fn reload(&self) {
        println!("Reloading checkout page...");
    }
}

/// Forwards terminal callbacks to the main loop
pub struct ConsoleHost {
    finished: mpsc::UnboundedSender<Finished>,
    prompt: PromptSlot,
}

impl ConsoleHost {
    pub const fn new(finished: mpsc::UnboundedSender<Finished>, prompt: PromptSlot) -> Self {
        Self { finished, prompt }
    }

    fn finish(&self, finished: Finished) {
        let _ = self.finished.send(finished);
    }
}

#[async_trait]
impl HostCallbacks for ConsoleHost {
    fn on_will_initialize(&self) {
        println!("Creating payment session...");
    }

    fn on_did_initialize(&self) {
        tracing::info!("Payment session created");
    }

    fn on_initialize_error(&self, error: &InitializationError) {
        self.finish(Finished::Failed(error.clone()));
    }

    fn on_abort(&self) {
        self.finish(Finished::Aborted);
    }

    fn on_complete(&self, outcome: &RedirectOutcome) {
        self.finish(Finished::Completed(outcome.clone()));
    }

    fn on_redirect_error(&self, error: &CheckoutError) {
        self.finish(Finished::Malformed(error.clone()));
    }

    async fn confirm_abort(&self) -> bool {
        let (tx, rx) = oneshot::channel();
        match self.prompt.lock() {
            Ok(mut slot) => *slot = Some(tx),
            Err(_) => return false,
        }
        println!("Are you sure you want to cancel this payment? [y/N]");
        rx.await.unwrap_or(false)
    }
}

/// Answer a pending abort prompt with `line`; false if none was pending
pub fn answer_prompt(prompt: &PromptSlot, line: &str) -> bool {
    let pending = prompt.lock().ok().and_then(|mut slot| slot.take());
    match pending {
        Some(tx) => {
            let yes = matches!(line.trim().to_lowercase().as_str(), "y" | "yes");
            let _ = tx.send(yes);
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_prompt_answer() {
        let slot: PromptSlot = Arc::default();
        assert!(!answer_prompt(&slot, "y"));

        let (tx, rx) = oneshot::channel();
        *slot.lock().unwrap() = Some(tx);
        assert!(answer_prompt(&slot, " Yes "));
        assert!(rx.await.unwrap());

        let (tx, rx) = oneshot::channel();
        *slot.lock().unwrap() = Some(tx);
        assert!(answer_prompt(&slot, "nope"));
        assert!(!rx.await.unwrap());
    }
}
