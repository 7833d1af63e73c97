//! Session Lifecycle Reducer
//!
//! Pure transition function `(state, event) -> (state, effects)`. The runtime
//! feeds events one at a time and executes the returned effects in order.
//!
//! ```text
//!          Begin                    Ok(url)
//!  Idle ──────────▶ Initializing ─────────────▶ Showing
//!   ▲                   │ Aborted                 │ redirect / abort / dismiss
//!   │◀──────────────────┘                         ▼
//!   │◀──────────── HideFinished (reset) ◀──── closing
//!  Ready ◀──────────────────────────────────────┘ (link kept)
//! ```

use chrono::{DateTime, Utc};
use url::Url;

use crate::cancel::CancellationToken;
use crate::error::{CheckoutError, InitializationError, Result};
use crate::redirect::{RedirectOutcome, classify};
use crate::request::{PreparedRequest, SessionRequest};
use crate::session::{Attempt, AttemptId, SessionLink, SessionState};

/// Inputs to the state machine
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Host pressed the pay button
    Begin { now: DateTime<Utc> },

    /// The initialization client resolved
    InitializationFinished {
        attempt: AttemptId,
        result: Result<Url>,
        now: DateTime<Utc>,
    },

    /// The display navigated to a new location
    Navigated(String),

    /// User asked to leave the embedded browser
    AbortRequested,

    /// Host confirmed the abort prompt
    AbortConfirmed,

    /// Host declined the abort prompt
    AbortDeclined,

    /// Start the hide transition
    Dismiss,

    /// Show transition completed
    ShowFinished,

    /// Hide transition completed
    HideFinished,

    /// Host supplied a new session request
    RequestChanged(SessionRequest),

    /// Reload the displayed page
    Reload,

    /// Controller is being destroyed
    Teardown,
}

/// Side effects requested by a transition
#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    NotifyWillInitialize,

    /// Start the initialization client for this attempt
    Initialize {
        attempt: AttemptId,
        request: PreparedRequest,
        token: CancellationToken,
    },

    NotifyDidInitialize,

    NotifyInitializeError(InitializationError),

    /// Load the link in the display and run the show transition
    Show { url: Url },

    /// Run the hide transition; the display answers with `HideFinished`
    Hide,

    Reload,

    /// Fire an in-flight attempt's cancellation token
    Cancel(CancellationToken),

    /// Ask the host for a yes/no abort confirmation
    ConfirmAbort,

    NotifyAbort,

    NotifyComplete(RedirectOutcome),

    NotifyRedirectError(CheckoutError),
}

/// Apply one event
pub fn reduce(mut state: SessionState, event: Event) -> (SessionState, Vec<Effect>) {
    let mut effects = Vec::new();

    match event {
        Event::Begin { now } => begin(&mut state, now, &mut effects),
        Event::InitializationFinished {
            attempt,
            result,
            now,
        } => initialization_finished(&mut state, attempt, result, now, &mut effects),
        Event::Navigated(location) => navigated(&mut state, &location, &mut effects),
        Event::AbortRequested => {
            if state.visible && !state.closing {
                effects.push(Effect::ConfirmAbort);
            }
        }
        Event::AbortConfirmed => {
            if state.visible && !state.closing {
                tracing::info!(tx_ref = ?state.last_tx_ref, "Checkout aborted by user");
                state.closing = true;
                effects.push(Effect::NotifyAbort);
                effects.push(Effect::Hide);
            }
        }
        Event::AbortDeclined => {
            tracing::debug!("Abort declined, checkout continues");
        }
        Event::Dismiss => {
            if !state.closing {
                state.closing = true;
                effects.push(Effect::Hide);
            }
        }
        Event::ShowFinished => {
            tracing::trace!("Show transition finished");
        }
        Event::HideFinished => reset(&mut state, &mut effects),
        Event::RequestChanged(request) => request_changed(&mut state, request, &mut effects),
        Event::Reload => {
            if state.visible && !state.closing {
                effects.push(Effect::Reload);
            }
        }
        Event::Teardown => {
            if let Some(attempt) = state.attempt.take() {
                effects.push(Effect::Cancel(attempt.token));
            }
            state = SessionState::new(state.request, state.policy);
        }
    }

    (state, effects)
}

fn begin(state: &mut SessionState, now: DateTime<Utc>, effects: &mut Vec<Effect>) {
    // Duplicate-submission guard
    if state.pending || state.closing {
        tracing::debug!(phase = %state.phase(), "Ignoring begin while busy");
        return;
    }

    if let Some(link) = &state.link {
        if link.is_expired(state.policy.link_ttl, now) {
            tracing::info!(issued_at = %link.issued_at, "Discarding expired session link");
            state.link = None;
        } else {
            if !state.visible {
                let url = link.url.clone();
                state.visible = true;
                effects.push(Effect::Show { url });
            }
            return;
        }
    }

    let tx_ref = state.request.tx_ref.clone();
    if state.last_tx_ref.as_deref() == Some(tx_ref.as_str()) {
        tracing::warn!(tx_ref = %tx_ref, "Rejecting reused transaction reference");
        let err = CheckoutError::DuplicateReference(tx_ref);
        effects.push(Effect::NotifyInitializeError(InitializationError::from(&err)));
        return;
    }

    let attempt = Attempt {
        id: AttemptId::new(),
        token: CancellationToken::new(),
    };
    tracing::info!(tx_ref = %tx_ref, attempt = %attempt.id, "Initializing payment session");

    state.pending = true;
    state.link = None;
    state.last_tx_ref = Some(tx_ref);
    state.attempt = Some(attempt.clone());

    effects.push(Effect::NotifyWillInitialize);
    effects.push(Effect::Initialize {
        attempt: attempt.id,
        request: state.request.prepare(&state.policy.redirect),
        token: attempt.token,
    });
}

fn initialization_finished(
    state: &mut SessionState,
    attempt: AttemptId,
    result: Result<Url>,
    now: DateTime<Utc>,
    effects: &mut Vec<Effect>,
) {
    let current = state.attempt.as_ref().is_some_and(|a| a.id == attempt);
    if !current || !state.pending {
        tracing::debug!(attempt = %attempt, "Ignoring result of superseded attempt");
        return;
    }
    state.attempt = None;
    state.pending = false;

    // Dismissed while the call was in flight; the result belongs to a closed session
    if state.closing {
        tracing::debug!(attempt = %attempt, "Dropping initialization result after dismiss");
        return;
    }

    match result {
        Ok(url) => {
            tracing::info!(attempt = %attempt, "Payment session ready");
            state.link = Some(SessionLink {
                url: url.clone(),
                issued_at: now,
            });
            state.visible = true;
            effects.push(Effect::NotifyDidInitialize);
            effects.push(Effect::Show { url });
        }
        Err(err) if err.is_abort() => {
            tracing::debug!(attempt = %attempt, "Initialization cancelled");
        }
        Err(err) => {
            tracing::warn!(attempt = %attempt, code = %err.code(), error = %err, "Initialization failed");
            effects.push(Effect::NotifyInitializeError(InitializationError::from(&err)));
            state.closing = true;
            effects.push(Effect::Hide);
        }
    }
}

fn navigated(state: &mut SessionState, location: &str, effects: &mut Vec<Effect>) {
    if !state.visible || state.closing {
        return;
    }

    match classify(&state.policy.redirect, location) {
        Ok(None) => {}
        Ok(Some(outcome)) => {
            tracing::info!(
                status = %outcome.status,
                tx_ref = ?outcome.tx_ref,
                transaction_id = ?outcome.transaction_id,
                "Checkout completed"
            );
            // The hosted session is spent either way; only success releases the reference
            state.force_clear = true;
            if outcome.is_successful() {
                state.last_tx_ref = None;
            }
            state.closing = true;
            effects.push(Effect::Hide);
            effects.push(Effect::NotifyComplete(outcome));
        }
        Err(err) => {
            tracing::error!(error = %err, "Redirect carried no usable status");
            state.force_clear = true;
            state.closing = true;
            effects.push(Effect::Hide);
            effects.push(Effect::NotifyRedirectError(err));
        }
    }
}

fn reset(state: &mut SessionState, effects: &mut Vec<Effect>) {
    if let Some(attempt) = state.attempt.take() {
        effects.push(Effect::Cancel(attempt.token));
    }
    state.pending = false;
    state.visible = false;
    state.closing = false;
    if state.force_clear {
        state.link = None;
    }
    state.force_clear = false;
}

fn request_changed(state: &mut SessionState, request: SessionRequest, effects: &mut Vec<Effect>) {
    if !request.differs_from(&state.request) {
        return;
    }
    state.request = request;

    if state.visible {
        tracing::debug!("Request changed while showing, clearing link at next reset");
        state.force_clear = true;
        return;
    }

    if let Some(attempt) = state.attempt.take() {
        tracing::info!(attempt = %attempt.id, "Request changed, cancelling stale initialization");
        effects.push(Effect::Cancel(attempt.token));
        state.pending = false;
        state.last_tx_ref = None;
        return;
    }

    tracing::debug!("Request changed, invalidating cached link and reference");
    state.link = None;
    state.last_tx_ref = None;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::redirect::RedirectStatus;
    use crate::request::Currency;
    use crate::session::{Phase, SessionPolicy};
    use chrono::Duration;
    use rust_decimal_macros::dec;

    const SESSION_URL: &str = "https://checkout.flutterwave.com/v3/hosted/pay/abc";

    fn request(tx_ref: &str) -> SessionRequest {
        SessionRequest::new("FLWSECK-test", tx_ref, dec!(500), Currency::Ngn, "ada@example.com")
    }

    fn idle() -> SessionState {
        SessionState::new(request("ref-1"), SessionPolicy::default())
    }

    fn begin_now(state: SessionState) -> (SessionState, Vec<Effect>) {
        reduce(state, Event::Begin { now: Utc::now() })
    }

    fn attempt_of(effects: &[Effect]) -> AttemptId {
        effects
            .iter()
            .find_map(|e| match e {
                Effect::Initialize { attempt, .. } => Some(*attempt),
                _ => None,
            })
            .expect("initialize effect")
    }

    fn finish(state: SessionState, attempt: AttemptId, result: Result<Url>) -> (SessionState, Vec<Effect>) {
        reduce(
            state,
            Event::InitializationFinished {
                attempt,
                result,
                now: Utc::now(),
            },
        )
    }

    fn showing() -> SessionState {
        let (state, effects) = begin_now(idle());
        let attempt = attempt_of(&effects);
        let (state, _) = finish(state, attempt, Ok(Url::parse(SESSION_URL).unwrap()));
        assert_eq!(state.phase(), Phase::Showing);
        state
    }

    #[test]
    fn test_begin_starts_initialization() {
        let (state, effects) = begin_now(idle());
        assert_eq!(state.phase(), Phase::Initializing);
        assert_eq!(state.last_tx_ref(), Some("ref-1"));
        assert_eq!(effects.len(), 2);
        assert_eq!(effects[0], Effect::NotifyWillInitialize);

        let Effect::Initialize { request, token, .. } = &effects[1] else {
            panic!("expected initialize, got {:?}", effects[1]);
        };
        assert_eq!(request.redirect_url().as_str(), "https://flutterwave.com/rn-redirect");
        assert_eq!(request.tx_ref(), "ref-1");
        assert_eq!(Some(token), state.attempt().map(|a| &a.token));
    }

    #[test]
    fn test_begin_while_pending_is_noop() {
        let (state, _) = begin_now(idle());
        let (state, effects) = begin_now(state);
        assert!(effects.is_empty());
        assert_eq!(state.phase(), Phase::Initializing);
    }

    #[test]
    fn test_success_orders_notify_before_show() {
        let (state, effects) = begin_now(idle());
        let (state, effects) = finish(state, attempt_of(&effects), Ok(Url::parse(SESSION_URL).unwrap()));

        assert_eq!(
            effects,
            vec![
                Effect::NotifyDidInitialize,
                Effect::Show {
                    url: Url::parse(SESSION_URL).unwrap()
                },
            ]
        );
        assert_eq!(state.link().map(|l| l.url.as_str()), Some(SESSION_URL));
        assert!(state.attempt().is_none());
    }

    #[test]
    fn test_cancelled_initialization_is_silent() {
        let (state, effects) = begin_now(idle());
        let (state, effects) = finish(state, attempt_of(&effects), Err(CheckoutError::Aborted));
        assert!(effects.is_empty());
        assert_eq!(state.phase(), Phase::Idle);
    }

    #[test]
    fn test_failed_initialization_reports_then_dismisses() {
        let (state, effects) = begin_now(idle());
        let err = CheckoutError::Transport("connection refused".into());
        let (state, effects) = finish(state, attempt_of(&effects), Err(err.clone()));

        assert_eq!(
            effects,
            vec![
                Effect::NotifyInitializeError(InitializationError::from(&err)),
                Effect::Hide,
            ]
        );
        let (state, effects) = reduce(state, Event::HideFinished);
        assert!(effects.is_empty());
        assert_eq!(state.phase(), Phase::Idle);
    }

    #[test]
    fn test_superseded_result_is_ignored() {
        let (state, effects) = begin_now(idle());
        let stale = attempt_of(&effects);
        let (state, effects) = reduce(state, Event::Dismiss);
        assert_eq!(effects, vec![Effect::Hide]);
        let (state, effects) = reduce(state, Event::HideFinished);
        assert!(matches!(effects.as_slice(), [Effect::Cancel(_)]));

        let before = state.clone();
        let (state, effects) = finish(state, stale, Ok(Url::parse(SESSION_URL).unwrap()));
        assert!(effects.is_empty());
        assert_eq!(state, before);
    }

    #[test]
    fn test_result_after_dismiss_is_dropped() {
        let (state, effects) = begin_now(idle());
        let attempt = attempt_of(&effects);
        let (state, effects) = reduce(state, Event::Dismiss);
        assert_eq!(effects, vec![Effect::Hide]);

        // The call resolves before the hide transition finishes
        let (state, effects) = finish(state, attempt, Ok(Url::parse(SESSION_URL).unwrap()));
        assert!(effects.is_empty());
        assert!(!state.is_visible());
        assert!(state.link().is_none());

        let (state, effects) = reduce(state, Event::HideFinished);
        assert!(effects.is_empty());
        assert_eq!(state.phase(), Phase::Idle);

        // A new request starts a fresh session that completes normally
        let (state, effects) = reduce(state, Event::RequestChanged(request("ref-2")));
        assert!(effects.is_empty());
        let (state, effects) = begin_now(state);
        let (state, _) = finish(state, attempt_of(&effects), Ok(Url::parse(SESSION_URL).unwrap()));
        assert_eq!(state.phase(), Phase::Showing);
        let (_, effects) = reduce(
            state,
            Event::Navigated("https://flutterwave.com/rn-redirect?status=successful&tx_ref=ref-2".into()),
        );
        assert!(matches!(effects.as_slice(), [Effect::Hide, Effect::NotifyComplete(_)]));
    }

    #[test]
    fn test_failure_after_dismiss_is_not_reported() {
        let (state, effects) = begin_now(idle());
        let attempt = attempt_of(&effects);
        let (state, _) = reduce(state, Event::Dismiss);
        let (_, effects) = finish(state, attempt, Err(CheckoutError::Transport("reset".into())));
        assert!(effects.is_empty());
    }

    #[test]
    fn test_successful_redirect_clears_guard() {
        let state = showing();
        let (state, effects) = reduce(
            state,
            Event::Navigated("https://flutterwave.com/rn-redirect?status=successful&tx_ref=ref-1".into()),
        );

        assert_eq!(effects.len(), 2);
        assert_eq!(effects[0], Effect::Hide);
        let Effect::NotifyComplete(outcome) = &effects[1] else {
            panic!("expected completion");
        };
        assert_eq!(outcome.status, RedirectStatus::Successful);
        assert!(state.last_tx_ref().is_none());

        let (state, _) = reduce(state, Event::HideFinished);
        assert_eq!(state.phase(), Phase::Idle);
        assert!(state.link().is_none());
    }

    #[test]
    fn test_cancelled_redirect_keeps_guard() {
        let state = showing();
        let (state, effects) = reduce(
            state,
            Event::Navigated("https://flutterwave.com/rn-redirect?status=cancelled".into()),
        );
        assert!(matches!(effects[1], Effect::NotifyComplete(ref o) if o.status == RedirectStatus::Cancelled));

        let (state, _) = reduce(state, Event::HideFinished);
        assert_eq!(state.last_tx_ref(), Some("ref-1"));

        let (state, effects) = begin_now(state);
        let Some(Effect::NotifyInitializeError(err)) = effects.first() else {
            panic!("expected duplicate reference error");
        };
        assert_eq!(err.code, "SAME_TXREF");
        assert_eq!(state.phase(), Phase::Idle);
    }

    #[test]
    fn test_outcome_consumed_once() {
        let state = showing();
        let location = "https://flutterwave.com/rn-redirect?status=successful".to_string();
        let (state, first) = reduce(state, Event::Navigated(location.clone()));
        let (_, second) = reduce(state, Event::Navigated(location));
        assert_eq!(first.len(), 2);
        assert!(second.is_empty());
    }

    #[test]
    fn test_unrelated_navigation_changes_nothing() {
        let state = showing();
        let before = state.clone();
        let (state, effects) = reduce(
            state,
            Event::Navigated("https://checkout.flutterwave.com/v3/hosted/pay/abc/card".into()),
        );
        assert!(effects.is_empty());
        assert_eq!(state, before);
    }

    #[test]
    fn test_malformed_redirect_is_reported() {
        let state = showing();
        let (state, effects) = reduce(state, Event::Navigated("https://flutterwave.com/rn-redirect?tx_ref=x".into()));
        assert_eq!(effects[0], Effect::Hide);
        assert!(matches!(
            effects[1],
            Effect::NotifyRedirectError(CheckoutError::MalformedRedirect { .. })
        ));
        let (state, _) = reduce(state, Event::HideFinished);
        assert!(state.link().is_none());
        assert_eq!(state.last_tx_ref(), Some("ref-1"));
    }

    #[test]
    fn test_abort_requires_confirmation() {
        let state = showing();
        let (state, effects) = reduce(state, Event::AbortRequested);
        assert_eq!(effects, vec![Effect::ConfirmAbort]);

        let (state, effects) = reduce(state, Event::AbortDeclined);
        assert!(effects.is_empty());
        assert_eq!(state.phase(), Phase::Showing);

        let (state, effects) = reduce(state, Event::AbortConfirmed);
        assert_eq!(effects, vec![Effect::NotifyAbort, Effect::Hide]);

        // Link survives so reopening skips the network
        let (state, _) = reduce(state, Event::HideFinished);
        assert_eq!(state.phase(), Phase::Ready);
        let (state, effects) = begin_now(state);
        assert!(matches!(effects.as_slice(), [Effect::Show { .. }]));
        assert_eq!(state.phase(), Phase::Showing);
    }

    #[test]
    fn test_dismiss_twice_is_stable() {
        let state = showing();
        let (state, _) = reduce(state, Event::Dismiss);
        let (state, _) = reduce(state, Event::HideFinished);
        let after_first = state.clone();

        let (state, effects) = reduce(state, Event::Dismiss);
        assert_eq!(effects, vec![Effect::Hide]);
        let (state, effects) = reduce(state, Event::HideFinished);
        assert!(effects.is_empty());
        assert_eq!(state, after_first);
    }

    #[test]
    fn test_request_change_while_idle_invalidates_link() {
        let state = showing();
        let (state, _) = reduce(state, Event::Dismiss);
        let (state, _) = reduce(state, Event::HideFinished);
        assert_eq!(state.phase(), Phase::Ready);

        let (state, effects) = reduce(state, Event::RequestChanged(request("ref-2")));
        assert!(effects.is_empty());
        assert_eq!(state.phase(), Phase::Idle);
        assert!(state.last_tx_ref().is_none());

        let (_, effects) = begin_now(state);
        assert_eq!(effects[0], Effect::NotifyWillInitialize);
    }

    #[test]
    fn test_request_change_after_cancelled_redirect_starts_fresh() {
        let state = showing();
        let (state, _) = reduce(
            state,
            Event::Navigated("https://flutterwave.com/rn-redirect?status=cancelled".into()),
        );
        let (state, _) = reduce(state, Event::HideFinished);
        assert!(state.link().is_none());
        assert_eq!(state.last_tx_ref(), Some("ref-1"));

        let mut changed = request("ref-1");
        changed.amount = dec!(750);
        let (state, effects) = reduce(state, Event::RequestChanged(changed));
        assert!(effects.is_empty());
        assert!(state.last_tx_ref().is_none());

        let (_, effects) = begin_now(state);
        assert_eq!(effects[0], Effect::NotifyWillInitialize);
        assert!(matches!(effects[1], Effect::Initialize { .. }));
    }

    #[test]
    fn test_equal_request_is_not_a_change() {
        let state = showing();
        let (state, _) = reduce(state, Event::Dismiss);
        let (state, _) = reduce(state, Event::HideFinished);
        let (state, _) = reduce(state, Event::RequestChanged(request("ref-1")));
        assert_eq!(state.phase(), Phase::Ready);

        let (_, effects) = begin_now(state);
        assert!(matches!(effects.as_slice(), [Effect::Show { .. }]));
    }

    #[test]
    fn test_request_change_while_showing_defers() {
        let state = showing();
        let (state, effects) = reduce(state, Event::RequestChanged(request("ref-2")));
        assert!(effects.is_empty());
        assert!(state.force_clear());
        assert!(state.link().is_some());

        let (state, _) = reduce(state, Event::Dismiss);
        let (state, _) = reduce(state, Event::HideFinished);
        assert!(state.link().is_none());
        assert!(!state.force_clear());
    }

    #[test]
    fn test_request_change_while_initializing_cancels() {
        let (state, _) = begin_now(idle());
        let (state, effects) = reduce(state, Event::RequestChanged(request("ref-2")));
        assert!(matches!(effects.as_slice(), [Effect::Cancel(_)]));
        assert_eq!(state.phase(), Phase::Idle);
        assert!(state.attempt().is_none());
    }

    #[test]
    fn test_expired_link_is_discarded() {
        let policy = SessionPolicy {
            link_ttl: Some(Duration::minutes(10)),
            ..Default::default()
        };
        let state = SessionState::new(request("ref-1"), policy);
        let (state, effects) = begin_now(state);
        let (state, _) = finish(state, attempt_of(&effects), Ok(Url::parse(SESSION_URL).unwrap()));
        let (state, _) = reduce(state, Event::Dismiss);
        let (state, _) = reduce(state, Event::HideFinished);

        let later = Utc::now() + Duration::minutes(11);
        let (state, effects) = reduce(state, Event::Begin { now: later });
        assert!(state.link().is_none());
        assert!(matches!(
            effects.as_slice(),
            [Effect::NotifyInitializeError(e)] if e.code == "SAME_TXREF"
        ));
    }

    #[test]
    fn test_reload_only_while_showing() {
        let (_, effects) = reduce(idle(), Event::Reload);
        assert!(effects.is_empty());
        let (_, effects) = reduce(showing(), Event::Reload);
        assert_eq!(effects, vec![Effect::Reload]);
    }

    #[test]
    fn test_teardown_cancels_and_clears() {
        let (state, _) = begin_now(idle());
        let token = state.attempt().map(|a| a.token.clone()).unwrap();
        let (state, effects) = reduce(state, Event::Teardown);
        assert_eq!(effects, vec![Effect::Cancel(token)]);
        assert_eq!(state.phase(), Phase::Idle);
        assert!(state.last_tx_ref().is_none());
    }
}
