//! Session State
//!
//! The controller's explicit state value. Only [`crate::reducer::reduce`]
//! mutates it; everything else reads it through accessors or a snapshot.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use crate::cancel::CancellationToken;
use crate::redirect::RedirectEndpoint;
use crate::request::SessionRequest;

/// Identifier of one initialization attempt
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttemptId(Uuid);

impl AttemptId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AttemptId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AttemptId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The in-flight initialization and the token that can stop it
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attempt {
    pub id: AttemptId,
    pub token: CancellationToken,
}

/// A hosted-session link returned by the processor
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionLink {
    pub url: Url,
    pub issued_at: DateTime<Utc>,
}

impl SessionLink {
    /// Whether the link is older than `ttl` at `now`
    pub fn is_expired(&self, ttl: Option<Duration>, now: DateTime<Utc>) -> bool {
        ttl.is_some_and(|ttl| now - self.issued_at >= ttl)
    }
}

/// Fixed behavior knobs for one controller
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionPolicy {
    /// Redirect target injected into requests and matched on navigation
    pub redirect: RedirectEndpoint,

    /// Discard a cached link older than this (None = never expires)
    pub link_ttl: Option<Duration>,
}

/// Lifecycle phase derived from the state flags
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// No link, not pending
    Idle,
    /// Waiting on the initialization client
    Initializing,
    /// Link cached, not displayed
    Ready,
    /// Link displayed
    Showing,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Initializing => "initializing",
            Self::Ready => "ready",
            Self::Showing => "showing",
        };
        f.write_str(s)
    }
}

/// The controller's mutable record
#[derive(Clone, Debug, PartialEq)]
pub struct SessionState {
    pub(crate) policy: SessionPolicy,
    pub(crate) request: SessionRequest,
    pub(crate) link: Option<SessionLink>,
    pub(crate) pending: bool,
    pub(crate) visible: bool,
    /// Hide transition started, waiting for it to finish
    pub(crate) closing: bool,
    pub(crate) last_tx_ref: Option<String>,
    /// Drop the cached link at the next reset
    pub(crate) force_clear: bool,
    pub(crate) attempt: Option<Attempt>,
}

impl SessionState {
    /// Fresh state: no link, nothing pending, nothing shown
    pub const fn new(request: SessionRequest, policy: SessionPolicy) -> Self {
        Self {
            policy,
            request,
            link: None,
            pending: false,
            visible: false,
            closing: false,
            last_tx_ref: None,
            force_clear: false,
            attempt: None,
        }
    }

    pub const fn phase(&self) -> Phase {
        if self.visible {
            Phase::Showing
        } else if self.pending {
            Phase::Initializing
        } else if self.link.is_some() {
            Phase::Ready
        } else {
            Phase::Idle
        }
    }

    pub const fn policy(&self) -> &SessionPolicy {
        &self.policy
    }

    pub const fn request(&self) -> &SessionRequest {
        &self.request
    }

    pub const fn link(&self) -> Option<&SessionLink> {
        self.link.as_ref()
    }

    pub const fn is_pending(&self) -> bool {
        self.pending
    }

    pub const fn is_visible(&self) -> bool {
        self.visible
    }

    pub const fn is_closing(&self) -> bool {
        self.closing
    }

    pub fn last_tx_ref(&self) -> Option<&str> {
        self.last_tx_ref.as_deref()
    }

    pub const fn force_clear(&self) -> bool {
        self.force_clear
    }

    pub const fn attempt(&self) -> Option<&Attempt> {
        self.attempt.as_ref()
    }

    /// Serializable read-only view of the state
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.phase(),
            link: self.link.as_ref().map(|l| l.url.clone()),
            pending: self.pending,
            visible: self.visible,
            last_tx_ref: self.last_tx_ref.clone(),
            force_clear: self.force_clear,
        }
    }
}

/// Point-in-time view handed out by the runtime
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub phase: Phase,
    pub link: Option<Url>,
    pub pending: bool,
    pub visible: bool,
    pub last_tx_ref: Option<String>,
    pub force_clear: bool,
}
