//! Host context adapters.

use crate::task::ports::{FeedbackSignal, HostContext};
use std::sync::{Mutex, PoisonError};

/// Host context for environments without a host platform.
///
/// Sends an empty identity token and drops notifications and signals.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHostContext;

impl HostContext for NoopHostContext {}

/// Host context with a fixed identity token that reports notifications
/// through `tracing`.
#[derive(Debug, Clone, Default)]
pub struct StaticHostContext {
    token: String,
}

impl StaticHostContext {
    /// Creates a host context forwarding `token` with every request.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl HostContext for StaticHostContext {
    fn identity_token(&self) -> String {
        self.token.clone()
    }

    fn notify(&self, message: &str) {
        tracing::warn!(%message, "user notification");
    }

    fn signal(&self, signal: FeedbackSignal) {
        tracing::debug!(?signal, "feedback signal");
    }
}

/// Host context that records everything it is asked to show.
#[derive(Debug, Default)]
pub struct RecordingHostContext {
    token: String,
    notifications: Mutex<Vec<String>>,
    signals: Mutex<Vec<FeedbackSignal>>,
}

impl RecordingHostContext {
    /// Creates a recording host with an empty identity token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a recording host forwarding `token`.
    #[must_use]
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            ..Self::default()
        }
    }

    /// Returns the notifications shown so far.
    #[must_use]
    pub fn notifications(&self) -> Vec<String> {
        self.notifications
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the feedback signals emitted so far.
    #[must_use]
    pub fn signals(&self) -> Vec<FeedbackSignal> {
        self.signals
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl HostContext for RecordingHostContext {
    fn identity_token(&self) -> String {
        self.token.clone()
    }

    fn notify(&self, message: &str) {
        self.notifications
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.to_owned());
    }

    fn signal(&self, signal: FeedbackSignal) {
        self.signals
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(signal);
    }
}
