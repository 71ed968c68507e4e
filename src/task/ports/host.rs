//! Host platform port: identity, user notifications and feedback signals.

/// Outcome signal sent to the host after a mutation, typically rendered as
/// haptic feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedbackSignal {
    /// The mutation was accepted by the remote authority.
    Success,
    /// The mutation failed.
    Failure,
}

/// Surrounding platform integration.
///
/// Every method has a no-op default, so hosts implement only what they
/// support.
pub trait HostContext: Send + Sync {
    /// Returns the opaque identity token forwarded with every request.
    ///
    /// An empty token is forwarded unchanged; the remote authority decides
    /// whether to reject it.
    fn identity_token(&self) -> String {
        String::new()
    }

    /// Shows an alert-style message to the user.
    fn notify(&self, message: &str) {
        let _ = message;
    }

    /// Emits a feedback signal for a mutation outcome.
    fn signal(&self, signal: FeedbackSignal) {
        let _ = signal;
    }
}
