//! Port contracts for task synchronization.
//!
//! Ports define infrastructure-agnostic interfaces used by the
//! synchronization controller.

pub mod host;
pub mod remote;

pub use host::{FeedbackSignal, HostContext};
pub use remote::{RemoteError, RemoteOperation, RemoteResult, RemoteTaskClient};
