//! Adapter implementations for task synchronization ports.

pub mod host;
pub mod http;
pub mod memory;

pub use host::{NoopHostContext, RecordingHostContext, StaticHostContext};
