//! In-memory adapters for task synchronization.

mod authority;

pub use authority::{InMemoryTaskAuthority, RemoteCall};
