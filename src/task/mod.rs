//! Task synchronization.
//!
//! Fetches the remote task collection with its stats, exposes it grouped by
//! status, and funnels creates, updates, status changes, and deletes through
//! a controller that refreshes after each accepted mutation. A task with a
//! mutation in flight refuses further mutations until it settles. The module
//! follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
