//! Tasksync: client-side task state synchronization.
//!
//! This crate keeps a local view of a remote task collection consistent with
//! the authority that owns it. Status changes follow a fixed three-state
//! cycle, and every accepted mutation is followed by a full refresh so the
//! local view always mirrors what the remote authority holds.
//!
//! # Architecture
//!
//! Tasksync follows hexagonal architecture principles:
//!
//! - **Domain**: Task records, status cycle, and payload types
//! - **Ports**: Abstract trait interfaces for the remote authority and host
//! - **Adapters**: HTTP and in-memory implementations of the ports
//!
//! # Modules
//!
//! - [`task`]: Task records, transitions, remote access, and synchronization

pub mod task;
