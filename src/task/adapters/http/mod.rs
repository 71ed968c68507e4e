//! HTTP adapter for the remote task authority.

mod client;
mod config;

pub use client::HttpTaskClient;
pub use config::{
    API_URL_ENV, ConfigError, DEFAULT_API_URL, REQUEST_TIMEOUT_ENV, RemoteClientConfig,
};
