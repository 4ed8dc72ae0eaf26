//! Single-client pose stream server
//!
//! This module provides:
//! - Server configuration
//! - The background accept/serve loop and best-effort record sending

pub mod config;
pub mod listener;

pub use config::ServerConfig;
pub use listener::StreamServer;
