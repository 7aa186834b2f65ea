//! # Beans
//!
//! A messaging workspace server: users, channels, direct messages, deferred
//! deliveries and usage statistics. Usable as a standalone binary or as a
//! library.
//!
//! ## Library Usage
//!
//! ```toml
//! [dependencies]
//! beans = { version = "0.1", default-features = false }
//! ```
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use beans::clock::SystemClock;
//! use beans::config::WorkspaceConfig;
//! use beans::server::{AppState, create_router};
//! use beans::workspace::Workspace;
//!
//! let workspace = Workspace::new(WorkspaceConfig::default(), Arc::new(SystemClock)).unwrap();
//! let router = create_router(Arc::new(AppState::new(workspace)));
//! // Serve with axum...
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` (default): Builds the `beans` binary. Disable with `default-features = false`.

pub mod auth;
pub mod clock;
pub mod config;
pub mod error;
pub mod server;
pub mod store;
pub mod types;
pub mod workspace;
