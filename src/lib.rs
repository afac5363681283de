//! rssdeck: a terminal client for go-rss style RSS aggregation servers.
//!
//! - [`session`] keeps the signed-in user across runs
//! - [`api`] talks to the server's `/v1` REST API
//! - [`sync`] routes views, runs loaders and executes commands
//! - [`ui`] renders the state in the terminal

pub mod api;
pub mod app;
pub mod config;
pub mod session;
pub mod storage;
pub mod sync;
pub mod ui;
pub mod util;
