// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Course Watcher: REST client core for a course-discovery service.
//!
//! The [`client`] module talks to the upstream course API: envelope
//! unwrapping, error normalization, session storage and single-flight
//! token refresh. [`services`] builds authentication and catalog
//! operations on top of it. The remaining modules implement a mock of
//! the upstream API so the client can be exercised end to end.

pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use db::MemoryDb;

/// Shared state of the mock upstream server.
pub struct AppState {
    pub config: Config,
    pub db: MemoryDb,
}
