//! Integration test utilities for the chat hub
//!
//! This crate provides helpers for running end-to-end tests against a live
//! hub server over real WebSocket connections.

pub mod helpers;

pub use helpers::*;
