//! Test support utilities for the hashtag game backend
//!
//! This crate provides the unified tracing bootstrap shared by the backend's
//! integration test binaries and helpers for generating unique identifiers.

pub mod logging;
pub mod unique_helpers;
