//! Test utilities and helpers for marketsync
//!
//! This module provides common testing utilities, fixtures, and helper functions
//! shared by the unit tests and the integration tests.

pub mod async_helpers;
pub mod fixtures;

pub use async_helpers::*;
pub use fixtures::*;
