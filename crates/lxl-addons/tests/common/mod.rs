//! Common test utilities for lxl-addons
//!
//! This module provides shared test infrastructure including:
//! - Constants for the test platform and catalog layout
//! - Addon and catalog builders
//! - A scripted source control double and wiremock helpers
//! - A per-test environment wiring registry, executor and resolver

#![allow(dead_code)]
#![allow(unused_imports)]

pub mod builders;
pub mod constants;
pub mod fixtures;
pub mod mocks;

pub use builders::*;
pub use constants::*;
pub use fixtures::*;
pub use mocks::*;
