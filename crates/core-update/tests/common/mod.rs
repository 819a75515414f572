//! Common test infrastructure for core-update tests
//!
//! # Usage
//!
//! In your test file, add:
//! ```ignore
//! mod common;
//! use common::*;
//! ```
//!
//! # Modules
//!
//! - `constants`: Version strings, platform identifiers, test data
//! - `builders`: Fluent builders for releases and their JSON form
//! - `mock_server`: Wiremock setup helpers for the release host
//! - `assertions`: Assertions over progress events and errors
//! - `updater_helpers`: Progress recorder and fake binaries

// Each test binary uses a different subset of the helpers
#![allow(dead_code)]
#![allow(unused_imports)]

pub mod assertions;
pub mod builders;
pub mod constants;
pub mod mock_server;
pub mod updater_helpers;

pub use assertions::*;
pub use builders::*;
pub use constants::*;
pub use mock_server::*;
pub use updater_helpers::*;
