//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! ledger engine test suite.
//!
//! # Modules
//!
//! - `fixtures`: a standard chart of accounts and standard templates
//! - `builders`: builder patterns for test data construction
//! - `assertions`: custom assertion helpers for domain types
//! - `generators`: property-based test data generators
//! - `logging`: tracing initialization for tests

pub mod assertions;
pub mod builders;
pub mod fixtures;
pub mod generators;
pub mod logging;

pub use assertions::*;
pub use builders::*;
pub use fixtures::*;
pub use generators::*;
pub use logging::*;
