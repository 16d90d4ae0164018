//! Test utilities
//!
//! Manual mock implementations and test fixtures for unit testing.
//!
//! Manual mocks instead of a mocking macro: the ports take `&str` and slice
//! arguments, and the rotation tests need to inspect the order of calls
//! across several methods, which a shared call journal gives directly.

pub mod fixtures;
pub mod mocks;

pub use fixtures::*;
pub use mocks::*;
