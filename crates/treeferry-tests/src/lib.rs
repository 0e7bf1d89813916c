//! Treeferry integration-test support
//!
//! Shared fixture helpers used by the cross-crate integration tests.

pub mod test_utils;
