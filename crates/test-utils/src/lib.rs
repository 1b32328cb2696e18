//! Shared test utilities for the coverage-codec workspace.
//!
//! This crate provides common testing infrastructure including:
//! - A sample catalog snapshot covering every identifier shape
//! - Temporary catalog files and directories
//! - Tracing setup for tests
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! Then import in your tests:
//!
//! ```ignore
//! use test_utils::{fixtures, write_temp_catalog};
//! ```

pub mod fixtures;
pub mod paths;

// Re-export commonly used items at the crate root
pub use fixtures::*;
pub use paths::*;

use tracing_subscriber::{fmt, EnvFilter};

/// Install a test-friendly tracing subscriber.
///
/// Honours `RUST_LOG` and defaults to `warn`. Safe to call from every test:
/// only the first call installs anything.
pub fn init_test_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .with_target(true)
        .try_init();
}

/// Assert that two collections hold the same items, ignoring order.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_set_eq;
///
/// assert_set_eq!(vec!["b", "a"], vec!["a", "b"]); // passes
/// ```
#[macro_export]
macro_rules! assert_set_eq {
    ($left:expr, $right:expr) => {{
        let left: std::collections::BTreeSet<_> = $left.into_iter().collect();
        let right: std::collections::BTreeSet<_> = $right.into_iter().collect();
        if left != right {
            panic!(
                "assertion failed: `(left == right)` as sets\n  missing: `{:?}`,\n  unexpected: `{:?}`",
                right.difference(&left).collect::<Vec<_>>(),
                left.difference(&right).collect::<Vec<_>>()
            );
        }
    }};
}
