//! Shared test utilities for the weather-charts workspace.
//!
//! Provides synthetic grid/field generators and skip/assert macros used by
//! the crate test suites.

pub mod generators;

pub use generators::*;

/// Skip a test when an external file (e.g. a system font) is not present.
///
/// # Usage
///
/// ```ignore
/// use test_utils::require_file_or_skip;
///
/// #[test]
/// fn test_annotations() {
///     let font = require_file_or_skip!("/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf");
///     // Test code using font...
/// }
/// ```
#[macro_export]
macro_rules! require_file_or_skip {
    ($path:expr) => {{
        let path = std::path::PathBuf::from($path);
        if !path.is_file() {
            eprintln!("SKIPPED: required file '{}' not found.", path.display());
            return;
        }
        path
    }};
}

/// Approximate floating-point equality assertion.
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: f64 = $left as f64;
        let right: f64 = $right as f64;
        let epsilon: f64 = $epsilon as f64;
        let diff = (left - right).abs();
        if diff > epsilon {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}` > epsilon `{:?}`",
                left, right, diff, epsilon
            );
        }
    }};
}
