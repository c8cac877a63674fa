//! Utility functions shared by the library and the server binary.
//!
//! Logging setup and numeric rounding helpers.

use tracing_subscriber::EnvFilter;

/// Installs the global `tracing` subscriber.
///
/// The filter defaults to `info` and can be overridden with `RUST_LOG`.
/// Calling this more than once is harmless; later calls are ignored.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// Rounds `value` to `decimals` decimal places, half away from zero.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(10007.543, 2), 10007.54);
        assert_eq!(round_to(1.005_1, 2), 1.01);
        assert_eq!(round_to(-2.345_6, 1), -2.3);
        assert_eq!(round_to(0.0, 2), 0.0);
    }

    #[test]
    fn test_init_tracing_twice() {
        init_tracing();
        init_tracing();
    }
}
