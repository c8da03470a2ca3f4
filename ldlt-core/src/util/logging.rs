//! Environment-driven verbosity.
//!
//! The crate logs through the `log` facade; installing a logger is left to
//! the application. `LDLT_VERBOSE` only decides whether per-iteration
//! progress goes to `info` (verbose) or `debug`.

use std::sync::OnceLock;

/// `LDLT_VERBOSE` parsed once: any level >= 1, or "true", enables verbose output.
pub fn verbose_from_env() -> bool {
    static VERBOSE: OnceLock<bool> = OnceLock::new();
    *VERBOSE.get_or_init(|| match std::env::var("LDLT_VERBOSE") {
        Ok(v) => v
            .parse::<u8>()
            .map(|n| n >= 1)
            .unwrap_or_else(|_| v.eq_ignore_ascii_case("true")),
        Err(_) => false,
    })
}

/// Log level for progress lines given the instance's `verbose` setting.
#[inline]
pub fn progress_level(verbose: bool) -> log::Level {
    if verbose {
        log::Level::Info
    } else {
        log::Level::Debug
    }
}
