#![forbid(unsafe_code)]

//! Logging facade for the engine.
//!
//! With the `tracing` feature (on by default) the engine logs through
//! `tracing`. Without it, the same macro names expand to nothing so the
//! engine builds with no logging dependency at all.

#[cfg(feature = "tracing")]
pub use tracing::{debug, info, warn};

#[cfg(not(feature = "tracing"))]
mod disabled {
    /// Expands to nothing; the `tracing` feature is off.
    #[macro_export]
    macro_rules! debug {
        ($($arg:tt)*) => {};
    }

    /// Expands to nothing; the `tracing` feature is off.
    #[macro_export]
    macro_rules! info {
        ($($arg:tt)*) => {};
    }

    /// Expands to nothing; the `tracing` feature is off.
    #[macro_export]
    macro_rules! warn {
        ($($arg:tt)*) => {};
    }
}
