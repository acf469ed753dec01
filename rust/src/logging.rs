//! Logging macros for the products scheduler with verbosity level control.
//!
//! Logging costs nothing beyond an integer comparison when disabled (verbosity=0).
//! Levels:
//! - 0: SILENT (errors are returned, never logged)
//! - 1: PROGRESS (products finished or deferred)
//! - 2: DECISIONS (deferral eligibility, short-circuited attempts)
//! - 3: TRACE (queue state, search-path checks)

/// Verbosity levels, compared against `ResolverConfig::verbosity`.
pub const VERBOSITY_SILENT: u8 = 0;
pub const VERBOSITY_PROGRESS: u8 = 1;
pub const VERBOSITY_DECISIONS: u8 = 2;
pub const VERBOSITY_TRACE: u8 = 3;

/// Log at PROGRESS level (verbosity >= 1).
///
/// Used for: products finished, products deferred.
#[macro_export]
macro_rules! log_progress {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::logging::VERBOSITY_PROGRESS {
            eprintln!($($arg)*);
        }
    };
}

/// Log at DECISIONS level (verbosity >= 2).
///
/// Used for: deferral eligibility, short-circuited attempts, what a product waits for.
#[macro_export]
macro_rules! log_decisions {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::logging::VERBOSITY_DECISIONS {
            eprintln!($($arg)*);
        }
    };
}

/// Log at TRACE level (verbosity >= 3).
///
/// Used for: initial queue contents, pushed search paths, stack checks.
#[macro_export]
macro_rules! log_trace {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::logging::VERBOSITY_TRACE {
            eprintln!($($arg)*);
        }
    };
}
