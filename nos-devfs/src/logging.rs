//! Unified logging support for nos-devfs
//!
//! The `log` crate is optional. Without the `log` feature these macros only
//! borrow their arguments through `format_args!`, so call sites never need
//! their own `#[cfg]` attributes and nothing is moved.

/// Trace-level logging
macro_rules! devfs_trace {
    ($($arg:tt)*) => {{
        #[cfg(feature = "log")]
        log::trace!($($arg)*);
        #[cfg(not(feature = "log"))]
        { let _ = ::core::format_args!($($arg)*); }
    }};
}

/// Debug-level logging
macro_rules! devfs_debug {
    ($($arg:tt)*) => {{
        #[cfg(feature = "log")]
        log::debug!($($arg)*);
        #[cfg(not(feature = "log"))]
        { let _ = ::core::format_args!($($arg)*); }
    }};
}

/// Info-level logging
macro_rules! devfs_info {
    ($($arg:tt)*) => {{
        #[cfg(feature = "log")]
        log::info!($($arg)*);
        #[cfg(not(feature = "log"))]
        { let _ = ::core::format_args!($($arg)*); }
    }};
}

/// Warn-level logging
macro_rules! devfs_warn {
    ($($arg:tt)*) => {{
        #[cfg(feature = "log")]
        log::warn!($($arg)*);
        #[cfg(not(feature = "log"))]
        { let _ = ::core::format_args!($($arg)*); }
    }};
}

/// Error-level logging
macro_rules! devfs_error {
    ($($arg:tt)*) => {{
        #[cfg(feature = "log")]
        log::error!($($arg)*);
        #[cfg(not(feature = "log"))]
        { let _ = ::core::format_args!($($arg)*); }
    }};
}
