//! Log points of the store.
//!
//! Levels are fixed per concern:
//! - `trace`: a node or leaf was built, or an input was cut to its field capacity
//! - `debug`: records were released, a child subtree was replaced, the tree was cleared
//! - `warn`: the memory limit refused an allocation
//! - `error`: a structural invariant was found broken
//!
//! Every macro expands to nothing unless the `tracing` feature is on.
//!
//! ```bash
//! RUST_LOG=pathkv=debug cargo run --example basic_usage --features tracing
//! ```

macro_rules! trace_log {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        {
            tracing::trace!($($arg)*);
        }
    };
}

macro_rules! debug_log {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        {
            tracing::debug!($($arg)*);
        }
    };
}

macro_rules! warn_log {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        {
            tracing::warn!($($arg)*);
        }
    };
}

macro_rules! error_log {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        {
            tracing::error!($($arg)*);
        }
    };
}

pub(crate) use debug_log;
pub(crate) use error_log;
pub(crate) use trace_log;
pub(crate) use warn_log;
