//! Internal logging shims.
//!
//! With the `tracing` feature enabled these forward to the macros of the same
//! name in [`tracing`](https://docs.rs/tracing); otherwise they expand to
//! nothing and the library stays silent.

#[cfg(feature = "tracing")]
macro_rules! debug {
    ( $( $arg:tt )* ) => { ::tracing::debug!($( $arg )*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! debug {
    ( $( $arg:tt )* ) => { () };
}
pub(crate) use debug;

#[cfg(feature = "tracing")]
macro_rules! trace {
    ( $( $arg:tt )* ) => { ::tracing::trace!($( $arg )*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace {
    ( $( $arg:tt )* ) => { () };
}
pub(crate) use trace;
