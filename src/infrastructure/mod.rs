//! Infrastructure Layer
//!
//! Cross-cutting concerns used by the poll loop and the binary.

pub mod shutdown;

pub use shutdown::{shutdown_signal, FetchGuard, PollShutdown};
