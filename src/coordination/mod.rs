//! Coordination for long-running operation
//!
//! Shutdown fan-out shared by the refresh scheduler and the API server.

pub mod shutdown;

pub use shutdown::GracefulShutdown;
