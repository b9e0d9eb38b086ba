//! Runtime orchestration and lifecycle management.
//!
//! - [`DashboardSystem`] starts the actors, wires the clients and gates
//!   navigation through the route loaders.
//! - [`setup_tracing`] initializes logging.

pub mod dashboard;
pub mod tracing;

pub use dashboard::*;
pub use tracing::*;
