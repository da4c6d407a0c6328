//! HTTP boundary for the marketscope pipeline.
//!
//! Hosts the queue push endpoints that feed the dispatch workers; the
//! queue itself (delivery, retries, dead-lettering) is the platform's
//! responsibility.

pub mod response;
pub mod routes;
pub mod state;

pub use routes::router;
pub use state::AppState;
