//! HTTP surface: router, request lifecycle hooks, and option/maintenance
//! handlers.

pub mod handlers;
pub mod hooks;
pub mod router;

pub use router::{CustodianState, custodian_router};
