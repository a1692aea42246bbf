pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod maintenance;
pub mod server;
pub mod telemetry;

pub use error::CustodianError;
