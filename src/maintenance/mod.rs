//! Maintenance core: classification, time gating, reaping, and the daily
//! autoload optimization pass.

pub mod classify;
pub mod gate;
pub mod jobs;
pub mod optimizer;
pub mod reaper;

pub use gate::{AUTOLOAD_OPTIMIZE_TASK, MaintenanceGate};
pub use jobs::ReapSchedule;
pub use optimizer::{AutoloadOptimizer, OptimizeOutcome};
pub use reaper::{ReapOutcome, TransientReaper};
