//! Concurrency primitives for the generation phase.
//!
//! The runner bounds how many generation tasks are in flight; the quota counter
//! is the only state shared between those tasks.

pub mod quota;
pub mod runner;

pub use quota::{QuotaCounter, QuotaPermit};
pub use runner::run_limited;
