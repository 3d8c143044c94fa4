//! The three pipeline stages: planning, execution and verification.

pub mod executor;
pub mod planner;
pub mod verifier;

pub use executor::{ExecutionPolicy, Executor, ExecutorSummary, HistoryEntry};
pub use planner::Planner;
pub use verifier::{VerificationReport, Verifier};
