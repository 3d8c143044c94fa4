//! Ops Assistant - multi-agent task runner over public APIs
//!
//! A task in plain language is turned into a plan by the planner, run step by
//! step against GitHub and weather APIs by the executor, and checked for
//! completeness by the verifier.

pub mod agents;
pub mod assistant;
pub mod config;
pub mod core;
pub mod display;
pub mod llm;
pub mod logging;
pub mod models;
pub mod routes;
pub mod tools;

// Re-export commonly used types
pub use assistant::{Assistant, AssistantError};
pub use config::Settings;
pub use models::{FinalOutput, Plan, PlanStep, TaskReport, TaskRequest, ToolKind, ToolResult};
