// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    CompletedOutput, ExecutionSummary, FailedOutput, FinalOutput, OutputMetadata, Plan, PlanStep, PlanSummary,
    Repository, ResultRecord, TaskExecution, TaskReport, ToolKind, ToolResult, Verification, VerificationDigest,
};
pub use requests::TaskRequest;
pub use responses::{ErrorResponse, HealthResponse, ServiceInfo, ToolInfo, ToolsResponse};
