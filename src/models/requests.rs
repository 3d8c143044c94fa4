use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to process a natural-language task
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TaskRequest {
    #[validate(length(min = 1, max = 2000))]
    pub task: String,
    #[serde(default = "default_user_id")]
    #[serde(alias = "userId")]
    pub user_id: String,
}

fn default_user_id() -> String {
    "default".to_string()
}
