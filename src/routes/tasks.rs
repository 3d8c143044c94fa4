use super::AppState;
use crate::assistant::AssistantError;
use crate::models::{ErrorResponse, TaskRequest};
use actix_web::{web, HttpResponse, Responder};
use validator::Validate;

/// Configure task processing routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/process", web::post().to(process_task));
}

/// Process a natural-language task
///
/// POST /process
///
/// Request body:
/// ```json
/// {
///   "task": "Find AI repositories and check Tokyo weather",
///   "user_id": "string"
/// }
/// ```
async fn process_task(state: web::Data<AppState>, req: web::Json<TaskRequest>) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for process request: {:?}", errors);
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    tracing::info!("Processing task for user {}", req.user_id);

    match state.assistant.process_task(&req.task).await {
        Ok(report) => HttpResponse::Ok().json(report),
        Err(e @ AssistantError::EmptyTask) => HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: e.to_string(),
            status_code: 400,
        }),
        Err(e) => {
            tracing::error!("Failed to process task: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Processing failed".to_string(),
                message: e.to_string(),
                status_code: 500,
            })
        }
    }
}
