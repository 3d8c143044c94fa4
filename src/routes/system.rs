use super::AppState;
use crate::agents::verifier::{AGENTS, SYSTEM_NAME};
use crate::models::{HealthResponse, ServiceInfo, ToolsResponse};
use actix_web::{web, HttpResponse, Responder};
use std::collections::BTreeMap;

/// Configure service-level routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(service_info))
        .route("/health", web::get().to(health_check))
        .route("/tools", web::get().to(list_tools));
}

async fn service_info() -> impl Responder {
    let endpoints = BTreeMap::from([
        ("process".to_string(), "POST /process".to_string()),
        ("health".to_string(), "GET /health".to_string()),
        ("tools".to_string(), "GET /tools".to_string()),
    ]);

    HttpResponse::Ok().json(ServiceInfo {
        service: SYSTEM_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        status: "running".to_string(),
        agents: AGENTS.iter().map(|a| a.to_string()).collect(),
        apis: vec!["GitHub".to_string(), "Open-Meteo".to_string(), "OpenWeatherMap".to_string()],
        endpoints,
    })
}

/// Health check endpoint
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// GET /tools
async fn list_tools(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(ToolsResponse {
        tools: state.assistant.executor().registry().describe(),
    })
}
