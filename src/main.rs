use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use ops_assistant::routes::{self, AppState};
use ops_assistant::{logging, Assistant, Settings};
use tracing::{error, info};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e));
        }
    };

    logging::init(&settings.logging);

    info!("Starting Ops Assistant service...");

    let assistant = Assistant::from_settings(&settings).map_err(|e| {
        error!("Failed to initialize assistant: {}", e);
        std::io::Error::new(std::io::ErrorKind::Other, e)
    })?;

    let app_state = AppState::new(assistant);

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{} ({} workers)", host, port, workers);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(routes::json_config())
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
