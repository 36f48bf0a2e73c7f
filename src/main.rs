use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};

use quizflow_server::{
    app_state::AppState, config::Config, handlers, middleware::RequestIdMiddleware,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env();
    config
        .validate()
        .map_err(|err| std::io::Error::other(err.to_string()))?;

    std::fs::create_dir_all(&config.upload_dir)?;
    std::fs::create_dir_all(&config.drafts_dir)?;

    let bind_address = (config.web_server_host.clone(), config.web_server_port);
    let state = AppState::new(config)
        .await
        .map_err(|err| std::io::Error::other(err.to_string()))?;

    log::info!(
        "Starting HTTP server on http://{}:{}",
        bind_address.0,
        bind_address.1
    );
    log::info!("Uploads served from {}", state.config.upload_dir.display());

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(Cors::permissive())
            .wrap(Logger::default())
            .wrap(RequestIdMiddleware)
            .configure(handlers::configure)
            .configure(handlers::configure_static(&state.config))
    })
    .bind(bind_address)?
    .run()
    .await
}
