use std::sync::Arc;

use actix_session::storage::CookieSessionStore;
use actix_session::SessionMiddleware;
use actix_web::cookie::{Key, SameSite};
use actix_web::{web, App, HttpServer};
use cabinet_backend::config::AppConfig;
use cabinet_backend::middleware::cors::cors_middleware;
use cabinet_backend::middleware::request_trace::RequestTrace;
use cabinet_backend::routes;
use cabinet_backend::state::app_state::AppState;
use cabinet_backend::state::security_config::SecurityConfig;
use cabinet_backend::upstream::client::HttpSubscriptionApi;
use cabinet_backend::{cache, SESSION_COOKIE_NAME};

mod telemetry;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    telemetry::init_tracing();

    // Environment variables must be set by the runtime environment:
    // - Docker: Set via docker-compose env_file or docker run --env-file
    // - Local dev: Source env files manually (e.g., set -a; . ./.env; set +a)
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {e}");
            std::process::exit(1);
        }
    };

    let upstream = match HttpSubscriptionApi::new(&config) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            eprintln!("❌ {e}");
            std::process::exit(1);
        }
    };

    let local_cache = match &config.local_db_path {
        Some(path) => match cache::connect(path).await {
            Ok(db) => {
                println!("✅ Local cache attached: {path}");
                Some(db)
            }
            Err(e) => {
                eprintln!("❌ {e}");
                std::process::exit(1);
            }
        },
        None => None,
    };

    let security = SecurityConfig::new(config.bot_token.clone(), config.auth_max_age);
    let session_key = Key::derive_from(config.session_secret.as_bytes());

    let app_state = AppState::new(security, upstream, local_cache, config.profile.clone());
    let data = web::Data::new(app_state);

    let host = config.host.clone();
    let port = config.port;
    println!("🚀 Starting cabinet backend on http://{host}:{port}");

    HttpServer::new(move || {
        App::new()
            .wrap(cors_middleware(&config.allowed_origins))
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), session_key.clone())
                    .cookie_name(SESSION_COOKIE_NAME.to_string())
                    .cookie_same_site(SameSite::Lax)
                    .cookie_secure(config.cookie_secure)
                    .build(),
            )
            .wrap(RequestTrace)
            .app_data(data.clone())
            .configure(routes::configure)
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
