use actix_web::web;

pub mod auth;
pub mod devices;
pub mod health;
pub mod profile;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.configure(health::configure_routes)
        .configure(auth::configure_routes)
        .configure(profile::configure_routes)
        .configure(devices::configure_routes);
}
