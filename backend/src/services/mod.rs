pub mod debug;
pub mod placeholders;
pub mod prompts;
pub mod scenes;
pub mod tables;
pub mod tasks;
pub mod tenants;

use actix_web::web;

/// Mounts every API scope on the application.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(scenes::configure_routes())
        .service(tenants::configure_routes())
        .service(placeholders::configure_routes())
        .service(prompts::configure_routes())
        .service(tables::configure_routes())
        .service(debug::configure_routes())
        .service(tasks::configure_routes());
}
