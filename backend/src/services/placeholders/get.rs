use crate::db::{load_registry, Database};
use actix_web::{web, HttpResponse, Responder};

/// Handler for `GET /api/placeholders/{scene}`.
pub(crate) async fn process(db: web::Data<Database>, scene: web::Path<String>) -> impl Responder {
    match load_registry(&db, &scene) {
        Ok(registry) => HttpResponse::Ok().json(registry),
        Err(e) => {
            log::error!("loading registry of scene {} failed: {}", scene, e);
            HttpResponse::ServiceUnavailable().body(format!("Error loading placeholders: {}", e))
        }
    }
}
