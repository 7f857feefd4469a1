//! Status lookups for background debug tasks started through
//! `POST /api/debug/api`.
//!
//! - `GET /api/tasks/{task_id}`: the current `TaskState`, or `404` when the
//!   task ID is unknown.

use crate::job_controller::state::TasksState;
use actix_web::web::{get, scope};
use actix_web::{web, HttpResponse, Responder, Scope};

const API_PATH: &str = "/api/tasks";

pub fn configure_routes() -> Scope {
    scope(API_PATH).route("/{task_id}", get().to(process))
}

async fn process(tasks: web::Data<TasksState>, path: web::Path<String>) -> impl Responder {
    let task_id = path.into_inner();
    match tasks.get(&task_id).await {
        Some(state) => HttpResponse::Ok().json(state),
        None => HttpResponse::NotFound().body(format!("Task {} not found", task_id)),
    }
}
