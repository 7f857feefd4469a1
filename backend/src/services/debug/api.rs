//! # API-mode Debug Task
//!
//! `POST /api/debug/api` answers immediately with a task ID and renders in the
//! background:
//!
//! 1.  The task is registered as `pending` in the shared `TasksState`.
//! 2.  A Tokio task marks it `running` and runs the render on the blocking
//!     pool, since it performs SQLite I/O.
//! 3.  The outcome becomes the task's final `completed` or `failed` state.
//! 4.  When the request carried a `notify_url`, the final state is POSTed to
//!     it; the client is then expected not to poll.

use super::notify;
use super::render::render_request;
use crate::db::Database;
use crate::job_controller::state::TasksState;
use actix_web::{web, HttpResponse, Responder};
use common::jobs::{TaskState, TaskStatus};
use common::requests::{DebugApiResponse, DebugRequest};

pub(crate) async fn process(
    db: web::Data<Database>,
    tasks: web::Data<TasksState>,
    payload: web::Json<DebugRequest>,
) -> impl Responder {
    let task_id = schedule_debug_task(
        db.get_ref().clone(),
        tasks.get_ref().clone(),
        payload.into_inner(),
    )
    .await;
    HttpResponse::Ok().json(DebugApiResponse {
        task_id: Some(task_id),
        result: None,
    })
}

/// Registers and spawns the render task, returning its ID.
pub async fn schedule_debug_task(db: Database, tasks: TasksState, req: DebugRequest) -> String {
    let task_id = tasks.register().await;
    let task_id_for_worker = task_id.clone();

    tokio::spawn(async move {
        let task_id = task_id_for_worker;
        tasks
            .report(TaskState {
                status: TaskStatus::Running,
                ..TaskState::pending(&task_id)
            })
            .await;

        let notify_url = req.notify_url.clone();
        let handle = tokio::task::spawn_blocking(move || render_request(&db, &req));

        let final_state = match handle.await {
            Ok(Ok(rendered)) => TaskState::completed(&task_id, rendered.content),
            Ok(Err(failure)) => TaskState::failed(&task_id, failure.message().to_string()),
            Err(join_err) => TaskState::failed(&task_id, format!("Task join error: {}", join_err)),
        };
        log::info!("debug task {} finished as {:?}", task_id, final_state.status);
        tasks.report(final_state.clone()).await;

        if let Some(url) = notify_url {
            notify::deliver(&url, &final_state).await;
        }
    });

    task_id
}
