mod config;
mod db;
mod job_controller;
mod services;

use crate::config::AppConfig;
use crate::db::Database;
use crate::job_controller::state::TasksState;
use actix_web::{web, App, HttpServer};
use env_logger::Env;
use log::info;
use std::io;

const TASK_CHANNEL_CAPACITY: usize = 100;

#[actix_web::main]
async fn main() -> io::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config = AppConfig::load().map_err(io::Error::other)?;
    let database = Database::new(&config.database_path);
    database.init().map_err(io::Error::other)?;
    info!("Using database {}", config.database_path.display());

    // Background debug tasks
    let tasks_state =
        TasksState::start_with_retention(TASK_CHANNEL_CAPACITY, config.task_retention);

    info!("Server running at {}", config.url());

    let json_limit = config.json_limit;
    HttpServer::new(move || {
        App::new()
            .app_data(web::JsonConfig::default().limit(json_limit))
            .app_data(web::Data::new(database.clone()))
            .app_data(web::Data::new(tasks_state.clone()))
            .configure(services::configure)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
