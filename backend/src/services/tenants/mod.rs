//! # Tenant Service Module
//!
//! Tenants are organisational scopes for prompts. The `default` tenant is
//! created with the schema and cannot be removed through the API.
//!
//! ## Registered routes (under `/api/tenants`)
//! - `GET ""`: every tenant, `default` first.
//! - `POST /save`: creates or updates a tenant by code.

use crate::db::Database;
use actix_web::web::{get, post, scope};
use actix_web::{web, HttpResponse, Responder, Scope};
use common::model::scene::{Tenant, DEFAULT_TENANT};
use rusqlite::params;

const API_PATH: &str = "/api/tenants";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", get().to(list))
        .route("/save", post().to(save))
}

async fn list(db: web::Data<Database>) -> impl Responder {
    match list_tenants(&db) {
        Ok(tenants) => HttpResponse::Ok().json(tenants),
        Err(e) => HttpResponse::ServiceUnavailable().body(format!("Error listing tenants: {}", e)),
    }
}

async fn save(db: web::Data<Database>, payload: web::Json<Tenant>) -> impl Responder {
    let mut tenant = payload.into_inner();
    tenant.code = tenant.code.trim().to_string();
    if tenant.code.is_empty() {
        return HttpResponse::BadRequest().body("Tenant code must not be empty");
    }
    match save_tenant(&db, &tenant) {
        Ok(()) => HttpResponse::Ok().json(tenant),
        Err(e) => HttpResponse::ServiceUnavailable().body(format!("Error saving tenant: {}", e)),
    }
}

pub fn list_tenants(db: &Database) -> Result<Vec<Tenant>, String> {
    let conn = db.connect()?;
    let mut stmt = conn
        .prepare("SELECT code, name FROM tenants ORDER BY code <> ?1, code")
        .map_err(|e| e.to_string())?;
    let tenants = stmt
        .query_map(params![DEFAULT_TENANT], |row| {
            Ok(Tenant {
                code: row.get(0)?,
                name: row.get(1)?,
            })
        })
        .map_err(|e| e.to_string())?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| e.to_string())?;
    Ok(tenants)
}

pub fn save_tenant(db: &Database, tenant: &Tenant) -> Result<(), String> {
    let conn = db.connect()?;
    conn.execute(
        "INSERT OR REPLACE INTO tenants (code, name) VALUES (?1, ?2)",
        params![tenant.code.trim(), tenant.name],
    )
    .map_err(|e| e.to_string())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testing::temp_db;
    use actix_web::{test as actix_test, App};
    use pretty_assertions::assert_eq;

    #[test]
    fn default_tenant_is_listed_first() {
        let (_dir, db) = temp_db();
        save_tenant(
            &db,
            &Tenant {
                code: "acme".to_string(),
                name: "Acme".to_string(),
            },
        )
        .expect("save");
        let codes: Vec<String> = list_tenants(&db)
            .expect("list")
            .into_iter()
            .map(|t| t.code)
            .collect();
        assert_eq!(codes, vec!["default", "acme"]);
    }

    #[actix_web::test]
    async fn saved_tenant_echoes_the_stored_code() {
        let (_dir, db) = temp_db();
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(db.clone()))
                .service(configure_routes()),
        )
        .await;
        let req = actix_test::TestRequest::post()
            .uri("/api/tenants/save")
            .set_json(Tenant {
                code: " acme ".to_string(),
                name: "Acme".to_string(),
            })
            .to_request();
        let saved: Tenant = actix_test::call_and_read_body_json(&app, req).await;
        assert_eq!(saved.code, "acme");

        let codes: Vec<String> = list_tenants(&db)
            .expect("list")
            .into_iter()
            .map(|t| t.code)
            .collect();
        assert_eq!(codes, vec!["default", "acme"]);
    }
}
