use crate::db::{load_registry, Database};
use actix_web::{web, HttpResponse, Responder};
use common::requests::{ValidateRequest, ValidationOutcome};
use common::template::validate_text;

/// Handler for `POST /api/placeholders/validate`.
///
/// Invalid text is not an HTTP error: the outcome carries the message shown
/// next to the editor.
pub(crate) async fn process(
    db: web::Data<Database>,
    payload: web::Json<ValidateRequest>,
) -> impl Responder {
    match validate_for_scene(&db, &payload.scene, &payload.text) {
        Ok(outcome) => HttpResponse::Ok().json(outcome),
        Err(e) => HttpResponse::ServiceUnavailable().body(format!("Error validating text: {}", e)),
    }
}

pub fn validate_for_scene(
    db: &Database,
    scene: &str,
    text: &str,
) -> Result<ValidationOutcome, String> {
    let registry = load_registry(db, scene)?;
    Ok(validate_text(text, &registry))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testing::temp_db;
    use crate::services::placeholders::configure_routes;
    use crate::services::placeholders::save::save_placeholder;
    use actix_web::{test as actix_test, App};
    use common::model::place_holder::{PlaceholderDefinition, PlaceholderRegistry};
    use pretty_assertions::assert_eq;

    #[actix_web::test]
    async fn validation_answers_with_an_outcome() {
        let (_dir, db) = temp_db();
        save_placeholder(&db, &PlaceholderDefinition::user_input("report", "name")).expect("save");
        save_placeholder(
            &db,
            &PlaceholderDefinition::table_bound("report", "balance", "t1", "amount"),
        )
        .expect("save");

        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(db))
                .service(configure_routes()),
        )
        .await;

        let req = actix_test::TestRequest::post()
            .uri("/api/placeholders/validate")
            .set_json(ValidateRequest {
                scene: "report".to_string(),
                text: "Hello {name}, your balance is {table.balance.row_id}".to_string(),
            })
            .to_request();
        let outcome: ValidationOutcome = actix_test::call_and_read_body_json(&app, req).await;
        assert_eq!(outcome, ValidationOutcome::ok());

        let req = actix_test::TestRequest::post()
            .uri("/api/placeholders/validate")
            .set_json(ValidateRequest {
                scene: "report".to_string(),
                text: "{unknown}".to_string(),
            })
            .to_request();
        let outcome: ValidationOutcome = actix_test::call_and_read_body_json(&app, req).await;
        assert!(!outcome.valid);
        assert!(outcome.error.unwrap_or_default().contains("{unknown}"));

        let req = actix_test::TestRequest::get()
            .uri("/api/placeholders/report")
            .to_request();
        let registry: PlaceholderRegistry = actix_test::call_and_read_body_json(&app, req).await;
        let keys: Vec<&str> = registry.placeholders.iter().map(|d| d.key.as_str()).collect();
        assert_eq!(keys, vec!["name", "balance"]);
    }
}
