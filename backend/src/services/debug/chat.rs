//! # Chat Debug Stream
//!
//! `POST /api/debug/chat` renders the request like `/render` does and streams
//! the result back as `text/event-stream`. Each frame is
//! `data: {"content": "<word>"}\n\n`; the stream ends with `data: [DONE]\n\n`.
//!
//! Render failures are reported as a plain HTTP error before any frame is
//! sent, so a client never sees a half-open stream for a bad request.

use super::render::render_request;
use crate::db::Database;
use actix_web::{web, HttpResponse, Responder};
use bytes::Bytes;
use common::requests::{ChatChunk, DebugRequest, STREAM_DONE};
use futures_util::stream;
use std::convert::Infallible;

/// Formats one SSE frame.
fn sse_frame(data: &str) -> Bytes {
    Bytes::from(format!("data: {}\n\n", data))
}

/// Splits the rendered text into word chunks, keeping the whitespace so the
/// concatenated chunks equal the input.
pub fn chat_frames(content: &str) -> Result<Vec<Bytes>, serde_json::Error> {
    let mut frames = Vec::new();
    for word in content.split_inclusive(char::is_whitespace) {
        let chunk = ChatChunk {
            content: word.to_string(),
        };
        frames.push(sse_frame(&serde_json::to_string(&chunk)?));
    }
    frames.push(sse_frame(STREAM_DONE));
    Ok(frames)
}

pub(crate) async fn process(
    db: web::Data<Database>,
    payload: web::Json<DebugRequest>,
) -> impl Responder {
    let rendered = match render_request(&db, &payload) {
        Ok(rendered) => rendered,
        Err(failure) => return failure.into_response(),
    };
    let frames = match chat_frames(&rendered.content) {
        Ok(frames) => frames,
        Err(e) => {
            return HttpResponse::InternalServerError().body(format!("Error encoding chunk: {}", e))
        }
    };

    log::debug!("streaming {} chat frame(s)", frames.len());
    HttpResponse::Ok()
        .content_type("text/event-stream")
        .insert_header(("cache-control", "no-cache"))
        .streaming(stream::iter(
            frames.into_iter().map(Ok::<Bytes, Infallible>),
        ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::debug::configure_routes;
    use crate::services::debug::render::tests::{billing_db, billing_request};
    use actix_web::{test as actix_test, App};
    use pretty_assertions::assert_eq;

    #[test]
    fn frames_concatenate_back_to_the_content() {
        let frames = chat_frames("Hello  Ada\nbye").expect("frames");
        let text: Vec<String> = frames
            .iter()
            .map(|f| String::from_utf8_lossy(f).into_owned())
            .collect();
        assert_eq!(
            text,
            vec![
                "data: {\"content\":\"Hello \"}\n\n",
                "data: {\"content\":\" \"}\n\n",
                "data: {\"content\":\"Ada\\n\"}\n\n",
                "data: {\"content\":\"bye\"}\n\n",
                "data: [DONE]\n\n",
            ]
        );
    }

    #[actix_web::test]
    async fn chat_endpoint_streams_rendered_words() {
        let (_dir, db) = billing_db();
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(db))
                .service(configure_routes()),
        )
        .await;

        let req = actix_test::TestRequest::post()
            .uri("/api/debug/chat")
            .set_json(billing_request())
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);
        assert_eq!(
            resp.headers()
                .get("content-type")
                .and_then(|v| v.to_str().ok()),
            Some("text/event-stream")
        );
        let body = actix_test::read_body(resp).await;
        let body = String::from_utf8_lossy(&body);
        assert!(body.starts_with("data: {\"content\":\"Hello \"}\n\n"), "{body}");
        assert!(body.contains("\"3.00\""), "{body}");
        assert!(body.ends_with("data: [DONE]\n\n"), "{body}");
    }
}
