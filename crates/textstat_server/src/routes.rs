//! Router assembly.

use crate::handlers::{analysis, health, texts};
use crate::AppState;
use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use std::time::Instant;

/// Builds the full application router.
pub fn build_router(state: AppState) -> Router {
    let texts = Router::new()
        .route("/", get(texts::list_texts).post(texts::create_text))
        .route(
            "/:text_id",
            get(texts::get_text)
                .patch(texts::update_text)
                .delete(texts::delete_text),
        )
        .route("/numberOfWords/:text_id", get(analysis::number_of_words))
        .route("/numberOfChars/:text_id", get(analysis::number_of_chars))
        .route(
            "/numberOfSentences/:text_id",
            get(analysis::number_of_sentences),
        )
        .route(
            "/numberOfParagraphs/:text_id",
            get(analysis::number_of_paragraphs),
        )
        .route(
            "/longestWordInParagraphs/:text_id",
            get(analysis::longest_word_in_paragraphs),
        )
        .route("/stats/:text_id", get(analysis::text_stats));

    Router::new()
        .route("/v1/health", get(health::health))
        .nest("/v1/texts", texts)
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}

async fn log_request(request: Request, next: Next) -> Response {
    let started_at = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let response = next.run(request).await;

    log::info!(
        "event=http_request module=api method={} path={} status={} duration_ms={}",
        method,
        path,
        response.status().as_u16(),
        started_at.elapsed().as_millis()
    );
    response
}
