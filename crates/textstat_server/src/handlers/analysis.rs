//! Statistics handlers.
//!
//! Each metric route loads one text and answers `{id, value, <metric>}`;
//! the stats route answers with every metric at once.

use super::text_id;
use crate::auth::Principal;
use crate::error::ApiError;
use crate::AppState;
use axum::extract::rejection::PathRejection;
use axum::extract::{Json, Path, State};
use serde::Serialize;
use serde_json::{Map, Value};
use textstat_core::{
    analyze, char_count, longest_word_per_paragraph, paragraph_count, sentence_count, word_count,
    Permission, TextId, TextStats,
};

type PathParam = Result<Path<String>, PathRejection>;

fn analyze_text(
    state: &AppState,
    principal: &Principal,
    path: PathParam,
    metric: &'static str,
    compute: impl FnOnce(&str) -> Value,
) -> Result<Json<Value>, ApiError> {
    principal.require(Permission::AnalyzeTexts)?;
    let id = text_id(path)?;
    let text = state.with_texts(|texts| texts.get_text(id)?.ok_or(ApiError::NotFound))?;

    log::debug!("event=text_analyze module=api status=ok id={} metric={}", text.id, metric);
    let result = compute(&text.value);
    let mut body = Map::new();
    body.insert("id".to_string(), Value::String(text.id.to_string()));
    body.insert("value".to_string(), Value::String(text.value));
    body.insert(metric.to_string(), result);
    Ok(Json(Value::Object(body)))
}

/// `GET /v1/texts/numberOfWords/{id}`
pub async fn number_of_words(
    State(state): State<AppState>,
    principal: Principal,
    path: PathParam,
) -> Result<Json<Value>, ApiError> {
    analyze_text(&state, &principal, path, "numberOfWords", |value| {
        Value::from(word_count(value))
    })
}

/// `GET /v1/texts/numberOfChars/{id}`
pub async fn number_of_chars(
    State(state): State<AppState>,
    principal: Principal,
    path: PathParam,
) -> Result<Json<Value>, ApiError> {
    analyze_text(&state, &principal, path, "numberOfChars", |value| {
        Value::from(char_count(value))
    })
}

/// `GET /v1/texts/numberOfSentences/{id}`
pub async fn number_of_sentences(
    State(state): State<AppState>,
    principal: Principal,
    path: PathParam,
) -> Result<Json<Value>, ApiError> {
    analyze_text(&state, &principal, path, "numberOfSentences", |value| {
        Value::from(sentence_count(value))
    })
}

/// `GET /v1/texts/numberOfParagraphs/{id}`
pub async fn number_of_paragraphs(
    State(state): State<AppState>,
    principal: Principal,
    path: PathParam,
) -> Result<Json<Value>, ApiError> {
    analyze_text(&state, &principal, path, "numberOfParagraphs", |value| {
        Value::from(paragraph_count(value))
    })
}

/// `GET /v1/texts/longestWordInParagraphs/{id}`
pub async fn longest_word_in_paragraphs(
    State(state): State<AppState>,
    principal: Principal,
    path: PathParam,
) -> Result<Json<Value>, ApiError> {
    analyze_text(&state, &principal, path, "longestWordInParagraphs", |value| {
        Value::from(
            longest_word_per_paragraph(value)
                .into_iter()
                .map(|word| word.map_or(Value::Null, Value::String))
                .collect::<Vec<_>>(),
        )
    })
}

#[derive(Debug, Serialize)]
pub struct TextStatsBody {
    pub id: TextId,
    pub value: String,
    #[serde(flatten)]
    pub stats: TextStats,
}

/// `GET /v1/texts/stats/{id}`
pub async fn text_stats(
    State(state): State<AppState>,
    principal: Principal,
    path: PathParam,
) -> Result<Json<TextStatsBody>, ApiError> {
    principal.require(Permission::AnalyzeTexts)?;
    let id = text_id(path)?;
    let text = state.with_texts(|texts| texts.get_text(id)?.ok_or(ApiError::NotFound))?;

    log::debug!("event=text_analyze module=api status=ok id={} metric=all", text.id);
    let stats = analyze(&text.value);
    Ok(Json(TextStatsBody {
        id: text.id,
        value: text.value,
        stats,
    }))
}
