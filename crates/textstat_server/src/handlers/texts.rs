//! Text CRUD handlers.

use super::{json_body, text_id};
use crate::auth::Principal;
use crate::error::ApiError;
use crate::AppState;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Json, Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;
use textstat_core::{Page, PageRequest, Permission, SortSpec, Text, TextFilter, TextPatch};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateTextBody {
    pub value: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateTextBody {
    pub value: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ListTextsParams {
    pub value: Option<String>,
    pub contains: Option<String>,
    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,
    pub limit: Option<String>,
    pub page: Option<String>,
}

impl ListTextsParams {
    fn into_query(self) -> Result<(TextFilter, PageRequest), ApiError> {
        let limit = parse_integer("limit", self.limit.as_deref())?;
        let page = parse_integer("page", self.page.as_deref())?;
        let sort = match self.sort_by.as_deref() {
            Some(raw) => SortSpec::parse(raw)?,
            None => SortSpec::default(),
        };
        let request = PageRequest::new(limit, page)?.with_sort(sort);

        let filter = TextFilter {
            value: self.value,
            contains: self.contains.filter(|fragment| !fragment.is_empty()),
        };
        Ok((filter, request))
    }
}

fn parse_integer(field: &'static str, raw: Option<&str>) -> Result<Option<i64>, ApiError> {
    raw.map(|raw| {
        raw.trim()
            .parse::<i64>()
            .map_err(|_| ApiError::field(field, "must be an integer"))
    })
    .transpose()
}

/// `POST /v1/texts`
pub async fn create_text(
    State(state): State<AppState>,
    principal: Principal,
    body: Result<Json<CreateTextBody>, JsonRejection>,
) -> Result<(StatusCode, Json<Text>), ApiError> {
    principal.require(Permission::ManageTexts)?;
    let body = json_body(body)?;

    let text = state.with_texts(|texts| Ok(texts.create_text(&body.value)?))?;
    Ok((StatusCode::CREATED, Json(text)))
}

/// `GET /v1/texts`
pub async fn list_texts(
    State(state): State<AppState>,
    principal: Principal,
    params: Result<Query<ListTextsParams>, QueryRejection>,
) -> Result<Json<Page<Text>>, ApiError> {
    principal.require(Permission::GetTexts)?;
    let Query(params) =
        params.map_err(|rejection| ApiError::field("query", rejection.body_text()))?;
    let (filter, request) = params.into_query()?;

    let page = state.with_texts(|texts| Ok(texts.query_texts(&filter, &request)?))?;
    Ok(Json(page))
}

/// `GET /v1/texts/{id}`
pub async fn get_text(
    State(state): State<AppState>,
    principal: Principal,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<Text>, ApiError> {
    principal.require(Permission::GetTexts)?;
    let id = text_id(path)?;

    let text = state.with_texts(|texts| texts.get_text(id)?.ok_or(ApiError::NotFound))?;
    Ok(Json(text))
}

/// `PATCH /v1/texts/{id}`
pub async fn update_text(
    State(state): State<AppState>,
    principal: Principal,
    path: Result<Path<String>, PathRejection>,
    body: Result<Json<UpdateTextBody>, JsonRejection>,
) -> Result<Json<Text>, ApiError> {
    principal.require(Permission::ManageTexts)?;
    let id = text_id(path)?;
    let body = json_body(body)?;
    if body.value.is_none() {
        return Err(ApiError::field("body", "must contain at least 1 field"));
    }

    let patch = TextPatch { value: body.value };
    let text = state.with_texts(|texts| Ok(texts.update_text(id, patch)?))?;
    Ok(Json(text))
}

/// `DELETE /v1/texts/{id}`
pub async fn delete_text(
    State(state): State<AppState>,
    principal: Principal,
    path: Result<Path<String>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    principal.require(Permission::ManageTexts)?;
    let id = text_id(path)?;

    state.with_texts(|texts| Ok(texts.delete_text(id)?))?;
    Ok(StatusCode::NO_CONTENT)
}
