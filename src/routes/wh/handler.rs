use axum::{
    extract::{Extension, Path, State},
    response::{IntoResponse, Response},
};

use super::model::{FullQuery, parse_kind, parse_payload};
use crate::{
    AppState,
    claims::Claims,
    error::AppError,
    id::WhId,
    routes::{AppJson, AppQuery},
    utils::success_to_api_response,
    wh::WhKind,
};

#[axum::debug_handler]
pub async fn create_wh(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(kind): Path<String>,
    AppJson(body): AppJson<serde_json::Value>,
) -> Result<impl IntoResponse, AppError> {
    let kind = parse_kind(&kind)?;
    let payload = parse_payload(kind, body)?;
    Ok(success_to_api_response(state.wh.create(&claims, payload).await?))
}

/// `?full=true` on items resolves property and spell references.
#[axum::debug_handler]
pub async fn list_wh(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(kind): Path<String>,
    AppQuery(query): AppQuery<FullQuery>,
) -> Result<Response, AppError> {
    let kind = parse_kind(&kind)?;
    if query.full && kind == WhKind::Item {
        let items = state.wh.list_full_items(&claims).await?;
        return Ok(success_to_api_response(items).into_response());
    }
    let list = state.wh.list(&claims, kind).await?;
    Ok(success_to_api_response(list).into_response())
}

#[axum::debug_handler]
pub async fn get_wh(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((kind, id)): Path<(String, WhId)>,
    AppQuery(query): AppQuery<FullQuery>,
) -> Result<Response, AppError> {
    let kind = parse_kind(&kind)?;
    if query.full && kind == WhKind::Item {
        let item = state.wh.get_full_item(&claims, &id).await?;
        return Ok(success_to_api_response(item).into_response());
    }
    let wh = state.wh.get(&claims, kind, &id).await?;
    Ok(success_to_api_response(wh).into_response())
}

#[axum::debug_handler]
pub async fn update_wh(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((kind, id)): Path<(String, WhId)>,
    AppJson(body): AppJson<serde_json::Value>,
) -> Result<impl IntoResponse, AppError> {
    let kind = parse_kind(&kind)?;
    let payload = parse_payload(kind, body)?;
    Ok(success_to_api_response(
        state.wh.update(&claims, kind, &id, payload).await?,
    ))
}

#[axum::debug_handler]
pub async fn delete_wh(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((kind, id)): Path<(String, WhId)>,
) -> Result<impl IntoResponse, AppError> {
    let kind = parse_kind(&kind)?;
    state.wh.delete(&claims, kind, &id).await?;
    Ok(success_to_api_response(()))
}

#[axum::debug_handler]
pub async fn get_generation_props(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    Ok(success_to_api_response(state.wh.generation_props().await?))
}
