//! Admin CRUD over the content collections.
//!
//! Every handler validates the payload, then routes the mutation through the
//! document store's conflict-safe `update` via the collection services. The
//! CSRF and admission middleware run before any of this.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use models::{
    ContactMessage, MenuItem, MenuItemInput, MenuItemPatch, NewsItem, NewsItemInput, NewsItemPatch,
    SalonInfo, StyleImage, StyleImageInput, StyleImagePatch, Stylist, StylistInput, StylistPatch,
};
use tracing::info;

use service::errors::ServiceError;

use crate::errors::ApiError;
use crate::state::AppState;

#[utoipa::path(post, path = "/admin/api/stylists", tag = "admin", request_body = crate::openapi::StylistInputDoc, responses((status = 200, description = "OK"), (status = 400, description = "Bad Request")))]
pub async fn create_stylist(
    State(state): State<AppState>,
    Json(input): Json<StylistInput>,
) -> Result<Json<Stylist>, ApiError> {
    input.validate().map_err(ServiceError::from)?;
    let created = state.stylists().insert(input.into_record()).await?;
    info!(id = %created.id, "stylist created");
    Ok(Json(created))
}

#[utoipa::path(put, path = "/admin/api/stylists/{id}", tag = "admin", request_body = crate::openapi::StylistPatchDoc, responses((status = 200, description = "OK"), (status = 404, description = "Not Found")))]
pub async fn update_stylist(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<StylistPatch>,
) -> Result<Json<Stylist>, ApiError> {
    patch.validate().map_err(ServiceError::from)?;
    let updated = state.stylists().modify(&id, |s| patch.apply(s)).await?;
    info!(%id, "stylist updated");
    Ok(Json(updated))
}

pub async fn delete_stylist(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.stylists().remove(&id).await?;
    info!(%id, "stylist deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(post, path = "/admin/api/styles", tag = "admin", request_body = crate::openapi::StyleImageInputDoc, responses((status = 200, description = "OK"), (status = 400, description = "Bad Request")))]
pub async fn create_style(
    State(state): State<AppState>,
    Json(input): Json<StyleImageInput>,
) -> Result<Json<StyleImage>, ApiError> {
    input.validate().map_err(ServiceError::from)?;
    let created = state.styles().insert(input.into_record()).await?;
    info!(id = %created.id, "style image created");
    Ok(Json(created))
}

#[utoipa::path(put, path = "/admin/api/styles/{id}", tag = "admin", responses((status = 200, description = "OK"), (status = 404, description = "Not Found")))]
pub async fn update_style(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<StyleImagePatch>,
) -> Result<Json<StyleImage>, ApiError> {
    patch.validate().map_err(ServiceError::from)?;
    let updated = state.styles().modify(&id, |s| patch.apply(s)).await?;
    info!(%id, "style image updated");
    Ok(Json(updated))
}

pub async fn delete_style(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.styles().remove(&id).await?;
    info!(%id, "style image deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(post, path = "/admin/api/menu", tag = "admin", request_body = crate::openapi::MenuItemInputDoc, responses((status = 200, description = "OK"), (status = 400, description = "Bad Request")))]
pub async fn create_menu_item(
    State(state): State<AppState>,
    Json(input): Json<MenuItemInput>,
) -> Result<Json<MenuItem>, ApiError> {
    input.validate().map_err(ServiceError::from)?;
    let created = state.menu().insert(input.into_record()).await?;
    info!(id = %created.id, "menu item created");
    Ok(Json(created))
}

#[utoipa::path(put, path = "/admin/api/menu/{id}", tag = "admin", responses((status = 200, description = "OK"), (status = 404, description = "Not Found")))]
pub async fn update_menu_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<MenuItemPatch>,
) -> Result<Json<MenuItem>, ApiError> {
    patch.validate().map_err(ServiceError::from)?;
    let updated = state.menu().modify(&id, |m| patch.apply(m)).await?;
    info!(%id, "menu item updated");
    Ok(Json(updated))
}

pub async fn delete_menu_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.menu().remove(&id).await?;
    info!(%id, "menu item deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(post, path = "/admin/api/news", tag = "admin", request_body = crate::openapi::NewsItemInputDoc, responses((status = 200, description = "OK"), (status = 400, description = "Bad Request")))]
pub async fn create_news_item(
    State(state): State<AppState>,
    Json(input): Json<NewsItemInput>,
) -> Result<Json<NewsItem>, ApiError> {
    input.validate().map_err(ServiceError::from)?;
    let created = state.news().insert(input.into_record()).await?;
    info!(id = %created.id, "news item created");
    Ok(Json(created))
}

#[utoipa::path(put, path = "/admin/api/news/{id}", tag = "admin", responses((status = 200, description = "OK"), (status = 404, description = "Not Found")))]
pub async fn update_news_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<NewsItemPatch>,
) -> Result<Json<NewsItem>, ApiError> {
    patch.validate().map_err(ServiceError::from)?;
    let updated = state.news().modify(&id, |n| patch.apply(n)).await?;
    info!(%id, "news item updated");
    Ok(Json(updated))
}

pub async fn delete_news_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.news().remove(&id).await?;
    info!(%id, "news item deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(put, path = "/admin/api/salon", tag = "admin", responses((status = 200, description = "OK"), (status = 400, description = "Bad Request")))]
pub async fn update_salon(
    State(state): State<AppState>,
    Json(info): Json<SalonInfo>,
) -> Result<Json<SalonInfo>, ApiError> {
    info.validate().map_err(ServiceError::from)?;
    let saved = state.salon().replace(info).await?;
    info!("salon profile replaced");
    Ok(Json(saved))
}

#[utoipa::path(get, path = "/admin/api/messages", tag = "admin", responses((status = 200, description = "OK")))]
pub async fn list_messages(
    State(state): State<AppState>,
) -> Result<Json<Vec<ContactMessage>>, ApiError> {
    Ok(Json(state.messages().list().await?))
}
// deletes are intentionally left out of the OpenAPI document for now
