//! Public read endpoints plus the contact form submission.

use axum::extract::State;
use axum::Json;
use models::{ContactMessage, ContactMessageInput, MenuItem, NewsItem, SalonInfo, StyleImage, Stylist};
use tracing::info;

use crate::errors::ApiError;
use crate::state::AppState;

#[utoipa::path(get, path = "/api/stylists", tag = "content", responses((status = 200, description = "OK")))]
pub async fn list_stylists(State(state): State<AppState>) -> Result<Json<Vec<Stylist>>, ApiError> {
    Ok(Json(state.stylists().list().await?))
}

#[utoipa::path(get, path = "/api/styles", tag = "content", responses((status = 200, description = "OK")))]
pub async fn list_styles(State(state): State<AppState>) -> Result<Json<Vec<StyleImage>>, ApiError> {
    Ok(Json(state.styles().list().await?))
}

#[utoipa::path(get, path = "/api/menu", tag = "content", responses((status = 200, description = "OK")))]
pub async fn list_menu(State(state): State<AppState>) -> Result<Json<Vec<MenuItem>>, ApiError> {
    Ok(Json(state.menu().list().await?))
}

#[utoipa::path(get, path = "/api/news", tag = "content", responses((status = 200, description = "OK")))]
pub async fn list_news(State(state): State<AppState>) -> Result<Json<Vec<NewsItem>>, ApiError> {
    Ok(Json(state.news().list().await?))
}

#[utoipa::path(get, path = "/api/salon", tag = "content", responses((status = 200, description = "OK")))]
pub async fn get_salon(State(state): State<AppState>) -> Result<Json<SalonInfo>, ApiError> {
    Ok(Json(state.salon().get().await?))
}

#[utoipa::path(post, path = "/api/contact", tag = "content", request_body = crate::openapi::ContactMessageInputDoc, responses((status = 200, description = "OK"), (status = 400, description = "Bad Request")))]
pub async fn submit_contact(
    State(state): State<AppState>,
    Json(input): Json<ContactMessageInput>,
) -> Result<Json<ContactMessage>, ApiError> {
    input.validate().map_err(service::errors::ServiceError::from)?;
    let record = input.into_record();
    let created = state.messages().insert(record).await?;
    info!(id = %created.id, "contact message stored");
    Ok(Json(created))
}
