use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use tracing::info;

use spacedesign_types::api::{ApiResponse, NewFurniture};
use spacedesign_types::models::FurnitureItem;

use crate::error::{ApiError, ApiResult};
use crate::extract::{CategoryQuery, IdPath, ValidatedJson};
use crate::state::{AppState, blocking};

/// GET /api/furniture?category=
pub async fn list_furniture(
    State(state): State<AppState>,
    CategoryQuery(filter): CategoryQuery,
) -> ApiResult<Json<ApiResponse<Vec<FurnitureItem>>>> {
    let category = filter.category().map(str::to_owned);

    let items = blocking(&state, move |app| {
        let rows = app.db.list_furniture(category.as_deref())?;
        Ok(rows.into_iter().map(FurnitureItem::from).collect())
    })
    .await?;

    Ok(Json(ApiResponse::list(items)))
}

/// POST /api/furniture
pub async fn create_furniture(
    State(state): State<AppState>,
    ValidatedJson(item): ValidatedJson<NewFurniture>,
) -> ApiResult<impl IntoResponse> {
    let item = blocking(&state, move |app| {
        Ok(FurnitureItem::from(app.db.create_furniture(&item)?))
    })
    .await?;

    info!(furniture_id = item.id, name = %item.name, "Furniture item created");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::data(item).with_message("Furniture item created successfully")),
    ))
}

/// DELETE /api/furniture/{id}
pub async fn delete_furniture(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> ApiResult<Json<ApiResponse<FurnitureItem>>> {
    let item = blocking(&state, move |app| {
        app.db
            .delete_furniture(id)?
            .map(FurnitureItem::from)
            .ok_or(ApiError::NotFound("Furniture item"))
    })
    .await?;

    info!(furniture_id = id, "Furniture item deleted");
    Ok(Json(
        ApiResponse::data(item).with_message("Furniture item deleted successfully"),
    ))
}
