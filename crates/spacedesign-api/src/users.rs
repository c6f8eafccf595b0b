use axum::{Json, extract::State};
use tracing::info;

use spacedesign_types::api::{ApiResponse, SubscriptionUpdate};
use spacedesign_types::models::{BusinessGroup, RoomDesign, User};

use crate::error::{ApiError, ApiResult};
use crate::extract::{IdPath, ValidatedJson};
use crate::state::{AppState, blocking};

/// GET /api/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> ApiResult<Json<ApiResponse<User>>> {
    let user = blocking(&state, move |app| {
        app.db
            .get_user(id)?
            .map(User::from)
            .ok_or(ApiError::NotFound("User"))
    })
    .await?;

    Ok(Json(ApiResponse::data(user)))
}

/// PUT /api/users/{id}/subscription
pub async fn update_subscription(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    ValidatedJson(update): ValidatedJson<SubscriptionUpdate>,
) -> ApiResult<Json<ApiResponse<User>>> {
    let user = blocking(&state, move |app| {
        app.db
            .update_user_subscription(id, &update.plan, update.expiry)?
            .map(User::from)
            .ok_or(ApiError::NotFound("User"))
    })
    .await?;

    info!(user_id = id, plan = %user.subscription_plan, "Subscription updated");
    Ok(Json(
        ApiResponse::data(user).with_message("Subscription updated successfully"),
    ))
}

/// GET /api/users/{id}/rooms
pub async fn user_rooms(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> ApiResult<Json<ApiResponse<Vec<RoomDesign>>>> {
    let rooms = blocking(&state, move |app| {
        let rows = app.db.list_user_room_designs(id)?;
        Ok(rows.into_iter().map(RoomDesign::from).collect())
    })
    .await?;

    Ok(Json(ApiResponse::list(rooms)))
}

/// GET /api/users/{id}/groups
pub async fn user_groups(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> ApiResult<Json<ApiResponse<Vec<BusinessGroup>>>> {
    let groups = blocking(&state, move |app| {
        let rows = app.db.list_user_groups(id)?;
        Ok(rows.into_iter().map(BusinessGroup::from).collect())
    })
    .await?;

    Ok(Json(ApiResponse::list(groups)))
}
