use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use tracing::{debug, info};

use spacedesign_db::models::Guarded;
use spacedesign_types::api::{ApiResponse, JoinResult, MemberRequest, NewBusinessGroup};
use spacedesign_types::models::{BusinessGroup, GroupMembership, MemberRole};

use crate::error::{ApiError, ApiResult};
use crate::extract::{CategoryQuery, IdPath, ValidatedJson};
use crate::state::{AppState, blocking};

/// GET /api/business/groups?category= — largest groups first.
pub async fn list_groups(
    State(state): State<AppState>,
    CategoryQuery(filter): CategoryQuery,
) -> ApiResult<Json<ApiResponse<Vec<BusinessGroup>>>> {
    let category = filter.category().map(str::to_owned);

    let groups = blocking(&state, move |app| {
        let rows = app.db.list_business_groups(category.as_deref())?;
        Ok(rows.into_iter().map(BusinessGroup::from).collect())
    })
    .await?;

    Ok(Json(ApiResponse::list(groups)))
}

/// POST /api/business/groups
pub async fn create_group(
    State(state): State<AppState>,
    ValidatedJson(group): ValidatedJson<NewBusinessGroup>,
) -> ApiResult<impl IntoResponse> {
    let group = blocking(&state, move |app| {
        Ok(BusinessGroup::from(app.db.create_business_group(&group)?))
    })
    .await?;

    info!(group_id = group.id, category = %group.category, "Business group created");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::data(group).with_message("Business group created successfully")),
    ))
}

/// POST /api/business/groups/{id}/join — idempotent per user.
pub async fn join_group(
    State(state): State<AppState>,
    IdPath(group_id): IdPath,
    ValidatedJson(MemberRequest { user_id }): ValidatedJson<MemberRequest>,
) -> ApiResult<Json<ApiResponse<JoinResult>>> {
    let outcome = blocking(&state, move |app| {
        Ok(app.db.join_group(user_id, group_id, MemberRole::default())?)
    })
    .await?;

    let (joined, (group, membership)) = match outcome {
        Guarded::Inserted(rows) => {
            info!(user_id, group_id, "User joined group");
            (true, rows)
        }
        Guarded::Unchanged(rows) => {
            debug!(user_id, group_id, "User already in group");
            (false, rows)
        }
        Guarded::MissingUser => return Err(ApiError::NotFound("User")),
        Guarded::MissingTarget => return Err(ApiError::NotFound("Business group")),
    };

    let message = if joined { "Joined group" } else { "Already a member" };
    let result = JoinResult {
        joined,
        group: BusinessGroup::from(group),
        membership: GroupMembership::from(membership),
    };
    Ok(Json(ApiResponse::data(result).with_message(message)))
}
