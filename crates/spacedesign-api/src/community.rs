use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use tracing::{debug, info};

use spacedesign_db::models::Guarded;
use spacedesign_db::queries::PUBLIC_FEED_LIMIT;
use spacedesign_types::api::{ApiResponse, LikeResult, MemberRequest, NewRoomDesign};
use spacedesign_types::models::RoomDesign;

use crate::error::{ApiError, ApiResult};
use crate::extract::{IdPath, ValidatedJson};
use crate::state::{AppState, blocking};

/// GET /api/community/rooms
pub async fn list_public_rooms(
    State(state): State<AppState>,
) -> ApiResult<Json<ApiResponse<Vec<RoomDesign>>>> {
    let rooms = blocking(&state, |app| {
        let rows = app.db.list_public_room_designs(PUBLIC_FEED_LIMIT)?;
        Ok(rows.into_iter().map(RoomDesign::from).collect())
    })
    .await?;

    Ok(Json(ApiResponse::list(rooms)))
}

/// POST /api/community/rooms
pub async fn create_room(
    State(state): State<AppState>,
    ValidatedJson(design): ValidatedJson<NewRoomDesign>,
) -> ApiResult<impl IntoResponse> {
    let room = blocking(&state, move |app| {
        if let Some(user_id) = design.user_id {
            if app.db.get_user(user_id)?.is_none() {
                return Err(ApiError::NotFound("User"));
            }
        }
        Ok(RoomDesign::from(app.db.create_room_design(&design)?))
    })
    .await?;

    info!(room_id = room.id, public = room.is_public, "Room design created");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::data(room).with_message("Room design created successfully")),
    ))
}

/// GET /api/community/rooms/{id}
pub async fn get_room(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> ApiResult<Json<ApiResponse<RoomDesign>>> {
    let room = blocking(&state, move |app| {
        app.db
            .get_room_design(id)?
            .map(RoomDesign::from)
            .ok_or(ApiError::NotFound("Room design"))
    })
    .await?;

    Ok(Json(ApiResponse::data(room)))
}

/// POST /api/community/rooms/{id}/like — idempotent per user.
pub async fn like_room(
    State(state): State<AppState>,
    IdPath(room_id): IdPath,
    ValidatedJson(MemberRequest { user_id }): ValidatedJson<MemberRequest>,
) -> ApiResult<Json<ApiResponse<LikeResult>>> {
    let outcome = blocking(&state, move |app| Ok(app.db.like_room(user_id, room_id)?)).await?;

    let (result, message) = match outcome {
        Guarded::Inserted(row) => {
            info!(user_id, room_id, likes = row.likes, "Room liked");
            let room = RoomDesign::from(row);
            (LikeResult { liked: true, room }, "Room liked")
        }
        Guarded::Unchanged(row) => {
            debug!(user_id, room_id, "Room already liked by user");
            let room = RoomDesign::from(row);
            (LikeResult { liked: false, room }, "Room already liked")
        }
        Guarded::MissingUser => return Err(ApiError::NotFound("User")),
        Guarded::MissingTarget => return Err(ApiError::NotFound("Room design")),
    };

    Ok(Json(ApiResponse::data(result).with_message(message)))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use crate::test_support::TestApp;

    async fn post_room(app: &TestApp, title: &str, public: bool) -> i64 {
        let (status, body) = app
            .send(
                Method::POST,
                "/api/community/rooms",
                Some(json!({ "title": title, "roomType": "living", "isPublic": public })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        body["data"]["id"].as_i64().unwrap()
    }

    #[tokio::test]
    async fn create_and_fetch_design() {
        let app = TestApp::new();
        let (status, body) = app
            .send(
                Method::POST,
                "/api/community/rooms",
                Some(json!({
                    "title": "Sunny nook",
                    "roomType": "reading",
                    "designData": { "walls": ["#fff8e7"] },
                    "images": ["https://img.example.com/nook.jpg"],
                    "isPublic": true
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        let room = &body["data"];
        assert_eq!(room["likes"], 0);
        assert_eq!(room["designData"]["walls"][0], "#fff8e7");

        let id = room["id"].as_i64().unwrap();
        let (status, body) = app.send(Method::GET, &format!("/api/community/rooms/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["title"], "Sunny nook");

        let (status, _) = app.send(Method::GET, "/api/community/rooms/31337", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn create_design_rejects_client_counters_and_unknown_owner() {
        let app = TestApp::new();
        let (status, body) = app
            .send(
                Method::POST,
                "/api/community/rooms",
                Some(json!({ "title": "Cheat", "roomType": "den", "likes": 500 })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"][0]["field"], "likes");

        let (status, body) = app
            .send(
                Method::POST,
                "/api/community/rooms",
                Some(json!({ "title": "Orphan", "roomType": "den", "userId": 404 })),
            )
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "User not found");
    }

    #[tokio::test]
    async fn feed_only_shows_public_designs() {
        let app = TestApp::new();
        post_room(&app, "Private study", false).await;
        post_room(&app, "Open kitchen", true).await;

        let (status, body) = app.send(Method::GET, "/api/community/rooms", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 1);
        assert_eq!(body["data"][0]["title"], "Open kitchen");
    }

    #[tokio::test]
    async fn liking_twice_counts_once() {
        let app = TestApp::new();
        let user = app.create_user("noor", "correct-horse").await;
        let room = post_room(&app, "Terrace", true).await;
        let uri = format!("/api/community/rooms/{room}/like");

        let (status, body) = app.send(Method::POST, &uri, Some(json!({ "userId": user }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["liked"], true);
        assert_eq!(body["data"]["room"]["likes"], 1);

        let (status, body) = app.send(Method::POST, &uri, Some(json!({ "userId": user }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["liked"], false);
        assert_eq!(body["data"]["room"]["likes"], 1);
    }

    #[tokio::test]
    async fn like_preconditions() {
        let app = TestApp::new();
        let user = app.create_user("theo", "correct-horse").await;
        let room = post_room(&app, "Attic", true).await;

        let (status, body) = app
            .send(Method::POST, &format!("/api/community/rooms/{room}/like"), Some(json!({})))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"][0]["field"], "userId");

        let (status, body) = app
            .send(Method::POST, "/api/community/rooms/9999/like", Some(json!({ "userId": user })))
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Room design not found");

        let (status, body) = app
            .send(
                Method::POST,
                &format!("/api/community/rooms/{room}/like"),
                Some(json!({ "userId": 9999 })),
            )
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "User not found");
    }
}
