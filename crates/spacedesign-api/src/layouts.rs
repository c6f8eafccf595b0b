//! Saved room layouts (`/api/room`, `/api/rooms`).
//!
//! Layouts are keyed by a client-chosen string id and saved by upsert.
//! Placements must point at catalog furniture when saved; deleting that
//! furniture later leaves the layout untouched.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use tracing::info;

use spacedesign_db::models::{LayoutSave, Upsert};
use spacedesign_types::api::ApiResponse;
use spacedesign_types::models::RoomLayout;
use spacedesign_types::validation::{FieldError, ValidationErrors};

use crate::error::{ApiError, ApiResult};
use crate::extract::{KeyPath, ValidatedJson};
use crate::state::{AppState, blocking};

/// GET /api/rooms
pub async fn list_layouts(
    State(state): State<AppState>,
) -> ApiResult<Json<ApiResponse<Vec<RoomLayout>>>> {
    let layouts = blocking(&state, |app| {
        let rows = app.db.list_room_layouts()?;
        Ok(rows.into_iter().map(RoomLayout::from).collect())
    })
    .await?;

    Ok(Json(ApiResponse::list(layouts)))
}

/// GET /api/room/{id}
pub async fn get_layout(
    State(state): State<AppState>,
    KeyPath(id): KeyPath,
) -> ApiResult<Json<ApiResponse<RoomLayout>>> {
    let layout = blocking(&state, move |app| {
        app.db
            .get_room_layout(&id)?
            .map(RoomLayout::from)
            .ok_or(ApiError::NotFound("Room"))
    })
    .await?;

    Ok(Json(ApiResponse::data(layout)))
}

/// POST /api/room — 201 for a new id, 200 when an existing layout is replaced.
pub async fn save_layout(
    State(state): State<AppState>,
    ValidatedJson(layout): ValidatedJson<RoomLayout>,
) -> ApiResult<impl IntoResponse> {
    let (layout, outcome) = blocking(&state, move |app| match app.db.save_room_layout(&layout)? {
        LayoutSave::Saved(outcome) => Ok((layout, outcome)),
        LayoutSave::UnknownFurniture(missing) => Err(unknown_furniture(&layout, &missing).into()),
    })
    .await?;

    info!(layout_id = %layout.id, pieces = layout.furniture.len(), ?outcome, "Room layout saved");
    let (status, message) = match outcome {
        Upsert::Created => (StatusCode::CREATED, "Room layout created successfully"),
        Upsert::Updated => (StatusCode::OK, "Room layout updated successfully"),
    };
    Ok((status, Json(ApiResponse::data(layout).with_message(message))))
}

fn unknown_furniture(layout: &RoomLayout, missing: &[i64]) -> ValidationErrors {
    let errors = layout
        .furniture
        .iter()
        .enumerate()
        .filter(|(_, p)| missing.contains(&p.furniture_id))
        .map(|(i, _)| {
            FieldError::new(
                format!("furniture[{i}].furnitureId"),
                "does not match any furniture item",
            )
        })
        .collect();
    ValidationErrors(errors)
}

/// DELETE /api/room/{id}
pub async fn delete_layout(
    State(state): State<AppState>,
    KeyPath(id): KeyPath,
) -> ApiResult<Json<ApiResponse<RoomLayout>>> {
    let layout = blocking(&state, move |app| {
        app.db
            .delete_room_layout(&id)?
            .map(RoomLayout::from)
            .ok_or(ApiError::NotFound("Room"))
    })
    .await?;

    info!(layout_id = %layout.id, "Room layout deleted");
    Ok(Json(
        ApiResponse::data(layout).with_message("Room layout deleted successfully"),
    ))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::{Value, json};

    use crate::test_support::TestApp;

    fn placement(furniture_id: i64, x: f64) -> Value {
        json!({ "furnitureId": furniture_id, "x": x, "y": 120.0, "z": 0, "rotation": 90 })
    }

    #[tokio::test]
    async fn demo_layout_is_seeded() {
        let app = TestApp::new();
        let (status, body) = app.send(Method::GET, "/api/room/living-room-1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["name"], "Modern Living Room");
        assert_eq!(body["data"]["furniture"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn save_twice_replaces_in_place() {
        let app = TestApp::new();
        let first = json!({ "id": "den", "name": "Den v1", "furniture": [placement(1, 10.0)] });
        let second = json!({ "id": "den", "name": "Den v2", "furniture": [placement(2, 55.5), placement(3, 80.0)] });

        let (status, body) = app.send(Method::POST, "/api/room", Some(first)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["message"], "Room layout created successfully");

        let (status, body) = app.send(Method::POST, "/api/room", Some(second)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Room layout updated successfully");

        let (status, body) = app.send(Method::GET, "/api/room/den", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["name"], "Den v2");
        assert_eq!(body["data"]["furniture"][0]["x"], 55.5);
        assert_eq!(body["data"]["furniture"].as_array().unwrap().len(), 2);

        let (_, body) = app.send(Method::GET, "/api/rooms", None).await;
        let dens = body["data"]
            .as_array()
            .unwrap()
            .iter()
            .filter(|l| l["id"] == "den")
            .count();
        assert_eq!(dens, 1);
        assert_eq!(body["count"], 2);
    }

    #[tokio::test]
    async fn placement_errors_are_indexed() {
        let app = TestApp::new();
        let body = json!({
            "id": "bad",
            "name": "Bad",
            "furniture": [
                placement(1, 0.0),
                { "furnitureId": 2, "x": "left", "y": 0, "z": 0, "rotation": 0 },
                { "furnitureId": 3, "x": 0, "y": 0, "z": 0 }
            ]
        });

        let (status, body) = app.send(Method::POST, "/api/room", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let fields: Vec<&str> = body["errors"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["field"].as_str().unwrap())
            .collect();
        assert_eq!(fields, vec!["furniture[1].x"]);

        let (status, _) = app.send(Method::GET, "/api/room/bad", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn unknown_furniture_is_rejected() {
        let app = TestApp::new();
        let body = json!({
            "id": "ghost",
            "name": "Ghost furniture",
            "furniture": [placement(1, 0.0), placement(404, 1.0)]
        });

        let (status, body) = app.send(Method::POST, "/api/room", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"][0]["field"], "furniture[1].furnitureId");

        let (status, _) = app.send(Method::GET, "/api/room/ghost", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn deleted_furniture_cannot_be_placed() {
        let app = TestApp::new();
        let (status, _) = app.send(Method::DELETE, "/api/furniture/2", None).await;
        assert_eq!(status, StatusCode::OK);

        let body = json!({ "id": "late", "name": "Late", "furniture": [placement(1, 0.0), placement(2, 5.0)] });
        let (status, body) = app.send(Method::POST, "/api/room", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"].as_array().unwrap().len(), 1);
        assert_eq!(body["errors"][0]["field"], "furniture[1].furnitureId");
    }

    #[tokio::test]
    async fn placement_rules_are_reported_together() {
        let app = TestApp::new();
        let body = json!({
            "id": "zeroes",
            "name": "Zeroes",
            "furniture": [placement(0, 0.0), placement(1, 0.0), placement(-3, 0.0)]
        });

        let (status, body) = app.send(Method::POST, "/api/room", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"][0]["field"], "furniture[0].furnitureId");
        assert_eq!(body["errors"][1]["field"], "furniture[2].furnitureId");
    }

    #[tokio::test]
    async fn layouts_survive_furniture_deletion() {
        let app = TestApp::new();
        let (status, _) = app.send(Method::DELETE, "/api/furniture/1", None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = app.send(Method::GET, "/api/room/living-room-1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["furniture"][0]["furnitureId"], 1);
    }

    #[tokio::test]
    async fn delete_layout() {
        let app = TestApp::new();
        let (status, body) = app.send(Method::DELETE, "/api/room/living-room-1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["id"], "living-room-1");

        let (status, body) = app.send(Method::DELETE, "/api/room/living-room-1", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Room not found");

        let (_, body) = app.send(Method::GET, "/api/rooms", None).await;
        assert_eq!(body["count"], 0);
    }
}
