pub mod assistant;
pub mod auth;
pub mod business;
pub mod community;
pub mod error;
pub mod extract;
pub mod furniture;
pub mod health;
pub mod layouts;
pub mod qa;
pub mod state;
pub mod users;

use axum::{
    Router,
    routing::{delete, get, post, put},
};

use crate::error::ApiError;
use crate::state::AppState;

/// The full `/api` surface. Layers (CORS, tracing) are added by the binary.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health::health))
        // Users
        .route("/api/users", post(auth::create_user))
        .route("/api/users/{id}", get(users::get_user))
        .route("/api/users/{id}/subscription", put(users::update_subscription))
        .route("/api/users/{id}/rooms", get(users::user_rooms))
        .route("/api/users/{id}/groups", get(users::user_groups))
        .route("/api/auth/login", post(auth::login))
        // Furniture catalog
        .route(
            "/api/furniture",
            get(furniture::list_furniture).post(furniture::create_furniture),
        )
        .route("/api/furniture/{id}", delete(furniture::delete_furniture))
        // Room layouts
        .route("/api/rooms", get(layouts::list_layouts))
        .route("/api/room", post(layouts::save_layout))
        .route(
            "/api/room/{id}",
            get(layouts::get_layout).delete(layouts::delete_layout),
        )
        // Community
        .route(
            "/api/community/rooms",
            get(community::list_public_rooms).post(community::create_room),
        )
        .route("/api/community/rooms/{id}", get(community::get_room))
        .route("/api/community/rooms/{id}/like", post(community::like_room))
        // Business groups
        .route(
            "/api/business/groups",
            get(business::list_groups).post(business::create_group),
        )
        .route("/api/business/groups/{id}/join", post(business::join_group))
        // Q&A
        .route(
            "/api/qa/questions",
            get(qa::list_questions).post(qa::ask_question),
        )
        .fallback(route_not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .with_state(state)
}

async fn route_not_found() -> ApiError {
    ApiError::NotFound("Route")
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use argon2::{Algorithm, Argon2, Params, Version};
    use axum::{
        Router,
        body::Body,
        http::{Method, Request, StatusCode, header},
    };
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use spacedesign_db::{Database, seed};

    use crate::auth::Passwords;
    use crate::state::AppStateInner;

    /// Argon2id with the smallest cost the crate accepts, so tests stay fast.
    pub fn test_passwords() -> Passwords {
        let params = Params::new(1024, 1, 1, None).unwrap();
        Passwords::new(Argon2::new(Algorithm::Argon2id, Version::V0x13, params)).unwrap()
    }

    /// A router over a fresh, demo-seeded in-memory database.
    pub struct TestApp {
        router: Router,
    }

    impl TestApp {
        pub fn new() -> Self {
            let db = Database::open_in_memory().unwrap();
            seed::seed_demo(&db).unwrap();
            let state = Arc::new(AppStateInner::with_passwords(db, test_passwords()));
            Self {
                router: super::router(state),
            }
        }

        pub async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
            let builder = Request::builder().method(method).uri(uri);
            let request = match body {
                Some(body) => builder
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(serde_json::to_vec(&body).unwrap()))
                    .unwrap(),
                None => builder.body(Body::empty()).unwrap(),
            };

            let response = self.router.clone().oneshot(request).await.unwrap();
            let status = response.status();
            let bytes = response.into_body().collect().await.unwrap().to_bytes();
            let value = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes).unwrap()
            };
            (status, value)
        }

        /// Create a user through the API and return its id.
        pub async fn create_user(&self, username: &str, password: &str) -> i64 {
            let (status, body) = self
                .send(
                    Method::POST,
                    "/api/users",
                    Some(json!({ "username": username, "password": password })),
                )
                .await;
            assert_eq!(status, StatusCode::CREATED, "{body}");
            body["data"]["id"].as_i64().unwrap()
        }
    }
}
