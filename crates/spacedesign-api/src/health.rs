use std::collections::BTreeMap;

use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// (group, route, what it does)
const ENDPOINTS: &[(&str, &str, &str)] = &[
    ("users", "POST /api/users", "Create a user"),
    ("users", "GET /api/users/{id}", "Get a user"),
    ("users", "PUT /api/users/{id}/subscription", "Update a user's subscription"),
    ("users", "GET /api/users/{id}/rooms", "Get a user's room designs"),
    ("users", "GET /api/users/{id}/groups", "Get a user's business groups"),
    ("auth", "POST /api/auth/login", "Log in with username and password"),
    ("furniture", "GET /api/furniture", "Get all furniture items"),
    ("furniture", "POST /api/furniture", "Create new furniture item"),
    ("furniture", "DELETE /api/furniture/{id}", "Delete furniture item"),
    ("rooms", "GET /api/room/{id}", "Get specific room layout"),
    ("rooms", "POST /api/room", "Create/update room layout"),
    ("rooms", "GET /api/rooms", "Get all room layouts"),
    ("rooms", "DELETE /api/room/{id}", "Delete room layout"),
    ("community", "GET /api/community/rooms", "Get public room designs"),
    ("community", "POST /api/community/rooms", "Share a room design"),
    ("community", "GET /api/community/rooms/{id}", "Get a room design"),
    ("community", "POST /api/community/rooms/{id}/like", "Like a room design"),
    ("business", "GET /api/business/groups", "Get business groups"),
    ("business", "POST /api/business/groups", "Create a business group"),
    ("business", "POST /api/business/groups/{id}/join", "Join a business group"),
    ("qa", "GET /api/qa/questions", "Get questions"),
    ("qa", "POST /api/qa/questions", "Ask a question"),
];

#[derive(Debug, Serialize)]
pub struct Health {
    pub success: bool,
    pub message: &'static str,
    pub timestamp: DateTime<Utc>,
    pub endpoints: BTreeMap<&'static str, BTreeMap<&'static str, &'static str>>,
}

/// GET /api/health — liveness plus an index of the API.
pub async fn health() -> Json<Health> {
    let mut endpoints: BTreeMap<_, BTreeMap<_, _>> = BTreeMap::new();
    for &(group, route, description) in ENDPOINTS {
        endpoints.entry(group).or_default().insert(route, description);
    }

    Json(Health {
        success: true,
        message: "API is running",
        timestamp: Utc::now(),
        endpoints,
    })
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};

    use crate::test_support::TestApp;

    #[tokio::test]
    async fn health_lists_endpoints() {
        let app = TestApp::new();
        let (status, body) = app.send(Method::GET, "/api/health", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "API is running");
        assert!(body["timestamp"].is_string());
        assert_eq!(body["endpoints"]["rooms"]["POST /api/room"], "Create/update room layout");
        assert_eq!(body["endpoints"]["furniture"].as_object().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn unknown_route_uses_error_envelope() {
        let app = TestApp::new();
        let (status, body) = app.send(Method::GET, "/api/nope", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Route not found");
    }
}
