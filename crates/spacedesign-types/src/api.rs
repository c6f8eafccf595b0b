use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

use crate::models::{BusinessGroup, GroupMembership, RoomDesign};
use crate::validation::{FieldError, timestamp, trimmed, trimmed_opt};

// -- Envelopes --

/// Success body shared by every endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

impl<T> ApiResponse<T> {
    pub fn data(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
            count: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl<T> ApiResponse<Vec<T>> {
    pub fn list(items: Vec<T>) -> Self {
        let count = items.len();
        Self {
            count: Some(count),
            ..Self::data(items)
        }
    }
}

/// Failure body. `errors` is only present for validation failures.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
}

// -- Users --

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewUser {
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 3, max = 32, message = "must be between 3 and 32 characters"))]
    pub username: String,
    #[validate(length(min = 8, message = "must be at least 8 characters"))]
    pub password: String,
    #[serde(default, deserialize_with = "trimmed_opt")]
    #[validate(email(message = "must be an email address"))]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "trimmed_opt")]
    pub external_auth_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LoginRequest {
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 1, message = "must not be empty"))]
    pub username: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SubscriptionUpdate {
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 1, message = "must not be empty"))]
    pub plan: String,
    #[serde(deserialize_with = "timestamp")]
    pub expiry: DateTime<Utc>,
}

/// Body of like / join requests: the acting user.
#[derive(Debug, Clone, Copy, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MemberRequest {
    #[validate(range(min = 1, message = "must be a positive integer"))]
    pub user_id: i64,
}

// -- Community --

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewRoomDesign {
    #[validate(range(min = 1, message = "must be a positive integer"))]
    pub user_id: Option<i64>,
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 1, message = "must not be empty"))]
    pub title: String,
    #[serde(default, deserialize_with = "trimmed_opt")]
    pub description: Option<String>,
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 1, message = "must not be empty"))]
    pub room_type: String,
    /// Opaque to the server.
    #[serde(default)]
    pub design_data: Option<Value>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub is_public: bool,
}

/// Outcome of a like request. `liked` is false when the like already existed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeResult {
    pub liked: bool,
    pub room: RoomDesign,
}

// -- Business groups --

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewBusinessGroup {
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 1, message = "must not be empty"))]
    pub name: String,
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 1, message = "must not be empty"))]
    pub category: String,
    #[serde(default, deserialize_with = "trimmed_opt")]
    pub description: Option<String>,
}

/// Outcome of a join request. `joined` is false for an existing member.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinResult {
    pub joined: bool,
    pub group: BusinessGroup,
    pub membership: GroupMembership,
}

// -- Furniture --

/// A catalog entry as submitted. Ratings and scores are never client input.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewFurniture {
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 1, message = "must not be empty"))]
    pub name: String,
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 1, message = "must not be empty"))]
    pub category: String,
    #[validate(range(min = 1, message = "must be a positive number"))]
    pub price: i64,
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 1, message = "must not be empty"))]
    pub image_url: String,
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 1, message = "must not be empty"))]
    pub description: String,
    #[serde(default)]
    pub images: Vec<String>,
}

// -- Q&A --

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewQuestion {
    #[validate(range(min = 1, message = "must be a positive integer"))]
    pub user_id: Option<i64>,
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 1, message = "must not be empty"))]
    pub question: String,
    #[serde(default, deserialize_with = "trimmed_opt")]
    pub category: Option<String>,
}

/// Query string for list endpoints that filter by category.
#[derive(Debug, Default, Deserialize)]
pub struct CategoryFilter {
    pub category: Option<String>,
}

impl CategoryFilter {
    /// The trimmed category, if one was given.
    pub fn category(&self) -> Option<&str> {
        self.category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }
}
