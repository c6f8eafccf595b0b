use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

use crate::validation::trimmed;

/// Public view of a user. The password hash never leaves the db crate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: Option<String>,
    pub external_auth_id: Option<String>,
    pub subscription_plan: String,
    pub subscription_expiry: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// A community room design. `likes` is maintained by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomDesign {
    pub id: i64,
    pub user_id: Option<i64>,
    pub title: String,
    pub description: Option<String>,
    pub room_type: String,
    pub design_data: Option<Value>,
    pub images: Vec<String>,
    pub is_public: bool,
    pub likes: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessGroup {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub description: Option<String>,
    pub member_count: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    #[default]
    Member,
    Admin,
    Moderator,
}

impl MemberRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Member => "member",
            Self::Admin => "admin",
            Self::Moderator => "moderator",
        }
    }
}

impl std::str::FromStr for MemberRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "member" => Ok(Self::Member),
            "admin" => Ok(Self::Admin),
            "moderator" => Ok(Self::Moderator),
            other => Err(format!("unknown member role: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupMembership {
    pub id: i64,
    pub user_id: i64,
    pub group_id: i64,
    pub role: MemberRole,
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FurnitureItem {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub price: Option<i64>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub images: Vec<String>,
    pub ai_score: Option<i64>,
    pub reviews: Option<Value>,
    pub average_rating: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// One piece of furniture placed in a saved layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FurniturePlacement {
    #[validate(range(min = 1, message = "must be a positive integer"))]
    pub furniture_id: i64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub rotation: f64,
}

/// A saved room layout. The id is chosen by the client, and the same shape
/// is accepted on save and returned on read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RoomLayout {
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 1, message = "must not be empty"))]
    pub id: String,
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 1, message = "must not be empty"))]
    pub name: String,
    #[validate(nested)]
    pub furniture: Vec<FurniturePlacement>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QaQuestion {
    pub id: i64,
    pub user_id: Option<i64>,
    pub question: String,
    pub category: Option<String>,
    pub is_answered: bool,
    pub ai_response: Option<String>,
    pub created_at: DateTime<Utc>,
}
