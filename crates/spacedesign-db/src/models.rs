//! Database row types. These map directly to SQLite rows and are kept apart
//! from the API models; `UserRow` is the only place a password hash lives.
use chrono::{DateTime, Utc};
use serde_json::Value;

use spacedesign_types::models::{
    BusinessGroup, FurnitureItem, FurniturePlacement, GroupMembership, MemberRole, QaQuestion,
    RoomDesign, RoomLayout, User,
};

pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub password: String,
    pub email: Option<String>,
    pub external_auth_id: Option<String>,
    pub subscription_plan: String,
    pub subscription_expiry: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

pub struct RoomDesignRow {
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

pub struct BusinessGroupRow {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub description: Option<String>,
    pub member_count: i64,
    pub created_at: DateTime<Utc>,
}

pub struct MembershipRow {
    pub id: i64,
    pub user_id: i64,
    pub group_id: i64,
    pub role: MemberRole,
    pub joined_at: DateTime<Utc>,
}

pub struct FurnitureRow {
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

pub struct LayoutRow {
    pub id: String,
    pub name: String,
    pub furniture: Vec<FurniturePlacement>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub struct QuestionRow {
    pub id: i64,
    pub user_id: Option<i64>,
    pub question: String,
    pub category: Option<String>,
    pub is_answered: bool,
    pub ai_response: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Result of a guarded insert (like, join).
#[derive(Debug)]
pub enum Guarded<T> {
    /// The pair was new: row inserted and the parent's counter bumped.
    Inserted(T),
    /// The pair already existed: nothing changed.
    Unchanged(T),
    MissingUser,
    MissingTarget,
}

/// Whether a layout save inserted or replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Created,
    Updated,
}

/// Result of a layout save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutSave {
    Saved(Upsert),
    /// Placements pointed at these ids, which are not in the catalog.
    /// Nothing was written.
    UnknownFurniture(Vec<i64>),
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            username: row.username,
            email: row.email,
            external_auth_id: row.external_auth_id,
            subscription_plan: row.subscription_plan,
            subscription_expiry: row.subscription_expiry,
            created_at: row.created_at,
        }
    }
}

impl From<RoomDesignRow> for RoomDesign {
    fn from(row: RoomDesignRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            title: row.title,
            description: row.description,
            room_type: row.room_type,
            design_data: row.design_data,
            images: row.images,
            is_public: row.is_public,
            likes: row.likes,
            created_at: row.created_at,
        }
    }
}

impl From<BusinessGroupRow> for BusinessGroup {
    fn from(row: BusinessGroupRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            category: row.category,
            description: row.description,
            member_count: row.member_count,
            created_at: row.created_at,
        }
    }
}

impl From<MembershipRow> for GroupMembership {
    fn from(row: MembershipRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            group_id: row.group_id,
            role: row.role,
            joined_at: row.joined_at,
        }
    }
}

impl From<FurnitureRow> for FurnitureItem {
    fn from(row: FurnitureRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            category: row.category,
            price: row.price,
            description: row.description,
            image_url: row.image_url,
            images: row.images,
            ai_score: row.ai_score,
            reviews: row.reviews,
            average_rating: row.average_rating,
            created_at: row.created_at,
        }
    }
}

impl From<LayoutRow> for RoomLayout {
    fn from(row: LayoutRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            furniture: row.furniture,
        }
    }
}

impl From<QuestionRow> for QaQuestion {
    fn from(row: QuestionRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            question: row.question,
            category: row.category,
            is_answered: row.is_answered,
            ai_response: row.ai_response,
            created_at: row.created_at,
        }
    }
}
