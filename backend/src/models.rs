use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schema::{comments, listing_images, listings, purchases, users};

#[derive(Debug, Clone, Queryable)]
#[diesel(table_name = users)]
pub struct User {
    pub id: Uuid,              // Uuid
    pub username: String,      // Varchar
    pub password_hash: String, // Text
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Queryable)]
#[diesel(table_name = listings)]
pub struct Listing {
    pub id: Uuid,
    pub seller_id: Uuid,
    pub title: Option<String>,
    pub description: Option<String>,
    pub price_cents: Option<i64>,
    pub category: Option<String>,
    pub condition: Option<String>,
    pub status: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = listings)]
pub struct NewListing {
    pub id: Uuid,
    pub seller_id: Uuid,
    pub title: Option<String>,
    pub description: Option<String>,
    pub price_cents: Option<i64>,
    pub category: Option<String>,
    pub condition: Option<String>,
    pub status: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Scalar field updates; `None` fields are left untouched.
#[derive(Debug, Default, AsChangeset)]
#[diesel(table_name = listings)]
pub struct ListingChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price_cents: Option<i64>,
    pub category: Option<String>,
    pub condition: Option<String>,
    pub status: Option<String>,
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Queryable)]
#[diesel(table_name = listing_images)]
pub struct ListingImage {
    pub id: Uuid,
    pub listing_id: Uuid,
    pub image_url: String,
    pub position: i32,
    pub uploaded_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = listing_images)]
pub struct NewListingImage {
    pub id: Uuid,
    pub listing_id: Uuid,
    pub image_url: String,
    pub position: i32,
    pub uploaded_at: NaiveDateTime,
}

#[derive(Debug, Clone, Queryable)]
#[diesel(table_name = comments)]
pub struct Comment {
    pub id: Uuid,
    pub listing_id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = comments)]
pub struct NewComment {
    pub id: Uuid,
    pub listing_id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Queryable)]
#[diesel(table_name = purchases)]
pub struct Purchase {
    pub id: Uuid,
    pub listing_id: Uuid,
    pub buyer_id: Uuid,
    pub price_cents_at_purchase: i64,
    pub purchased_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = purchases)]
pub struct NewPurchase {
    pub id: Uuid,
    pub listing_id: Uuid,
    pub buyer_id: Uuid,
    pub price_cents_at_purchase: i64,
    pub purchased_at: NaiveDateTime,
}

/// Listing lifecycle. Rows store the lowercase string form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Draft,
    Published,
    InProgress,
    Sold,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Draft => "draft",
            Status::Published => "published",
            Status::InProgress => "in_progress",
            Status::Sold => "sold",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "draft" => Some(Status::Draft),
            "published" => Some(Status::Published),
            "in_progress" => Some(Status::InProgress),
            "sold" => Some(Status::Sold),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Chair,
    Table,
    Sofa,
    Bed,
    Dresser,
    Bookshelf,
    Desk,
    Cabinet,
    Wardrobe,
    Other,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Chair => "chair",
            Category::Table => "table",
            Category::Sofa => "sofa",
            Category::Bed => "bed",
            Category::Dresser => "dresser",
            Category::Bookshelf => "bookshelf",
            Category::Desk => "desk",
            Category::Cabinet => "cabinet",
            Category::Wardrobe => "wardrobe",
            Category::Other => "other",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "chair" => Some(Category::Chair),
            "table" => Some(Category::Table),
            "sofa" => Some(Category::Sofa),
            "bed" => Some(Category::Bed),
            "dresser" => Some(Category::Dresser),
            "bookshelf" => Some(Category::Bookshelf),
            "desk" => Some(Category::Desk),
            "cabinet" => Some(Category::Cabinet),
            "wardrobe" => Some(Category::Wardrobe),
            "other" => Some(Category::Other),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    NewWithTags,
    NewWithoutTags,
    LikeNew,
    Good,
    Fair,
    Poor,
}

impl Condition {
    pub fn as_str(self) -> &'static str {
        match self {
            Condition::NewWithTags => "new_with_tags",
            Condition::NewWithoutTags => "new_without_tags",
            Condition::LikeNew => "like_new",
            Condition::Good => "good",
            Condition::Fair => "fair",
            Condition::Poor => "poor",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "new_with_tags" => Some(Condition::NewWithTags),
            "new_without_tags" => Some(Condition::NewWithoutTags),
            "like_new" => Some(Condition::LikeNew),
            "good" => Some(Condition::Good),
            "fair" => Some(Condition::Fair),
            "poor" => Some(Condition::Poor),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Condition::NewWithTags => "New with tags",
            Condition::NewWithoutTags => "New without tags",
            Condition::LikeNew => "Like new",
            Condition::Good => "Good",
            Condition::Fair => "Fair",
            Condition::Poor => "Poor",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips() {
        for status in [Status::Draft, Status::Published, Status::InProgress, Status::Sold] {
            assert_eq!(Status::parse(status.as_str()), Some(status));
        }
        assert_eq!(Status::parse("completed"), None);
    }

    #[test]
    fn category_round_trips() {
        assert_eq!(Category::parse("wardrobe"), Some(Category::Wardrobe));
        assert_eq!(Category::parse("WARDROBE"), None);
        assert_eq!(Category::Wardrobe.as_str(), "wardrobe");
    }

    #[test]
    fn condition_labels() {
        assert_eq!(Condition::parse("new_with_tags"), Some(Condition::NewWithTags));
        assert_eq!(Condition::NewWithTags.label(), "New with tags");
        assert_eq!(Condition::parse("mint"), None);
    }
}
