use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::db;
use crate::error::{ApiError, ApiResult};
use crate::models::{Comment, Listing, NewComment, Status, User};
use crate::schema::{comments, listings, users};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct CommentDto {
    pub id: Uuid,
    pub user: String,
    pub listing_id: Uuid,
    pub content: String,
    pub created_at: NaiveDateTime,
}

fn visible_listing(
    conn: &mut PgConnection,
    listing_ref: Uuid,
    viewer: Uuid,
) -> ApiResult<Listing> {
    let listing: Listing = listings::table
        .find(listing_ref)
        .first(conn)
        .optional()?
        .ok_or_else(|| ApiError::NotFound("listing not found".to_string()))?;
    if listing.status == Status::Draft.as_str() && listing.seller_id != viewer {
        return Err(ApiError::NotFound("listing not found".to_string()));
    }
    Ok(listing)
}

pub async fn list_comments(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Path(listing_ref): Path<Uuid>,
) -> ApiResult<Json<Vec<CommentDto>>> {
    let mut conn = db::establish_connection(&state.config.database_url)?;
    visible_listing(&mut conn, listing_ref, user_id)?;

    let rows: Vec<(Comment, User)> = comments::table
        .inner_join(users::table)
        .filter(comments::listing_id.eq(listing_ref))
        .order(comments::created_at.desc())
        .load(&mut conn)?;
    Ok(Json(
        rows.into_iter()
            .map(|(comment, author)| CommentDto {
                id: comment.id,
                user: author.username,
                listing_id: comment.listing_id,
                content: comment.content,
                created_at: comment.created_at,
            })
            .collect(),
    ))
}

pub async fn create_comment(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Path(listing_ref): Path<Uuid>,
    Json(request): Json<CreateCommentRequest>,
) -> ApiResult<(StatusCode, Json<CommentDto>)> {
    if request.content.trim().is_empty() {
        return Err(ApiError::validation(["content"]));
    }

    let mut conn = db::establish_connection(&state.config.database_url)?;
    visible_listing(&mut conn, listing_ref, user_id)?;
    let author: User = users::table.find(user_id).first(&mut conn)?;

    let comment = NewComment {
        id: Uuid::new_v4(),
        listing_id: listing_ref,
        user_id,
        content: request.content,
        created_at: Utc::now().naive_utc(),
    };
    diesel::insert_into(comments::table)
        .values(&comment)
        .execute(&mut conn)?;

    Ok((
        StatusCode::CREATED,
        Json(CommentDto {
            id: comment.id,
            user: author.username,
            listing_id: comment.listing_id,
            content: comment.content,
            created_at: comment.created_at,
        }),
    ))
}
