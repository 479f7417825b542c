//! Listing aggregate: scalar fields plus the owned image set. Field updates
//! and image reconciliation share one transaction; the thumbnail is derived
//! on every read, never stored.

use std::collections::HashMap;

use axum::extract::{Multipart, Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::{Extension, Json};
use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::auth::{self, AuthUser};
use crate::db;
use crate::error::{ApiError, ApiResult};
use crate::images::{self, Upload, UploadManifest};
use crate::models::{
    Category, Condition, Listing, ListingChanges, ListingImage, NewListing, Status, User,
};
use crate::schema::{listing_images, listings, users};
use crate::AppState;

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;
const MAX_TITLE_CHARS: usize = 60;

#[derive(Debug, Serialize)]
pub struct ListingImageDto {
    pub id: Uuid,
    pub image_url: String,
    pub order: i32,
}

#[derive(Debug, Serialize)]
pub struct SellerDto {
    pub id: Uuid,
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct ListingSummary {
    pub id: Uuid,
    pub title: Option<String>,
    pub description: Option<String>,
    pub price_cents: Option<i64>,
    pub created_at: NaiveDateTime,
    pub status: String,
    pub category: Option<String>,
    pub thumbnail: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ListingDetail {
    pub id: Uuid,
    pub title: Option<String>,
    pub description: Option<String>,
    pub price_cents: Option<i64>,
    pub category: Option<String>,
    pub condition: Option<String>,
    pub condition_display: Option<&'static str>,
    pub status: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub images: Vec<ListingImageDto>,
    pub thumbnail: Option<String>,
    pub seller: SellerDto,
    pub is_owner: bool,
}

/// Scalar fields and upload manifest extracted from one multipart body.
#[derive(Default)]
struct ListingForm {
    title: Option<String>,
    description: Option<String>,
    price_cents: Option<i64>,
    category: Option<String>,
    condition: Option<String>,
    status: Option<String>,
    image_updates: Option<String>,
    uploads: UploadManifest,
}

async fn read_listing_form(mut multipart: Multipart) -> ApiResult<ListingForm> {
    let mut form = ListingForm::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("invalid multipart body: {e}")))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        if let Some(file_name) = field.file_name() {
            let extension = file_name
                .rsplit_once('.')
                .map(|(_, ext)| ext.to_ascii_lowercase())
                .unwrap_or_else(|| "jpg".to_string());
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(format!("failed to read upload {name}: {e}")))?;
            if bytes.is_empty() {
                return Err(ApiError::validation([name]));
            }
            form.uploads.insert(
                name,
                Upload {
                    bytes: bytes.to_vec(),
                    extension,
                },
            );
            continue;
        }
        let value = field
            .text()
            .await
            .map_err(|e| ApiError::BadRequest(format!("failed to read field {name}: {e}")))?;
        match name.as_str() {
            "title" => form.title = Some(value),
            "description" => form.description = Some(value),
            "price_cents" => {
                let parsed = value
                    .parse::<i64>()
                    .map_err(|_| ApiError::validation(["price_cents"]))?;
                form.price_cents = Some(parsed);
            }
            "category" => form.category = Some(value),
            "condition" => form.condition = Some(value),
            "status" => form.status = Some(value),
            "image_updates" => form.image_updates = Some(value),
            _ => {}
        }
    }
    Ok(form)
}

/// Form scalars after enum parsing and range checks.
#[derive(Debug, Default)]
struct ScalarFields {
    title: Option<String>,
    description: Option<String>,
    price_cents: Option<i64>,
    category: Option<Category>,
    condition: Option<Condition>,
    status: Option<Status>,
}

fn validate_scalars(form: &ListingForm) -> ApiResult<ScalarFields> {
    let mut bad: Vec<&str> = Vec::new();

    let category = match form.category.as_deref() {
        None => None,
        Some(value) => match Category::parse(value) {
            Some(parsed) => Some(parsed),
            None => {
                bad.push("category");
                None
            }
        },
    };
    let condition = match form.condition.as_deref() {
        None => None,
        Some(value) => match Condition::parse(value) {
            Some(parsed) => Some(parsed),
            None => {
                bad.push("condition");
                None
            }
        },
    };
    let status = match form.status.as_deref() {
        None => None,
        Some(value) => match Status::parse(value) {
            Some(parsed) => Some(parsed),
            None => {
                bad.push("status");
                None
            }
        },
    };
    if form.price_cents.map_or(false, |cents| cents < 0) {
        bad.push("price_cents");
    }
    if form
        .title
        .as_deref()
        .map_or(false, |title| title.chars().count() > MAX_TITLE_CHARS)
    {
        bad.push("title");
    }

    if !bad.is_empty() {
        return Err(ApiError::validation(bad));
    }
    Ok(ScalarFields {
        title: form.title.clone(),
        description: form.description.clone(),
        price_cents: form.price_cents,
        category,
        condition,
        status,
    })
}

/// The listing as it would look after applying the request on top of the
/// stored row; publish validation runs against this view.
#[derive(Debug, PartialEq, Eq)]
struct EffectiveListing<'a> {
    title: Option<&'a str>,
    price_cents: Option<i64>,
    category: Option<&'a str>,
    condition: Option<&'a str>,
}

fn effective_fields<'a>(existing: Option<&'a Listing>, form: &'a ScalarFields) -> EffectiveListing<'a> {
    EffectiveListing {
        title: form
            .title
            .as_deref()
            .or_else(|| existing.and_then(|listing| listing.title.as_deref())),
        price_cents: form
            .price_cents
            .or_else(|| existing.and_then(|listing| listing.price_cents)),
        category: form
            .category
            .map(Category::as_str)
            .or_else(|| existing.and_then(|listing| listing.category.as_deref())),
        condition: form
            .condition
            .map(Condition::as_str)
            .or_else(|| existing.and_then(|listing| listing.condition.as_deref())),
    }
}

fn validate_for_publish(effective: &EffectiveListing) -> ApiResult<()> {
    let mut missing: Vec<&str> = Vec::new();
    if effective.title.map_or(true, |title| title.trim().is_empty()) {
        missing.push("title");
    }
    if effective.price_cents.is_none() {
        missing.push("price_cents");
    }
    if effective.category.is_none() {
        missing.push("category");
    }
    if effective.condition.is_none() {
        missing.push("condition");
    }
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ApiError::validation(missing))
    }
}

/// Lowest-position image wins; recomputed on every read.
pub fn thumbnail_url(images: &[ListingImage]) -> Option<&str> {
    images
        .iter()
        .min_by_key(|image| image.position)
        .map(|image| image.image_url.as_str())
}

pub(crate) fn thumbnails_for(
    conn: &mut PgConnection,
    ids: &[Uuid],
) -> Result<HashMap<Uuid, String>, diesel::result::Error> {
    let rows: Vec<ListingImage> = listing_images::table
        .filter(listing_images::listing_id.eq_any(ids))
        .order(listing_images::position.asc())
        .load(conn)?;
    let mut map = HashMap::new();
    for row in rows {
        map.entry(row.listing_id).or_insert(row.image_url);
    }
    Ok(map)
}

fn summarize(listing: Listing, thumbnail: Option<String>) -> ListingSummary {
    ListingSummary {
        id: listing.id,
        title: listing.title,
        description: listing.description,
        price_cents: listing.price_cents,
        created_at: listing.created_at,
        status: listing.status,
        category: listing.category,
        thumbnail,
    }
}

fn build_detail(conn: &mut PgConnection, listing_ref: Uuid, viewer: Uuid) -> ApiResult<ListingDetail> {
    let listing: Listing = listings::table.find(listing_ref).first(conn)?;
    let seller: User = users::table.find(listing.seller_id).first(conn)?;
    let image_rows: Vec<ListingImage> = listing_images::table
        .filter(listing_images::listing_id.eq(listing_ref))
        .order(listing_images::position.asc())
        .load(conn)?;

    let thumbnail = thumbnail_url(&image_rows).map(str::to_string);
    let condition_display = listing
        .condition
        .as_deref()
        .and_then(Condition::parse)
        .map(Condition::label);

    Ok(ListingDetail {
        id: listing.id,
        title: listing.title,
        description: listing.description,
        price_cents: listing.price_cents,
        category: listing.category,
        condition: listing.condition,
        condition_display,
        status: listing.status,
        created_at: listing.created_at,
        updated_at: listing.updated_at,
        images: image_rows
            .into_iter()
            .map(|image| ListingImageDto {
                id: image.id,
                image_url: image.image_url,
                order: image.position,
            })
            .collect(),
        thumbnail,
        is_owner: listing.seller_id == viewer,
        seller: SellerDto {
            id: seller.id,
            username: seller.username,
        },
    })
}

fn map_image_conflict(err: ApiError) -> ApiError {
    if err.is_unique_violation() {
        ApiError::BusinessRule("conflicting image order values".to_string())
    } else {
        err
    }
}

pub async fn create_listing(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<ListingDetail>)> {
    let form = read_listing_form(multipart).await?;
    let scalars = validate_scalars(&form)?;

    let status = scalars.status.unwrap_or(Status::Draft);
    if status == Status::Sold {
        return Err(ApiError::BusinessRule(
            "A listing cannot be created as sold".to_string(),
        ));
    }
    if status == Status::Published {
        validate_for_publish(&effective_fields(None, &scalars))?;
    }

    let directives = match form.image_updates.as_deref() {
        Some(raw) => images::parse_directives(raw)?,
        None => Vec::new(),
    };
    images::validate_uploads(&directives, &form.uploads)?;
    // No persisted images yet, so anything but a Create plans to nothing.
    let plan = images::plan(&[], &directives);
    let staged = images::stage_uploads(state.store.as_ref(), &plan.creates, &form.uploads)?;

    let mut conn = db::establish_connection(&state.config.database_url)?;
    let now = Utc::now().naive_utc();
    let listing_ref = Uuid::new_v4();
    let new_listing = NewListing {
        id: listing_ref,
        seller_id: user_id,
        title: scalars.title,
        description: scalars.description,
        price_cents: scalars.price_cents,
        category: scalars.category.map(|value| value.as_str().to_string()),
        condition: scalars.condition.map(|value| value.as_str().to_string()),
        status: status.as_str().to_string(),
        created_at: now,
        updated_at: now,
    };

    let result = conn.transaction::<_, ApiError, _>(|conn| {
        diesel::insert_into(listings::table)
            .values(&new_listing)
            .execute(conn)?;
        images::apply(conn, listing_ref, &plan, &staged, now)?;
        Ok(())
    });
    if let Err(err) = result {
        images::discard_staged(state.store.as_ref(), &staged);
        return Err(map_image_conflict(err));
    }

    let detail = build_detail(&mut conn, listing_ref, user_id)?;
    Ok((StatusCode::CREATED, Json(detail)))
}

pub async fn get_listing(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Path(listing_ref): Path<Uuid>,
) -> ApiResult<Json<ListingDetail>> {
    let mut conn = db::establish_connection(&state.config.database_url)?;
    let listing: Listing = listings::table
        .find(listing_ref)
        .first(&mut conn)
        .optional()?
        .ok_or_else(|| ApiError::NotFound("listing not found".to_string()))?;
    if listing.status == Status::Draft.as_str() && listing.seller_id != user_id {
        return Err(ApiError::NotFound("listing not found".to_string()));
    }
    Ok(Json(build_detail(&mut conn, listing_ref, user_id)?))
}

pub async fn update_listing(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Path(listing_ref): Path<Uuid>,
    multipart: Multipart,
) -> ApiResult<Json<ListingDetail>> {
    let form = read_listing_form(multipart).await?;
    let scalars = validate_scalars(&form)?;

    let mut conn = db::establish_connection(&state.config.database_url)?;
    let listing: Listing = listings::table
        .find(listing_ref)
        .first(&mut conn)
        .optional()?
        .ok_or_else(|| ApiError::NotFound("listing not found".to_string()))?;
    if listing.seller_id != user_id {
        if listing.status == Status::Draft.as_str() {
            return Err(ApiError::NotFound("listing not found".to_string()));
        }
        return Err(ApiError::Forbidden(
            "Only the seller can modify a listing".to_string(),
        ));
    }
    if listing.status == Status::Sold.as_str() {
        return Err(ApiError::BusinessRule(
            "This listing has already been sold".to_string(),
        ));
    }
    if scalars.status == Some(Status::Sold) {
        return Err(ApiError::BusinessRule(
            "A listing cannot be marked sold directly".to_string(),
        ));
    }

    let effective_status = scalars
        .status
        .or_else(|| Status::parse(&listing.status))
        .unwrap_or(Status::Draft);
    if effective_status == Status::Published {
        validate_for_publish(&effective_fields(Some(&listing), &scalars))?;
    }

    let directives = match form.image_updates.as_deref() {
        Some(raw) => images::parse_directives(raw)?,
        None => Vec::new(),
    };
    images::validate_uploads(&directives, &form.uploads)?;
    let existing_images: Vec<ListingImage> = listing_images::table
        .filter(listing_images::listing_id.eq(listing_ref))
        .order(listing_images::position.asc())
        .load(&mut conn)?;
    let plan = images::plan(&existing_images, &directives);
    let staged = images::stage_uploads(state.store.as_ref(), &plan.creates, &form.uploads)?;

    let now = Utc::now().naive_utc();
    let changes = ListingChanges {
        title: scalars.title,
        description: scalars.description,
        price_cents: scalars.price_cents,
        category: scalars.category.map(|value| value.as_str().to_string()),
        condition: scalars.condition.map(|value| value.as_str().to_string()),
        status: scalars.status.map(|value| value.as_str().to_string()),
        updated_at: Some(now),
    };
    let deleted_urls: Vec<String> = plan
        .deletes
        .iter()
        .map(|spec| spec.image_url.clone())
        .collect();

    let result = conn.transaction::<_, ApiError, _>(|conn| {
        diesel::update(listings::table.find(listing_ref))
            .set(&changes)
            .execute(conn)?;
        images::apply(conn, listing_ref, &plan, &staged, now)?;
        Ok(())
    });
    match result {
        Ok(()) => images::release_blobs(state.store.as_ref(), &deleted_urls),
        Err(err) => {
            images::discard_staged(state.store.as_ref(), &staged);
            return Err(map_image_conflict(err));
        }
    }

    Ok(Json(build_detail(&mut conn, listing_ref, user_id)?))
}

pub async fn delete_listing(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Path(listing_ref): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let mut conn = db::establish_connection(&state.config.database_url)?;
    let listing: Listing = listings::table
        .find(listing_ref)
        .first(&mut conn)
        .optional()?
        .ok_or_else(|| ApiError::NotFound("listing not found".to_string()))?;
    if listing.seller_id != user_id {
        if listing.status == Status::Draft.as_str() {
            return Err(ApiError::NotFound("listing not found".to_string()));
        }
        return Err(ApiError::Forbidden(
            "Only the seller can delete a listing".to_string(),
        ));
    }
    if listing.status == Status::Sold.as_str() {
        return Err(ApiError::BusinessRule(
            "A sold listing cannot be deleted".to_string(),
        ));
    }

    let urls: Vec<String> = listing_images::table
        .filter(listing_images::listing_id.eq(listing_ref))
        .select(listing_images::image_url)
        .load(&mut conn)?;

    // Images and comments go with the row via cascade.
    conn.transaction::<_, ApiError, _>(|conn| {
        diesel::delete(listings::table.find(listing_ref)).execute(conn)?;
        Ok(())
    })?;
    images::release_blobs(state.store.as_ref(), &urls);

    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct HomepageQuery {
    pub q: Option<String>,
    pub category: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

pub async fn homepage(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<HomepageQuery>,
) -> ApiResult<Json<serde_json::Value>> {
    let viewer = auth::user_from_headers(&headers, &state.config.jwt_secret)?;
    let page = params.page.unwrap_or(1).max(1);
    let page_size = params
        .page_size
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);

    let mut conn = db::establish_connection(&state.config.database_url)?;
    let mut query = listings::table
        .filter(listings::status.eq(Status::Published.as_str()))
        .into_boxed();
    if let Some(user) = viewer {
        query = query.filter(listings::seller_id.ne(user));
    }
    if let Some(category) = params.category.as_deref() {
        if Category::parse(category).is_none() {
            return Err(ApiError::validation(["category"]));
        }
        query = query.filter(listings::category.eq(category.to_string()));
    }
    if let Some(needle) = params.q.as_deref() {
        let pattern = format!("%{needle}%");
        query = query.filter(
            listings::title
                .ilike(pattern.clone())
                .or(listings::description.ilike(pattern)),
        );
    }

    let rows: Vec<Listing> = query
        .order(listings::created_at.desc())
        .limit(page_size)
        .offset((page - 1) * page_size)
        .load(&mut conn)?;
    let ids: Vec<Uuid> = rows.iter().map(|listing| listing.id).collect();
    let mut thumbnails = thumbnails_for(&mut conn, &ids)?;

    let results: Vec<ListingSummary> = rows
        .into_iter()
        .map(|listing| {
            let thumbnail = thumbnails.remove(&listing.id);
            summarize(listing, thumbnail)
        })
        .collect();
    Ok(Json(json!({
        "page": page,
        "page_size": page_size,
        "results": results,
    })))
}

pub async fn my_listings(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Path(status_raw): Path<String>,
) -> ApiResult<Json<Vec<ListingSummary>>> {
    let status =
        Status::parse(&status_raw).ok_or_else(|| ApiError::validation(["status"]))?;

    let mut conn = db::establish_connection(&state.config.database_url)?;
    let rows: Vec<Listing> = listings::table
        .filter(listings::seller_id.eq(user_id))
        .filter(listings::status.eq(status.as_str()))
        .order(listings::created_at.desc())
        .load(&mut conn)?;
    let ids: Vec<Uuid> = rows.iter().map(|listing| listing.id).collect();
    let mut thumbnails = thumbnails_for(&mut conn, &ids)?;

    Ok(Json(
        rows.into_iter()
            .map(|listing| {
                let thumbnail = thumbnails.remove(&listing.id);
                summarize(listing, thumbnail)
            })
            .collect(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    fn at_epoch() -> NaiveDateTime {
        DateTime::from_timestamp(0, 0).expect("epoch").naive_utc()
    }

    fn image(position: i32, url: &str) -> ListingImage {
        ListingImage {
            id: Uuid::new_v4(),
            listing_id: Uuid::new_v4(),
            image_url: url.to_string(),
            position,
            uploaded_at: at_epoch(),
        }
    }

    fn draft_listing() -> Listing {
        Listing {
            id: Uuid::new_v4(),
            seller_id: Uuid::new_v4(),
            title: Some("Oak table".to_string()),
            description: None,
            price_cents: Some(12_000),
            category: Some("table".to_string()),
            condition: Some("good".to_string()),
            status: "draft".to_string(),
            created_at: at_epoch(),
            updated_at: at_epoch(),
        }
    }

    #[test]
    fn thumbnail_is_the_lowest_order_image() {
        let images = vec![image(3, "https://cdn/a.jpg"), image(1, "https://cdn/b.jpg")];
        assert_eq!(thumbnail_url(&images), Some("https://cdn/b.jpg"));
    }

    #[test]
    fn thumbnail_of_no_images_is_absent() {
        assert_eq!(thumbnail_url(&[]), None);
    }

    #[test]
    fn publish_requires_all_fields_and_names_the_missing() {
        let scalars = ScalarFields {
            title: Some("Chair".to_string()),
            category: Some(Category::Chair),
            ..Default::default()
        };
        let err = validate_for_publish(&effective_fields(None, &scalars)).unwrap_err();
        match err {
            ApiError::Validation { fields } => {
                assert_eq!(fields, vec!["price_cents", "condition"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn publish_rejects_blank_title() {
        let scalars = ScalarFields {
            title: Some("   ".to_string()),
            price_cents: Some(100),
            category: Some(Category::Sofa),
            condition: Some(Condition::Good),
            ..Default::default()
        };
        let err = validate_for_publish(&effective_fields(None, &scalars)).unwrap_err();
        match err {
            ApiError::Validation { fields } => assert_eq!(fields, vec!["title"]),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn publish_accepts_a_complete_listing() {
        let scalars = ScalarFields {
            title: Some("Sofa".to_string()),
            price_cents: Some(45_000),
            category: Some(Category::Sofa),
            condition: Some(Condition::LikeNew),
            ..Default::default()
        };
        assert!(validate_for_publish(&effective_fields(None, &scalars)).is_ok());
    }

    #[test]
    fn stored_fields_satisfy_publish_validation_on_update() {
        let listing = draft_listing();
        let scalars = ScalarFields::default();
        assert!(validate_for_publish(&effective_fields(Some(&listing), &scalars)).is_ok());
    }

    #[test]
    fn form_fields_override_stored_fields() {
        let listing = draft_listing();
        let scalars = ScalarFields {
            title: Some("Walnut table".to_string()),
            price_cents: Some(9_900),
            ..Default::default()
        };
        let effective = effective_fields(Some(&listing), &scalars);
        assert_eq!(effective.title, Some("Walnut table"));
        assert_eq!(effective.price_cents, Some(9_900));
        assert_eq!(effective.category, Some("table"));
    }

    #[test]
    fn negative_price_is_rejected() {
        let form = ListingForm {
            price_cents: Some(-1),
            ..Default::default()
        };
        let err = validate_scalars(&form).unwrap_err();
        match err {
            ApiError::Validation { fields } => assert_eq!(fields, vec!["price_cents"]),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn unknown_enum_values_are_rejected_together() {
        let form = ListingForm {
            category: Some("garage".to_string()),
            condition: Some("mint".to_string()),
            status: Some("archived".to_string()),
            ..Default::default()
        };
        let err = validate_scalars(&form).unwrap_err();
        match err {
            ApiError::Validation { fields } => {
                assert_eq!(fields, vec!["category", "condition", "status"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn overlong_title_is_rejected() {
        let form = ListingForm {
            title: Some("x".repeat(MAX_TITLE_CHARS + 1)),
            ..Default::default()
        };
        assert!(validate_scalars(&form).is_err());
    }

    #[test]
    fn valid_scalars_parse_to_enums() {
        let form = ListingForm {
            title: Some("Bookshelf".to_string()),
            price_cents: Some(0),
            category: Some("bookshelf".to_string()),
            condition: Some("fair".to_string()),
            status: Some("published".to_string()),
            ..Default::default()
        };
        let scalars = validate_scalars(&form).expect("valid");
        assert_eq!(scalars.category, Some(Category::Bookshelf));
        assert_eq!(scalars.condition, Some(Condition::Fair));
        assert_eq!(scalars.status, Some(Status::Published));
        assert_eq!(scalars.price_cents, Some(0));
    }
}
