//! Reconciliation of a client-submitted image edit batch against a listing's
//! persisted image set. Directives are decided into tagged variants once at
//! the boundary, planned against the current rows, and applied inside the
//! caller's transaction: deletions first, then repositionings, then creates.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDateTime;
use diesel::prelude::*;
use log::{info, warn};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::models::{ListingImage, NewListingImage};
use crate::storage::ImageStore;

/// One uploaded file part, keyed in the manifest by its multipart field name.
pub struct Upload {
    pub bytes: Vec<u8>,
    pub extension: String,
}

pub type UploadManifest = HashMap<String, Upload>;

/// Wire form of one entry in the `image_updates` array.
#[derive(Debug, Deserialize)]
struct RawDirective {
    id: Option<Uuid>,
    order: Option<i32>,
    #[serde(default)]
    delete: bool,
    file: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageDirective {
    /// Reposition an existing image.
    Keep { id: Uuid, position: i32 },
    /// Remove an existing image and release its blob.
    Delete { id: Uuid },
    /// Add a new image from the upload part named by `file_key`.
    Create { position: i32, file_key: String },
}

pub fn parse_directives(raw_json: &str) -> ApiResult<Vec<ImageDirective>> {
    let raw: Vec<RawDirective> = serde_json::from_str(raw_json)
        .map_err(|e| ApiError::BadRequest(format!("invalid image_updates payload: {e}")))?;
    raw.into_iter().map(to_directive).collect()
}

fn to_directive(raw: RawDirective) -> ApiResult<ImageDirective> {
    match (raw.id, raw.delete) {
        // The delete flag wins over any order also present.
        (Some(id), true) => Ok(ImageDirective::Delete { id }),
        (Some(id), false) => {
            let position = raw.order.ok_or_else(|| ApiError::validation(["order"]))?;
            if position < 1 {
                return Err(ApiError::validation(["order"]));
            }
            Ok(ImageDirective::Keep { id, position })
        }
        (None, true) => Err(ApiError::BadRequest(
            "image directive with delete requires an id".to_string(),
        )),
        (None, false) => {
            let position = raw.order.ok_or_else(|| ApiError::validation(["order"]))?;
            if position < 1 {
                return Err(ApiError::validation(["order"]));
            }
            let file_key = raw.file.ok_or_else(|| ApiError::validation(["file"]))?;
            Ok(ImageDirective::Create { position, file_key })
        }
    }
}

/// Every Create directive must name a part of the upload manifest; checked
/// before any blob or row is touched.
pub fn validate_uploads(directives: &[ImageDirective], uploads: &UploadManifest) -> ApiResult<()> {
    let missing: Vec<String> = directives
        .iter()
        .filter_map(|directive| match directive {
            ImageDirective::Create { file_key, .. } if !uploads.contains_key(file_key) => {
                Some(file_key.clone())
            }
            _ => None,
        })
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ApiError::Validation { fields: missing })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteSpec {
    pub id: Uuid,
    pub image_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateSpec {
    pub position: i32,
    pub file_key: String,
}

/// Mutation set computed from the current rows and the directive batch.
/// Directives whose id does not belong to the listing are ignored; images the
/// batch never names are left untouched, so an empty batch is a no-op.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReconcilePlan {
    pub deletes: Vec<DeleteSpec>,
    pub repositions: Vec<(Uuid, i32)>,
    pub creates: Vec<CreateSpec>,
}

impl ReconcilePlan {
    pub fn is_empty(&self) -> bool {
        self.deletes.is_empty() && self.repositions.is_empty() && self.creates.is_empty()
    }
}

pub fn plan(existing: &[ListingImage], directives: &[ImageDirective]) -> ReconcilePlan {
    let by_id: HashMap<Uuid, &ListingImage> =
        existing.iter().map(|image| (image.id, image)).collect();

    let mut deleted_ids: HashSet<Uuid> = HashSet::new();
    let mut deletes = Vec::new();
    let mut repositions = Vec::new();
    let mut creates = Vec::new();

    for directive in directives {
        match directive {
            ImageDirective::Delete { id } => {
                if let Some(image) = by_id.get(id) {
                    if deleted_ids.insert(*id) {
                        deletes.push(DeleteSpec {
                            id: *id,
                            image_url: image.image_url.clone(),
                        });
                    }
                }
            }
            ImageDirective::Keep { id, position } => {
                if by_id.contains_key(id) {
                    repositions.push((*id, *position));
                }
            }
            ImageDirective::Create { position, file_key } => {
                creates.push(CreateSpec {
                    position: *position,
                    file_key: file_key.clone(),
                });
            }
        }
    }

    // Deletion takes precedence over repositioning of the same image.
    repositions.retain(|(id, _)| !deleted_ids.contains(id));

    ReconcilePlan {
        deletes,
        repositions,
        creates,
    }
}

#[derive(Debug, Clone)]
pub struct StagedCreate {
    pub position: i32,
    pub image_url: String,
}

/// Writes the new blobs to the store ahead of the database transaction. If a
/// put fails, already-staged blobs are deleted again before returning.
pub fn stage_uploads(
    store: &dyn ImageStore,
    creates: &[CreateSpec],
    uploads: &UploadManifest,
) -> ApiResult<Vec<StagedCreate>> {
    let mut staged = Vec::with_capacity(creates.len());
    for create in creates {
        let upload = uploads
            .get(&create.file_key)
            .ok_or_else(|| ApiError::Validation {
                fields: vec![create.file_key.clone()],
            })?;
        match store.put(&upload.bytes, &upload.extension) {
            Ok(image_url) => staged.push(StagedCreate {
                position: create.position,
                image_url,
            }),
            Err(err) => {
                discard_staged(store, &staged);
                return Err(err.into());
            }
        }
    }
    Ok(staged)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ReconcileSummary {
    pub deleted: usize,
    pub updated: usize,
    pub created: usize,
}

/// Applies the plan inside the caller's transaction. Row deletions run first
/// so repositionings and creates never collide with rows on their way out;
/// the (listing_id, position) uniqueness is deferred to commit, so the batch
/// is checked as a whole.
pub fn apply(
    conn: &mut PgConnection,
    listing: Uuid,
    plan: &ReconcilePlan,
    staged: &[StagedCreate],
    now: NaiveDateTime,
) -> Result<ReconcileSummary, diesel::result::Error> {
    use crate::schema::listing_images::dsl::{id, listing_id, listing_images, position};

    let delete_ids: Vec<Uuid> = plan.deletes.iter().map(|spec| spec.id).collect();
    let deleted = if delete_ids.is_empty() {
        0
    } else {
        diesel::delete(
            listing_images
                .filter(listing_id.eq(listing))
                .filter(id.eq_any(&delete_ids)),
        )
        .execute(conn)?
    };

    let mut updated = 0;
    for (image_id, new_position) in &plan.repositions {
        updated += diesel::update(
            listing_images
                .filter(listing_id.eq(listing))
                .filter(id.eq(*image_id)),
        )
        .set(position.eq(*new_position))
        .execute(conn)?;
    }

    let rows: Vec<NewListingImage> = staged
        .iter()
        .map(|create| NewListingImage {
            id: Uuid::new_v4(),
            listing_id: listing,
            image_url: create.image_url.clone(),
            position: create.position,
            uploaded_at: now,
        })
        .collect();
    let created = if rows.is_empty() {
        0
    } else {
        diesel::insert_into(listing_images)
            .values(&rows)
            .execute(conn)?
    };

    info!(
        "reconciled images for listing {}: deleted={} updated={} created={}",
        listing, deleted, updated, created
    );
    Ok(ReconcileSummary {
        deleted,
        updated,
        created,
    })
}

/// Releases blobs whose rows were deleted in a committed transaction. A
/// failure here leaks the blob, never the request: it is logged and skipped.
pub fn release_blobs(store: &dyn ImageStore, urls: &[String]) {
    for url in urls {
        match store.delete(url) {
            Ok(true) => {}
            Ok(false) => warn!("blob already absent for deleted image: {}", url),
            Err(err) => warn!("failed to delete blob {} (leak candidate): {}", url, err),
        }
    }
}

/// Rolls back staged blobs after the surrounding transaction failed. Blobs
/// that cannot be removed are orphans for the storage sweep.
pub fn discard_staged(store: &dyn ImageStore, staged: &[StagedCreate]) {
    for create in staged {
        if let Err(err) = store.delete(&create.image_url) {
            warn!(
                "orphaned blob {} after rollback: {}",
                create.image_url, err
            );
        }
    }
}
