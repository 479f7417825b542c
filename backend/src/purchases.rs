//! Purchase ledger: flips a listing to sold exactly once. The unique
//! constraint on purchases.listing_id is the actual race enforcement; the
//! status check is a fast path.

use axum::extract::{Path, State};
use axum::{Extension, Json};
use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use serde_json::json;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::db;
use crate::error::{ApiError, ApiResult};
use crate::listings::thumbnails_for;
use crate::models::{Listing, NewPurchase, Purchase, Status};
use crate::schema::{listings, purchases};
use crate::AppState;

/// Pure business-rule gate; returns the price snapshot to record.
fn ensure_purchasable(listing: &Listing, buyer: Uuid) -> ApiResult<i64> {
    if listing.seller_id == buyer {
        return Err(ApiError::BusinessRule(
            "You cannot buy your own listing".to_string(),
        ));
    }
    if listing.status == Status::Sold.as_str() {
        return Err(ApiError::BusinessRule(
            "This item has already been sold".to_string(),
        ));
    }
    if listing.status == Status::Draft.as_str() {
        return Err(ApiError::NotFound("listing not found".to_string()));
    }
    listing.price_cents.ok_or_else(|| {
        ApiError::BusinessRule("This listing is not available for purchase".to_string())
    })
}

pub async fn purchase_listing(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Path(listing_ref): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    let mut conn = db::establish_connection(&state.config.database_url)?;
    let now = Utc::now().naive_utc();

    let result = conn.transaction::<_, ApiError, _>(|conn| {
        let listing: Listing = listings::table
            .find(listing_ref)
            .first(conn)
            .optional()?
            .ok_or_else(|| ApiError::NotFound("listing not found".to_string()))?;
        let price = ensure_purchasable(&listing, user_id)?;

        let purchase = NewPurchase {
            id: Uuid::new_v4(),
            listing_id: listing_ref,
            buyer_id: user_id,
            price_cents_at_purchase: price,
            purchased_at: now,
        };
        diesel::insert_into(purchases::table)
            .values(&purchase)
            .execute(conn)?;
        diesel::update(listings::table.find(listing_ref))
            .set((
                listings::status.eq(Status::Sold.as_str()),
                listings::updated_at.eq(now),
            ))
            .execute(conn)?;
        Ok(())
    });

    match result {
        Ok(()) => {
            log::info!("listing {} purchased by {}", listing_ref, user_id);
            Ok(Json(json!({
                "message": "Purchase completed",
                "listing_id": listing_ref,
            })))
        }
        // Two buyers raced past the status check; the loser lands here.
        Err(err) if err.is_unique_violation() => Err(ApiError::BusinessRule(
            "This item has already been sold".to_string(),
        )),
        Err(err) => Err(err),
    }
}

#[derive(Debug, Serialize)]
pub struct PurchaseItem {
    pub id: Uuid,
    pub listing_id: Uuid,
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price_cents_at_purchase: i64,
    pub purchased_at: NaiveDateTime,
    pub thumbnail: Option<String>,
}

pub async fn list_purchases(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
) -> ApiResult<Json<Vec<PurchaseItem>>> {
    let mut conn = db::establish_connection(&state.config.database_url)?;
    let rows: Vec<(Purchase, Listing)> = purchases::table
        .inner_join(listings::table)
        .filter(purchases::buyer_id.eq(user_id))
        .order(purchases::purchased_at.desc())
        .load(&mut conn)?;

    let ids: Vec<Uuid> = rows.iter().map(|(_, listing)| listing.id).collect();
    let mut thumbnails = thumbnails_for(&mut conn, &ids)?;

    Ok(Json(
        rows.into_iter()
            .map(|(purchase, listing)| PurchaseItem {
                id: purchase.id,
                listing_id: listing.id,
                title: listing.title,
                description: listing.description,
                category: listing.category,
                price_cents_at_purchase: purchase.price_cents_at_purchase,
                purchased_at: purchase.purchased_at,
                thumbnail: thumbnails.remove(&listing.id),
            })
            .collect(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    fn listing(status: Status, seller: Uuid, price_cents: Option<i64>) -> Listing {
        let at_epoch = DateTime::from_timestamp(0, 0).expect("epoch").naive_utc();
        Listing {
            id: Uuid::new_v4(),
            seller_id: seller,
            title: Some("Dresser".to_string()),
            description: None,
            price_cents,
            category: Some("dresser".to_string()),
            condition: Some("good".to_string()),
            status: status.as_str().to_string(),
            created_at: at_epoch,
            updated_at: at_epoch,
        }
    }

    #[test]
    fn published_listing_is_purchasable_at_its_price() {
        let seller = Uuid::new_v4();
        let buyer = Uuid::new_v4();
        let listing = listing(Status::Published, seller, Some(25_000));
        assert_eq!(ensure_purchasable(&listing, buyer).expect("ok"), 25_000);
    }

    #[test]
    fn own_listing_is_rejected_regardless_of_status() {
        let seller = Uuid::new_v4();
        for status in [Status::Draft, Status::Published, Status::InProgress, Status::Sold] {
            let listing = listing(status, seller, Some(100));
            let err = ensure_purchasable(&listing, seller).unwrap_err();
            match err {
                ApiError::BusinessRule(message) => {
                    assert_eq!(message, "You cannot buy your own listing");
                }
                other => panic!("unexpected error: {other:?}"),
            }
        }
    }

    #[test]
    fn sold_listing_is_a_business_rule_rejection() {
        let listing = listing(Status::Sold, Uuid::new_v4(), Some(100));
        let err = ensure_purchasable(&listing, Uuid::new_v4()).unwrap_err();
        match err {
            ApiError::BusinessRule(message) => {
                assert_eq!(message, "This item has already been sold");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn draft_listing_is_invisible_to_other_buyers() {
        let listing = listing(Status::Draft, Uuid::new_v4(), Some(100));
        assert!(matches!(
            ensure_purchasable(&listing, Uuid::new_v4()).unwrap_err(),
            ApiError::NotFound(_)
        ));
    }

    #[test]
    fn priceless_listing_cannot_be_purchased() {
        let listing = listing(Status::InProgress, Uuid::new_v4(), None);
        assert!(matches!(
            ensure_purchasable(&listing, Uuid::new_v4()).unwrap_err(),
            ApiError::BusinessRule(_)
        ));
    }
}
