use chrono::Utc;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::Deserialize;
use tracing::{info, warn};
use validator::Validate;

use crate::catalog::access::{Capability, Principal};
use crate::catalog::error::CatalogError;
use crate::catalog::filter::PredicateSet;
use crate::catalog::rating::{lock_active_product, lock_product, recompute_rating};
use crate::entities::product;
use crate::entities::review::{self, Entity as ReviewEntity};

fn default_grade() -> i32 {
    5
}

#[derive(Clone, Debug, Deserialize, Validate)]
pub struct ReviewPayload {
    #[validate(range(min = 1, message = "product_id must be positive"))]
    pub product_id: i32,
    pub comment: Option<String>,
    #[serde(default = "default_grade")]
    #[validate(range(min = 1, max = 5, message = "grade must be between 1 and 5"))]
    pub grade: i32,
}

pub async fn list_reviews(db: &DatabaseConnection) -> Result<Vec<review::Model>, CatalogError> {
    Ok(ReviewEntity::find()
        .filter(review::Column::IsActive.eq(true))
        .order_by_asc(review::Column::Id)
        .all(db)
        .await?)
}

pub async fn product_reviews(
    db: &DatabaseConnection,
    product_id: i32,
) -> Result<Vec<review::Model>, CatalogError> {
    let txn = db.begin().await?;
    PredicateSet::active()
        .select()
        .filter(product::Column::Id.eq(product_id))
        .one(&txn)
        .await?
        .ok_or_else(|| CatalogError::product_not_found(product_id))?;

    let reviews = ReviewEntity::find()
        .filter(review::Column::ProductId.eq(product_id))
        .filter(review::Column::IsActive.eq(true))
        .order_by_asc(review::Column::Id)
        .all(&txn)
        .await?;
    txn.commit().await?;
    Ok(reviews)
}

/// Inserts a review and recomputes the product rating in the same
/// transaction.
///
/// The product row is locked before the duplicate check, so two requests from
/// one author cannot both pass it, and two authors cannot overwrite each
/// other's recomputation. Any early return drops the transaction, which rolls
/// it back.
pub async fn create_review(
    db: &DatabaseConnection,
    caller: &Principal,
    payload: ReviewPayload,
) -> Result<review::Model, CatalogError> {
    payload.validate()?;

    let txn = db.begin().await?;
    let product = lock_active_product(&txn, payload.product_id).await?;
    caller.require(Capability::AuthorReview)?;

    let duplicate = ReviewEntity::find()
        .filter(review::Column::ProductId.eq(product.id))
        .filter(review::Column::UserId.eq(caller.user_id))
        .filter(review::Column::IsActive.eq(true))
        .one(&txn)
        .await?;
    if duplicate.is_some() {
        warn!(product_id = product.id, user_id = caller.user_id, "Rejected duplicate review");
        return Err(CatalogError::DuplicateReview(
            "You have already made a review about this product".to_string(),
        ));
    }

    let created = review::ActiveModel {
        user_id: Set(caller.user_id),
        product_id: Set(product.id),
        comment: Set(payload.comment),
        comment_date: Set(Utc::now()),
        grade: Set(payload.grade),
        is_active: Set(true),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let rating = recompute_rating(&txn, product.id).await?;
    txn.commit().await?;

    info!(review_id = created.id, product_id = product.id, rating, "Created review");
    Ok(created)
}

/// Soft-deletes a review and recomputes the product rating in the same
/// transaction.
pub async fn delete_review(
    db: &DatabaseConnection,
    caller: &Principal,
    review_id: i32,
) -> Result<(), CatalogError> {
    // A review never moves between products, so its product can be read
    // before the transaction; the lock has to be its first statement.
    let existing = ReviewEntity::find_by_id(review_id)
        .filter(review::Column::IsActive.eq(true))
        .one(db)
        .await?
        .ok_or_else(|| CatalogError::review_not_found(review_id))?;
    caller.require(Capability::ModerateReviews)?;

    // The product itself may already be soft-deleted; its rating is still kept
    // in step with its reviews.
    let txn = db.begin().await?;
    lock_product(&txn, existing.product_id).await?;

    let flipped = ReviewEntity::update_many()
        .col_expr(review::Column::IsActive, Expr::value(false))
        .filter(review::Column::Id.eq(review_id))
        .filter(review::Column::IsActive.eq(true))
        .exec(&txn)
        .await?;
    if flipped.rows_affected == 0 {
        return Err(CatalogError::review_not_found(review_id));
    }

    let rating = recompute_rating(&txn, existing.product_id).await?;
    txn.commit().await?;

    info!(review_id, product_id = existing.product_id, rating, "Soft-deleted review");
    Ok(())
}
