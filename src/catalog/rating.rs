use sea_orm::{
    sea_query::{Alias, Expr, Func, SimpleExpr},
    ColumnTrait, ConnectionTrait, DatabaseTransaction, DbBackend, EntityTrait, QueryFilter,
    QuerySelect,
};
use tracing::info;

use crate::catalog::error::CatalogError;
use crate::catalog::filter::PredicateSet;
use crate::entities::{product, review};

/// Rating of a product without active reviews.
pub const DEFAULT_RATING: f64 = 0.0;

/// Loads a product and takes a row lock on it for the rest of the
/// transaction.
///
/// SQLite has no row locks. A no-op write on the row takes the database
/// writer lock instead; it has to be the first statement of the transaction,
/// or a concurrent commit makes the later upgrade fail with `SQLITE_BUSY`.
pub(crate) async fn lock_product(
    txn: &DatabaseTransaction,
    product_id: i32,
) -> Result<Option<product::Model>, CatalogError> {
    let mut select = product::Entity::find_by_id(product_id);
    if txn.get_database_backend() == DbBackend::Sqlite {
        product::Entity::update_many()
            .col_expr(product::Column::Rating, Expr::col(product::Column::Rating).into())
            .filter(product::Column::Id.eq(product_id))
            .exec(txn)
            .await?;
    } else {
        select = select.lock_exclusive();
    }
    Ok(select.one(txn).await?)
}

/// Locks a product that every read path can see: active, in an active
/// category.
pub(crate) async fn lock_active_product(
    txn: &DatabaseTransaction,
    product_id: i32,
) -> Result<product::Model, CatalogError> {
    if lock_product(txn, product_id).await?.is_none() {
        return Err(CatalogError::product_not_found(product_id));
    }
    PredicateSet::active()
        .select()
        .filter(product::Column::Id.eq(product_id))
        .one(txn)
        .await?
        .ok_or_else(|| CatalogError::product_not_found(product_id))
}

/// Mean grade of the active reviews of a product, or [`DEFAULT_RATING`].
pub async fn mean_active_grade<C>(conn: &C, product_id: i32) -> Result<f64, CatalogError>
where
    C: ConnectionTrait,
{
    let mean = SimpleExpr::from(Func::cast_as(
        Func::avg(Expr::col((review::Entity, review::Column::Grade))),
        Alias::new("double precision"),
    ));

    let mean: Option<f64> = review::Entity::find()
        .select_only()
        .column_as(mean, "mean_grade")
        .filter(review::Column::ProductId.eq(product_id))
        .filter(review::Column::IsActive.eq(true))
        .into_tuple::<Option<f64>>()
        .one(conn)
        .await?
        .flatten();

    Ok(mean.unwrap_or(DEFAULT_RATING))
}

/// Recomputes `products.rating` from scratch inside the caller's transaction.
///
/// Must run after the triggering review mutation and before commit; the
/// caller is expected to already hold the product row lock.
pub(crate) async fn recompute_rating(
    txn: &DatabaseTransaction,
    product_id: i32,
) -> Result<f64, CatalogError> {
    let rating = mean_active_grade(txn, product_id).await?;

    product::Entity::update_many()
        .col_expr(product::Column::Rating, Expr::value(rating))
        .filter(product::Column::Id.eq(product_id))
        .exec(txn)
        .await?;

    info!(product_id, rating, "Recomputed product rating");
    Ok(rating)
}
