use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction, EntityTrait, Order, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::Deserialize;
use tracing::{debug, info};
use validator::Validate;

use crate::catalog::access::{Capability, Principal};
use crate::catalog::categories::find_active as find_active_category;
use crate::catalog::error::CatalogError;
use crate::catalog::filter::{PredicateSet, ProductFilter};
use crate::catalog::pagination::{Page, PageRequest};
use crate::catalog::rating::DEFAULT_RATING;
use crate::catalog::search::SearchTerm;
use crate::entities::product::{self, Entity as ProductEntity};

#[derive(Clone, Debug, Deserialize, Validate)]
pub struct ProductPayload {
    #[validate(length(min = 3, max = 100, message = "name must be 3-100 characters"))]
    pub name: String,
    #[validate(length(max = 500, message = "description must be at most 500 characters"))]
    pub description: Option<String>,
    #[validate(range(exclusive_min = 0.0, message = "price must be greater than 0"))]
    pub price: f64,
    #[validate(length(max = 200, message = "image_url must be at most 200 characters"))]
    pub image_url: Option<String>,
    #[validate(range(min = 0, message = "stock cannot be negative"))]
    pub stock: i32,
    pub category_id: i32,
}

/// Everything a listing request can carry.
#[derive(Clone, Debug, Default)]
pub struct ProductQuery {
    pub filter: ProductFilter,
    pub search: Option<String>,
    pub page: PageRequest,
}

/// Filtered, optionally ranked, paginated product listing.
///
/// The count and the page are built from one [`PredicateSet`] and read in one
/// transaction, so `total` always describes the universe the page came from.
pub async fn list_products(
    db: &DatabaseConnection,
    query: &ProductQuery,
) -> Result<Page<product::Model>, CatalogError> {
    let mut predicates = query.filter.predicates()?;
    let (offset, limit) = query.page.window()?;

    let ranked = SearchTerm::parse(query.search.as_deref())
        .map(|term| term.rank(db.get_database_backend()));
    if let Some(ranked) = &ranked {
        predicates.push(ranked.predicate.clone());
    }

    let txn = db.begin().await?;
    let total = predicates.select().count(&txn).await?;

    let mut select = predicates.select();
    if let Some(ranked) = ranked {
        select = select.order_by(ranked.score, Order::Desc);
    }
    let items = select
        .order_by_asc(product::Column::Id)
        .offset(offset)
        .limit(limit)
        .all(&txn)
        .await?;
    txn.commit().await?;

    debug!(total, returned = items.len(), page = query.page.page, "Listed products");
    Ok(Page::new(items, total, &query.page))
}

pub async fn get_product(db: &DatabaseConnection, id: i32) -> Result<product::Model, CatalogError> {
    PredicateSet::active()
        .select()
        .filter(product::Column::Id.eq(id))
        .one(db)
        .await?
        .ok_or_else(|| CatalogError::product_not_found(id))
}

pub async fn products_by_category(
    db: &DatabaseConnection,
    category_id: i32,
) -> Result<Vec<product::Model>, CatalogError> {
    let txn = db.begin().await?;
    find_active_category(&txn, category_id).await?;

    let filter = ProductFilter {
        category_id: Some(category_id),
        ..Default::default()
    };
    let products = filter
        .predicates()?
        .select()
        .order_by_asc(product::Column::Id)
        .all(&txn)
        .await?;
    txn.commit().await?;
    Ok(products)
}

pub async fn create_product(
    db: &DatabaseConnection,
    caller: &Principal,
    payload: ProductPayload,
) -> Result<product::Model, CatalogError> {
    payload.validate()?;
    caller.require(Capability::SellProducts)?;

    let txn = db.begin().await?;
    find_active_category(&txn, payload.category_id).await?;

    let created = product::ActiveModel {
        name: Set(payload.name),
        description: Set(payload.description),
        price: Set(payload.price),
        image_url: Set(payload.image_url),
        stock: Set(payload.stock),
        category_id: Set(payload.category_id),
        seller_id: Set(caller.user_id),
        is_active: Set(true),
        rating: Set(DEFAULT_RATING),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    info!(product_id = created.id, seller_id = caller.user_id, "Created product");
    Ok(created)
}

async fn find_owned(
    txn: &DatabaseTransaction,
    caller: &Principal,
    id: i32,
) -> Result<product::Model, CatalogError> {
    caller.require(Capability::SellProducts)?;
    let existing = ProductEntity::find_by_id(id)
        .filter(product::Column::IsActive.eq(true))
        .one(txn)
        .await?
        .ok_or_else(|| CatalogError::product_not_found(id))?;
    caller.require_owner(existing.seller_id)?;
    Ok(existing)
}

/// Replaces the client-editable fields. `rating`, `seller_id` and `is_active`
/// are left untouched.
pub async fn update_product(
    db: &DatabaseConnection,
    caller: &Principal,
    id: i32,
    payload: ProductPayload,
) -> Result<product::Model, CatalogError> {
    payload.validate()?;

    let txn = db.begin().await?;
    let existing = find_owned(&txn, caller, id).await?;
    find_active_category(&txn, payload.category_id).await?;

    let mut product: product::ActiveModel = existing.into();
    product.name = Set(payload.name);
    product.description = Set(payload.description);
    product.price = Set(payload.price);
    product.image_url = Set(payload.image_url);
    product.stock = Set(payload.stock);
    product.category_id = Set(payload.category_id);
    let updated = product.update(&txn).await?;
    txn.commit().await?;

    info!(product_id = id, "Updated product");
    Ok(updated)
}

pub async fn delete_product(
    db: &DatabaseConnection,
    caller: &Principal,
    id: i32,
) -> Result<(), CatalogError> {
    let txn = db.begin().await?;
    let existing = find_owned(&txn, caller, id).await?;

    let mut product: product::ActiveModel = existing.into();
    product.is_active = Set(false);
    product.update(&txn).await?;
    txn.commit().await?;

    info!(product_id = id, "Soft-deleted product");
    Ok(())
}
