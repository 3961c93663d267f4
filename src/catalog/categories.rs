use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::Deserialize;
use std::collections::HashSet;
use tracing::{info, warn};
use validator::Validate;

use crate::catalog::access::{Capability, Principal};
use crate::catalog::error::CatalogError;
use crate::entities::category::{self, Entity as CategoryEntity};

#[derive(Clone, Debug, Deserialize, Validate)]
pub struct CategoryPayload {
    #[validate(length(min = 3, max = 50, message = "name must be 3-50 characters"))]
    pub name: String,
    pub parent_id: Option<i32>,
}

pub(crate) async fn find_active<C>(conn: &C, id: i32) -> Result<category::Model, CatalogError>
where
    C: ConnectionTrait,
{
    CategoryEntity::find_by_id(id)
        .filter(category::Column::IsActive.eq(true))
        .one(conn)
        .await?
        .ok_or_else(|| CatalogError::category_not_found(id))
}

async fn check_parent<C>(conn: &C, parent_id: Option<i32>) -> Result<(), CatalogError>
where
    C: ConnectionTrait,
{
    if let Some(parent_id) = parent_id {
        find_active(conn, parent_id).await.map_err(|err| match err {
            CatalogError::CategoryNotFound(_) => {
                warn!(parent_id, "Rejected inactive or missing parent category");
                CatalogError::CategoryNotFound(format!("Parent category {parent_id} not found"))
            }
            other => other,
        })?;
    }
    Ok(())
}

/// Walks up from `parent_id`; reaching `id` means the update would close a
/// loop in the tree.
async fn check_cycle<C>(conn: &C, id: i32, parent_id: Option<i32>) -> Result<(), CatalogError>
where
    C: ConnectionTrait,
{
    let mut seen = HashSet::new();
    let mut next = parent_id;
    while let Some(current) = next {
        if current == id {
            warn!(category_id = id, parent_id = ?parent_id, "Rejected cyclic category parent");
            return Err(CatalogError::InvalidInput(format!(
                "Category {id} cannot be nested under its own descendant"
            )));
        }
        if !seen.insert(current) {
            break;
        }
        next = CategoryEntity::find_by_id(current)
            .one(conn)
            .await?
            .and_then(|category| category.parent_id);
    }
    Ok(())
}

pub async fn list_categories(db: &DatabaseConnection) -> Result<Vec<category::Model>, CatalogError> {
    Ok(CategoryEntity::find()
        .filter(category::Column::IsActive.eq(true))
        .order_by_asc(category::Column::Id)
        .all(db)
        .await?)
}

pub async fn get_category(db: &DatabaseConnection, id: i32) -> Result<category::Model, CatalogError> {
    find_active(db, id).await
}

pub async fn create_category(
    db: &DatabaseConnection,
    caller: &Principal,
    payload: CategoryPayload,
) -> Result<category::Model, CatalogError> {
    payload.validate()?;
    caller.require(Capability::ManageCategories)?;

    let txn = db.begin().await?;
    check_parent(&txn, payload.parent_id).await?;

    let created = category::ActiveModel {
        name: Set(payload.name),
        parent_id: Set(payload.parent_id),
        is_active: Set(true),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    info!(category_id = created.id, "Created category");
    Ok(created)
}

pub async fn update_category(
    db: &DatabaseConnection,
    caller: &Principal,
    id: i32,
    payload: CategoryPayload,
) -> Result<category::Model, CatalogError> {
    payload.validate()?;
    caller.require(Capability::ManageCategories)?;
    if payload.parent_id == Some(id) {
        return Err(CatalogError::InvalidInput(
            "A category cannot be its own parent".to_string(),
        ));
    }

    let txn = db.begin().await?;
    let existing = find_active(&txn, id).await?;
    check_parent(&txn, payload.parent_id).await?;
    check_cycle(&txn, id, payload.parent_id).await?;

    let mut category: category::ActiveModel = existing.into();
    category.name = Set(payload.name);
    category.parent_id = Set(payload.parent_id);
    let updated = category.update(&txn).await?;
    txn.commit().await?;

    info!(category_id = id, "Updated category");
    Ok(updated)
}

pub async fn delete_category(
    db: &DatabaseConnection,
    caller: &Principal,
    id: i32,
) -> Result<(), CatalogError> {
    caller.require(Capability::ManageCategories)?;

    let txn = db.begin().await?;
    let existing = find_active(&txn, id).await?;
    let mut category: category::ActiveModel = existing.into();
    category.is_active = Set(false);
    category.update(&txn).await?;
    txn.commit().await?;

    info!(category_id = id, "Soft-deleted category");
    Ok(())
}
