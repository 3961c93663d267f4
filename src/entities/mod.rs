pub mod category;
pub mod product;
pub mod review;
pub mod user;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
    Argon2,
};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseBackend, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Schema, Set,
};
use tracing::info;

use crate::entities::{
    category::Entity as Category, product::Entity as Product, review::Entity as Review,
    user::Entity as User,
};

const ACTIVE_REVIEW_INDEX: &str = "CREATE UNIQUE INDEX IF NOT EXISTS ux_reviews_active_author \
     ON reviews (user_id, product_id) WHERE is_active";

const PG_SEARCH_VECTOR: &str = "ALTER TABLE products ADD COLUMN IF NOT EXISTS search_vector tsvector \
     GENERATED ALWAYS AS (to_tsvector('english', coalesce(name, '') || ' ' || coalesce(description, ''))) STORED";

const PG_SEARCH_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS ix_products_search_vector ON products USING GIN (search_vector)";

/// Creates every table (parents first) plus the extra DDL the entities cannot
/// express: the active-review uniqueness index and, on Postgres, the
/// full-text search vector.
pub async fn setup_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    let backend = db.get_database_backend();

    create_table(db, User).await?;
    create_table(db, Category).await?;
    create_table(db, Product).await?;
    create_table(db, Review).await?;

    db.execute_unprepared(ACTIVE_REVIEW_INDEX).await?;

    if backend == DatabaseBackend::Postgres {
        db.execute_unprepared(PG_SEARCH_VECTOR).await?;
        db.execute_unprepared(PG_SEARCH_INDEX).await?;
    }

    info!(backend = ?backend, "Schema ready");
    Ok(())
}

async fn create_table<E>(db: &DatabaseConnection, entity: E) -> Result<(), DbErr>
where
    E: EntityTrait,
{
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(backend.build(&statement)).await?;
    Ok(())
}

/// Inserts an administrative account unless the email is already taken.
pub async fn seed_admin(db: &DatabaseConnection, email: &str, password: &str) -> Result<(), DbErr> {
    let existing = User::find()
        .filter(user::Column::Email.eq(email))
        .one(db)
        .await?;
    if existing.is_some() {
        return Ok(());
    }

    let password_hash =
        hash_password(password).map_err(|err| DbErr::Custom(format!("Failed to hash password: {err}")))?;

    let admin = user::ActiveModel {
        email: Set(email.to_owned()),
        password: Set(password_hash),
        role: Set(user::Role::Admin),
        is_active: Set(true),
        ..Default::default()
    };
    User::insert(admin).exec(db).await?;
    info!(email = %email, "Seeded admin account");
    Ok(())
}

pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    Ok(argon2.hash_password(password.as_bytes(), &salt)?.to_string())
}
