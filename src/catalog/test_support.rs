use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::catalog::access::Principal;
use crate::entities::{category, product, setup_schema, user};

pub(crate) struct SeededCatalog {
    pub seller: Principal,
    pub category_id: i32,
    pub product_id: i32,
}

pub(crate) async fn memory_db() -> DatabaseConnection {
    let db = crate::connect("sqlite::memory:").await.unwrap();
    setup_schema(&db).await.unwrap();
    db
}

/// On-disk SQLite file behind a multi-connection pool.
pub(crate) struct TempStore {
    path: PathBuf,
}

impl TempStore {
    pub fn remove(self) {
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{suffix}", self.path.display()));
        }
    }
}

/// Pooled store for tests that need real connection concurrency, which
/// `memory_db` cannot give.
pub(crate) async fn file_db(name: &str) -> (DatabaseConnection, TempStore) {
    let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_nanos();
    let path = std::env::temp_dir().join(format!("{name}-{}-{nanos}.sqlite", std::process::id()));
    let db = crate::connect(&format!("sqlite://{}?mode=rwc", path.display()))
        .await
        .unwrap();
    setup_schema(&db).await.unwrap();
    (db, TempStore { path })
}

pub(crate) async fn seed_user(db: &DatabaseConnection, email: &str, role: user::Role) -> Principal {
    let created = user::ActiveModel {
        email: Set(email.to_owned()),
        password: Set("not-a-real-hash".to_owned()),
        role: Set(role),
        is_active: Set(true),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap();
    Principal::new(created.id, role)
}

pub(crate) async fn seed_category(db: &DatabaseConnection, name: &str) -> i32 {
    category::ActiveModel {
        name: Set(name.to_owned()),
        parent_id: Set(None),
        is_active: Set(true),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
    .id
}

pub(crate) async fn seed_product(
    db: &DatabaseConnection,
    seller: &Principal,
    category_id: i32,
    name: &str,
    price: f64,
    stock: i32,
) -> i32 {
    product::ActiveModel {
        name: Set(name.to_owned()),
        description: Set(None),
        price: Set(price),
        image_url: Set(None),
        stock: Set(stock),
        category_id: Set(category_id),
        seller_id: Set(seller.user_id),
        is_active: Set(true),
        rating: Set(0.0),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
    .id
}

pub(crate) async fn seed_catalog(db: &DatabaseConnection) -> SeededCatalog {
    let seller = seed_user(db, "seller-seed@shop.test", user::Role::Seller).await;
    let category_id = seed_category(db, "Kitchen").await;
    let product_id = seed_product(db, &seller, category_id, "Kettle", 30.0, 5).await;
    SeededCatalog {
        seller,
        category_id,
        product_id,
    }
}
