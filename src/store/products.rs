use uuid::Uuid;

use crate::{
    db::DbPool,
    error::{StoreError, StoreResult},
    models::Product,
    store::Pagination,
};

pub const NAME_MAX_LEN: usize = 150;

#[derive(Debug, Clone)]
pub struct NewProduct {
    pub thumbnail: String,
    pub name: String,
    pub price: i64,
    pub description: String,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateProduct {
    pub thumbnail: Option<String>,
    pub name: Option<String>,
    pub price: Option<i64>,
    pub description: Option<String>,
}

/// Generate a unique reference path for a thumbnail asset. Only the path is
/// stored here; the bytes live in external storage.
pub fn thumbnail_path(file_name: &str) -> String {
    format!("thumbnails/{}-{}", Uuid::new_v4(), file_name)
}

fn validate_name(name: &str) -> StoreResult<()> {
    if name.is_empty() {
        return Err(StoreError::Validation("name must be set".to_string()));
    }
    if name.chars().count() > NAME_MAX_LEN {
        return Err(StoreError::Validation(format!(
            "name must be at most {NAME_MAX_LEN} characters"
        )));
    }
    Ok(())
}

pub async fn create_product(pool: &DbPool, new: NewProduct) -> StoreResult<Product> {
    validate_name(&new.name)?;

    let product: Product = sqlx::query_as(
        r#"
        INSERT INTO products (id, thumbnail, name, price, description)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&new.thumbnail)
    .bind(&new.name)
    .bind(new.price)
    .bind(&new.description)
    .fetch_one(pool)
    .await?;

    tracing::debug!(product_id = %product.id, "product created");
    Ok(product)
}

pub async fn get_product(pool: &DbPool, id: Uuid) -> StoreResult<Product> {
    sqlx::query_as("SELECT * FROM products WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(StoreError::NotFound)
}

pub async fn list_products(pool: &DbPool, pagination: Pagination) -> StoreResult<Vec<Product>> {
    let (_page, limit, offset) = pagination.normalize();
    let products = sqlx::query_as(
        "SELECT * FROM products ORDER BY created_at DESC LIMIT $1 OFFSET $2",
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;
    Ok(products)
}

pub async fn update_product(
    pool: &DbPool,
    id: Uuid,
    update: UpdateProduct,
) -> StoreResult<Product> {
    if let Some(name) = update.name.as_deref() {
        validate_name(name)?;
    }

    let product: Option<Product> = sqlx::query_as(
        r#"
        UPDATE products
        SET thumbnail = COALESCE($2, thumbnail),
            name = COALESCE($3, name),
            price = COALESCE($4, price),
            description = COALESCE($5, description)
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(update.thumbnail)
    .bind(update.name)
    .bind(update.price)
    .bind(update.description)
    .fetch_optional(pool)
    .await?;

    product.ok_or(StoreError::NotFound)
}

/// Delete a product. Reviews and cart items referencing it are removed by the
/// foreign-key cascades.
pub async fn delete_product(pool: &DbPool, id: Uuid) -> StoreResult<()> {
    let result = sqlx::query("DELETE FROM products WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(StoreError::NotFound);
    }

    tracing::debug!(product_id = %id, "product deleted");
    Ok(())
}

/// Mean rating over the product's reviews, 0 when it has none. Computed in a
/// single AVG query on every call.
pub async fn average_rating(pool: &DbPool, product_id: Uuid) -> StoreResult<f64> {
    let avg: f64 = sqlx::query_scalar(
        "SELECT COALESCE(AVG(rating), 0)::FLOAT8 FROM reviews WHERE product_id = $1",
    )
    .bind(product_id)
    .fetch_one(pool)
    .await?;
    Ok(avg)
}
