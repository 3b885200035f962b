use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::{
    db::DbPool,
    error::{StoreError, StoreResult, map_unique},
    models::{Product, ShoppingCart, ShoppingCartItem},
};

#[derive(FromRow)]
struct ItemWithProductRow {
    item_id: Uuid,
    amount: i32,
    product_id: Uuid,
    thumbnail: String,
    name: String,
    price: i64,
    description: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CartItemWithProduct {
    pub id: Uuid,
    pub product: Product,
    pub amount: i32,
}

/// Create a cart for the user. A user owns at most one cart; a second create
/// surfaces the uniqueness violation as a conflict.
pub async fn create_cart(pool: &DbPool, user_id: Uuid) -> StoreResult<ShoppingCart> {
    let cart: ShoppingCart =
        sqlx::query_as("INSERT INTO carts (id, user_id) VALUES ($1, $2) RETURNING *")
            .bind(Uuid::new_v4())
            .bind(user_id)
            .fetch_one(pool)
            .await
            .map_err(|e| map_unique(e, "User already has a cart"))?;

    tracing::debug!(cart_id = %cart.id, user_id = %user_id, "cart created");
    Ok(cart)
}

/// Fetch the user's cart, materializing it on first access. Registration does
/// not create a cart; this is the lazy path callers normally use.
pub async fn get_or_create_cart(pool: &DbPool, user_id: Uuid) -> StoreResult<ShoppingCart> {
    sqlx::query("INSERT INTO carts (id, user_id) VALUES ($1, $2) ON CONFLICT (user_id) DO NOTHING")
        .bind(Uuid::new_v4())
        .bind(user_id)
        .execute(pool)
        .await?;

    let cart = sqlx::query_as("SELECT * FROM carts WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(pool)
        .await?;
    Ok(cart)
}

/// Put a product in the cart. One row per (cart, product): adding a product
/// already in the cart replaces its amount.
pub async fn add_item(
    pool: &DbPool,
    cart_id: Uuid,
    product_id: Uuid,
    amount: i32,
) -> StoreResult<ShoppingCartItem> {
    if amount <= 0 {
        return Err(StoreError::Validation(
            "amount must be greater than 0".to_string(),
        ));
    }

    let product_exist: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM products WHERE id = $1")
        .bind(product_id)
        .fetch_optional(pool)
        .await?;
    if product_exist.is_none() {
        return Err(StoreError::Validation("product not found".to_string()));
    }

    let item: ShoppingCartItem = sqlx::query_as(
        r#"
        INSERT INTO cart_items (id, cart_id, product_id, amount)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (cart_id, product_id) DO UPDATE SET amount = EXCLUDED.amount
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(cart_id)
    .bind(product_id)
    .bind(amount)
    .fetch_one(pool)
    .await?;

    tracing::debug!(cart_id = %cart_id, product_id = %product_id, amount, "cart item upserted");
    Ok(item)
}

pub async fn remove_item(pool: &DbPool, cart_id: Uuid, product_id: Uuid) -> StoreResult<()> {
    let result = sqlx::query("DELETE FROM cart_items WHERE cart_id = $1 AND product_id = $2")
        .bind(cart_id)
        .bind(product_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(StoreError::NotFound);
    }

    tracing::debug!(cart_id = %cart_id, product_id = %product_id, "cart item removed");
    Ok(())
}

pub async fn list_items(pool: &DbPool, cart_id: Uuid) -> StoreResult<Vec<CartItemWithProduct>> {
    let rows = sqlx::query_as::<_, ItemWithProductRow>(
        r#"
        SELECT ci.id AS item_id, ci.amount,
               p.id AS product_id, p.thumbnail, p.name, p.price, p.description, p.created_at
        FROM cart_items ci
        JOIN products p ON p.id = ci.product_id
        WHERE ci.cart_id = $1
        ORDER BY p.name
        "#,
    )
    .bind(cart_id)
    .fetch_all(pool)
    .await?;

    let items = rows
        .into_iter()
        .map(|row| CartItemWithProduct {
            id: row.item_id,
            product: Product {
                id: row.product_id,
                thumbnail: row.thumbnail,
                name: row.name,
                price: row.price,
                description: row.description,
                created_at: row.created_at,
            },
            amount: row.amount,
        })
        .collect();
    Ok(items)
}

/// Total quantity across the cart's items, `None` when the cart is empty.
/// A single SUM query per call; cart contents can change between reads, so
/// the result is never cached.
pub async fn item_count(pool: &DbPool, cart_id: Uuid) -> StoreResult<Option<i64>> {
    let count: Option<i64> =
        sqlx::query_scalar("SELECT SUM(amount)::BIGINT FROM cart_items WHERE cart_id = $1")
            .bind(cart_id)
            .fetch_one(pool)
            .await?;
    Ok(count)
}

/// Total price of the cart in currency minor units, `None` when empty.
pub async fn item_price(pool: &DbPool, cart_id: Uuid) -> StoreResult<Option<i64>> {
    let total: Option<i64> = sqlx::query_scalar(
        r#"
        SELECT SUM(p.price * ci.amount)::BIGINT
        FROM cart_items ci
        JOIN products p ON p.id = ci.product_id
        WHERE ci.cart_id = $1
        "#,
    )
    .bind(cart_id)
    .fetch_one(pool)
    .await?;
    Ok(total)
}
