use uuid::Uuid;

use crate::{
    db::DbPool,
    error::{StoreError, StoreResult},
    models::Review,
    store::Pagination,
};

pub const TITLE_MAX_LEN: usize = 255;
pub const RATING_MIN: i32 = 0;
pub const RATING_MAX: i32 = 5;

#[derive(Debug, Clone)]
pub struct NewReview {
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub rating: i32,
    pub title: String,
    pub comment: Option<String>,
}

pub async fn add_review(pool: &DbPool, new: NewReview) -> StoreResult<Review> {
    if new.title.is_empty() {
        return Err(StoreError::Validation("title must be set".to_string()));
    }
    if new.title.chars().count() > TITLE_MAX_LEN {
        return Err(StoreError::Validation(format!(
            "title must be at most {TITLE_MAX_LEN} characters"
        )));
    }
    if !(RATING_MIN..=RATING_MAX).contains(&new.rating) {
        return Err(StoreError::Validation(format!(
            "rating must be between {RATING_MIN} and {RATING_MAX}"
        )));
    }

    let review: Review = sqlx::query_as(
        r#"
        INSERT INTO reviews (id, user_id, product_id, rating, title, comment)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(new.user_id)
    .bind(new.product_id)
    .bind(new.rating)
    .bind(&new.title)
    .bind(&new.comment)
    .fetch_one(pool)
    .await?;

    tracing::debug!(review_id = %review.id, product_id = %new.product_id, "review added");
    Ok(review)
}

pub async fn list_reviews(
    pool: &DbPool,
    product_id: Uuid,
    pagination: Pagination,
) -> StoreResult<Vec<Review>> {
    let (_page, limit, offset) = pagination.normalize();
    let reviews = sqlx::query_as(
        "SELECT * FROM reviews WHERE product_id = $1 ORDER BY created_at DESC LIMIT $2 OFFSET $3",
    )
    .bind(product_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;
    Ok(reviews)
}

pub async fn delete_review(pool: &DbPool, id: Uuid) -> StoreResult<()> {
    let result = sqlx::query("DELETE FROM reviews WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(StoreError::NotFound);
    }
    Ok(())
}
