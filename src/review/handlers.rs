use axum::extract::{Json, Path, State};
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use super::models::{NewReview, Review, ReviewView, SubmitReview};
use crate::auth::CurrentUser;
use crate::schema::{products, reviews};
use crate::utils::types::{ApiResult, Pool};
use crate::utils::{AppError, ValidatedJson};

/// Stores a review, updating the author's existing root review if any.
///
/// Root reviews are keyed on `(product, author)`; replies (`parent` set) are
/// always inserted and must point at a review of the same product.
pub async fn upsert_review(
    conn: &mut AsyncPgConnection,
    product_id: i32,
    author_id: Uuid,
    payload: &SubmitReview,
) -> Result<Review, AppError> {
    conn.transaction::<Review, AppError, _>(move |conn| {
        Box::pin(async move {
            products::table
                .find(product_id)
                .select(products::id)
                .first::<i32>(conn)
                .await
                .optional()?
                .ok_or_else(|| AppError::NotFound(format!("product {product_id}")))?;

            if let Some(parent_id) = payload.parent {
                let parent_product = reviews::table
                    .find(parent_id)
                    .select(reviews::product_id)
                    .first::<i32>(conn)
                    .await
                    .optional()?
                    .ok_or_else(|| AppError::NotFound(format!("review {parent_id}")))?;

                if parent_product != product_id {
                    return Err(AppError::BadRequest(format!(
                        "review {parent_id} belongs to another product"
                    )));
                }

                return insert_review(conn, product_id, author_id, Some(parent_id), payload).await;
            }

            let existing = reviews::table
                .filter(reviews::product_id.eq(product_id))
                .filter(reviews::author_id.eq(author_id))
                .filter(reviews::parent_id.is_null())
                .select(reviews::id)
                .for_update()
                .first::<i32>(conn)
                .await
                .optional()?;

            match existing {
                Some(id) => {
                    let review = diesel::update(reviews::table.find(id))
                        .set((
                            reviews::text.eq(&payload.text),
                            reviews::rate.eq(payload.rate),
                            reviews::updated_at.eq(Utc::now()),
                        ))
                        .returning(Review::as_returning())
                        .get_result(conn)
                        .await?;
                    tracing::debug!(review = id, "updated existing review");
                    Ok(review)
                }
                None => insert_review(conn, product_id, author_id, None, payload).await,
            }
        })
    })
    .await
}

async fn insert_review(
    conn: &mut AsyncPgConnection,
    product_id: i32,
    author_id: Uuid,
    parent_id: Option<i32>,
    payload: &SubmitReview,
) -> Result<Review, AppError> {
    let review = diesel::insert_into(reviews::table)
        .values(NewReview {
            product_id,
            author_id,
            parent_id,
            text: &payload.text,
            rate: payload.rate,
        })
        .returning(Review::as_returning())
        .get_result(conn)
        .await?;

    Ok(review)
}

pub async fn submit_review(
    Path(product_id): Path<i32>,
    State(pool): State<Pool>,
    CurrentUser(user): CurrentUser,
    ValidatedJson(payload): ValidatedJson<SubmitReview>,
) -> ApiResult<ReviewView> {
    let mut conn = pool.get().await?;

    let review = upsert_review(&mut conn, product_id, user.id, &payload).await?;

    tracing::info!(product = product_id, review = review.id, "review submitted");

    Ok(Json(ReviewView::new(&review, &user)))
}
