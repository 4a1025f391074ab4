use axum::extract::{Json, State};
use chrono::Utc;
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use super::models::{Basket, BasketItem, BasketLine, NewBasket};
use crate::auth::CurrentUser;
use crate::product::models::{Product, ProductKey};
use crate::product::queries::{find_product, load_parts};
use crate::product::views::{ProductSummary, priced_now};
use crate::schema::{basket_items, baskets, products};
use crate::utils::types::{ApiResult, Pool};
use crate::utils::{AppError, ValidatedJson};

/// The user's basket, created on first use.
pub async fn basket_for(conn: &mut AsyncPgConnection, user_id: Uuid) -> Result<Basket, AppError> {
    diesel::insert_into(baskets::table)
        .values(NewBasket { user_id })
        .on_conflict(baskets::user_id)
        .do_nothing()
        .execute(conn)
        .await?;

    let basket = baskets::table
        .filter(baskets::user_id.eq(user_id))
        .select(Basket::as_select())
        .first(conn)
        .await?;

    Ok(basket)
}

pub async fn basket_lines(
    conn: &mut AsyncPgConnection,
    basket_id: i32,
) -> Result<Vec<ProductSummary>, AppError> {
    let rows = basket_items::table
        .filter(basket_items::basket_id.eq(basket_id))
        .inner_join(products::table)
        .select((BasketItem::as_select(), Product::as_select()))
        .order(basket_items::product_id)
        .load::<(BasketItem, Product)>(conn)
        .await?;

    let (items, products): (Vec<BasketItem>, Vec<Product>) = rows.into_iter().unzip();
    let parts = load_parts(conn, &products).await?;

    Ok(items
        .iter()
        .zip(&products)
        .zip(&parts)
        .map(|((item, product), parts)| priced_now(product, parts, item.count))
        .collect())
}

pub async fn clear_basket(conn: &mut AsyncPgConnection, user_id: Uuid) -> Result<(), AppError> {
    let basket_ids = baskets::table
        .filter(baskets::user_id.eq(user_id))
        .select(baskets::id);

    diesel::delete(basket_items::table.filter(basket_items::basket_id.eq_any(basket_ids)))
        .execute(conn)
        .await?;

    Ok(())
}

pub async fn get_basket(
    State(pool): State<Pool>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Vec<ProductSummary>> {
    let mut conn = pool.get().await?;

    let basket = basket_for(&mut conn, user.id).await?;

    Ok(Json(basket_lines(&mut conn, basket.id).await?))
}

pub async fn add_to_basket(
    State(pool): State<Pool>,
    CurrentUser(user): CurrentUser,
    ValidatedJson(line): ValidatedJson<BasketLine>,
) -> ApiResult<Vec<ProductSummary>> {
    let mut conn = pool.get().await?;
    let user_id = user.id;

    let basket_id = conn
        .transaction::<i32, AppError, _>(move |conn| {
            Box::pin(async move {
                let basket = basket_for(conn, user_id).await?;
                let product = find_product(conn, &ProductKey::Id(line.id)).await?;

                if !product.available {
                    return Err(AppError::BadRequest(format!(
                        "product {} is not available",
                        product.id
                    )));
                }

                let total = diesel::insert_into(basket_items::table)
                    .values(BasketItem {
                        basket_id: basket.id,
                        product_id: product.id,
                        count: line.count,
                    })
                    .on_conflict((basket_items::basket_id, basket_items::product_id))
                    .do_update()
                    .set(basket_items::count.eq(basket_items::count + excluded(basket_items::count)))
                    .returning(basket_items::count)
                    .get_result::<i32>(conn)
                    .await?;

                if total > product.count {
                    return Err(AppError::BadRequest(format!(
                        "only {} of product {} in stock",
                        product.count, product.id
                    )));
                }

                diesel::update(baskets::table.find(basket.id))
                    .set(baskets::updated_at.eq(Utc::now()))
                    .execute(conn)
                    .await?;

                Ok(basket.id)
            })
        })
        .await?;

    tracing::debug!(user = %user_id, product = line.id, count = line.count, "basket line added");

    Ok(Json(basket_lines(&mut conn, basket_id).await?))
}

pub async fn remove_from_basket(
    State(pool): State<Pool>,
    CurrentUser(user): CurrentUser,
    ValidatedJson(line): ValidatedJson<BasketLine>,
) -> ApiResult<Vec<ProductSummary>> {
    let mut conn = pool.get().await?;
    let user_id = user.id;

    let basket_id = conn
        .transaction::<i32, AppError, _>(move |conn| {
            Box::pin(async move {
                let basket = basket_for(conn, user_id).await?;
                let current = basket_items::table
                    .find((basket.id, line.id))
                    .select(basket_items::count)
                    .for_update()
                    .first::<i32>(conn)
                    .await
                    .optional()?
                    .ok_or_else(|| AppError::NotFound(format!("product {} in basket", line.id)))?;

                let item = basket_items::table.find((basket.id, line.id));
                if current > line.count {
                    diesel::update(item)
                        .set(basket_items::count.eq(current - line.count))
                        .execute(conn)
                        .await?;
                } else {
                    diesel::delete(item).execute(conn).await?;
                }

                diesel::update(baskets::table.find(basket.id))
                    .set(baskets::updated_at.eq(Utc::now()))
                    .execute(conn)
                    .await?;

                Ok(basket.id)
            })
        })
        .await?;

    tracing::debug!(user = %user_id, product = line.id, count = line.count, "basket line removed");

    Ok(Json(basket_lines(&mut conn, basket_id).await?))
}
