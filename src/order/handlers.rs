use std::collections::HashMap;

use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
};
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use super::models::{
    ConfirmOrder, NewOrder, Order, OrderContact, OrderCreated, OrderItem, OrderLine, OrderStatus,
    OrderView, merge_lines, order_total,
};
use crate::auth::CurrentUser;
use crate::basket::handlers::clear_basket;
use crate::product::models::Product;
use crate::product::queries::load_parts;
use crate::product::views::{ProductParts, line_summary};
use crate::schema::{order_items, orders, products};
use crate::utils::types::{ApiResult, Pool};
use crate::utils::{AppError, PlainListJson, ValidatedJson};

/// Locks the caller's order row for the rest of the transaction.
pub async fn owned_order_for_update(
    conn: &mut AsyncPgConnection,
    order_id: i32,
    user_id: Uuid,
) -> Result<Order, AppError> {
    orders::table
        .filter(orders::id.eq(order_id))
        .filter(orders::user_id.eq(user_id))
        .select(Order::as_select())
        .for_update()
        .first(conn)
        .await
        .optional()?
        .ok_or_else(|| AppError::NotFound(format!("order {order_id}")))
}

async fn order_views(
    conn: &mut AsyncPgConnection,
    placed: Vec<Order>,
) -> Result<Vec<OrderView>, AppError> {
    let rows = OrderItem::belonging_to(&placed)
        .inner_join(products::table)
        .select((OrderItem::as_select(), Product::as_select()))
        .order(order_items::product_id)
        .load::<(OrderItem, Product)>(conn)
        .await?;

    let mut distinct: Vec<Product> = rows.iter().map(|(_, product)| product.clone()).collect();
    distinct.sort_by_key(|product| product.id);
    distinct.dedup_by_key(|product| product.id);

    let parts = load_parts(conn, &distinct).await?;
    let parts: HashMap<i32, ProductParts> = distinct.iter().map(|p| p.id).zip(parts).collect();
    let no_parts = ProductParts::default();

    let grouped = rows.grouped_by(&placed);

    Ok(placed
        .into_iter()
        .zip(grouped)
        .map(|(order, lines)| {
            let products = lines
                .iter()
                .map(|(item, product)| {
                    let parts = parts.get(&product.id).unwrap_or(&no_parts);
                    line_summary(product, parts, item.count, item.price)
                })
                .collect();
            OrderView::new(order, products)
        })
        .collect())
}

async fn insert_order(
    conn: &mut AsyncPgConnection,
    user_id: Uuid,
    lines: &[OrderLine],
) -> Result<i32, AppError> {
    let ids: Vec<i32> = lines.iter().map(|line| line.id).collect();

    let found: HashMap<i32, Product> = products::table
        .filter(products::id.eq_any(&ids))
        .filter(products::archived.eq(false))
        .select(Product::as_select())
        .for_update()
        .load::<Product>(conn)
        .await?
        .into_iter()
        .map(|product| (product.id, product))
        .collect();

    let now = Utc::now();
    let mut items = Vec::with_capacity(lines.len());

    for line in lines {
        let product = found
            .get(&line.id)
            .ok_or_else(|| AppError::NotFound(format!("product {}", line.id)))?;

        if !product.available {
            return Err(AppError::BadRequest(format!(
                "product {} is not available",
                product.id
            )));
        }
        if line.count > product.count {
            return Err(AppError::BadRequest(format!(
                "only {} of product {} in stock",
                product.count, product.id
            )));
        }

        items.push(OrderItem {
            order_id: 0,
            product_id: product.id,
            count: line.count,
            price: product.effective_price(now),
        });
    }

    let order_id = diesel::insert_into(orders::table)
        .values(NewOrder {
            user_id,
            total_cost: order_total(&items),
            status: OrderStatus::Created.as_str(),
        })
        .returning(orders::id)
        .get_result::<i32>(conn)
        .await?;

    for item in &mut items {
        item.order_id = order_id;
    }

    diesel::insert_into(order_items::table)
        .values(&items)
        .execute(conn)
        .await?;

    Ok(order_id)
}

pub async fn create_order(
    State(pool): State<Pool>,
    CurrentUser(user): CurrentUser,
    PlainListJson(lines): PlainListJson<OrderLine>,
) -> Result<(StatusCode, Json<OrderCreated>), AppError> {
    let lines = merge_lines(&lines)?;
    let mut conn = pool.get().await?;
    let user_id = user.id;

    let order_id = conn
        .transaction::<i32, AppError, _>(move |conn| {
            Box::pin(async move { insert_order(conn, user_id, &lines).await })
        })
        .await?;

    tracing::info!(order = order_id, user = %user_id, "order created");

    Ok((StatusCode::CREATED, Json(OrderCreated { order_id })))
}

pub async fn list_orders(
    State(pool): State<Pool>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Vec<OrderView>> {
    let mut conn = pool.get().await?;

    let res = orders::table
        .filter(orders::user_id.eq(user.id))
        .select(Order::as_select())
        .order((orders::created_at.desc(), orders::id.desc()))
        .load(&mut conn)
        .await?;

    Ok(Json(order_views(&mut conn, res).await?))
}

pub async fn get_order(
    Path(id): Path<i32>,
    State(pool): State<Pool>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<OrderView> {
    let mut conn = pool.get().await?;

    let order = orders::table
        .filter(orders::id.eq(id))
        .filter(orders::user_id.eq(user.id))
        .select(Order::as_select())
        .first(&mut conn)
        .await
        .optional()?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;

    let view = order_views(&mut conn, vec![order])
        .await?
        .pop()
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;

    Ok(Json(view))
}

pub async fn confirm_order(
    Path(id): Path<i32>,
    State(pool): State<Pool>,
    CurrentUser(user): CurrentUser,
    ValidatedJson(payload): ValidatedJson<ConfirmOrder>,
) -> ApiResult<OrderCreated> {
    let mut conn = pool.get().await?;
    let user_id = user.id;

    conn.transaction::<(), AppError, _>(move |conn| {
        Box::pin(async move {
            let order = owned_order_for_update(conn, id, user_id).await?;

            if order.status()? == OrderStatus::Paid {
                return Err(AppError::Conflict(format!("order {id} is already paid")));
            }

            diesel::update(orders::table.find(order.id))
                .set(OrderContact::from(&payload))
                .execute(conn)
                .await?;

            clear_basket(conn, user_id).await
        })
    })
    .await?;

    tracing::info!(order = id, user = %user_id, "order accepted");

    Ok(Json(OrderCreated { order_id: id }))
}
