use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use diesel::prelude::*;
use diesel_async::{AsyncConnection, RunQueryDsl};

use super::models::{NewPaymentCard, PaymentCard};
use crate::auth::CurrentUser;
use crate::order::handlers::owned_order_for_update;
use crate::order::models::{OrderItem, OrderStatus};
use crate::schema::{order_items, orders, payment_cards, products};
use crate::utils::types::Pool;
use crate::utils::{AppError, ValidatedJson};

/// Records the card against the order and marks it paid.
pub async fn capture_payment(
    Path(id): Path<i32>,
    State(pool): State<Pool>,
    CurrentUser(user): CurrentUser,
    ValidatedJson(card): ValidatedJson<PaymentCard>,
) -> Result<StatusCode, AppError> {
    let mut conn = pool.get().await?;
    let user_id = user.id;

    conn.transaction::<(), AppError, _>(move |conn| {
        Box::pin(async move {
            let order = owned_order_for_update(conn, id, user_id).await?;

            if order.status()? == OrderStatus::Paid {
                return Err(AppError::Conflict(format!("order {id} is already paid")));
            }

            diesel::insert_into(payment_cards::table)
                .values(NewPaymentCard::new(&card, user_id, order.id))
                .execute(conn)
                .await?;

            diesel::update(orders::table.find(order.id))
                .set(orders::status.eq(OrderStatus::Paid.as_str()))
                .execute(conn)
                .await?;

            let items = order_items::table
                .filter(order_items::order_id.eq(order.id))
                .select(OrderItem::as_select())
                .load::<OrderItem>(conn)
                .await?;

            for item in items {
                diesel::update(products::table.find(item.product_id))
                    .set(products::number_of_purchases.eq(products::number_of_purchases + item.count))
                    .execute(conn)
                    .await?;
            }

            Ok(())
        })
    })
    .await?;

    tracing::info!(order = id, user = %user_id, "payment captured");

    Ok(StatusCode::OK)
}
