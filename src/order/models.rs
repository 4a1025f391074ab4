use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::product::models::Product;
use crate::product::views::ProductSummary;
use crate::schema::{order_items, orders};
use crate::utils::AppError;
use crate::utils::dates::review_date;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Created,
    Accepted,
    Paid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryType {
    #[default]
    Ordinary,
    Express,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentType {
    #[default]
    Online,
    Someone,
}

impl OrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Created => "created",
            OrderStatus::Accepted => "accepted",
            OrderStatus::Paid => "paid",
        }
    }
}

impl DeliveryType {
    pub fn as_str(self) -> &'static str {
        match self {
            DeliveryType::Ordinary => "ordinary",
            DeliveryType::Express => "express",
        }
    }
}

impl PaymentType {
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentType::Online => "online",
            PaymentType::Someone => "someone",
        }
    }
}

impl FromStr for OrderStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created" => Ok(OrderStatus::Created),
            "accepted" => Ok(OrderStatus::Accepted),
            "paid" => Ok(OrderStatus::Paid),
            other => Err(AppError::Internal(format!("unknown order status {other:?}"))),
        }
    }
}

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, PartialEq)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Order {
    pub id: i32,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub delivery_type: String,
    pub payment_type: String,
    pub total_cost: f64,
    pub status: String,
    pub city: Option<String>,
    pub address: Option<String>,
}

impl Order {
    pub fn status(&self) -> Result<OrderStatus, AppError> {
        self.status.parse()
    }
}

#[derive(Insertable)]
#[diesel(table_name = orders)]
pub struct NewOrder {
    pub user_id: Uuid,
    pub total_cost: f64,
    pub status: &'static str,
}

/// Unit price is frozen when the order is created.
#[derive(Queryable, Selectable, Identifiable, Associations, Insertable, Debug, Clone, PartialEq)]
#[diesel(belongs_to(Order))]
#[diesel(belongs_to(Product))]
#[diesel(table_name = order_items)]
#[diesel(primary_key(order_id, product_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderItem {
    pub order_id: i32,
    pub product_id: i32,
    pub count: i32,
    pub price: f64,
}

/// One entry of the order body; extra fields the storefront sends along
/// (title, price, ...) are ignored.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderLine {
    pub id: i32,
    pub count: i32,
}

#[derive(Deserialize, Validate, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmOrder {
    #[validate(length(min = 1, max = 150))]
    pub full_name: String,
    #[validate(email, length(max = 254))]
    pub email: String,
    #[validate(length(min = 1, max = 20))]
    pub phone: String,
    #[serde(default)]
    pub delivery_type: DeliveryType,
    #[serde(default)]
    pub payment_type: PaymentType,
    #[validate(length(min = 1, max = 100))]
    pub city: String,
    #[validate(length(min = 1, max = 200))]
    pub address: String,
}

#[derive(AsChangeset)]
#[diesel(table_name = orders)]
pub struct OrderContact<'a> {
    pub full_name: &'a str,
    pub email: &'a str,
    pub phone: &'a str,
    pub delivery_type: &'static str,
    pub payment_type: &'static str,
    pub city: &'a str,
    pub address: &'a str,
    pub status: &'static str,
}

impl<'a> From<&'a ConfirmOrder> for OrderContact<'a> {
    fn from(payload: &'a ConfirmOrder) -> Self {
        OrderContact {
            full_name: &payload.full_name,
            email: &payload.email,
            phone: &payload.phone,
            delivery_type: payload.delivery_type.as_str(),
            payment_type: payload.payment_type.as_str(),
            city: &payload.city,
            address: &payload.address,
            status: OrderStatus::Accepted.as_str(),
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderCreated {
    pub order_id: i32,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    pub id: i32,
    pub created_at: String,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub delivery_type: String,
    pub payment_type: String,
    pub total_cost: f64,
    pub status: String,
    pub city: Option<String>,
    pub address: Option<String>,
    pub products: Vec<ProductSummary>,
}

impl OrderView {
    pub fn new(order: Order, products: Vec<ProductSummary>) -> Self {
        Self {
            id: order.id,
            created_at: review_date(&order.created_at),
            full_name: order.full_name,
            email: order.email,
            phone: order.phone,
            delivery_type: order.delivery_type,
            payment_type: order.payment_type,
            total_cost: order.total_cost,
            status: order.status,
            city: order.city,
            address: order.address,
            products,
        }
    }
}

/// Folds repeated product ids into one line each, ordered by product id.
pub fn merge_lines(lines: &[OrderLine]) -> Result<Vec<OrderLine>, AppError> {
    if lines.is_empty() {
        return Err(AppError::BadRequest("order has no items".into()));
    }

    let mut merged: BTreeMap<i32, i32> = BTreeMap::new();
    for line in lines {
        if line.count < 1 {
            return Err(AppError::BadRequest(format!(
                "count for product {} must be at least 1",
                line.id
            )));
        }
        let count = merged.entry(line.id).or_default();
        *count = count
            .checked_add(line.count)
            .ok_or_else(|| AppError::BadRequest(format!("count for product {} is too large", line.id)))?;
    }

    Ok(merged
        .into_iter()
        .map(|(id, count)| OrderLine { id, count })
        .collect())
}

/// Sum of unit price times count, in whole cents.
pub fn order_total(items: &[OrderItem]) -> f64 {
    let total: f64 = items
        .iter()
        .map(|item| item.price * f64::from(item.count))
        .sum();
    (total * 100.0).round() / 100.0
}
