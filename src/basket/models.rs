use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::product::models::Product;
use crate::schema::{basket_items, baskets};

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, PartialEq)]
#[diesel(table_name = baskets)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Basket {
    pub id: i32,
    pub user_id: Uuid,
    pub updated_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = baskets)]
pub struct NewBasket {
    pub user_id: Uuid,
}

#[derive(Queryable, Selectable, Identifiable, Associations, Insertable, Debug, Clone, PartialEq)]
#[diesel(belongs_to(Basket))]
#[diesel(belongs_to(Product))]
#[diesel(table_name = basket_items)]
#[diesel(primary_key(basket_id, product_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct BasketItem {
    pub basket_id: i32,
    pub product_id: i32,
    pub count: i32,
}

/// `{id, count}` as sent by the storefront for basket changes.
#[derive(Deserialize, Validate, Debug, Clone, Copy, PartialEq, Eq)]
pub struct BasketLine {
    pub id: i32,
    #[validate(range(min = 1))]
    pub count: i32,
}
