use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::auth::User;
use crate::product::models::Product;
use crate::schema::reviews;
use crate::utils::dates::review_date;

#[derive(Queryable, Selectable, Identifiable, Associations, Debug, Clone, PartialEq)]
#[diesel(belongs_to(Product))]
#[diesel(table_name = reviews)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Review {
    pub id: i32,
    pub product_id: i32,
    pub author_id: Uuid,
    pub parent_id: Option<i32>,
    pub text: String,
    pub rate: Option<i16>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = reviews)]
pub struct NewReview<'a> {
    pub product_id: i32,
    pub author_id: Uuid,
    pub parent_id: Option<i32>,
    pub text: &'a str,
    pub rate: Option<i16>,
}

#[derive(Deserialize, Validate, Debug)]
pub struct SubmitReview {
    #[validate(length(min = 1, max = 5000))]
    pub text: String,
    #[validate(range(min = 1, max = 5))]
    pub rate: Option<i16>,
    /// Replying to another review of the same product.
    pub parent: Option<i32>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ReviewView {
    pub author: String,
    pub email: String,
    pub date: String,
    pub text: String,
    pub rate: Option<i16>,
}

impl ReviewView {
    pub fn new(review: &Review, author: &User) -> Self {
        Self {
            author: author.username.clone(),
            email: author.email.clone(),
            date: review_date(&review.created_at),
            text: review.text.clone(),
            rate: review.rate,
        }
    }
}
