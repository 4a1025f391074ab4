use diesel::prelude::*;
use serde::Deserialize;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::schema::payment_cards;

/// Card details captured with a payment. Nothing is charged.
#[derive(Deserialize, Validate, Debug)]
pub struct PaymentCard {
    #[validate(length(min = 1, max = 8), custom(function = "digits_only"))]
    pub number: String,
    #[validate(length(min = 1, max = 30))]
    pub name: String,
    #[validate(custom(function = "validate_month"))]
    pub month: String,
    #[validate(length(equal = 4), custom(function = "digits_only"))]
    pub year: String,
    #[validate(length(equal = 3), custom(function = "digits_only"))]
    pub code: String,
}

#[derive(Insertable)]
#[diesel(table_name = payment_cards)]
pub struct NewPaymentCard<'a> {
    pub owner_id: Uuid,
    pub order_id: i32,
    pub number: &'a str,
    pub name: &'a str,
    pub month: &'a str,
    pub year: &'a str,
    pub code: &'a str,
}

impl<'a> NewPaymentCard<'a> {
    pub fn new(card: &'a PaymentCard, owner_id: Uuid, order_id: i32) -> Self {
        NewPaymentCard {
            owner_id,
            order_id,
            number: &card.number,
            name: &card.name,
            month: &card.month,
            year: &card.year,
            code: &card.code,
        }
    }
}

fn digits_only(value: &str) -> Result<(), ValidationError> {
    if value.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(ValidationError::new("digits"))
    }
}

fn validate_month(month: &str) -> Result<(), ValidationError> {
    let valid = month.len() == 2
        && digits_only(month).is_ok()
        && month
            .parse::<u8>()
            .is_ok_and(|month| (1..=12).contains(&month));
    if valid {
        Ok(())
    } else {
        Err(ValidationError::new("month"))
    }
}
