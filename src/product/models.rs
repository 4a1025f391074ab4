use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Deserialize;
use validator::{Validate, ValidationError};

use crate::category::models::Category;
use crate::schema::{product_images, product_tags, products, property_types, specifications};
use crate::tag::models::Tag;
use crate::utils::types::{ImageInput, ImageView};

#[derive(Queryable, Selectable, Identifiable, Associations, Debug, Clone, PartialEq)]
#[diesel(belongs_to(Category))]
#[diesel(table_name = products)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Product {
    pub id: i32,
    pub category_id: Option<i32>,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub full_description: String,
    pub free_delivery: bool,
    pub sort_index: i32,
    pub number_of_purchases: i32,
    pub limited_edition: bool,
    pub price: f64,
    pub sale_price: Option<f64>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
    pub count: i32,
    pub available: bool,
    pub archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// A sale price applies only inside its `[date_from, date_to]` window.
    pub fn on_sale(&self, now: DateTime<Utc>) -> bool {
        match (self.sale_price, self.date_from, self.date_to) {
            (Some(_), Some(from), Some(to)) => from <= now && now <= to,
            _ => false,
        }
    }

    pub fn effective_price(&self, now: DateTime<Utc>) -> f64 {
        match self.sale_price {
            Some(sale) if self.on_sale(now) => sale,
            _ => self.price,
        }
    }
}

#[derive(Queryable, Selectable, Identifiable, Associations, Debug, Clone, PartialEq)]
#[diesel(belongs_to(Product))]
#[diesel(table_name = product_images)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProductImage {
    pub id: i32,
    pub product_id: i32,
    pub src: String,
    pub alt: Option<String>,
}

impl From<&ProductImage> for ImageView {
    fn from(image: &ProductImage) -> Self {
        ImageView {
            src: image.src.clone(),
            alt: image.alt.clone(),
        }
    }
}

#[derive(Insertable)]
#[diesel(table_name = product_images)]
pub struct NewProductImage<'a> {
    pub product_id: i32,
    pub src: &'a str,
    pub alt: Option<&'a str>,
}

#[derive(Identifiable, Selectable, Queryable, Associations, Insertable, Debug, Clone)]
#[diesel(belongs_to(Product))]
#[diesel(belongs_to(Tag))]
#[diesel(table_name = product_tags)]
#[diesel(primary_key(product_id, tag_id))]
pub struct ProductTag {
    pub product_id: i32,
    pub tag_id: i32,
}

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, PartialEq)]
#[diesel(table_name = property_types)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PropertyType {
    pub id: i32,
    pub name: String,
}

/// One `name: value` attribute of a product, e.g. "Color" -> "Red".
#[derive(Queryable, Selectable, Identifiable, Associations, Debug, Clone, PartialEq)]
#[diesel(belongs_to(Product))]
#[diesel(belongs_to(PropertyType))]
#[diesel(table_name = specifications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Specification {
    pub id: i32,
    pub product_id: i32,
    pub property_type_id: i32,
    pub value: String,
}

#[derive(Insertable)]
#[diesel(table_name = specifications)]
pub struct NewSpecification<'a> {
    pub product_id: i32,
    pub property_type_id: i32,
    pub value: &'a str,
}

#[derive(Insertable)]
#[diesel(table_name = products)]
pub struct NewProduct<'a> {
    pub category_id: Option<i32>,
    pub title: &'a str,
    pub slug: &'a str,
    pub description: &'a str,
    pub full_description: &'a str,
    pub free_delivery: bool,
    pub sort_index: i32,
    pub limited_edition: bool,
    pub price: f64,
    pub sale_price: Option<f64>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
    pub count: i32,
    pub available: bool,
}

impl<'a> From<&'a CreateProduct> for NewProduct<'a> {
    fn from(payload: &'a CreateProduct) -> Self {
        NewProduct {
            category_id: Some(payload.category),
            title: &payload.title,
            slug: &payload.slug,
            description: &payload.description,
            full_description: &payload.full_description,
            free_delivery: payload.free_delivery,
            sort_index: payload.sort_index,
            limited_edition: payload.limited_edition,
            price: payload.price,
            sale_price: payload.sale_price,
            date_from: payload.date_from,
            date_to: payload.date_to,
            count: payload.count,
            available: payload.available,
        }
    }
}

#[derive(Deserialize, Validate, Debug)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_sale_window"))]
pub struct CreateProduct {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1, max = 200), custom(function = "validate_slug"))]
    pub slug: String,
    #[serde(default)]
    #[validate(length(max = 500))]
    pub description: String,
    #[serde(default)]
    pub full_description: String,
    #[serde(default)]
    pub free_delivery: bool,
    #[serde(default)]
    pub sort_index: i32,
    #[serde(default)]
    pub limited_edition: bool,
    #[validate(range(min = 0.0))]
    pub price: f64,
    #[validate(range(min = 0.0))]
    pub sale_price: Option<f64>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub count: i32,
    #[serde(default = "default_available")]
    pub available: bool,
    pub category: i32,
    #[serde(default)]
    pub tags: Vec<i32>,
    #[serde(default)]
    #[validate(nested)]
    pub images: Vec<ImageInput>,
    #[serde(default)]
    #[validate(nested)]
    pub specifications: Vec<SpecificationInput>,
}

#[derive(Deserialize, Validate, Debug)]
pub struct SpecificationInput {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(min = 1, max = 200))]
    pub value: String,
}

fn default_available() -> bool {
    true
}

fn validate_slug(slug: &str) -> Result<(), ValidationError> {
    let valid = slug
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_');
    // an all-digit slug would be read back as a product id
    let numeric = slug.chars().all(|c| c.is_ascii_digit());
    if valid && !numeric {
        Ok(())
    } else {
        Err(ValidationError::new("slug"))
    }
}

fn validate_sale_window(payload: &CreateProduct) -> Result<(), ValidationError> {
    if let (Some(from), Some(to)) = (payload.date_from, payload.date_to) {
        if from > to {
            return Err(ValidationError::new("sale_window"));
        }
    }
    Ok(())
}

/// Products are addressed by numeric id or by their unique slug.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum ProductKey {
    Id(i32),
    Slug(String),
}

impl From<String> for ProductKey {
    fn from(raw: String) -> Self {
        match raw.parse() {
            Ok(id) => ProductKey::Id(id),
            Err(_) => ProductKey::Slug(raw),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn product() -> Product {
        let created = Utc.with_ymd_and_hms(2024, 1, 10, 9, 0, 0).unwrap();
        Product {
            id: 1,
            category_id: Some(2),
            title: "Kettle".into(),
            slug: "kettle".into(),
            description: String::new(),
            full_description: String::new(),
            free_delivery: false,
            sort_index: 0,
            number_of_purchases: 0,
            limited_edition: false,
            price: 100.0,
            sale_price: Some(80.0),
            date_from: Some(created),
            date_to: Some(created + Duration::days(7)),
            count: 5,
            available: true,
            archived: false,
            created_at: created,
            updated_at: created,
        }
    }

    #[test]
    fn sale_price_applies_inside_window() {
        let p = product();
        let inside = p.date_from.unwrap() + Duration::days(1);
        assert!(p.on_sale(inside));
        assert_eq!(p.effective_price(inside), 80.0);
    }

    #[test]
    fn regular_price_outside_window() {
        let p = product();
        let before = p.date_from.unwrap() - Duration::seconds(1);
        let after = p.date_to.unwrap() + Duration::seconds(1);
        assert_eq!(p.effective_price(before), 100.0);
        assert_eq!(p.effective_price(after), 100.0);
    }

    #[test]
    fn missing_window_means_no_sale() {
        let mut p = product();
        p.date_to = None;
        assert!(!p.on_sale(p.created_at));
        assert_eq!(p.effective_price(p.created_at), 100.0);
    }

    #[test]
    fn product_key_parses_ids_and_slugs() {
        assert_eq!(ProductKey::from("42".to_owned()), ProductKey::Id(42));
        assert_eq!(
            ProductKey::from("red-kettle".to_owned()),
            ProductKey::Slug("red-kettle".into())
        );
    }

    #[test]
    fn slug_rules() {
        assert!(validate_slug("red-kettle_2").is_ok());
        assert!(validate_slug("Red Kettle").is_err());
    }

    #[test]
    fn numeric_slugs_are_rejected() {
        assert!(validate_slug("2024").is_err());
        assert!(validate_slug("2024-edition").is_ok());
        assert_eq!(ProductKey::from("2024".to_owned()), ProductKey::Id(2024));
    }

    #[test]
    fn inverted_sale_window_fails_validation() {
        let payload: CreateProduct = serde_json::from_value(serde_json::json!({
            "title": "Kettle",
            "slug": "kettle",
            "price": 10.0,
            "category": 1,
            "dateFrom": "2024-02-01T00:00:00Z",
            "dateTo": "2024-01-01T00:00:00Z",
        }))
        .unwrap();

        let errors = payload.validate().unwrap_err();
        assert!(errors.errors().contains_key("__all__"));
    }

    #[test]
    fn product_needs_a_category() {
        let body = serde_json::json!({"title": "Kettle", "slug": "kettle", "price": 10.0});
        assert!(serde_json::from_value::<CreateProduct>(body).is_err());
    }
}
