use chrono::Utc;
use serde::Serialize;

use super::models::{Product, ProductImage, PropertyType, Specification};
use crate::auth::User;
use crate::review::models::{Review, ReviewView};
use crate::review::rating::RatingSummary;
use crate::tag::models::{Tag, TagView};
use crate::utils::dates::{listing_date, sale_day};
use crate::utils::types::ImageView;

/// Related rows a product summary is assembled from.
#[derive(Debug, Default, Clone)]
pub struct ProductParts {
    pub images: Vec<ProductImage>,
    pub tags: Vec<Tag>,
    pub rating: RatingSummary,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    pub id: i32,
    pub category: Option<i32>,
    pub price: f64,
    pub count: i32,
    pub date: String,
    pub title: String,
    pub description: String,
    pub free_delivery: bool,
    pub images: Vec<ImageView>,
    pub tags: Vec<TagView>,
    pub reviews: i64,
    pub rating: f64,
}

impl ProductSummary {
    pub fn new(product: &Product, parts: &ProductParts) -> Self {
        Self {
            id: product.id,
            category: product.category_id,
            price: product.price,
            count: product.count,
            date: listing_date(&product.created_at),
            title: product.title.clone(),
            description: product.description.clone(),
            free_delivery: product.free_delivery,
            images: parts.images.iter().map(ImageView::from).collect(),
            tags: parts.tags.iter().map(TagView::from).collect(),
            reviews: parts.rating.count(),
            rating: parts.rating.average(),
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SpecificationView {
    pub name: String,
    pub value: String,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetail {
    pub id: i32,
    pub category: Option<i32>,
    pub price: f64,
    pub count: i32,
    pub date: String,
    pub title: String,
    pub description: String,
    pub full_description: String,
    pub free_delivery: bool,
    pub images: Vec<ImageView>,
    pub tags: Vec<TagView>,
    pub reviews: Vec<ReviewView>,
    pub specifications: Vec<SpecificationView>,
    pub rating: f64,
}

impl ProductDetail {
    /// `reviews` holds the rows to display (root reviews); the rating is
    /// computed over every review of the product.
    pub fn new(
        product: &Product,
        parts: &ProductParts,
        specifications: &[(Specification, PropertyType)],
        reviews: &[(Review, User)],
    ) -> Self {
        let summary = ProductSummary::new(product, parts);

        Self {
            id: summary.id,
            category: summary.category,
            price: summary.price,
            count: summary.count,
            date: summary.date,
            title: summary.title,
            description: summary.description,
            full_description: product.full_description.clone(),
            free_delivery: summary.free_delivery,
            images: summary.images,
            tags: summary.tags,
            reviews: reviews
                .iter()
                .map(|(review, author)| ReviewView::new(review, author))
                .collect(),
            specifications: specifications
                .iter()
                .map(|(spec, kind)| SpecificationView {
                    name: kind.name.clone(),
                    value: spec.value.clone(),
                })
                .collect(),
            rating: summary.rating,
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SaleView {
    pub id: i32,
    pub price: f64,
    pub sale_price: f64,
    pub date_from: String,
    pub date_to: String,
    pub title: String,
    pub images: Vec<ImageView>,
}

impl SaleView {
    /// `None` unless the product carries a complete sale window.
    pub fn new(product: &Product, images: &[ProductImage]) -> Option<Self> {
        Some(Self {
            id: product.id,
            price: product.price,
            sale_price: product.sale_price?,
            date_from: sale_day(&product.date_from?),
            date_to: sale_day(&product.date_to?),
            title: product.title.clone(),
            images: images.iter().map(ImageView::from).collect(),
        })
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub current_page: i64,
    pub last_page: i64,
}

/// Summary priced for the moment of purchase, with `count` taken from a
/// basket or order line rather than stock.
pub fn line_summary(
    product: &Product,
    parts: &ProductParts,
    count: i32,
    unit_price: f64,
) -> ProductSummary {
    ProductSummary {
        count,
        price: unit_price,
        ..ProductSummary::new(product, parts)
    }
}

pub fn priced_now(product: &Product, parts: &ProductParts, count: i32) -> ProductSummary {
    line_summary(product, parts, count, product.effective_price(Utc::now()))
}
