use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::schema::{categories, category_images};
use crate::utils::types::{ImageInput, ImageView, double_option};

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, PartialEq)]
#[diesel(table_name = categories)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Category {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub image_id: Option<i32>,
    pub parent_id: Option<i32>,
}

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, PartialEq)]
#[diesel(table_name = category_images)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CategoryImage {
    pub id: i32,
    pub src: String,
    pub alt: Option<String>,
}

impl From<&CategoryImage> for ImageView {
    fn from(image: &CategoryImage) -> Self {
        ImageView {
            src: image.src.clone(),
            alt: image.alt.clone(),
        }
    }
}

#[derive(Insertable)]
#[diesel(table_name = categories)]
pub struct NewCategory<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub image_id: Option<i32>,
    pub parent_id: Option<i32>,
}

#[derive(Insertable)]
#[diesel(table_name = category_images)]
pub struct NewCategoryImage<'a> {
    pub src: &'a str,
    pub alt: Option<&'a str>,
}

#[derive(Deserialize, Validate, Debug)]
pub struct CreateCategory {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub parent: Option<i32>,
    #[validate(nested)]
    pub image: Option<ImageInput>,
}

#[derive(Deserialize, Validate, Debug, AsChangeset)]
#[diesel(table_name = categories)]
pub struct UpdateCategory {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(default, rename = "parent", deserialize_with = "double_option")]
    pub parent_id: Option<Option<i32>>,
}

/// Client-facing category: the same shape at every level of the tree.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CategoryView {
    pub id: i32,
    pub title: String,
    pub image: Option<ImageView>,
    pub subcategories: Vec<CategoryView>,
}
