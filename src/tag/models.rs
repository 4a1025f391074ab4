use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::schema::tags;

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, PartialEq, Serialize)]
#[diesel(table_name = tags)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Tag {
    pub id: i32,
    pub name: String,
}

#[derive(Insertable, Deserialize, Validate, Debug)]
#[diesel(table_name = tags)]
pub struct NewTag {
    #[validate(length(min = 1, max = 150))]
    pub name: String,
}

#[derive(Deserialize, Debug, Default)]
pub struct TagsQuery {
    pub category: Option<i32>,
}

/// Tags as embedded in product representations.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct TagView {
    pub name: String,
}

impl From<&Tag> for TagView {
    fn from(tag: &Tag) -> Self {
        TagView {
            name: tag.name.clone(),
        }
    }
}
