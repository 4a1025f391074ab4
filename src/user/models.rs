use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::auth::User;
use crate::schema::{avatars, profiles};
use crate::utils::types::ImageView;

const DEFAULT_AVATAR_ALT: &str = "avatar";

#[derive(Queryable, Selectable, Identifiable, Associations, Debug, Clone, PartialEq)]
#[diesel(belongs_to(User))]
#[diesel(table_name = profiles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Profile {
    pub id: i32,
    pub user_id: Uuid,
    pub full_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub avatar_id: Option<i32>,
}

#[derive(Insertable)]
#[diesel(table_name = profiles)]
pub struct NewProfile<'a> {
    pub user_id: Uuid,
    pub email: Option<&'a str>,
}

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, PartialEq)]
#[diesel(table_name = avatars)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Avatar {
    pub id: i32,
    pub src: String,
    pub alt: Option<String>,
}

#[derive(Insertable)]
#[diesel(table_name = avatars)]
pub struct NewAvatar<'a> {
    pub src: &'a str,
    pub alt: &'a str,
}

/// Partial update: absent fields keep their stored value.
#[derive(Deserialize, Validate, AsChangeset, Debug, Default)]
#[serde(rename_all = "camelCase")]
#[diesel(table_name = profiles)]
pub struct UpdateProfile {
    #[validate(length(min = 1, max = 150))]
    pub full_name: Option<String>,
    #[validate(email, length(max = 254))]
    pub email: Option<String>,
    #[validate(length(min = 1, max = 20))]
    pub phone: Option<String>,
}

impl UpdateProfile {
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none() && self.email.is_none() && self.phone.is_none()
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    pub full_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub avatar: Option<ImageView>,
}

impl ProfileView {
    pub fn new(profile: Profile, avatar: Option<Avatar>) -> Self {
        Self {
            full_name: profile.full_name,
            email: profile.email,
            phone: profile.phone,
            avatar: avatar.map(|avatar| ImageView {
                src: avatar.src,
                alt: avatar.alt,
            }),
        }
    }
}

/// File stem of the image path, e.g. `images/avatars/me.png` -> `me`.
pub fn alt_from_src(src: &str) -> String {
    let path = src.split(['?', '#']).next().unwrap_or(src);
    let name = path.rsplit('/').next().unwrap_or(path);
    let stem = match name.rsplit_once('.') {
        Some((stem, _)) => stem,
        None => name,
    };

    if stem.is_empty() {
        DEFAULT_AVATAR_ALT.to_owned()
    } else {
        stem.to_owned()
    }
}
