use diesel_async::{AsyncPgConnection, pooled_connection::AsyncDieselConnectionManager};
use serde::{Deserialize, Deserializer, Serialize};

use super::error::AppError;

pub type Pool = bb8::Pool<AsyncDieselConnectionManager<AsyncPgConnection>>;

pub type ApiResult<T> = std::result::Result<axum::Json<T>, AppError>;

/// `{src, alt}` as every image-bearing entity renders it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageView {
    pub src: String,
    pub alt: Option<String>,
}

#[derive(Debug, Clone, Deserialize, validator::Validate)]
pub struct ImageInput {
    #[validate(length(min = 1))]
    pub src: String,
    #[validate(length(max = 150))]
    pub alt: Option<String>,
}

/// Tells "field absent" (`None`) apart from "field set to null" (`Some(None)`).
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "double_option")]
        parent: Option<Option<i32>>,
    }

    #[test]
    fn double_option_distinguishes_null_from_missing() {
        let missing: Patch = serde_json::from_str("{}").unwrap();
        let null: Patch = serde_json::from_str(r#"{"parent": null}"#).unwrap();
        let set: Patch = serde_json::from_str(r#"{"parent": 4}"#).unwrap();

        assert_eq!(missing.parent, None);
        assert_eq!(null.parent, Some(None));
        assert_eq!(set.parent, Some(Some(4)));
    }
}
