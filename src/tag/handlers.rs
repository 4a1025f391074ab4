use std::sync::Arc;

use axum::{
    extract::{Json, Query, State},
    http::StatusCode,
};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use super::models::{NewTag, Tag, TagsQuery};
use crate::category::handlers::load_tree;
use crate::config::Config;
use crate::schema::{product_tags, products, tags};
use crate::utils::types::{ApiResult, Pool};
use crate::utils::{AppError, ValidatedJson};

/// All tags, or only those carried by products in a category subtree.
pub async fn get_tags(
    Query(query): Query<TagsQuery>,
    State(pool): State<Pool>,
    State(config): State<Arc<Config>>,
) -> ApiResult<Vec<Tag>> {
    let mut conn = pool.get().await?;

    let res = match query.category {
        None => {
            tags::table
                .select(Tag::as_select())
                .order(tags::id)
                .load(&mut conn)
                .await?
        }
        Some(category) => {
            let tree = load_tree(&mut conn, config.category_max_depth).await?;
            let category_ids = tree.subtree_ids(category)?;

            let used = product_tags::table
                .inner_join(products::table)
                .filter(products::category_id.assume_not_null().eq_any(category_ids))
                .filter(products::archived.eq(false))
                .select(product_tags::tag_id);

            tags::table
                .filter(tags::id.eq_any(used))
                .select(Tag::as_select())
                .order(tags::id)
                .load(&mut conn)
                .await?
        }
    };

    Ok(Json(res))
}

pub async fn create_tag(
    State(pool): State<Pool>,
    ValidatedJson(payload): ValidatedJson<NewTag>,
) -> Result<(StatusCode, Json<Tag>), AppError> {
    let mut conn = pool.get().await?;

    let tag = diesel::insert_into(tags::table)
        .values(&payload)
        .returning(Tag::as_returning())
        .get_result(&mut conn)
        .await?;

    Ok((StatusCode::CREATED, Json(tag)))
}
