use std::sync::Arc;

use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
};
use diesel::prelude::*;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};

use super::models::{
    Category, CategoryImage, CategoryView, CreateCategory, NewCategory, NewCategoryImage,
    UpdateCategory,
};
use super::tree::CategoryTree;
use crate::config::Config;
use crate::schema::{categories, category_images};
use crate::utils::types::{ApiResult, Pool};
use crate::utils::{AppError, ValidatedJson};

/// Loads every category with its image in one query.
pub(crate) async fn load_tree(
    conn: &mut AsyncPgConnection,
    max_depth: usize,
) -> Result<CategoryTree, AppError> {
    let rows = categories::table
        .left_join(category_images::table)
        .select((Category::as_select(), Option::<CategoryImage>::as_select()))
        .order(categories::id)
        .load::<(Category, Option<CategoryImage>)>(conn)
        .await?;

    tracing::debug!(categories = rows.len(), "loaded category tree");

    Ok(CategoryTree::new(rows, max_depth))
}

pub async fn get_categories(
    State(pool): State<Pool>,
    State(config): State<Arc<Config>>,
) -> ApiResult<Vec<CategoryView>> {
    let mut conn = pool.get().await?;
    let tree = load_tree(&mut conn, config.category_max_depth).await?;

    Ok(Json(tree.render_roots()?))
}

pub async fn get_category_by_id(
    Path(id): Path<i32>,
    State(pool): State<Pool>,
    State(config): State<Arc<Config>>,
) -> ApiResult<CategoryView> {
    let mut conn = pool.get().await?;
    let tree = load_tree(&mut conn, config.category_max_depth).await?;

    Ok(Json(tree.render(id)?))
}

pub async fn create_category(
    State(pool): State<Pool>,
    State(config): State<Arc<Config>>,
    ValidatedJson(payload): ValidatedJson<CreateCategory>,
) -> Result<(StatusCode, Json<CategoryView>), AppError> {
    let mut conn = pool.get().await?;

    let id = conn
        .transaction::<i32, AppError, _>(move |conn| {
            Box::pin(async move {
                if let Some(parent) = payload.parent {
                    categories::table
                        .find(parent)
                        .select(categories::id)
                        .first::<i32>(conn)
                        .await
                        .optional()?
                        .ok_or_else(|| AppError::NotFound(format!("category {parent}")))?;
                }

                let image_id = match &payload.image {
                    Some(image) => Some(
                        diesel::insert_into(category_images::table)
                            .values(NewCategoryImage {
                                src: &image.src,
                                alt: image.alt.as_deref(),
                            })
                            .returning(category_images::id)
                            .get_result::<i32>(conn)
                            .await?,
                    ),
                    None => None,
                };

                let id = diesel::insert_into(categories::table)
                    .values(NewCategory {
                        title: &payload.title,
                        description: &payload.description,
                        image_id,
                        parent_id: payload.parent,
                    })
                    .returning(categories::id)
                    .get_result::<i32>(conn)
                    .await?;

                Ok(id)
            })
        })
        .await?;

    tracing::info!(category = id, "category created");

    let tree = load_tree(&mut conn, config.category_max_depth).await?;
    Ok((StatusCode::CREATED, Json(tree.render(id)?)))
}

pub async fn update_category(
    Path(id): Path<i32>,
    State(pool): State<Pool>,
    State(config): State<Arc<Config>>,
    ValidatedJson(payload): ValidatedJson<UpdateCategory>,
) -> ApiResult<CategoryView> {
    let mut conn = pool.get().await?;
    let max_depth = config.category_max_depth;

    conn.transaction::<(), AppError, _>(move |conn| {
        Box::pin(async move {
            // serializes re-parenting so the cycle check sees every committed move
            if payload.parent_id.is_some() {
                diesel::sql_query("LOCK TABLE categories IN SHARE ROW EXCLUSIVE MODE")
                    .execute(conn)
                    .await?;
            }

            let tree = load_tree(conn, max_depth).await?;
            if !tree.contains(id) {
                return Err(AppError::NotFound(format!("category {id}")));
            }
            if let Some(Some(parent)) = payload.parent_id {
                if tree.would_cycle(id, parent)? {
                    return Err(AppError::BadRequest(format!(
                        "category {parent} cannot become the parent of category {id}"
                    )));
                }
            }

            if payload.title.is_none()
                && payload.description.is_none()
                && payload.parent_id.is_none()
            {
                return Ok(());
            }

            diesel::update(categories::table.find(id))
                .set(&payload)
                .execute(conn)
                .await?;

            Ok(())
        })
    })
    .await?;

    let tree = load_tree(&mut conn, max_depth).await?;
    Ok(Json(tree.render(id)?))
}

/// Children and products keep existing: their references null out.
pub async fn delete_category(
    Path(id): Path<i32>,
    State(pool): State<Pool>,
) -> Result<StatusCode, AppError> {
    let mut conn = pool.get().await?;

    let deleted = diesel::delete(categories::table.find(id))
        .execute(&mut conn)
        .await?;

    if deleted == 0 {
        return Err(AppError::NotFound(format!("category {id}")));
    }

    tracing::info!(category = id, "category deleted");
    Ok(StatusCode::NO_CONTENT)
}
