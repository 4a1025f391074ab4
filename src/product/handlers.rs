use std::sync::Arc;

use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
};
use diesel::prelude::*;
use diesel_async::{AsyncConnection, RunQueryDsl};

use super::filters::{CatalogQuery, Page, PageQuery};
use super::models::{
    CreateProduct, NewProduct, NewProductImage, NewSpecification, Product, ProductKey, ProductTag,
};
use super::queries::{catalog_page, load_detail, load_summaries, sales_page};
use super::views::{Paginated, ProductDetail, ProductSummary, SaleView};
use crate::category::handlers::load_tree;
use crate::config::Config;
use crate::schema::{
    product_images, product_tags, products, property_type_categories, property_types,
    specifications,
};
use crate::utils::types::{ApiResult, Pool};
use crate::utils::{AppError, ValidatedJson};

const POPULAR_LIMIT: i64 = 8;
const LIMITED_LIMIT: i64 = 16;
const BANNERS_LIMIT: i64 = 3;

pub async fn get_catalog(
    Query(query): Query<CatalogQuery>,
    State(pool): State<Pool>,
    State(config): State<Arc<Config>>,
) -> ApiResult<Paginated<ProductSummary>> {
    let page = Page::new(query.current_page, query.limit, config.catalog_page_size)?;
    let mut conn = pool.get().await?;

    let categories = match query.category {
        Some(category) => {
            let tree = load_tree(&mut conn, config.category_max_depth).await?;
            Some(tree.subtree_ids(category)?)
        }
        None => None,
    };

    Ok(Json(catalog_page(&mut conn, &query, categories, page).await?))
}

pub async fn get_popular(State(pool): State<Pool>) -> ApiResult<Vec<ProductSummary>> {
    let mut conn = pool.get().await?;

    let res = products::table
        .filter(products::archived.eq(false))
        .select(Product::as_select())
        .order((
            products::sort_index.desc(),
            products::number_of_purchases.desc(),
            products::id.asc(),
        ))
        .limit(POPULAR_LIMIT)
        .load(&mut conn)
        .await?;

    Ok(Json(load_summaries(&mut conn, res).await?))
}

pub async fn get_limited(State(pool): State<Pool>) -> ApiResult<Vec<ProductSummary>> {
    let mut conn = pool.get().await?;

    let res = products::table
        .filter(products::archived.eq(false))
        .filter(products::limited_edition.eq(true))
        .select(Product::as_select())
        .order(products::id.asc())
        .limit(LIMITED_LIMIT)
        .load(&mut conn)
        .await?;

    Ok(Json(load_summaries(&mut conn, res).await?))
}

pub async fn get_banners(State(pool): State<Pool>) -> ApiResult<Vec<ProductSummary>> {
    let mut conn = pool.get().await?;

    let res = products::table
        .filter(products::archived.eq(false))
        .filter(products::available.eq(true))
        .select(Product::as_select())
        .order((products::number_of_purchases.desc(), products::id.asc()))
        .limit(BANNERS_LIMIT)
        .load(&mut conn)
        .await?;

    Ok(Json(load_summaries(&mut conn, res).await?))
}

pub async fn get_sales(
    Query(query): Query<PageQuery>,
    State(pool): State<Pool>,
    State(config): State<Arc<Config>>,
) -> ApiResult<Paginated<SaleView>> {
    let page = Page::new(query.current_page, None, config.catalog_page_size)?;
    let mut conn = pool.get().await?;

    Ok(Json(sales_page(&mut conn, page).await?))
}

pub async fn get_product(
    Path(key): Path<ProductKey>,
    State(pool): State<Pool>,
) -> ApiResult<ProductDetail> {
    let mut conn = pool.get().await?;

    Ok(Json(load_detail(&mut conn, &key).await?))
}

pub async fn create_product(
    State(pool): State<Pool>,
    ValidatedJson(payload): ValidatedJson<CreateProduct>,
) -> Result<(StatusCode, Json<ProductDetail>), AppError> {
    let mut conn = pool.get().await?;

    let id = conn
        .transaction::<i32, AppError, _>(move |conn| {
            Box::pin(async move {
                let id = diesel::insert_into(products::table)
                    .values(NewProduct::from(&payload))
                    .returning(products::id)
                    .get_result::<i32>(conn)
                    .await?;

                let images: Vec<NewProductImage> = payload
                    .images
                    .iter()
                    .map(|image| NewProductImage {
                        product_id: id,
                        src: &image.src,
                        alt: image.alt.as_deref(),
                    })
                    .collect();
                diesel::insert_into(product_images::table)
                    .values(&images)
                    .execute(conn)
                    .await?;

                let tags: Vec<ProductTag> = payload
                    .tags
                    .iter()
                    .map(|tag_id| ProductTag {
                        product_id: id,
                        tag_id: *tag_id,
                    })
                    .collect();
                diesel::insert_into(product_tags::table)
                    .values(&tags)
                    .on_conflict_do_nothing()
                    .execute(conn)
                    .await?;

                for spec in &payload.specifications {
                    let existing = property_types::table
                        .filter(property_types::name.eq(&spec.name))
                        .select(property_types::id)
                        .first::<i32>(conn)
                        .await
                        .optional()?;

                    let property_type_id = match existing {
                        Some(existing) => existing,
                        None => {
                            diesel::insert_into(property_types::table)
                                .values(property_types::name.eq(&spec.name))
                                .returning(property_types::id)
                                .get_result::<i32>(conn)
                                .await?
                        }
                    };

                    diesel::insert_into(property_type_categories::table)
                        .values((
                            property_type_categories::property_type_id.eq(property_type_id),
                            property_type_categories::category_id.eq(payload.category),
                        ))
                        .on_conflict_do_nothing()
                        .execute(conn)
                        .await?;

                    diesel::insert_into(specifications::table)
                        .values(NewSpecification {
                            product_id: id,
                            property_type_id,
                            value: &spec.value,
                        })
                        .execute(conn)
                        .await?;
                }

                Ok(id)
            })
        })
        .await?;

    tracing::info!(product = id, "product created");

    let detail = load_detail(&mut conn, &ProductKey::Id(id)).await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

/// Images, specifications, tag links and reviews go with the product.
pub async fn delete_product(
    Path(id): Path<i32>,
    State(pool): State<Pool>,
) -> Result<StatusCode, AppError> {
    let mut conn = pool.get().await?;

    let deleted = diesel::delete(products::table.find(id))
        .execute(&mut conn)
        .await?;

    if deleted == 0 {
        return Err(AppError::NotFound(format!("product {id}")));
    }

    tracing::info!(product = id, "product deleted");
    Ok(StatusCode::NO_CONTENT)
}
