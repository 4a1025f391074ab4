use chrono::Utc;
use diesel::dsl::sql;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Double};
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use super::filters::{CatalogQuery, Page, SortDirection, SortKey};
use super::models::{Product, ProductImage, ProductKey, ProductTag, PropertyType, Specification};
use super::views::{Paginated, ProductDetail, ProductParts, ProductSummary, SaleView};
use crate::auth::User;
use crate::review::models::Review;
use crate::review::rating::summarize_by_product;
use crate::schema::{
    product_images, product_tags, products, property_types, reviews, specifications, tags, users,
};
use crate::tag::models::Tag;
use crate::utils::AppError;

const AVERAGE_RATE_SQL: &str =
    "(SELECT COALESCE(AVG(reviews.rate), 0)::float8 FROM reviews WHERE reviews.product_id = products.id)";
const REVIEW_COUNT_SQL: &str =
    "(SELECT COUNT(*) FROM reviews WHERE reviews.product_id = products.id)";

/// Images, tags and review stats for each product, in input order.
pub async fn load_parts(
    conn: &mut AsyncPgConnection,
    products: &[Product],
) -> Result<Vec<ProductParts>, AppError> {
    let images = ProductImage::belonging_to(products)
        .select(ProductImage::as_select())
        .order(product_images::id)
        .load::<ProductImage>(conn)
        .await?;

    let tags = ProductTag::belonging_to(products)
        .inner_join(tags::table)
        .select((ProductTag::as_select(), Tag::as_select()))
        .order(tags::id)
        .load::<(ProductTag, Tag)>(conn)
        .await?;

    let rates = Review::belonging_to(products)
        .select((reviews::product_id, reviews::rate))
        .load::<(i32, Option<i16>)>(conn)
        .await?;
    let ratings = summarize_by_product(rates);

    let parts = images
        .grouped_by(products)
        .into_iter()
        .zip(tags.grouped_by(products))
        .zip(products)
        .map(|((images, tags), product)| ProductParts {
            images,
            tags: tags.into_iter().map(|(_, tag)| tag).collect(),
            rating: ratings.get(&product.id).copied().unwrap_or_default(),
        })
        .collect();

    Ok(parts)
}

pub async fn load_summaries(
    conn: &mut AsyncPgConnection,
    products: Vec<Product>,
) -> Result<Vec<ProductSummary>, AppError> {
    let parts = load_parts(conn, &products).await?;

    Ok(products
        .iter()
        .zip(&parts)
        .map(|(product, parts)| ProductSummary::new(product, parts))
        .collect())
}

pub async fn find_product(
    conn: &mut AsyncPgConnection,
    key: &ProductKey,
) -> Result<Product, AppError> {
    let query: products::BoxedQuery<'_, Pg> = products::table
        .filter(products::archived.eq(false))
        .into_boxed();

    let query = match key {
        ProductKey::Id(id) => query.filter(products::id.eq(*id)),
        ProductKey::Slug(slug) => query.filter(products::slug.eq(slug.clone())),
    };

    query
        .select(Product::as_select())
        .first(conn)
        .await
        .optional()?
        .ok_or_else(|| {
            AppError::NotFound(match key {
                ProductKey::Id(id) => format!("product {id}"),
                ProductKey::Slug(slug) => format!("product {slug:?}"),
            })
        })
}

pub async fn load_detail(
    conn: &mut AsyncPgConnection,
    key: &ProductKey,
) -> Result<ProductDetail, AppError> {
    let product = find_product(conn, key).await?;

    let parts = load_parts(conn, std::slice::from_ref(&product))
        .await?
        .pop()
        .unwrap_or_default();

    let specifications = Specification::belonging_to(&product)
        .inner_join(property_types::table)
        .select((Specification::as_select(), PropertyType::as_select()))
        .order(specifications::id)
        .load::<(Specification, PropertyType)>(conn)
        .await?;

    let root_reviews = Review::belonging_to(&product)
        .filter(reviews::parent_id.is_null())
        .filter(reviews::active.eq(true))
        .inner_join(users::table)
        .select((Review::as_select(), User::as_select()))
        .order(reviews::created_at.desc())
        .load::<(Review, User)>(conn)
        .await?;

    Ok(ProductDetail::new(
        &product,
        &parts,
        &specifications,
        &root_reviews,
    ))
}

fn catalog_filter(
    query: &CatalogQuery,
    categories: Option<Vec<i32>>,
    tag_ids: Vec<i32>,
) -> products::BoxedQuery<'static, Pg> {
    let mut q = products::table
        .filter(products::archived.eq(false))
        .into_boxed();

    if let Some(pattern) = query.name_pattern() {
        q = q.filter(products::title.ilike(pattern));
    }
    if let Some(min) = query.min_price {
        q = q.filter(products::price.ge(min));
    }
    if let Some(max) = query.max_price {
        q = q.filter(products::price.le(max));
    }
    if query.free_delivery == Some(true) {
        q = q.filter(products::free_delivery.eq(true));
    }
    if query.available == Some(true) {
        q = q.filter(products::available.eq(true));
    }
    if let Some(ids) = categories {
        q = q.filter(products::category_id.assume_not_null().eq_any(ids));
    }
    if !tag_ids.is_empty() {
        let tagged = product_tags::table
            .filter(product_tags::tag_id.eq_any(tag_ids))
            .select(product_tags::product_id);
        q = q.filter(products::id.eq_any(tagged));
    }

    q
}

fn catalog_order(
    q: products::BoxedQuery<'static, Pg>,
    sort: SortKey,
    direction: SortDirection,
) -> products::BoxedQuery<'static, Pg> {
    use SortDirection::{Dec, Inc};

    let q = match (sort, direction) {
        (SortKey::Price, Inc) => q.order(products::price.asc()),
        (SortKey::Price, Dec) => q.order(products::price.desc()),
        (SortKey::Date, Inc) => q.order(products::created_at.asc()),
        (SortKey::Date, Dec) => q.order(products::created_at.desc()),
        (SortKey::Rating, Inc) => q.order(sql::<Double>(AVERAGE_RATE_SQL).asc()),
        (SortKey::Rating, Dec) => q.order(sql::<Double>(AVERAGE_RATE_SQL).desc()),
        (SortKey::Reviews, Inc) => q.order(sql::<BigInt>(REVIEW_COUNT_SQL).asc()),
        (SortKey::Reviews, Dec) => q.order(sql::<BigInt>(REVIEW_COUNT_SQL).desc()),
    };

    q.then_order_by(products::id.asc())
}

/// Filtered, sorted, paginated catalog listing.
///
/// `categories` is the already-expanded set of category ids (a category and
/// all of its descendants), or `None` for no category filter.
pub async fn catalog_page(
    conn: &mut AsyncPgConnection,
    query: &CatalogQuery,
    categories: Option<Vec<i32>>,
    page: Page,
) -> Result<Paginated<ProductSummary>, AppError> {
    let tag_ids = query.tag_ids()?;

    let total = catalog_filter(query, categories.clone(), tag_ids.clone())
        .count()
        .get_result::<i64>(conn)
        .await?;

    let items = catalog_order(
        catalog_filter(query, categories, tag_ids),
        query.sort,
        query.sort_type,
    )
    .select(Product::as_select())
    .limit(page.limit)
    .offset(page.offset())
    .load::<Product>(conn)
    .await?;

    tracing::debug!(total, returned = items.len(), page = page.number, "catalog page");

    Ok(Paginated {
        items: load_summaries(conn, items).await?,
        current_page: page.number,
        last_page: page.last_page(total),
    })
}

pub async fn sales_page(
    conn: &mut AsyncPgConnection,
    page: Page,
) -> Result<Paginated<SaleView>, AppError> {
    let now = Utc::now();

    let on_sale = || -> products::BoxedQuery<'static, Pg> {
        products::table
            .filter(products::archived.eq(false))
            .filter(products::sale_price.is_not_null())
            .filter(products::date_from.le(now))
            .filter(products::date_to.ge(now))
            .into_boxed()
    };

    let total = on_sale().count().get_result::<i64>(conn).await?;

    let items = on_sale()
        .select(Product::as_select())
        .order((products::date_to.asc(), products::id.asc()))
        .limit(page.limit)
        .offset(page.offset())
        .load::<Product>(conn)
        .await?;

    let parts = load_parts(conn, &items).await?;

    Ok(Paginated {
        items: items
            .iter()
            .zip(&parts)
            .filter_map(|(product, parts)| SaleView::new(product, &parts.images))
            .collect(),
        current_page: page.number,
        last_page: page.last_page(total),
    })
}
