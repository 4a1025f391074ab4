//! Scenarios against a live PostgreSQL; skipped unless `TEST_DATABASE_URL` is set.

mod common;

use axum::http::StatusCode;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use serde_json::json;

use common::{create_category, create_product, create_user, database, request, send, unique_slug};
use storefront::product::models::ProductKey;
use storefront::product::queries::{find_product, load_summaries};
use storefront::review::handlers::upsert_review;
use storefront::review::models::SubmitReview;
use storefront::schema::{property_type_categories, property_types, reviews};

fn product_body(title: &str, category: i64) -> serde_json::Value {
    json!({
        "title": title,
        "slug": unique_slug("item"),
        "category": category,
        "price": 25.0,
        "count": 10,
        "images": [{"src": "images/item.png", "alt": "item"}],
        "specifications": [{"name": "Color", "value": "Red"}],
    })
}

fn review(text: &str, rate: i16, parent: Option<i32>) -> SubmitReview {
    SubmitReview {
        text: text.to_owned(),
        rate: Some(rate),
        parent,
    }
}

#[tokio::test]
async fn resubmitted_review_keeps_one_row_with_latest_rate() {
    let Some((pool, app)) = database().await else {
        return;
    };
    let category = create_category(&app, "Goods", None).await;
    let author = create_user(&pool).await;
    let product_id = create_product(&app, product_body("Lamp", category)).await as i32;

    let mut conn = pool.get().await.unwrap();
    upsert_review(&mut conn, product_id, author, &review("Nice", 3, None))
        .await
        .unwrap();
    upsert_review(&mut conn, product_id, author, &review("Nice", 5, None))
        .await
        .unwrap();

    let rows = reviews::table
        .filter(reviews::product_id.eq(product_id))
        .filter(reviews::author_id.eq(author))
        .select(reviews::rate)
        .load::<Option<i16>>(&mut conn)
        .await
        .unwrap();

    assert_eq!(rows, vec![Some(5)]);
}

#[tokio::test]
async fn replies_count_towards_reviews_but_are_not_listed() {
    let Some((pool, app)) = database().await else {
        return;
    };
    let category = create_category(&app, "Goods", None).await;
    let author = create_user(&pool).await;
    let replier = create_user(&pool).await;
    let product_id = create_product(&app, product_body("Chair", category)).await as i32;

    let mut conn = pool.get().await.unwrap();
    let root = upsert_review(&mut conn, product_id, author, &review("Solid", 4, None))
        .await
        .unwrap();
    upsert_review(&mut conn, product_id, replier, &review("Agreed", 2, Some(root.id)))
        .await
        .unwrap();

    let product = find_product(&mut conn, &ProductKey::Id(product_id)).await.unwrap();
    let summary = load_summaries(&mut conn, vec![product]).await.unwrap().remove(0);
    assert_eq!(summary.reviews, 2);
    assert_eq!(summary.rating, 3.0);

    let (status, detail) = send(&app, request("GET", &format!("/api/product/{product_id}"), None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["reviews"].as_array().unwrap().len(), 1);
    assert_eq!(detail["reviews"][0]["text"], "Solid");
    assert_eq!(detail["specifications"], json!([{"name": "Color", "value": "Red"}]));
}

#[tokio::test]
async fn reply_to_another_products_review_is_rejected() {
    let Some((pool, app)) = database().await else {
        return;
    };
    let category = create_category(&app, "Goods", None).await;
    let author = create_user(&pool).await;
    let first = create_product(&app, product_body("Desk", category)).await as i32;
    let second = create_product(&app, product_body("Shelf", category)).await as i32;

    let mut conn = pool.get().await.unwrap();
    let root = upsert_review(&mut conn, first, author, &review("Fine", 4, None))
        .await
        .unwrap();

    let err = upsert_review(&mut conn, second, author, &review("Hm", 1, Some(root.id)))
        .await
        .unwrap_err();
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn product_without_reviews_rates_zero() {
    let Some((_pool, app)) = database().await else {
        return;
    };
    let category = create_category(&app, "Goods", None).await;
    let slug = unique_slug("quiet");
    let mut body = product_body("Quiet fan", category);
    body["slug"] = json!(slug);
    create_product(&app, body).await;

    let (status, detail) = send(&app, request("GET", &format!("/api/product/{slug}"), None, None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["rating"], 0.0);
    assert_eq!(detail["reviews"], json!([]));
}

#[tokio::test]
async fn three_level_category_renders_nested() {
    let Some((_pool, app)) = database().await else {
        return;
    };

    let post = |body: serde_json::Value| request("POST", "/api/categories", None, Some(&body.to_string()));

    let (status, root) = send(
        &app,
        post(json!({"title": "Home", "image": {"src": "images/home.png", "alt": "home"}})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let root_id = root["id"].as_i64().unwrap();

    let (_, child) = send(&app, post(json!({"title": "Kitchen", "parent": root_id}))).await;
    let child_id = child["id"].as_i64().unwrap();

    let (_, leaf) = send(&app, post(json!({"title": "Cups", "parent": child_id}))).await;
    let leaf_id = leaf["id"].as_i64().unwrap();

    let (status, tree) = send(&app, request("GET", &format!("/api/categories/{root_id}"), None, None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        tree,
        json!({
            "id": root_id,
            "title": "Home",
            "image": {"src": "images/home.png", "alt": "home"},
            "subcategories": [{
                "id": child_id,
                "title": "Kitchen",
                "image": null,
                "subcategories": [{
                    "id": leaf_id,
                    "title": "Cups",
                    "image": null,
                    "subcategories": [],
                }],
            }],
        })
    );

    let (status, _) = send(
        &app,
        request(
            "PATCH",
            &format!("/api/categories/{root_id}"),
            None,
            Some(&json!({"parent": leaf_id}).to_string()),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_order_body_is_a_parse_error() {
    let Some((pool, app)) = database().await else {
        return;
    };
    let user = create_user(&pool).await;

    let (status, body) = send(
        &app,
        request("POST", "/api/orders", Some(user), Some(r#"[{"id": 1, "count": 1}"#)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("JSON parse error - "));

    let (status, _) = send(&app, request("POST", "/api/orders", Some(user), Some("[]"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn basket_to_paid_order() {
    let Some((pool, app)) = database().await else {
        return;
    };
    let category = create_category(&app, "Goods", None).await;
    let user = create_user(&pool).await;
    let product_id = create_product(&app, product_body("Kettle", category)).await;

    let line = json!({"id": product_id, "count": 2}).to_string();
    let (status, basket) = send(&app, request("POST", "/api/basket", Some(user), Some(&line))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(basket[0]["count"], 2);
    assert_eq!(basket[0]["price"], 25.0);

    let order_body = json!([{"id": product_id, "count": 2}]).to_string();
    let (status, created) = send(&app, request("POST", "/api/orders", Some(user), Some(&order_body))).await;
    assert_eq!(status, StatusCode::CREATED);
    let order_id = created["orderId"].as_i64().unwrap();

    let contact = json!({
        "fullName": "Ann Lee",
        "email": "ann@example.com",
        "phone": "+4700000",
        "deliveryType": "express",
        "paymentType": "online",
        "city": "Oslo",
        "address": "Main st 1",
    })
    .to_string();
    let (status, _) = send(
        &app,
        request("POST", &format!("/api/order/{order_id}"), Some(user), Some(&contact)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, basket) = send(&app, request("GET", "/api/basket", Some(user), None)).await;
    assert_eq!(basket, json!([]));

    let card = json!({"number": "12345678", "name": "Ann Lee", "month": "04", "year": "2030", "code": "123"})
        .to_string();
    let (status, _) = send(
        &app,
        request("POST", &format!("/api/payment/{order_id}"), Some(user), Some(&card)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, order) = send(&app, request("GET", &format!("/api/order/{order_id}"), Some(user), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(order["status"], "paid");
    assert_eq!(order["totalCost"], 50.0);
    assert_eq!(order["deliveryType"], "express");
    assert_eq!(order["products"][0]["count"], 2);

    let stranger = create_user(&pool).await;
    let (status, _) = send(&app, request("GET", &format!("/api/order/{order_id}"), Some(stranger), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn profile_is_created_on_first_read() {
    let Some((pool, app)) = database().await else {
        return;
    };
    let user = create_user(&pool).await;

    let (status, profile) = send(&app, request("GET", "/api/profile", Some(user), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["fullName"], "");
    assert_eq!(profile["avatar"], serde_json::Value::Null);

    let avatar = json!({"src": "images/avatars/me.png"}).to_string();
    let (status, profile) = send(&app, request("POST", "/api/profile/avatar", Some(user), Some(&avatar))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["avatar"], json!({"src": "images/avatars/me.png", "alt": "me"}));
}

#[tokio::test]
async fn profile_update_is_partial_and_persisted() {
    let Some((pool, app)) = database().await else {
        return;
    };
    let user = create_user(&pool).await;

    let patch = json!({"fullName": "Ann Lee", "phone": "+4700000"}).to_string();
    let (status, profile) = send(&app, request("POST", "/api/profile", Some(user), Some(&patch))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["fullName"], "Ann Lee");

    let patch = json!({"phone": "+4711111"}).to_string();
    send(&app, request("POST", "/api/profile", Some(user), Some(&patch))).await;

    let (_, profile) = send(&app, request("GET", "/api/profile", Some(user), None)).await;
    assert_eq!(profile["fullName"], "Ann Lee");
    assert_eq!(profile["phone"], "+4711111");

    let bad = json!({"email": "nope"}).to_string();
    let (status, _) = send(&app, request("POST", "/api/profile", Some(user), Some(&bad))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn specification_types_are_linked_to_the_product_category() {
    let Some((pool, app)) = database().await else {
        return;
    };
    let category = create_category(&app, "Lighting", None).await;
    create_product(&app, product_body("Bulb", category)).await;

    let mut conn = pool.get().await.unwrap();
    let linked = property_type_categories::table
        .inner_join(property_types::table)
        .filter(property_type_categories::category_id.eq(category as i32))
        .select(property_types::name)
        .load::<String>(&mut conn)
        .await
        .unwrap();

    assert_eq!(linked, vec!["Color".to_owned()]);
}

#[tokio::test]
async fn category_can_move_under_a_sibling_but_not_a_descendant() {
    let Some((_pool, app)) = database().await else {
        return;
    };
    let root = create_category(&app, "Garden", None).await;
    let tools = create_category(&app, "Tools", Some(root)).await;
    let seeds = create_category(&app, "Seeds", Some(root)).await;

    let move_to = |id: i64, parent: i64| {
        request(
            "PATCH",
            &format!("/api/categories/{id}"),
            None,
            Some(&json!({"parent": parent}).to_string()),
        )
    };

    let (status, _) = send(&app, move_to(seeds, tools)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, move_to(tools, seeds)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, tree) = send(&app, request("GET", &format!("/api/categories/{root}"), None, None)).await;
    assert_eq!(tree["subcategories"][0]["id"], tools);
    assert_eq!(tree["subcategories"][0]["subcategories"][0]["id"], seeds);
}

#[tokio::test]
async fn product_with_unknown_category_is_rejected() {
    let Some((_pool, app)) = database().await else {
        return;
    };

    let (status, _) = send(
        &app,
        request(
            "POST",
            "/api/products",
            None,
            Some(&product_body("Ghost", i32::MAX as i64).to_string()),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
