//! Menu caching, auth flow, and checkout against a mock backend.

#![allow(clippy::unwrap_used)]

use secrecy::ExposeSecret;
use serde_json::json;

use tavola_core::{DishId, OrderId, OrderStatus};
use tavola_integration_tests::fixtures::{TestEnv, cart_body, line_json, signed_in};

fn dishes_body() -> String {
    json!({
        "data": {
            "dishes": [
                {
                    "id": 1,
                    "name": "Margherita",
                    "description": "Tomato, mozzarella, basil",
                    "price": {"amount": "11.50"},
                    "category": "main",
                    "isAvailable": true
                },
                {
                    "id": 2,
                    "name": "Tiramisu",
                    "price": {"amount": "6.00"},
                    "category": "dessert",
                    "isAvailable": false
                }
            ]
        }
    })
    .to_string()
}

#[tokio::test]
async fn menu_listing_is_cached() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/dishes")
        .with_status(200)
        .with_body(dishes_body())
        .expect(1)
        .create_async()
        .await;

    let env = TestEnv::new(&server.url());
    let first = env.api.list_dishes(None).await.unwrap();
    let second = env.api.list_dishes(None).await.unwrap();

    mock.assert_async().await;
    assert_eq!(first, second);
    assert_eq!(first.len(), 2);
    assert!(!first[1].is_available);
}

#[tokio::test]
async fn admin_mutations_invalidate_the_menu_cache() {
    let mut server = mockito::Server::new_async().await;
    let listing = server
        .mock("GET", "/dishes")
        .with_status(200)
        .with_body(dishes_body())
        .expect(2)
        .create_async()
        .await;
    server
        .mock("POST", "/dishes")
        .match_header("authorization", "Bearer test-token")
        .with_status(201)
        .with_body(
            json!({
                "data": {
                    "dish": {
                        "id": 3,
                        "name": "Pad Thai",
                        "price": {"amount": "13.95"},
                        "category": "main",
                        "isAvailable": true
                    }
                }
            })
            .to_string(),
        )
        .create_async()
        .await;

    let env = TestEnv::new(&server.url());
    let session = signed_in();

    env.api.list_dishes(None).await.unwrap();

    let input = tavola_client::api::types::DishInput {
        name: "Pad Thai".to_string(),
        description: None,
        price: tavola_core::Price::new("13.95".parse().unwrap(), tavola_core::CurrencyCode::USD),
        category: tavola_core::DishCategory::Main,
        is_available: true,
        image_url: None,
    };
    let created = env.api.create_dish(&session, &input).await.unwrap();
    assert_eq!(created.id, DishId::new(3));

    // The cache was invalidated, so this hits the network again
    env.api.list_dishes(None).await.unwrap();
    listing.assert_async().await;
}

#[tokio::test]
async fn login_returns_a_usable_token() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/auth/login")
        .match_body(mockito::Matcher::Json(json!({
            "email": "ada@example.com",
            "password": "correct horse"
        })))
        .with_status(200)
        .with_body(
            json!({
                "data": {
                    "token": "tok_live",
                    "user": {"id": 1, "email": "ada@example.com", "name": "Ada", "isAdmin": false}
                }
            })
            .to_string(),
        )
        .create_async()
        .await;
    let me = server
        .mock("GET", "/auth/me")
        .match_header("authorization", "Bearer tok_live")
        .with_status(200)
        .with_body(
            json!({
                "data": {
                    "user": {"id": 1, "email": "ada@example.com", "name": "Ada", "isAdmin": false}
                }
            })
            .to_string(),
        )
        .create_async()
        .await;

    let env = TestEnv::new(&server.url());
    let (token, user) = env
        .api
        .login("ada@example.com", "correct horse")
        .await
        .unwrap();
    assert_eq!(token.expose_secret(), "tok_live");
    assert_eq!(user.email, "ada@example.com");

    // The persisted session survives a reload and carries the token
    env.sessions.save(&token, &user).unwrap();
    let session = env.sessions.load();
    assert!(session.is_authenticated());

    let profile = env.api.me(&session).await.unwrap();
    me.assert_async().await;
    assert_eq!(profile.name, "Ada");
}

#[tokio::test]
async fn checkout_turns_the_cart_into_an_order() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/orders")
        .match_header("authorization", "Bearer test-token")
        .with_status(201)
        .with_body(
            json!({
                "data": {
                    "order": {
                        "id": 17,
                        "items": [line_json(1, "Soup", "4.50", 2)],
                        "status": "placed",
                        "total": {"amount": "9.00"},
                        "placedAt": "2026-08-06T12:00:00Z"
                    }
                }
            })
            .to_string(),
        )
        .create_async()
        .await;
    // The backend consumed the cart at checkout
    server
        .mock("GET", "/cart")
        .with_status(200)
        .with_body(cart_body(&[]))
        .create_async()
        .await;

    let env = TestEnv::new(&server.url());
    let session = signed_in();

    let order = env.api.place_order(&session).await.unwrap();
    assert_eq!(order.id, OrderId::new(17));
    assert_eq!(order.status, OrderStatus::Placed);
    assert_eq!(order.total_items(), 2);

    let mut cart = env.cart();
    cart.load(&session).await;
    assert!(cart.state().is_empty());
}

#[tokio::test]
async fn order_status_updates_round_trip() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("PATCH", "/orders/17/status")
        .match_body(mockito::Matcher::Json(json!({"status": "preparing"})))
        .with_status(200)
        .with_body(
            json!({
                "data": {
                    "order": {
                        "id": 17,
                        "items": [],
                        "status": "preparing",
                        "total": {"amount": "9.00"},
                        "placedAt": "2026-08-06T12:00:00Z"
                    }
                }
            })
            .to_string(),
        )
        .create_async()
        .await;

    let env = TestEnv::new(&server.url());
    let order = env
        .api
        .set_order_status(&signed_in(), OrderId::new(17), OrderStatus::Preparing)
        .await
        .unwrap();
    assert_eq!(order.status, OrderStatus::Preparing);
}
