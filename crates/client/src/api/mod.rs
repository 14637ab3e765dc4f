//! REST client for the ordering backend.
//!
//! One `reqwest` client behind an `Arc`, cheap to clone. Menu reads are
//! cached with `moka` (5-minute TTL) and invalidated by admin mutations;
//! cart and order calls are never cached. Every failure is captured as a
//! classified [`ApiError`].

pub mod types;

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::{Method, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use uuid::Uuid;

use tavola_core::{Dish, DishCategory, DishId, Order, OrderId, OrderStatus};

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::session::{Session, UserProfile};

use types::{
    AuthData, AvailabilityRequest, CartData, CartItemInput, DishData, DishInput, DishesData,
    Envelope, LoginRequest, OrderData, OrdersData, PlaceOrderRequest, RegisterRequest,
    RemoteCart, ReplaceCartRequest, StatusRequest, UserData,
};

/// Cached menu responses.
#[derive(Clone)]
enum CacheValue {
    Menu(Vec<Dish>),
    Dish(Box<Dish>),
}

/// Client for the ordering backend REST API.
///
/// Provides typed access to auth, menu, cart, order, and admin endpoints.
/// Menu responses are cached for 5 minutes.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: String,
    menu_cache: Cache<String, CacheValue>,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;

        let menu_cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.base_url.as_str().trim_end_matches('/').to_string(),
                menu_cache,
            }),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.inner.base_url)
    }

    /// Build a request for a public endpoint.
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.inner.client.request(method, self.url(path))
    }

    /// Build a request carrying the session's bearer token, when present.
    fn authed(&self, method: Method, path: &str, session: &Session) -> RequestBuilder {
        let builder = self.request(method, path);
        match session.token() {
            Some(token) => builder.bearer_auth(token.expose_secret()),
            None => builder,
        }
    }

    /// Send a request and parse the success body.
    async fn send<T: DeserializeOwned>(builder: RequestBuilder) -> Result<T, ApiError> {
        let response = builder.send().await?;
        if !response.status().is_success() {
            return Err(ApiError::from_response(response).await);
        }
        // Read the body as text first for better parse diagnostics
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(ApiError::from)
    }

    /// Send a request whose success body carries nothing we need.
    async fn send_unit(builder: RequestBuilder) -> Result<(), ApiError> {
        let response = builder.send().await?;
        if !response.status().is_success() {
            return Err(ApiError::from_response(response).await);
        }
        Ok(())
    }

    // =========================================================================
    // Auth
    // =========================================================================

    /// Create an account and sign in.
    ///
    /// # Errors
    ///
    /// Returns a classified error if the request fails or is rejected
    /// (e.g., validation errors on the submitted fields).
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<(SecretString, UserProfile), ApiError> {
        let body = RegisterRequest {
            email,
            password,
            name,
        };
        let envelope: Envelope<AuthData> =
            Self::send(self.request(Method::POST, "/auth/register").json(&body)).await?;
        Ok((
            SecretString::from(envelope.data.token),
            envelope.data.user,
        ))
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns a classified error if the request fails or the credentials
    /// are rejected.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(SecretString, UserProfile), ApiError> {
        let body = LoginRequest { email, password };
        let envelope: Envelope<AuthData> =
            Self::send(self.request(Method::POST, "/auth/login").json(&body)).await?;
        Ok((
            SecretString::from(envelope.data.token),
            envelope.data.user,
        ))
    }

    /// Invalidate the session's token server-side.
    ///
    /// # Errors
    ///
    /// Returns a classified error if the request fails.
    #[instrument(skip(self, session))]
    pub async fn logout(&self, session: &Session) -> Result<(), ApiError> {
        Self::send_unit(self.authed(Method::POST, "/auth/logout", session)).await
    }

    /// Fetch the signed-in user's profile.
    ///
    /// # Errors
    ///
    /// Returns a classified error if the request fails or the token has
    /// expired.
    #[instrument(skip(self, session))]
    pub async fn me(&self, session: &Session) -> Result<UserProfile, ApiError> {
        let envelope: Envelope<UserData> =
            Self::send(self.authed(Method::GET, "/auth/me", session)).await?;
        Ok(envelope.data.user)
    }

    // =========================================================================
    // Menu
    // =========================================================================

    /// List menu dishes, optionally filtered by category.
    ///
    /// # Errors
    ///
    /// Returns a classified error if the request fails.
    #[instrument(skip(self))]
    pub async fn list_dishes(
        &self,
        category: Option<DishCategory>,
    ) -> Result<Vec<Dish>, ApiError> {
        let cache_key = category.map_or_else(
            || "dishes:all".to_string(),
            |c| format!("dishes:{c}"),
        );

        // Check cache
        if let Some(CacheValue::Menu(dishes)) = self.inner.menu_cache.get(&cache_key).await {
            debug!("Cache hit for menu");
            return Ok(dishes);
        }

        let path = category.map_or_else(
            || "/dishes".to_string(),
            |c| format!("/dishes?category={c}"),
        );
        let envelope: Envelope<DishesData> = Self::send(self.request(Method::GET, &path)).await?;
        let dishes = envelope.data.dishes;

        self.inner
            .menu_cache
            .insert(cache_key, CacheValue::Menu(dishes.clone()))
            .await;

        Ok(dishes)
    }

    /// Get a single dish by id.
    ///
    /// # Errors
    ///
    /// Returns a classified error if the dish is not found or the request
    /// fails.
    #[instrument(skip(self), fields(dish_id = %dish_id))]
    pub async fn get_dish(&self, dish_id: DishId) -> Result<Dish, ApiError> {
        let cache_key = format!("dish:{dish_id}");

        // Check cache
        if let Some(CacheValue::Dish(dish)) = self.inner.menu_cache.get(&cache_key).await {
            debug!("Cache hit for dish");
            return Ok(*dish);
        }

        let envelope: Envelope<DishData> =
            Self::send(self.request(Method::GET, &format!("/dishes/{dish_id}"))).await?;
        let dish = envelope.data.dish;

        self.inner
            .menu_cache
            .insert(cache_key, CacheValue::Dish(Box::new(dish.clone())))
            .await;

        Ok(dish)
    }

    /// Invalidate all cached menu data.
    pub async fn invalidate_menu(&self) {
        self.inner.menu_cache.invalidate_all();
        self.inner.menu_cache.run_pending_tasks().await;
    }

    // =========================================================================
    // Cart (not cached - mutable state)
    // =========================================================================

    /// Fetch the signed-in user's cart.
    ///
    /// # Errors
    ///
    /// Returns a classified error if the request fails.
    #[instrument(skip(self, session))]
    pub async fn fetch_cart(&self, session: &Session) -> Result<RemoteCart, ApiError> {
        let envelope: Envelope<CartData> =
            Self::send(self.authed(Method::GET, "/cart", session)).await?;
        Ok(envelope.data.cart)
    }

    /// Replace the remote cart with the given item set and return the cart
    /// the backend settled on (it may normalize, merge, or reject lines).
    ///
    /// # Errors
    ///
    /// Returns a classified error if the request fails or is rejected.
    #[instrument(skip(self, session, items))]
    pub async fn replace_cart(
        &self,
        session: &Session,
        items: Vec<CartItemInput>,
    ) -> Result<RemoteCart, ApiError> {
        let body = ReplaceCartRequest { items };
        let envelope: Envelope<CartData> =
            Self::send(self.authed(Method::PUT, "/cart", session).json(&body)).await?;
        Ok(envelope.data.cart)
    }

    /// Delete the remote cart.
    ///
    /// # Errors
    ///
    /// Returns a classified error if the request fails.
    #[instrument(skip(self, session))]
    pub async fn clear_cart(&self, session: &Session) -> Result<(), ApiError> {
        Self::send_unit(self.authed(Method::DELETE, "/cart", session)).await
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Check out the remote cart into an order.
    ///
    /// # Errors
    ///
    /// Returns a classified error if the request fails or the cart cannot
    /// be ordered (e.g., a dish became unavailable).
    #[instrument(skip(self, session))]
    pub async fn place_order(&self, session: &Session) -> Result<Order, ApiError> {
        let body = PlaceOrderRequest {
            idempotency_key: Uuid::new_v4(),
        };
        let envelope: Envelope<OrderData> =
            Self::send(self.authed(Method::POST, "/orders", session).json(&body)).await?;
        Ok(envelope.data.order)
    }

    /// List the signed-in user's orders.
    ///
    /// # Errors
    ///
    /// Returns a classified error if the request fails.
    #[instrument(skip(self, session))]
    pub async fn list_orders(&self, session: &Session) -> Result<Vec<Order>, ApiError> {
        let envelope: Envelope<OrdersData> =
            Self::send(self.authed(Method::GET, "/orders", session)).await?;
        Ok(envelope.data.orders)
    }

    /// Get one order by id.
    ///
    /// # Errors
    ///
    /// Returns a classified error if the order is not found or the request
    /// fails.
    #[instrument(skip(self, session), fields(order_id = %order_id))]
    pub async fn get_order(&self, session: &Session, order_id: OrderId) -> Result<Order, ApiError> {
        let envelope: Envelope<OrderData> =
            Self::send(self.authed(Method::GET, &format!("/orders/{order_id}"), session)).await?;
        Ok(envelope.data.order)
    }

    // =========================================================================
    // Admin
    // =========================================================================

    /// Create a menu dish.
    ///
    /// # Errors
    ///
    /// Returns a classified error if the request fails or is rejected
    /// (validation errors surface per field).
    #[instrument(skip(self, session, input))]
    pub async fn create_dish(
        &self,
        session: &Session,
        input: &DishInput,
    ) -> Result<Dish, ApiError> {
        let envelope: Envelope<DishData> =
            Self::send(self.authed(Method::POST, "/dishes", session).json(input)).await?;
        self.invalidate_menu().await;
        Ok(envelope.data.dish)
    }

    /// Replace a menu dish.
    ///
    /// # Errors
    ///
    /// Returns a classified error if the dish is not found or the request
    /// fails.
    #[instrument(skip(self, session, input), fields(dish_id = %dish_id))]
    pub async fn update_dish(
        &self,
        session: &Session,
        dish_id: DishId,
        input: &DishInput,
    ) -> Result<Dish, ApiError> {
        let envelope: Envelope<DishData> = Self::send(
            self.authed(Method::PUT, &format!("/dishes/{dish_id}"), session)
                .json(input),
        )
        .await?;
        self.invalidate_menu().await;
        Ok(envelope.data.dish)
    }

    /// Remove a menu dish.
    ///
    /// # Errors
    ///
    /// Returns a classified error if the dish is not found or the request
    /// fails.
    #[instrument(skip(self, session), fields(dish_id = %dish_id))]
    pub async fn delete_dish(&self, session: &Session, dish_id: DishId) -> Result<(), ApiError> {
        Self::send_unit(self.authed(Method::DELETE, &format!("/dishes/{dish_id}"), session))
            .await?;
        self.invalidate_menu().await;
        Ok(())
    }

    /// Toggle a dish's availability without editing the rest of it.
    ///
    /// # Errors
    ///
    /// Returns a classified error if the dish is not found or the request
    /// fails.
    #[instrument(skip(self, session), fields(dish_id = %dish_id))]
    pub async fn set_dish_availability(
        &self,
        session: &Session,
        dish_id: DishId,
        is_available: bool,
    ) -> Result<Dish, ApiError> {
        let body = AvailabilityRequest { is_available };
        let envelope: Envelope<DishData> = Self::send(
            self.authed(
                Method::PATCH,
                &format!("/dishes/{dish_id}/availability"),
                session,
            )
            .json(&body),
        )
        .await?;
        self.invalidate_menu().await;
        Ok(envelope.data.dish)
    }

    /// Move an order to a new status.
    ///
    /// # Errors
    ///
    /// Returns a classified error if the order is not found, the transition
    /// is rejected, or the request fails.
    #[instrument(skip(self, session), fields(order_id = %order_id, status = %status))]
    pub async fn set_order_status(
        &self,
        session: &Session,
        order_id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, ApiError> {
        let body = StatusRequest { status };
        let envelope: Envelope<OrderData> = Self::send(
            self.authed(
                Method::PATCH,
                &format!("/orders/{order_id}/status"),
                session,
            )
            .json(&body),
        )
        .await?;
        Ok(envelope.data.order)
    }
}
