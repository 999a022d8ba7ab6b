//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Legacy cart page
//! GET  /health                 - Health check
//! GET  /health/ready           - Readiness (database reachable)
//!
//! # Legacy cart (HTMX fragments, cart saved in the session)
//! POST /cart/add               - Add item (returns count, triggers cart-updated)
//! POST /cart/update            - Set quantity
//! POST /cart/remove            - Remove item
//! POST /cart/clear             - Empty the cart
//! GET  /cart/count             - Cart count badge (fragment)
//! GET  /cart/summary           - Lines, count and formatted total (JSON)
//!
//! # Catalog API
//! GET  /api/products           - ?search=&category=&sort=
//! GET  /api/products/{id}      - Product with category
//! GET  /api/products/{id}/reviews - Latest reviews
//! GET  /api/categories         - Categories by name
//!
//! # Remote cart API
//! GET    /api/cart             - Lines and total
//! GET    /api/cart/count       - Badge count
//! POST   /api/cart/items       - Add one unit of a product
//! PATCH  /api/cart/items/{id}  - Set quantity
//! DELETE /api/cart/items/{id}  - Remove row
//! ```
//!
//! Anything else falls through to the static file service, then to a
//! plain-text 404.

pub mod api;
pub mod cart;
pub mod health;
pub mod home;

use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::state::AppState;

/// Create the legacy cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route("/count", get(cart::count))
        .route("/summary", get(cart::summary))
}

/// Create the JSON API router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(api::catalog::list_products))
        .route("/products/{id}", get(api::catalog::get_product))
        .route("/products/{id}/reviews", get(api::catalog::list_reviews))
        .route("/categories", get(api::catalog::list_categories))
        .route("/cart", get(api::cart::show))
        .route("/cart/count", get(api::cart::count))
        .route("/cart/items", post(api::cart::add_item))
        .route(
            "/cart/items/{id}",
            patch(api::cart::update_item).delete(api::cart::remove_item),
        )
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/cart", cart_routes())
        .nest("/api", api_routes())
}
