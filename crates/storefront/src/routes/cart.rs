//! Legacy cart route handlers.
//!
//! The legacy page's cart is a [`Cart`] saved in the visitor's session under
//! [`kiro_core::CART_SLOT_KEY`]. Each request loads it, applies one mutation
//! and, only if something changed, saves it back and sends
//! `HX-Trigger: cart-updated` so the page refreshes its badge.
//!
//! Invalid input never fails the request: it is a no-op that returns the
//! current count without the trigger header.

use std::str::FromStr;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Json,
    response::{AppendHeaders, IntoResponse, Response},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{debug, instrument};

use kiro_core::{Cart, CartChange, CartPersistence};

use crate::error::add_breadcrumb;
use crate::middleware::SessionSlot;

/// Header that tells the page the cart changed.
pub const HX_TRIGGER: &str = "HX-Trigger";
/// Event name sent in [`HX_TRIGGER`].
pub const CART_UPDATED_EVENT: &str = "cart-updated";

/// Add to cart form data. Every field is optional so that a missing one is a
/// no-op rather than a rejected request.
#[derive(Debug, Default, Deserialize)]
pub struct AddToCartForm {
    pub product_id: Option<String>,
    pub name: Option<String>,
    pub price: Option<String>,
    pub quantity: Option<u32>,
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub product_id: String,
    pub quantity: i64,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub product_id: String,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u64,
}

/// Owns the visitor's legacy cart for the duration of one request.
struct SessionCart {
    persistence: CartPersistence<SessionSlot>,
    cart: Cart,
}

impl SessionCart {
    async fn load(session: Session) -> Self {
        let persistence = CartPersistence::new(SessionSlot::new(session));
        let cart = persistence.load().await;
        Self { persistence, cart }
    }

    /// Apply a mutation, save if it changed anything, and render the badge.
    async fn apply(mut self, mutate: impl FnOnce(&mut Cart) -> CartChange) -> Response {
        let change = mutate(&mut self.cart);
        let count = CartCountTemplate {
            count: self.cart.item_count(),
        };

        if !change.is_mutation() {
            debug!("Cart unchanged");
            return count.into_response();
        }

        self.persistence.save(&self.cart).await;
        (AppendHeaders([(HX_TRIGGER, CART_UPDATED_EVENT)]), count).into_response()
    }
}

fn parse_price(raw: Option<&str>) -> Option<Decimal> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| Decimal::from_str(s).ok())
}

/// Add one product (or `quantity` units of it) to the cart.
#[instrument(skip(session))]
pub async fn add(session: Session, Form(form): Form<AddToCartForm>) -> Response {
    let product_id = form.product_id.unwrap_or_default();
    let name = form.name.unwrap_or_default();
    let price = parse_price(form.price.as_deref());
    let quantity = form.quantity.unwrap_or(1);

    add_breadcrumb("cart", "Add to cart", Some(&[("product_id", product_id.as_str())]));

    SessionCart::load(session)
        .await
        .apply(|cart| match price {
            Some(price) => cart.add_item(&product_id, &name, price, quantity),
            None => CartChange::Unchanged,
        })
        .await
}

/// Set a line's quantity; zero or less removes it.
#[instrument(skip(session))]
pub async fn update(session: Session, Form(form): Form<UpdateCartForm>) -> Response {
    SessionCart::load(session)
        .await
        .apply(|cart| cart.set_quantity(&form.product_id, form.quantity))
        .await
}

/// Remove a line.
#[instrument(skip(session))]
pub async fn remove(session: Session, Form(form): Form<RemoveFromCartForm>) -> Response {
    SessionCart::load(session)
        .await
        .apply(|cart| cart.remove_item(&form.product_id))
        .await
}

/// Empty the cart.
#[instrument(skip(session))]
pub async fn clear(session: Session) -> Response {
    SessionCart::load(session).await.apply(Cart::clear).await
}

/// Get cart count badge (HTMX).
#[instrument(skip(session))]
pub async fn count(session: Session) -> impl IntoResponse {
    let cart = SessionCart::load(session).await.cart;
    CartCountTemplate {
        count: cart.item_count(),
    }
}

/// The cart's lines, count and formatted total.
#[instrument(skip(session))]
pub async fn summary(session: Session) -> Response {
    let cart = SessionCart::load(session).await.cart;
    Json(cart.summary()).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_price() {
        assert_eq!(parse_price(Some("49999")), Some(Decimal::from(49_999)));
        assert_eq!(parse_price(Some(" 12.50 ")), Some(Decimal::new(1250, 2)));
        assert_eq!(parse_price(Some("")), None);
        assert_eq!(parse_price(Some("free")), None);
        assert_eq!(parse_price(None), None);
    }
}
