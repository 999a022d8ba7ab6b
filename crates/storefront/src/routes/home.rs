//! Legacy cart page.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::IntoResponse;
use rust_decimal::Decimal;
use tower_sessions::Session;
use tracing::instrument;

use kiro_core::{CartPersistence, CurrencyCode, Price};

use crate::middleware::SessionSlot;

/// A product card on the legacy page.
#[derive(Clone)]
pub struct ShowcaseProduct {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub price: Decimal,
    pub formatted_price: String,
}

impl ShowcaseProduct {
    fn new(id: &'static str, name: &'static str, description: &'static str, price: i64) -> Self {
        let price = Decimal::from(price);
        Self {
            id,
            name,
            description,
            price,
            formatted_price: Price::new(price, CurrencyCode::default()).display(),
        }
    }
}

/// The fixed product lineup shown on the legacy page.
#[must_use]
pub fn showcase() -> Vec<ShowcaseProduct> {
    vec![
        ShowcaseProduct::new(
            "1",
            "HP Laptop",
            "15.6\" FHD, 16GB RAM, 512GB SSD",
            49_999,
        ),
        ShowcaseProduct::new(
            "2",
            "Smartphone",
            "6.5\" AMOLED, 128GB storage",
            29_999,
        ),
        ShowcaseProduct::new(
            "3",
            "Wireless Headphones",
            "Active noise cancelling, 30h battery",
            7_999,
        ),
        ShowcaseProduct::new("4", "Smart Watch", "Heart rate and GPS tracking", 12_499),
    ]
}

/// Legacy page template.
#[derive(Template, WebTemplate)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub products: Vec<ShowcaseProduct>,
    /// Cart badge count at render time.
    pub count: u64,
}

/// Display the legacy cart page.
#[instrument(skip(session))]
pub async fn home(session: Session) -> impl IntoResponse {
    let cart = CartPersistence::new(SessionSlot::new(session)).load().await;

    IndexTemplate {
        products: showcase(),
        count: cart.item_count(),
    }
}
