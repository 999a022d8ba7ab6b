//! Catalog rows: products, categories and reviews.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

use kiro_core::{CategoryId, CurrencyCode, Price, ProductId, ReviewId};

/// A product in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub image_url: Option<String>,
    pub rating: Option<Decimal>,
    pub reviews_count: i32,
    pub stock: i32,
    pub category_id: Option<CategoryId>,
}

impl Product {
    /// Price rendered for display.
    #[must_use]
    pub fn display_price(&self) -> String {
        Price::new(self.price, CurrencyCode::default()).display()
    }

    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }
}

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

/// A product together with its category, for the detail page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    pub category: Option<Category>,
}

/// A review left on a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Review {
    pub id: ReviewId,
    pub product_id: ProductId,
    pub author_name: String,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}
