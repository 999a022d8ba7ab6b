//! Remote cart rows and the cart page view built from them.

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

use kiro_core::{CartRowId, CurrencyCode, Price, ProductId, SessionId};

use super::catalog::Product;

/// A row of the `cart_items` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, FromRow)]
pub struct CartRow {
    pub id: CartRowId,
    pub session_id: SessionId,
    pub product_id: ProductId,
    pub quantity: i32,
}

/// A cart row joined with its product. The product is absent if it has been
/// deleted from the catalog since it was added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartLine {
    pub id: CartRowId,
    pub product_id: ProductId,
    pub quantity: i32,
    pub product: Option<Product>,
}

impl CartLine {
    /// `price × quantity`, or zero if the product is gone.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.product
            .as_ref()
            .map_or(Decimal::ZERO, |product| {
                product.price * Decimal::from(self.quantity)
            })
    }
}

/// Every line in a visitor's remote cart with the derived total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartLines {
    pub lines: Vec<CartLine>,
    pub item_count: i64,
    pub total: Decimal,
    pub formatted_total: String,
}

impl CartLines {
    /// Derive count and total from the lines.
    #[must_use]
    pub fn new(lines: Vec<CartLine>) -> Self {
        let item_count = lines.iter().map(|line| i64::from(line.quantity)).sum();
        let total = lines.iter().map(CartLine::line_total).sum();

        Self {
            lines,
            item_count,
            total,
            formatted_total: Price::new(total, CurrencyCode::default()).display(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
