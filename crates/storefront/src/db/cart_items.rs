//! Cart item repository for the remote cart.
//!
//! Each visitor's cart is the set of `cart_items` rows carrying their
//! session id. The table has a unique constraint on `(session_id,
//! product_id)`, and [`CartItemRepository::increment`] is a single
//! `INSERT ... ON CONFLICT` statement, so two concurrent adds of the same
//! product always end up as one row.

use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};

use kiro_core::{CartRowId, CategoryId, ProductId, SessionId};

use super::RepositoryError;
use crate::models::{CartLine, CartRow, Product};

/// A cart row left-joined with its product.
#[derive(FromRow)]
struct CartLineRow {
    id: CartRowId,
    product_id: ProductId,
    quantity: i32,
    product_name: Option<String>,
    product_description: Option<String>,
    product_price: Option<Decimal>,
    product_image_url: Option<String>,
    product_rating: Option<Decimal>,
    product_reviews_count: Option<i32>,
    product_stock: Option<i32>,
    product_category_id: Option<CategoryId>,
}

impl From<CartLineRow> for CartLine {
    fn from(row: CartLineRow) -> Self {
        let product = match (row.product_name, row.product_price) {
            (Some(name), Some(price)) => Some(Product {
                id: row.product_id,
                name,
                description: row.product_description,
                price,
                image_url: row.product_image_url,
                rating: row.product_rating,
                reviews_count: row.product_reviews_count.unwrap_or(0),
                stock: row.product_stock.unwrap_or(0),
                category_id: row.product_category_id,
            }),
            _ => None,
        };

        Self {
            id: row.id,
            product_id: row.product_id,
            quantity: row.quantity,
            product,
        }
    }
}

/// Repository for cart row database operations.
pub struct CartItemRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartItemRepository<'a> {
    /// Create a new cart item repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Add one unit of a product: insert a row with quantity 1, or bump the
    /// existing row for the same session and product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the product does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn increment(
        &self,
        session_id: SessionId,
        product_id: ProductId,
    ) -> Result<CartRow, RepositoryError> {
        sqlx::query_as::<_, CartRow>(
            r"
            INSERT INTO cart_items (session_id, product_id, quantity)
            VALUES ($1, $2, 1)
            ON CONFLICT (session_id, product_id)
            DO UPDATE SET quantity = cart_items.quantity + EXCLUDED.quantity,
                          updated_at = NOW()
            RETURNING id, session_id, product_id, quantity
            ",
        )
        .bind(session_id)
        .bind(product_id)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_foreign_key_violation()
            {
                return RepositoryError::Conflict(format!("unknown product {product_id}"));
            }
            RepositoryError::Database(e)
        })
    }

    /// Sum of quantities across the session's rows.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self, session_id: SessionId) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar::<_, i64>(
            r"
            SELECT COALESCE(SUM(quantity), 0)::BIGINT
            FROM cart_items
            WHERE session_id = $1
            ",
        )
        .bind(session_id)
        .fetch_one(self.pool)
        .await?;

        Ok(count)
    }

    /// Every row for the session, joined with its product, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_lines(&self, session_id: SessionId) -> Result<Vec<CartLine>, RepositoryError> {
        let rows = sqlx::query_as::<_, CartLineRow>(
            r"
            SELECT c.id, c.product_id, c.quantity,
                   p.name AS product_name,
                   p.description AS product_description,
                   p.price AS product_price,
                   p.image_url AS product_image_url,
                   p.rating AS product_rating,
                   p.reviews_count AS product_reviews_count,
                   p.stock AS product_stock,
                   p.category_id AS product_category_id
            FROM cart_items c
            LEFT JOIN products p ON p.id = c.product_id
            WHERE c.session_id = $1
            ORDER BY c.created_at ASC, c.id ASC
            ",
        )
        .bind(session_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(CartLine::from).collect())
    }

    /// Set the quantity of one of the session's rows.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the row doesn't exist or belongs
    /// to another session.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn set_quantity(
        &self,
        session_id: SessionId,
        row_id: CartRowId,
        quantity: i32,
    ) -> Result<CartRow, RepositoryError> {
        sqlx::query_as::<_, CartRow>(
            r"
            UPDATE cart_items
            SET quantity = $3, updated_at = NOW()
            WHERE id = $1 AND session_id = $2
            RETURNING id, session_id, product_id, quantity
            ",
        )
        .bind(row_id)
        .bind(session_id)
        .bind(quantity)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Delete one of the session's rows.
    ///
    /// # Returns
    ///
    /// Returns `true` if the row was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(
        &self,
        session_id: SessionId,
        row_id: CartRowId,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            DELETE FROM cart_items
            WHERE id = $1 AND session_id = $2
            ",
        )
        .bind(row_id)
        .bind(session_id)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
