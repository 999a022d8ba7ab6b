//! Catalog repository: read-only product, category and review queries.
//!
//! Nothing is cached here. Every call is a fresh read, so any change to the
//! filter or sort order is reflected immediately.

use sqlx::{PgPool, Postgres, QueryBuilder};

use kiro_core::{CategoryId, ProductId};

use super::RepositoryError;
use crate::models::{Category, Product, ProductDetail, Review};

/// Number of reviews shown on a product page.
pub const REVIEW_LIMIT: i64 = 5;

const PRODUCT_COLUMNS: &str =
    "id, name, description, price, image_url, rating, reviews_count, stock, category_id";

/// Sort order for product listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProductSort {
    /// Name, A to Z.
    #[default]
    Name,
    /// Cheapest first.
    PriceAsc,
    /// Most expensive first.
    PriceDesc,
    /// Best rated first.
    Rating,
}

impl ProductSort {
    /// Parse a sort key; anything unrecognised sorts by name.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "price-asc" => Self::PriceAsc,
            "price-desc" => Self::PriceDesc,
            "rating" => Self::Rating,
            _ => Self::Name,
        }
    }

    const fn order_by(self) -> &'static str {
        match self {
            Self::Name => " ORDER BY name ASC",
            Self::PriceAsc => " ORDER BY price ASC, name ASC",
            Self::PriceDesc => " ORDER BY price DESC, name ASC",
            Self::Rating => " ORDER BY rating DESC NULLS LAST, name ASC",
        }
    }
}

/// Filters for a product listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductQuery {
    /// Case-insensitive substring of the product name.
    pub search: Option<String>,
    /// Exact category.
    pub category_id: Option<CategoryId>,
    pub sort: ProductSort,
}

/// Escape `LIKE` wildcards so the search term matches literally.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn build_product_query(query: &ProductQuery) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE TRUE"));

    if let Some(search) = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        builder
            .push(" AND name ILIKE ")
            .push_bind(format!("%{}%", escape_like(search)))
            .push(" ESCAPE '\\'");
    }

    if let Some(category_id) = query.category_id {
        builder.push(" AND category_id = ").push_bind(category_id);
    }

    builder.push(query.sort.order_by());
    builder
}

/// Repository for catalog reads.
pub struct CatalogRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CatalogRepository<'a> {
    /// Create a new catalog repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List products matching the filters, in the requested order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_products(&self, query: &ProductQuery) -> Result<Vec<Product>, RepositoryError> {
        let products = build_product_query(query)
            .build_query_as::<Product>()
            .fetch_all(self.pool)
            .await?;

        Ok(products)
    }

    /// Get a product with its category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_product(&self, id: ProductId) -> Result<Option<ProductDetail>, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        let Some(product) = product else {
            return Ok(None);
        };

        let category = match product.category_id {
            Some(category_id) => {
                sqlx::query_as::<_, Category>(
                    r"
                    SELECT id, name, description, image_url
                    FROM categories
                    WHERE id = $1
                    ",
                )
                .bind(category_id)
                .fetch_optional(self.pool)
                .await?
            }
            None => None,
        };

        Ok(Some(ProductDetail { product, category }))
    }

    /// List every category by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_categories(&self) -> Result<Vec<Category>, RepositoryError> {
        let categories = sqlx::query_as::<_, Category>(
            r"
            SELECT id, name, description, image_url
            FROM categories
            ORDER BY name ASC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(categories)
    }

    /// The most recent reviews for a product, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_reviews(&self, product_id: ProductId) -> Result<Vec<Review>, RepositoryError> {
        let reviews = sqlx::query_as::<_, Review>(
            r"
            SELECT id, product_id, author_name, rating, comment, created_at
            FROM reviews
            WHERE product_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            ",
        )
        .bind(product_id)
        .bind(REVIEW_LIMIT)
        .fetch_all(self.pool)
        .await?;

        Ok(reviews)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_parse() {
        assert_eq!(ProductSort::parse("name"), ProductSort::Name);
        assert_eq!(ProductSort::parse("price-asc"), ProductSort::PriceAsc);
        assert_eq!(ProductSort::parse("price-desc"), ProductSort::PriceDesc);
        assert_eq!(ProductSort::parse("rating"), ProductSort::Rating);
        assert_eq!(ProductSort::parse(""), ProductSort::Name);
        assert_eq!(ProductSort::parse("popularity"), ProductSort::Name);
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("laptop"), "laptop");
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like("usb_c"), "usb\\_c");
        assert_eq!(escape_like("a\\b"), "a\\\\b");
    }

    #[test]
    fn test_default_query_sorts_by_name() {
        let builder = build_product_query(&ProductQuery::default());
        let sql = builder.sql();
        assert!(sql.starts_with("SELECT id, name"));
        assert!(!sql.contains("ILIKE"));
        assert!(!sql.contains("category_id ="));
        assert!(sql.ends_with("ORDER BY name ASC"));
    }

    #[test]
    fn test_filters_are_bound() {
        let builder = build_product_query(&ProductQuery {
            search: Some("phone".to_string()),
            category_id: Some(CategoryId::generate()),
            sort: ProductSort::PriceDesc,
        });
        let sql = builder.sql();
        assert!(sql.contains("AND name ILIKE $1 ESCAPE '\\'"));
        assert!(sql.contains("AND category_id = $2"));
        assert!(sql.ends_with("ORDER BY price DESC, name ASC"));
        assert!(!sql.contains("phone"));
    }

    #[test]
    fn test_blank_search_is_ignored() {
        let builder = build_product_query(&ProductQuery {
            search: Some("   ".to_string()),
            ..ProductQuery::default()
        });
        assert!(!builder.sql().contains("ILIKE"));
    }

    #[test]
    fn test_rating_sort_puts_unrated_last() {
        let builder = build_product_query(&ProductQuery {
            sort: ProductSort::Rating,
            ..ProductQuery::default()
        });
        assert!(builder.sql().contains("rating DESC NULLS LAST"));
    }
}
