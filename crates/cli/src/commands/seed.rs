//! Seed the catalog from a YAML file.
//!
//! Categories are upserted by name. A product is only inserted if its
//! category has no product of the same name yet, so running the command
//! twice leaves the catalog unchanged. Reviews are inserted together with
//! their new product and `reviews_count` is recomputed at the end.

use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::{Postgres, Transaction};
use tracing::{error, info};

use kiro_core::{CategoryId, ProductId};

use super::connect;

/// Catalog bundled with the CLI, used when no file is given.
const DEMO_CATALOG: &str = include_str!("../../seed/catalog.yaml");

/// Top level of a catalog file.
#[derive(Debug, Deserialize)]
pub struct CatalogSeed {
    pub categories: Vec<CategorySeed>,
}

#[derive(Debug, Deserialize)]
pub struct CategorySeed {
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub products: Vec<ProductSeed>,
}

#[derive(Debug, Deserialize)]
pub struct ProductSeed {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub image_url: Option<String>,
    pub rating: Option<Decimal>,
    #[serde(default)]
    pub stock: i32,
    #[serde(default)]
    pub reviews: Vec<ReviewSeed>,
}

#[derive(Debug, Deserialize)]
pub struct ReviewSeed {
    pub author_name: String,
    pub rating: i32,
    pub comment: Option<String>,
}

/// What a seed run inserted.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub categories: usize,
    pub products: usize,
    pub skipped_products: usize,
    pub reviews: usize,
}

/// Check a parsed catalog before touching the database.
///
/// Returns one message per problem found.
pub fn validate(catalog: &CatalogSeed) -> Vec<String> {
    let mut errors = Vec::new();

    for category in &catalog.categories {
        if category.name.trim().is_empty() {
            errors.push("category with an empty name".to_string());
        }
        for product in &category.products {
            let label = format!("{} / {}", category.name, product.name);
            if product.name.trim().is_empty() {
                errors.push(format!("{}: product with an empty name", category.name));
            }
            if product.price <= Decimal::ZERO {
                errors.push(format!("{label}: price must be positive"));
            }
            if let Some(rating) = product.rating
                && !(Decimal::ZERO..=Decimal::from(5)).contains(&rating)
            {
                errors.push(format!("{label}: rating must be between 0 and 5"));
            }
            if product.stock < 0 {
                errors.push(format!("{label}: stock cannot be negative"));
            }
            for review in &product.reviews {
                if !(1..=5).contains(&review.rating) {
                    errors.push(format!(
                        "{label}: review by {} must be rated 1 to 5",
                        review.author_name
                    ));
                }
            }
        }
    }

    errors
}

/// Parse a catalog document.
///
/// # Errors
///
/// Returns an error if the YAML does not match the catalog shape.
pub fn parse(content: &str) -> Result<CatalogSeed, serde_yaml::Error> {
    serde_yaml::from_str(content)
}

/// Seed the catalog from `file`, or from the bundled demo catalog.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, validation fails,
/// or a database operation fails. Nothing is written unless every insert
/// succeeds.
pub async fn run(file: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let content = match file {
        Some(path) => {
            info!(path = %path.display(), "Loading catalog from file");
            tokio::fs::read_to_string(path).await?
        }
        None => {
            info!("Loading bundled demo catalog");
            DEMO_CATALOG.to_string()
        }
    };

    let catalog = parse(&content)?;
    info!(categories = catalog.categories.len(), "Parsed catalog");

    let errors = validate(&catalog);
    if !errors.is_empty() {
        error!("Catalog validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        return Err(format!("{} validation errors found", errors.len()).into());
    }

    let pool = connect().await?;
    let mut tx = pool.begin().await?;
    let report = seed_catalog(&mut tx, &catalog).await?;
    tx.commit().await?;

    info!(
        categories = report.categories,
        products = report.products,
        skipped_products = report.skipped_products,
        reviews = report.reviews,
        "Seeding complete"
    );
    Ok(())
}

async fn seed_catalog(
    tx: &mut Transaction<'_, Postgres>,
    catalog: &CatalogSeed,
) -> Result<SeedReport, sqlx::Error> {
    let mut report = SeedReport::default();

    for category in &catalog.categories {
        let category_id = sqlx::query_scalar::<_, CategoryId>(
            r"
            INSERT INTO categories (name, description, image_url)
            VALUES ($1, $2, $3)
            ON CONFLICT (name) DO UPDATE
                SET description = EXCLUDED.description,
                    image_url = EXCLUDED.image_url
            RETURNING id
            ",
        )
        .bind(&category.name)
        .bind(&category.description)
        .bind(&category.image_url)
        .fetch_one(&mut **tx)
        .await?;
        report.categories += 1;

        for product in &category.products {
            let Some(product_id) = insert_product(tx, category_id, product).await? else {
                report.skipped_products += 1;
                continue;
            };
            report.products += 1;

            for review in &product.reviews {
                sqlx::query(
                    r"
                    INSERT INTO reviews (product_id, author_name, rating, comment)
                    VALUES ($1, $2, $3, $4)
                    ",
                )
                .bind(product_id)
                .bind(&review.author_name)
                .bind(review.rating)
                .bind(&review.comment)
                .execute(&mut **tx)
                .await?;
                report.reviews += 1;
            }
        }
    }

    sqlx::query(
        r"
        UPDATE products p
        SET reviews_count = (SELECT COUNT(*) FROM reviews r WHERE r.product_id = p.id)
        ",
    )
    .execute(&mut **tx)
    .await?;

    Ok(report)
}

/// Insert a product unless its category already has one with that name.
async fn insert_product(
    tx: &mut Transaction<'_, Postgres>,
    category_id: CategoryId,
    product: &ProductSeed,
) -> Result<Option<ProductId>, sqlx::Error> {
    sqlx::query_scalar::<_, ProductId>(
        r"
        INSERT INTO products (name, description, price, image_url, rating, stock, category_id)
        SELECT $1, $2, $3, $4, $5, $6, $7
        WHERE NOT EXISTS (
            SELECT 1 FROM products WHERE name = $1 AND category_id = $7
        )
        RETURNING id
        ",
    )
    .bind(&product.name)
    .bind(&product.description)
    .bind(product.price)
    .bind(&product.image_url)
    .bind(product.rating)
    .bind(product.stock)
    .bind(category_id)
    .fetch_optional(&mut **tx)
    .await
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_catalog_is_valid() {
        let catalog = parse(DEMO_CATALOG).unwrap();

        assert!(validate(&catalog).is_empty());
        assert_eq!(catalog.categories.len(), 3);

        let laptop = &catalog.categories[0].products[0];
        assert_eq!(laptop.name, "HP Laptop");
        assert_eq!(laptop.price, Decimal::from(49_999));
        assert_eq!(laptop.reviews.len(), 2);
    }

    #[test]
    fn test_optional_fields_default() {
        let catalog = parse(
            r"
categories:
  - name: Cables
    products:
      - name: HDMI Cable
        price: 299
",
        )
        .unwrap();

        let product = &catalog.categories[0].products[0];
        assert_eq!(product.stock, 0);
        assert!(product.rating.is_none());
        assert!(product.reviews.is_empty());
    }

    #[test]
    fn test_validate_reports_each_problem() {
        let catalog = parse(
            r"
categories:
  - name: Phones
    products:
      - name: Broken
        price: 0
        rating: 7
        stock: -1
        reviews:
          - author_name: Sam
            rating: 9
",
        )
        .unwrap();

        let errors = validate(&catalog);
        assert_eq!(errors.len(), 4);
        assert!(errors[0].contains("price must be positive"));
    }

    #[test]
    fn test_rejects_unknown_shape() {
        assert!(parse("products: []").is_err());
    }
}
