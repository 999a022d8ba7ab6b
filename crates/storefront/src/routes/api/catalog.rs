//! Catalog API routes.
//!
//! Read-only JSON endpoints over [`CatalogRepository`]. Every request is a
//! fresh query.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use tracing::instrument;

use kiro_core::{CategoryId, ProductId};

use crate::db::CatalogRepository;
use crate::db::catalog::{ProductQuery, ProductSort};
use crate::error::{AppError, Result};
use crate::models::{Category, Product, ProductDetail, Review};
use crate::state::AppState;

/// Query string for the product listing.
#[derive(Debug, Default, Deserialize)]
pub struct ProductListParams {
    pub search: Option<String>,
    pub category: Option<String>,
    pub sort: Option<String>,
}

impl ProductListParams {
    /// Convert to a repository query.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` if `category` is not a valid id.
    pub fn into_query(self) -> Result<ProductQuery> {
        let category_id = self
            .category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(|c| {
                c.parse::<CategoryId>()
                    .map_err(|_| AppError::BadRequest(format!("invalid category id: {c}")))
            })
            .transpose()?;

        Ok(ProductQuery {
            search: self.search,
            category_id,
            sort: self.sort.as_deref().map(ProductSort::parse).unwrap_or_default(),
        })
    }
}

/// List products, filtered and sorted.
#[instrument(skip(state))]
pub async fn list_products(
    State(state): State<AppState>,
    Query(params): Query<ProductListParams>,
) -> Result<Json<Vec<Product>>> {
    let query = params.into_query()?;
    let products = CatalogRepository::new(state.pool())
        .list_products(&query)
        .await?;
    Ok(Json(products))
}

/// A single product with its category.
#[instrument(skip(state))]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<ProductDetail>> {
    CatalogRepository::new(state.pool())
        .get_product(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))
}

/// The latest reviews for a product.
#[instrument(skip(state))]
pub async fn list_reviews(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Vec<Review>>> {
    let reviews = CatalogRepository::new(state.pool()).list_reviews(id).await?;
    Ok(Json(reviews))
}

/// Every category, by name.
#[instrument(skip(state))]
pub async fn list_categories(State(state): State<AppState>) -> Result<Json<Vec<Category>>> {
    let categories = CatalogRepository::new(state.pool()).list_categories().await?;
    Ok(Json(categories))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_params_default_to_name_sort() {
        let query = ProductListParams::default().into_query().unwrap();
        assert_eq!(query, ProductQuery::default());
    }

    #[test]
    fn test_params_parse_category_and_sort() {
        let category_id = CategoryId::generate();
        let query = ProductListParams {
            search: Some("lap".to_string()),
            category: Some(category_id.to_string()),
            sort: Some("price-desc".to_string()),
        }
        .into_query()
        .unwrap();

        assert_eq!(query.category_id, Some(category_id));
        assert_eq!(query.sort, ProductSort::PriceDesc);
        assert_eq!(query.search.as_deref(), Some("lap"));
    }

    #[test]
    fn test_params_unknown_sort_falls_back() {
        let query = ProductListParams {
            sort: Some("cheapest".to_string()),
            ..ProductListParams::default()
        }
        .into_query()
        .unwrap();
        assert_eq!(query.sort, ProductSort::Name);
    }

    #[test]
    fn test_params_blank_category_is_ignored() {
        let query = ProductListParams {
            category: Some(" ".to_string()),
            ..ProductListParams::default()
        }
        .into_query()
        .unwrap();
        assert!(query.category_id.is_none());
    }

    #[test]
    fn test_params_invalid_category() {
        let err = ProductListParams {
            category: Some("electronics".to_string()),
            ..ProductListParams::default()
        }
        .into_query()
        .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
