//! Product-specific list endpoints.

use shop_console_core::{CategoryId, Page, Product, ShopId};
use tracing::instrument;

use super::catalog::ProductService;
use super::filters::ProductFilter;
use crate::api::ApiError;

impl ProductService {
    /// One page of the products sold by a shop.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self))]
    pub async fn list_by_shop(
        &self,
        shop_id: ShopId,
        page: u32,
        size: u32,
    ) -> Result<Page<Product>, ApiError> {
        self.list_matching(ProductFilter::shop(shop_id), page, size)
            .await
    }

    /// One page of a shop's products within one category.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self))]
    pub async fn list_by_shop_and_category(
        &self,
        shop_id: ShopId,
        category_id: CategoryId,
        page: u32,
        size: u32,
    ) -> Result<Page<Product>, ApiError> {
        let filter = ProductFilter {
            shop_id: Some(shop_id),
            category_id: Some(category_id),
        };
        self.list_matching(filter, page, size).await
    }

    /// One page of products matching `filter`; unfiltered when it is empty.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    pub async fn list_matching(
        &self,
        filter: ProductFilter,
        page: u32,
        size: u32,
    ) -> Result<Page<Product>, ApiError> {
        match filter.expression() {
            Some(expression) => self.list_filtered(page, size, &expression).await,
            None => self.list(page, size).await,
        }
    }
}
