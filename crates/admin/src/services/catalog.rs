//! Generic CRUD service over one catalog resource.

use std::fmt::{Debug, Display};
use std::future::Future;
use std::marker::PhantomData;

use serde::Serialize;
use serde::de::DeserializeOwned;
use shop_console_core::{
    Category, CategoryId, MinimalCategory, MinimalProduct, MinimalShop, Page, PageEnvelope,
    Product, ProductId, Shop, ShopId,
};
use tracing::{info, instrument};

use crate::api::{ApiClient, ApiError};
use crate::list::{ListRequest, ListSource, ListStrategy, search_fragment};

/// A catalog resource served under `/{RESOURCE}`.
pub trait CatalogEntity: DeserializeOwned + Clone + Send + Sync + 'static {
    /// Path segment of the collection (`shops`, `products`, `categories`).
    const RESOURCE: &'static str;
    /// Singular name for log and toast messages.
    const LABEL: &'static str;

    type Id: Debug + Display + Copy + Send + Sync + 'static;
    /// Payload accepted by create and update.
    type Draft: Serialize + Send + Sync;

    /// Id carried by a draft, if it refers to an existing entity.
    fn draft_id(draft: &Self::Draft) -> Option<Self::Id>;
}

impl CatalogEntity for Shop {
    const RESOURCE: &'static str = "shops";
    const LABEL: &'static str = "shop";
    type Id = ShopId;
    type Draft = MinimalShop;

    fn draft_id(draft: &MinimalShop) -> Option<ShopId> {
        draft.id
    }
}

impl CatalogEntity for Product {
    const RESOURCE: &'static str = "products";
    const LABEL: &'static str = "product";
    type Id = ProductId;
    type Draft = MinimalProduct;

    fn draft_id(draft: &MinimalProduct) -> Option<ProductId> {
        draft.id
    }
}

impl CatalogEntity for Category {
    const RESOURCE: &'static str = "categories";
    const LABEL: &'static str = "category";
    type Id = CategoryId;
    type Draft = MinimalCategory;

    fn draft_id(draft: &MinimalCategory) -> Option<CategoryId> {
        draft.id
    }
}

/// CRUD and list operations for one resource.
pub struct CatalogService<E> {
    client: ApiClient,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for CatalogService<E> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E: CatalogEntity> std::fmt::Debug for CatalogService<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogService")
            .field("resource", &E::RESOURCE)
            .finish_non_exhaustive()
    }
}

/// Shop endpoints.
pub type ShopService = CatalogService<Shop>;
/// Product endpoints.
pub type ProductService = CatalogService<Product>;
/// Category endpoints.
pub type CategoryService = CatalogService<Category>;

impl<E: CatalogEntity> CatalogService<E> {
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self {
            client,
            _entity: PhantomData,
        }
    }

    /// Fetch one unsorted, unfiltered page.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self), fields(resource = E::RESOURCE))]
    pub async fn list(&self, page: u32, size: u32) -> Result<Page<E>, ApiError> {
        self.fetch_page(&format!("{}?page={page}&size={size}", E::RESOURCE))
            .await
    }

    /// Fetch one page ordered by `sort_key`, optionally narrowed by name.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self), fields(resource = E::RESOURCE))]
    pub async fn list_sorted(
        &self,
        page: u32,
        size: u32,
        sort_key: &str,
        search: Option<&str>,
    ) -> Result<Page<E>, ApiError> {
        let search = search.map(search_fragment).unwrap_or_default();
        let path = format!(
            "{}?page={page}&size={size}&sortBy={}{search}",
            E::RESOURCE,
            urlencoding::encode(sort_key)
        );
        self.fetch_page(&path).await
    }

    /// Fetch one page narrowed by a raw filter expression.
    ///
    /// The expression is a query-string fragment such as
    /// `&inVacations=true&createdAfter=2024-01-01`, appended verbatim.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self), fields(resource = E::RESOURCE))]
    pub async fn list_filtered(&self, page: u32, size: u32, filter: &str) -> Result<Page<E>, ApiError> {
        let separator = if filter.is_empty() || filter.starts_with('&') {
            ""
        } else {
            "&"
        };
        let path = format!("{}?page={page}&size={size}{separator}{filter}", E::RESOURCE);
        self.fetch_page(&path).await
    }

    /// Fetch one entity.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` for an unknown id, or another `ApiError`
    /// if the request fails.
    #[instrument(skip(self), fields(resource = E::RESOURCE))]
    pub async fn get(&self, id: E::Id) -> Result<E, ApiError> {
        self.client.get_json(&format!("{}/{id}", E::RESOURCE)).await
    }

    /// Create an entity from a draft.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self, draft), fields(resource = E::RESOURCE))]
    pub async fn create(&self, draft: &E::Draft) -> Result<E, ApiError> {
        let created = self.client.post_json(E::RESOURCE, draft).await?;
        info!("Created {}", E::LABEL);
        Ok(created)
    }

    /// Replace an existing entity.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidArgument` without any network call when the
    /// draft has no id, or another `ApiError` if the request fails.
    #[instrument(skip(self, draft), fields(resource = E::RESOURCE))]
    pub async fn update(&self, draft: &E::Draft) -> Result<E, ApiError> {
        let Some(id) = E::draft_id(draft) else {
            return Err(ApiError::InvalidArgument(format!(
                "Cannot update a {} without an id",
                E::LABEL
            )));
        };
        let updated = self.client.put_json(E::RESOURCE, draft).await?;
        info!(%id, "Updated {}", E::LABEL);
        Ok(updated)
    }

    /// Delete an entity.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self), fields(resource = E::RESOURCE))]
    pub async fn remove(&self, id: E::Id) -> Result<(), ApiError> {
        self.client.delete(&format!("{}/{id}", E::RESOURCE)).await?;
        info!(%id, "Deleted {}", E::LABEL);
        Ok(())
    }

    async fn fetch_page(&self, path: &str) -> Result<Page<E>, ApiError> {
        let envelope: PageEnvelope<E> = self.client.get_json(path).await?;
        Ok(Page::from(envelope))
    }
}

impl<E: CatalogEntity> ListSource for CatalogService<E> {
    type Item = E;

    fn fetch(&self, request: ListRequest) -> impl Future<Output = Result<Page<E>, ApiError>> + Send {
        async move {
            let ListRequest {
                page_index,
                page_size,
                strategy,
            } = request;
            match strategy {
                ListStrategy::Sorted { sort_key, search } => {
                    self.list_sorted(page_index, page_size, &sort_key, search.as_deref())
                        .await
                }
                ListStrategy::Filtered { expression } => {
                    self.list_filtered(page_index, page_size, &expression).await
                }
                ListStrategy::Plain => self.list(page_index, page_size).await,
            }
        }
    }
}
