//! Catalog services.
//!
//! # Services
//!
//! - `catalog` - Generic list and CRUD operations over one REST resource
//! - `filters` - Filter expressions for shop and product lists
//! - `products` - Product lists scoped to a shop or category

pub mod catalog;
pub mod filters;
mod products;

pub use catalog::{CatalogEntity, CatalogService, CategoryService, ProductService, ShopService};
pub use filters::{ProductFilter, ShopFilter};
