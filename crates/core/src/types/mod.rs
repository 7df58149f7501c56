//! Catalog types for the shop console.
//!
//! This module mirrors the JSON resources of the catalog API.

pub mod category;
pub mod id;
pub mod page;
pub mod price;
pub mod product;
pub mod shop;
pub mod toast;
pub mod validation;

pub use category::{Category, MinimalCategory};
pub use id::*;
pub use page::{Page, PageEnvelope, Pageable, expected_total_pages};
pub use price::Price;
pub use product::{
    CategoryRef, Locale, LocalizedProduct, MinimalProduct, Product, ProductText, ShopRef,
};
pub use shop::{MinimalShop, OpeningHours, Shop, day_name, parse_time};
pub use toast::{Severity, Toast};
pub use validation::ValidationErrors;
