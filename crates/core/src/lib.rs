//! Shop Console Core - Catalog types.
//!
//! This crate provides the types shared by the console components:
//! - `admin` - Server-rendered administration console
//! - `cli` - Command-line client for the catalog API
//!
//! # Architecture
//!
//! The core crate contains only types and pure validation - no I/O and no
//! HTTP clients. Everything here mirrors the JSON shapes of the catalog REST
//! API so both the console and the CLI deserialize the same structures.
//!
//! # Modules
//!
//! - [`types`] - Entity IDs, shops, products, categories, pages and toasts

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
