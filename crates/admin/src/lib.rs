//! Shop Console Admin library.
//!
//! This crate provides the administration console as a library, allowing it
//! to be tested and reused by the CLI.
//!
//! # Layers
//!
//! - [`api`] - HTTP client for the catalog REST API
//! - [`services`] - Typed shop/product/category endpoints
//! - [`list`] - Paginated, sortable, filterable, searchable list controller
//! - [`notifications`] and [`loading`] - Toast slot and in-flight indicator
//! - [`live`] and [`routes`] - Server-rendered pages with live list views

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod components;
pub mod config;
pub mod error;
pub mod filters;
pub mod list;
pub mod live;
pub mod loading;
pub mod notifications;
pub mod routes;
pub mod services;
pub mod state;
