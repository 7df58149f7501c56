//! List views: query state, fetch strategy and the controller driving them.

mod controller;
mod query;

pub use controller::{ListController, ListInput, ListSettings, ListSource, ListView, ViewClosed};
pub use query::{ListQuery, ListRequest, ListStrategy, search_fragment};
