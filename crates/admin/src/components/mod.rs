//! Reusable view models shared by list pages.
//!
//! - `controls` - Sort and filter selectors for list toolbars
//! - `pagination` - Page links under a list

pub mod controls;
pub mod pagination;

pub use controls::{SelectOption, sort_options};
pub use pagination::{PageLink, Pagination};
