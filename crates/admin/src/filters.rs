//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

/// Turns an ISO weekday number (1 = Monday) into its English name.
///
/// Usage in templates: `{{ slot.day|weekday }}`
#[askama::filter_fn]
pub fn weekday(value: impl Display, _env: &dyn askama::Values) -> askama::Result<&'static str> {
    Ok(value
        .to_string()
        .parse::<u8>()
        .map_or("?", shop_console_core::day_name))
}

