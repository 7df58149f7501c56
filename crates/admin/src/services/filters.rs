//! Filter expressions for list endpoints.
//!
//! A filter expression is a query-string fragment appended to a list URL,
//! always starting with `&`. An empty filter yields no expression.

use chrono::NaiveDate;
use shop_console_core::{CategoryId, ShopId};

/// Filters accepted by `GET /shops`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShopFilter {
    pub in_vacations: Option<bool>,
    pub created_after: Option<NaiveDate>,
    pub created_before: Option<NaiveDate>,
}

impl ShopFilter {
    /// Encode as a filter expression, or `None` when nothing is set.
    #[must_use]
    pub fn expression(&self) -> Option<String> {
        let mut out = String::new();
        if let Some(in_vacations) = self.in_vacations {
            out.push_str(&format!("&inVacations={in_vacations}"));
        }
        if let Some(after) = self.created_after {
            out.push_str(&format!("&createdAfter={}", after.format("%Y-%m-%d")));
        }
        if let Some(before) = self.created_before {
            out.push_str(&format!("&createdBefore={}", before.format("%Y-%m-%d")));
        }
        (!out.is_empty()).then_some(out)
    }
}

/// Filters accepted by `GET /products`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProductFilter {
    pub shop_id: Option<ShopId>,
    pub category_id: Option<CategoryId>,
}

impl ProductFilter {
    /// Products of one shop.
    #[must_use]
    pub const fn shop(shop_id: ShopId) -> Self {
        Self {
            shop_id: Some(shop_id),
            category_id: None,
        }
    }

    /// Encode as a filter expression, or `None` when nothing is set.
    #[must_use]
    pub fn expression(&self) -> Option<String> {
        let mut out = String::new();
        if let Some(shop_id) = self.shop_id {
            out.push_str(&format!("&shopId={shop_id}"));
        }
        if let Some(category_id) = self.category_id {
            out.push_str(&format!("&categoryId={category_id}"));
        }
        (!out.is_empty()).then_some(out)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_filters_have_no_expression() {
        assert_eq!(ShopFilter::default().expression(), None);
        assert_eq!(ProductFilter::default().expression(), None);
    }

    #[test]
    fn test_shop_filter_encodes_in_api_order() {
        let filter = ShopFilter {
            in_vacations: Some(false),
            created_after: NaiveDate::from_ymd_opt(2024, 1, 1),
            created_before: NaiveDate::from_ymd_opt(2024, 12, 31),
        };
        assert_eq!(
            filter.expression().unwrap(),
            "&inVacations=false&createdAfter=2024-01-01&createdBefore=2024-12-31"
        );
    }

    #[test]
    fn test_product_filter_combines_shop_and_category() {
        let filter = ProductFilter {
            shop_id: Some(ShopId::new(3)),
            category_id: Some(CategoryId::new(7)),
        };
        assert_eq!(filter.expression().unwrap(), "&shopId=3&categoryId=7");
        assert_eq!(
            ProductFilter::shop(ShopId::new(3)).expression().unwrap(),
            "&shopId=3"
        );
    }
}
