//! Products, their localizations and references to shops and categories.

use serde::{Deserialize, Serialize};

use super::category::Category;
use super::id::{CategoryId, ProductId, ShopId};
use super::price::Price;
use super::validation::{ValidationErrors, require_text};

/// Locales a product can be described in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Locale {
    #[default]
    Fr,
    En,
}

impl Locale {
    /// All supported locales, in display order.
    pub const ALL: [Self; 2] = [Self::Fr, Self::En];

    /// Wire code (`FR`, `EN`).
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Fr => "FR",
            Self::En => "EN",
        }
    }
}

impl std::fmt::Display for Locale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "FR" => Ok(Self::Fr),
            "EN" => Ok(Self::En),
            other => Err(format!("unsupported locale: {other}")),
        }
    }
}

/// Name and description of a product in one locale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalizedProduct {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub locale: Locale,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Back-reference from a product to the shop that sells it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopRef {
    pub id: ShopId,
    #[serde(default)]
    pub name: Option<String>,
}

/// Reference to a category by id, as sent in product drafts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRef {
    pub id: CategoryId,
}

/// A product as returned by the catalog API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub price: Price,
    #[serde(default)]
    pub localized_products: Vec<LocalizedProduct>,
    #[serde(default)]
    pub shop: Option<ShopRef>,
    #[serde(default)]
    pub categories: Vec<Category>,
}

/// Product text resolved for one locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductText<'a> {
    pub name: &'a str,
    pub description: Option<&'a str>,
}

impl Product {
    /// Name and description in `locale`, falling back to the first
    /// localization when the product is not translated.
    #[must_use]
    pub fn localized(&self, locale: Locale) -> ProductText<'_> {
        self.localized_products
            .iter()
            .find(|l| l.locale == locale)
            .or_else(|| self.localized_products.first())
            .map_or(
                ProductText {
                    name: "",
                    description: None,
                },
                |l| ProductText {
                    name: &l.name,
                    description: l.description.as_deref().filter(|d| !d.is_empty()),
                },
            )
    }
}

/// Draft used to create or edit a product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MinimalProduct {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ProductId>,
    pub price: Price,
    pub localized_products: Vec<LocalizedProduct>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shop: Option<ShopRef>,
    #[serde(default)]
    pub categories: Vec<CategoryRef>,
}

impl From<Product> for MinimalProduct {
    fn from(product: Product) -> Self {
        Self {
            id: Some(product.id),
            price: product.price,
            localized_products: product.localized_products,
            shop: product.shop,
            categories: product
                .categories
                .iter()
                .map(|c| CategoryRef { id: c.id })
                .collect(),
        }
    }
}

impl MinimalProduct {
    /// Validate the draft before submission.
    ///
    /// At least one localization is required and every localization needs a
    /// name. Localization errors are keyed `name.<LOCALE>`.
    ///
    /// # Errors
    ///
    /// Returns the failing fields.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.price.is_negative() {
            errors.add("price", "Price must be positive");
        }
        if self.localized_products.is_empty() {
            errors.add("name", "At least one translation is required");
        }
        for localized in &self.localized_products {
            require_text(&mut errors, &format!("name.{}", localized.locale), &localized.name);
        }
        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product() -> Product {
        serde_json::from_str(
            r#"{
                "id": 11,
                "price": 4.5,
                "localizedProducts": [
                    {"locale": "FR", "name": "Pain", "description": ""},
                    {"locale": "EN", "name": "Bread", "description": "Fresh"}
                ],
                "shop": {"id": 2, "name": "Boulangerie"},
                "categories": [{"id": 1, "name": "Food"}]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_localized_picks_requested_locale() {
        let product = product();
        let en = product.localized(Locale::En);
        assert_eq!(en.name, "Bread");
        assert_eq!(en.description, Some("Fresh"));
        assert_eq!(product.localized(Locale::Fr).description, None);
    }

    #[test]
    fn test_localized_falls_back_to_first_translation() {
        let mut product = product();
        product.localized_products.retain(|l| l.locale == Locale::En);
        assert_eq!(product.localized(Locale::Fr).name, "Bread");
    }

    #[test]
    fn test_draft_keeps_category_ids_only() {
        let draft = MinimalProduct::from(product());
        let value = serde_json::to_value(&draft).unwrap();
        assert_eq!(value["categories"], serde_json::json!([{"id": 1}]));
        assert_eq!(value["id"], 11);
    }

    #[test]
    fn test_validate_requires_a_named_translation() {
        let draft = MinimalProduct {
            localized_products: vec![LocalizedProduct {
                id: None,
                locale: Locale::En,
                name: " ".to_string(),
                description: None,
            }],
            ..MinimalProduct::default()
        };
        let errors = draft.validate().unwrap_err();
        assert!(errors.get("name.EN").is_some());
        assert!(MinimalProduct::default().validate().unwrap_err().get("name").is_some());
    }
}
