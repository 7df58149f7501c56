//! Product route handlers.

use askama::Template;
use axum::{
    Router,
    extract::{Path, Query, RawForm, State},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::Deserialize;
use shop_console_core::{
    CategoryId, CategoryRef, Locale, LocalizedProduct, MinimalProduct, Price, Product, ProductId,
    ShopId, ShopRef, ValidationErrors,
};
use tracing::instrument;
use uuid::Uuid;

use super::forms::FormFields;
use super::{CHOICES_PAGE_SIZE, ListParams, mount_list, render};
use crate::components::{Pagination, SelectOption, sort_options};
use crate::error::AppError;
use crate::list::ListView;
use crate::live::{ListKind, LiveList};
use crate::state::AppState;

/// Build the products router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/products", get(index).post(create))
        .route("/products/new", get(new_product))
        .route("/products/{id}", get(show).post(update))
        .route("/products/{id}/edit", get(edit))
        .route("/products/{id}/delete", post(delete))
}

// =============================================================================
// View Models
// =============================================================================

/// Product card for list templates, in the console's display locale.
#[derive(Debug, Clone)]
pub struct ProductView {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub price: String,
    pub shop_id: Option<i64>,
    pub shop_name: String,
    pub categories: Vec<String>,
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        let text = product.localized(Locale::default());
        Self {
            id: product.id.as_i64(),
            name: if text.name.is_empty() {
                format!("Product #{}", product.id)
            } else {
                text.name.to_string()
            },
            description: text.description.unwrap_or_default().to_string(),
            price: product.price.to_string(),
            shop_id: product.shop.as_ref().map(|s| s.id.as_i64()),
            shop_name: product
                .shop
                .as_ref()
                .and_then(|s| s.name.clone())
                .unwrap_or_default(),
            categories: product.categories.iter().map(|c| c.name.clone()).collect(),
        }
    }
}

/// One translation on the detail page.
#[derive(Debug, Clone)]
pub struct TranslationView {
    pub locale: &'static str,
    pub name: String,
    pub description: String,
}

/// Editable translation block of the form.
#[derive(Debug, Clone)]
pub struct TranslationField {
    pub code: &'static str,
    pub id: String,
    pub name: String,
    pub description: String,
    pub error: String,
}

/// Category checkbox of the form.
#[derive(Debug, Clone)]
pub struct CategoryChoice {
    pub id: i64,
    pub name: String,
    pub checked: bool,
}

// =============================================================================
// Templates
// =============================================================================

#[derive(Template)]
#[template(path = "products/list.html")]
pub struct ProductListTemplate {
    pub view_id: String,
    pub products: Vec<ProductView>,
    pub pagination: Pagination,
    pub loaded: bool,
}

#[derive(Template)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub current_path: String,
    pub view_id: String,
    pub list_html: String,
    pub search: String,
    pub sort_options: Vec<SelectOption>,
    pub shop_options: Vec<SelectOption>,
    pub category_options: Vec<SelectOption>,
}

#[derive(Template)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub current_path: String,
    pub product: ProductView,
    pub translations: Vec<TranslationView>,
}

#[derive(Template)]
#[template(path = "products/form.html")]
pub struct ProductFormTemplate {
    pub current_path: String,
    pub title: String,
    pub action: String,
    pub cancel_url: String,
    pub price: String,
    pub shop_options: Vec<SelectOption>,
    pub categories: Vec<CategoryChoice>,
    pub translations: Vec<TranslationField>,
    pub price_error: String,
    pub shop_error: String,
    pub name_error: String,
    pub form_error: Option<String>,
}

/// Render the list fragment for a product list view.
#[must_use]
pub fn render_list(view_id: Uuid, view: &ListView<Product>) -> String {
    let template = ProductListTemplate {
        view_id: view_id.to_string(),
        products: view.items.iter().map(ProductView::from).collect(),
        pagination: Pagination::new(view.displayed_page, view.total_pages),
        loaded: view.loaded,
    };
    template.render().unwrap_or_else(|e| {
        tracing::error!("Template render error: {}", e);
        String::new()
    })
}

// =============================================================================
// Form Input
// =============================================================================

/// Submitted product form. Translation fields are named `name_<LOCALE>` and
/// `description_<LOCALE>`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFormInput {
    pub price: String,
    pub shop_id: String,
    pub category_ids: Vec<String>,
    /// `(locale, id, name, description)` for every supported locale.
    pub translations: Vec<(Locale, String, String, String)>,
}

impl ProductFormInput {
    #[must_use]
    pub fn from_fields(fields: &FormFields) -> Self {
        Self {
            price: fields.text("price"),
            shop_id: fields.text("shop_id"),
            category_ids: fields
                .all("category_ids")
                .into_iter()
                .map(str::to_string)
                .collect(),
            translations: Locale::ALL
                .iter()
                .map(|locale| {
                    let code = locale.code();
                    (
                        *locale,
                        fields.text(&format!("locale_id_{code}")),
                        fields.text(&format!("name_{code}")),
                        fields.text(&format!("description_{code}")),
                    )
                })
                .collect(),
        }
    }

    /// Prefill from an existing product.
    #[must_use]
    pub fn from_product(product: &Product) -> Self {
        Self {
            price: product.price.amount().to_string(),
            shop_id: product
                .shop
                .as_ref()
                .map(|s| s.id.to_string())
                .unwrap_or_default(),
            category_ids: product.categories.iter().map(|c| c.id.to_string()).collect(),
            translations: Locale::ALL
                .iter()
                .map(|locale| {
                    product
                        .localized_products
                        .iter()
                        .find(|l| l.locale == *locale)
                        .map_or_else(
                            || (*locale, String::new(), String::new(), String::new()),
                            |l| {
                                (
                                    *locale,
                                    l.id.map(|id| id.to_string()).unwrap_or_default(),
                                    l.name.clone(),
                                    l.description.clone().unwrap_or_default(),
                                )
                            },
                        )
                })
                .collect(),
        }
    }

    /// Empty form for a new product, optionally for a given shop.
    #[must_use]
    pub fn for_shop(shop_id: Option<ShopId>) -> Self {
        Self {
            shop_id: shop_id.map(|id| id.to_string()).unwrap_or_default(),
            translations: Locale::ALL
                .iter()
                .map(|locale| (*locale, String::new(), String::new(), String::new()))
                .collect(),
            ..Self::default()
        }
    }

    /// Build and validate the draft.
    ///
    /// A locale is submitted when its name or description is filled in.
    ///
    /// # Errors
    ///
    /// Returns field errors: `price`, `shop`, `categories`, `name` and
    /// `name.<LOCALE>`.
    pub fn to_draft(&self, id: Option<ProductId>) -> Result<MinimalProduct, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let price = self.price.parse::<Price>().unwrap_or_else(|_| {
            errors.add("price", "Enter a valid price");
            Price::default()
        });

        let shop = match self.shop_id.parse::<ShopId>() {
            Ok(id) => Some(ShopRef { id, name: None }),
            Err(_) => {
                errors.add("shop", "Choose a shop");
                None
            }
        };

        let categories = self
            .category_ids
            .iter()
            .filter_map(|raw| {
                raw.parse::<CategoryId>().map_or_else(
                    |_| {
                        errors.add("categories", "Unknown category");
                        None
                    },
                    |id| Some(CategoryRef { id }),
                )
            })
            .collect();

        let localized_products = self
            .translations
            .iter()
            .filter(|(_, _, name, description)| !name.is_empty() || !description.is_empty())
            .map(|(locale, row_id, name, description)| LocalizedProduct {
                id: row_id.parse().ok(),
                locale: *locale,
                name: name.clone(),
                description: (!description.is_empty()).then(|| description.clone()),
            })
            .collect();

        let draft = MinimalProduct {
            id,
            price,
            localized_products,
            shop,
            categories,
        };
        if let Err(draft_errors) = draft.validate() {
            for field in draft_errors.fields() {
                errors.add(field, draft_errors.get(field).unwrap_or_default());
            }
        }

        errors.into_result().map(|()| draft)
    }
}

// =============================================================================
// Choices
// =============================================================================

async fn shop_options(state: &AppState, current: &str, blank: &str) -> Vec<SelectOption> {
    let shops = state
        .shops()
        .list(0, CHOICES_PAGE_SIZE)
        .await
        .map(|page| page.items)
        .unwrap_or_default();
    let mut options = vec![SelectOption::new("", blank, current)];
    options.extend(
        shops
            .iter()
            .map(|s| SelectOption::new(s.id.to_string(), s.name.clone(), current)),
    );
    options
}

async fn category_choices(state: &AppState, checked: &[String]) -> Vec<CategoryChoice> {
    state
        .categories()
        .list(0, CHOICES_PAGE_SIZE)
        .await
        .map(|page| page.items)
        .unwrap_or_default()
        .into_iter()
        .map(|c| CategoryChoice {
            checked: checked.iter().any(|id| *id == c.id.to_string()),
            id: c.id.as_i64(),
            name: c.name,
        })
        .collect()
}

async fn form_template(
    state: &AppState,
    title: String,
    action: String,
    cancel_url: String,
    input: &ProductFormInput,
    errors: Option<&ValidationErrors>,
    form_error: Option<String>,
) -> ProductFormTemplate {
    let field_error = |field: &str| {
        errors
            .and_then(|e| e.get(field))
            .unwrap_or_default()
            .to_string()
    };

    ProductFormTemplate {
        current_path: "/products".to_string(),
        title,
        action,
        cancel_url,
        price: input.price.clone(),
        shop_options: shop_options(state, &input.shop_id, "Choose a shop").await,
        categories: category_choices(state, &input.category_ids).await,
        translations: input
            .translations
            .iter()
            .map(|(locale, id, name, description)| TranslationField {
                code: locale.code(),
                id: id.clone(),
                name: name.clone(),
                description: description.clone(),
                error: field_error(&format!("name.{locale}")),
            })
            .collect(),
        price_error: field_error("price"),
        shop_error: field_error("shop"),
        name_error: field_error("name"),
        form_error,
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Products list page handler.
#[instrument(skip(state))]
async fn index(State(state): State<AppState>, Query(params): Query<ListParams>) -> Html<String> {
    let query = params.into_query(None);
    let search = query.search_text().to_string();
    let sort = query.sort_text().to_string();

    let shop_options = shop_options(&state, "", "All shops").await;
    let mut category_options = vec![SelectOption::new("", "All categories", "")];
    category_options.extend(
        category_choices(&state, &[])
            .await
            .into_iter()
            .map(|c| SelectOption::new(c.id.to_string(), c.name, "")),
    );

    let (view_id, view) = mount_list(&state, state.products(), query, LiveList::Products).await;

    render(&ProductsIndexTemplate {
        current_path: "/products".to_string(),
        view_id: view_id.to_string(),
        list_html: render_list(view_id, &view),
        search,
        sort_options: sort_options(ListKind::Products, &sort),
        shop_options,
        category_options,
    })
}

/// Product detail handler.
#[instrument(skip(state))]
async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Html<String>, AppError> {
    let product = state.products().get(id).await?;
    let translations = product
        .localized_products
        .iter()
        .map(|l| TranslationView {
            locale: l.locale.code(),
            name: l.name.clone(),
            description: l.description.clone().unwrap_or_default(),
        })
        .collect();

    Ok(render(&ProductShowTemplate {
        current_path: "/products".to_string(),
        product: ProductView::from(&product),
        translations,
    }))
}

/// Query of the new product form.
#[derive(Debug, Deserialize)]
pub struct NewProductParams {
    pub shop_id: Option<ShopId>,
}

/// New product form handler. `?shop_id=` preselects the shop.
#[instrument(skip(state))]
async fn new_product(
    State(state): State<AppState>,
    Query(params): Query<NewProductParams>,
) -> Html<String> {
    let cancel_url = params
        .shop_id
        .map_or_else(|| "/products".to_string(), |id| format!("/shops/{id}"));
    render(
        &form_template(
            &state,
            "New product".to_string(),
            "/products".to_string(),
            cancel_url,
            &ProductFormInput::for_shop(params.shop_id),
            None,
            None,
        )
        .await,
    )
}

/// Edit product form handler.
#[instrument(skip(state))]
async fn edit(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Html<String>, AppError> {
    let product = state.products().get(id).await?;
    let name = ProductView::from(&product).name;
    Ok(render(
        &form_template(
            &state,
            format!("Edit {name}"),
            format!("/products/{id}"),
            format!("/products/{id}"),
            &ProductFormInput::from_product(&product),
            None,
            None,
        )
        .await,
    ))
}

/// Create product handler.
#[instrument(skip(state, form))]
async fn create(State(state): State<AppState>, RawForm(form): RawForm) -> Response {
    let input = ProductFormInput::from_fields(&FormFields::parse(&form));
    submit(&state, input, None).await
}

/// Update product handler.
#[instrument(skip(state, form))]
async fn update(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    RawForm(form): RawForm,
) -> Response {
    let input = ProductFormInput::from_fields(&FormFields::parse(&form));
    submit(&state, input, Some(id)).await
}

async fn submit(state: &AppState, input: ProductFormInput, id: Option<ProductId>) -> Response {
    let (title, action) = id.map_or_else(
        || ("New product".to_string(), "/products".to_string()),
        |id| ("Edit product".to_string(), format!("/products/{id}")),
    );
    let cancel_url = action.clone();

    let draft = match input.to_draft(id) {
        Ok(draft) => draft,
        Err(errors) => {
            tracing::debug!(%errors, "Product form rejected");
            let template =
                form_template(state, title, action, cancel_url, &input, Some(&errors), None).await;
            return render(&template).into_response();
        }
    };

    let result = match id {
        Some(_) => state.products().update(&draft).await,
        None => state.products().create(&draft).await,
    };

    match result {
        Ok(product) => {
            let verb = if id.is_some() { "updated" } else { "created" };
            tracing::info!(product_id = %product.id, "Product {verb}");
            state.notifier().success(format!("Product {verb}"));
            Redirect::to(&format!("/products/{}", product.id)).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to save product");
            let template = form_template(
                state,
                title,
                action,
                cancel_url,
                &input,
                None,
                Some(e.form_message()),
            )
            .await;
            render(&template).into_response()
        }
    }
}

/// Delete product handler.
#[instrument(skip(state))]
async fn delete(State(state): State<AppState>, Path(id): Path<ProductId>) -> Redirect {
    match state.products().remove(id).await {
        Ok(()) => {
            state.notifier().success("Product deleted");
            Redirect::to("/products")
        }
        Err(e) => {
            tracing::error!(product_id = %id, error = %e, "Failed to delete product");
            Redirect::to(&format!("/products/{id}"))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn fields(body: &str) -> FormFields {
        FormFields::parse(body.as_bytes())
    }

    #[test]
    fn test_only_filled_locales_are_sent() {
        let input = ProductFormInput::from_fields(&fields(
            "price=4%2C50&shop_id=2&category_ids=1&category_ids=3\
             &name_FR=Pain&description_FR=&name_EN=&description_EN=",
        ));
        let draft = input.to_draft(None).unwrap();
        assert_eq!(draft.price.amount(), Decimal::new(450, 2));
        assert_eq!(draft.shop.map(|s| s.id), Some(ShopId::new(2)));
        assert_eq!(draft.categories.len(), 2);
        assert_eq!(draft.localized_products.len(), 1);
        assert_eq!(draft.localized_products[0].locale, Locale::Fr);
        assert_eq!(draft.localized_products[0].description, None);
    }

    #[test]
    fn test_description_without_name_is_rejected() {
        let input = ProductFormInput::from_fields(&fields(
            "price=3&shop_id=2&name_FR=Pain&description_EN=Fresh+bread",
        ));
        let errors = input.to_draft(None).unwrap_err();
        assert!(errors.get("name.EN").is_some());
        assert!(errors.get("name.FR").is_none());
    }

    #[test]
    fn test_local_errors_are_collected_together() {
        let input = ProductFormInput::from_fields(&fields("price=abc&shop_id="));
        let errors = input.to_draft(None).unwrap_err();
        assert_eq!(errors.get("price"), Some("Enter a valid price"));
        assert_eq!(errors.get("shop"), Some("Choose a shop"));
        assert_eq!(errors.get("name"), Some("At least one translation is required"));
    }

    #[test]
    fn test_edit_form_prefills_every_locale() {
        let product: Product = serde_json::from_str(
            r#"{"id": 5, "price": 2.5,
                "localizedProducts": [{"id": 9, "locale": "EN", "name": "Bread"}],
                "shop": {"id": 1}, "categories": [{"id": 4, "name": "Food"}]}"#,
        )
        .unwrap();
        let input = ProductFormInput::from_product(&product);
        assert_eq!(input.translations.len(), Locale::ALL.len());
        assert_eq!(input.translations[0].2, "");
        assert_eq!(input.translations[1].1, "9");
        assert_eq!(input.category_ids, vec!["4".to_string()]);

        let draft = input.to_draft(Some(product.id)).unwrap();
        assert_eq!(draft.localized_products[0].id, Some(9));
    }

    #[test]
    fn test_untranslated_product_gets_placeholder_name() {
        let product: Product =
            serde_json::from_str(r#"{"id": 5, "price": 2.0, "localizedProducts": []}"#).unwrap();
        let view = ProductView::from(&product);
        assert_eq!(view.name, "Product #5");
        assert_eq!(view.price, "2.00 €");
    }
}
