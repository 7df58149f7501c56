//! Category route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::Deserialize;
use shop_console_core::{Category, CategoryId, MinimalCategory, ValidationErrors};
use tracing::instrument;
use uuid::Uuid;

use super::{ListParams, mount_list, products};
use crate::components::{Pagination, SelectOption, sort_options};
use crate::error::AppError;
use crate::list::{ListQuery, ListView};
use crate::live::{ListKind, LiveList};
use crate::services::ProductFilter;
use crate::state::AppState;

/// Build the categories router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/categories", get(index).post(create))
        .route("/categories/new", get(new_category))
        .route("/categories/{id}", get(show).post(update))
        .route("/categories/{id}/edit", get(edit))
        .route("/categories/{id}/delete", post(delete))
}

/// Category row for list templates.
#[derive(Debug, Clone)]
pub struct CategoryView {
    pub id: i64,
    pub name: String,
}

impl From<&Category> for CategoryView {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id.as_i64(),
            name: category.name.clone(),
        }
    }
}

#[derive(Template)]
#[template(path = "categories/list.html")]
pub struct CategoryListTemplate {
    pub view_id: String,
    pub categories: Vec<CategoryView>,
    pub pagination: Pagination,
    pub loaded: bool,
}

#[derive(Template, WebTemplate)]
#[template(path = "categories/index.html")]
pub struct CategoriesIndexTemplate {
    pub current_path: String,
    pub view_id: String,
    pub list_html: String,
    pub search: String,
    pub sort_options: Vec<SelectOption>,
}

#[derive(Template, WebTemplate)]
#[template(path = "categories/show.html")]
pub struct CategoryShowTemplate {
    pub current_path: String,
    pub category: CategoryView,
    pub products_view_id: String,
    pub products_html: String,
}

#[derive(Template, WebTemplate)]
#[template(path = "categories/form.html")]
pub struct CategoryFormTemplate {
    pub current_path: String,
    pub title: String,
    pub action: String,
    pub cancel_url: String,
    pub name: String,
    pub name_error: String,
    pub form_error: Option<String>,
}

impl CategoryFormTemplate {
    fn new(id: Option<CategoryId>, name: &str) -> Self {
        let (title, action) = id.map_or_else(
            || ("New category".to_string(), "/categories".to_string()),
            |id| ("Edit category".to_string(), format!("/categories/{id}")),
        );
        Self {
            current_path: "/categories".to_string(),
            cancel_url: action.clone(),
            title,
            action,
            name: name.to_string(),
            name_error: String::new(),
            form_error: None,
        }
    }
}

/// Render the list fragment for a category list view.
#[must_use]
pub fn render_list(view_id: Uuid, view: &ListView<Category>) -> String {
    let template = CategoryListTemplate {
        view_id: view_id.to_string(),
        categories: view.items.iter().map(CategoryView::from).collect(),
        pagination: Pagination::new(view.displayed_page, view.total_pages),
        loaded: view.loaded,
    };
    template.render().unwrap_or_else(|e| {
        tracing::error!("Template render error: {}", e);
        String::new()
    })
}

/// Category form submission.
#[derive(Debug, Deserialize)]
pub struct CategoryForm {
    #[serde(default)]
    pub name: String,
}

impl CategoryForm {
    /// Build and validate the draft.
    ///
    /// # Errors
    ///
    /// Returns the failing fields.
    pub fn to_draft(&self, id: Option<CategoryId>) -> Result<MinimalCategory, ValidationErrors> {
        let draft = MinimalCategory {
            id,
            name: self.name.trim().to_string(),
        };
        draft.validate()?;
        Ok(draft)
    }
}

/// Categories list page handler.
#[instrument(skip(state))]
async fn index(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> CategoriesIndexTemplate {
    let query = params.into_query(None);
    let search = query.search_text().to_string();
    let sort = query.sort_text().to_string();

    let (view_id, view) =
        mount_list(&state, state.categories(), query, LiveList::Categories).await;

    CategoriesIndexTemplate {
        current_path: "/categories".to_string(),
        view_id: view_id.to_string(),
        list_html: render_list(view_id, &view),
        search,
        sort_options: sort_options(ListKind::Categories, &sort),
    }
}

/// Category detail handler, listing the products in the category.
#[instrument(skip(state))]
async fn show(
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
) -> Result<CategoryShowTemplate, AppError> {
    let category = state.categories().get(id).await?;

    let filter = ProductFilter {
        category_id: Some(id),
        ..ProductFilter::default()
    };
    let (products_view_id, view) = mount_list(
        &state,
        state.products(),
        ListQuery::filtered(filter.expression()),
        LiveList::Products,
    )
    .await;

    Ok(CategoryShowTemplate {
        current_path: "/categories".to_string(),
        category: CategoryView::from(&category),
        products_view_id: products_view_id.to_string(),
        products_html: products::render_list(products_view_id, &view),
    })
}

#[instrument]
async fn new_category() -> CategoryFormTemplate {
    CategoryFormTemplate::new(None, "")
}

#[instrument(skip(state))]
async fn edit(
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
) -> Result<CategoryFormTemplate, AppError> {
    let category = state.categories().get(id).await?;
    Ok(CategoryFormTemplate::new(Some(id), &category.name))
}

#[instrument(skip(state))]
async fn create(State(state): State<AppState>, Form(form): Form<CategoryForm>) -> Response {
    submit(&state, &form, None).await
}

#[instrument(skip(state))]
async fn update(
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
    Form(form): Form<CategoryForm>,
) -> Response {
    submit(&state, &form, Some(id)).await
}

async fn submit(state: &AppState, form: &CategoryForm, id: Option<CategoryId>) -> Response {
    let mut template = CategoryFormTemplate::new(id, &form.name);

    let draft = match form.to_draft(id) {
        Ok(draft) => draft,
        Err(errors) => {
            template.name_error = errors.get("name").unwrap_or_default().to_string();
            return template.into_response();
        }
    };

    let result = match id {
        Some(_) => state.categories().update(&draft).await,
        None => state.categories().create(&draft).await,
    };

    match result {
        Ok(category) => {
            let verb = if id.is_some() { "updated" } else { "created" };
            tracing::info!(category_id = %category.id, name = %category.name, "Category {verb}");
            state
                .notifier()
                .success(format!("Category \"{}\" {verb}", category.name));
            Redirect::to(&format!("/categories/{}", category.id)).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to save category");
            template.form_error = Some(e.form_message());
            template.into_response()
        }
    }
}

#[instrument(skip(state))]
async fn delete(State(state): State<AppState>, Path(id): Path<CategoryId>) -> Redirect {
    match state.categories().remove(id).await {
        Ok(()) => {
            state.notifier().success("Category deleted");
            Redirect::to("/categories")
        }
        Err(e) => {
            tracing::error!(category_id = %id, error = %e, "Failed to delete category");
            Redirect::to(&format!("/categories/{id}"))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_category_name_is_trimmed() {
        let form = CategoryForm {
            name: "  Boulangerie ".to_string(),
        };
        let draft = form.to_draft(Some(CategoryId::new(2))).unwrap();
        assert_eq!(draft.name, "Boulangerie");
        assert_eq!(draft.id, Some(CategoryId::new(2)));
    }

    #[test]
    fn test_blank_category_name_is_rejected() {
        let form = CategoryForm {
            name: "   ".to_string(),
        };
        assert!(form.to_draft(None).unwrap_err().get("name").is_some());
    }

    #[test]
    fn test_form_targets_follow_id() {
        let template = CategoryFormTemplate::new(Some(CategoryId::new(7)), "Food");
        assert_eq!(template.action, "/categories/7");
        assert_eq!(template.cancel_url, "/categories/7");
        assert!(template.render().unwrap().contains("value=\"Food\""));
    }
}
