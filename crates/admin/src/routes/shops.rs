//! Shop route handlers.

use askama::Template;
use axum::{
    Router,
    extract::{Path, Query, RawForm, State},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use shop_console_core::types::validation::require_text;
use shop_console_core::{
    MinimalShop, OpeningHours, OpeningHoursId, Shop, ShopId, ValidationErrors, day_name, parse_time,
};
use tracing::instrument;
use uuid::Uuid;

use super::forms::FormFields;
use super::{CHOICES_PAGE_SIZE, ListParams, mount_list, mount_list_with, products, render};
use crate::components::{Pagination, SelectOption, sort_options};
use crate::error::AppError;
use crate::filters;
use crate::list::{ListQuery, ListSettings, ListView};
use crate::live::{ListKind, LiveList};
use crate::services::ProductFilter;
use crate::state::AppState;

/// Products shown per page on a shop's detail page.
const SHOP_PRODUCTS_PAGE_SIZE: u32 = 6;

/// Build the shops router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/shops", get(index).post(create))
        .route("/shops/new", get(new_shop))
        .route("/shops/{id}", get(show).post(update))
        .route("/shops/{id}/edit", get(edit))
        .route("/shops/{id}/delete", post(delete))
}

// =============================================================================
// View Models
// =============================================================================

/// Shop card for list templates.
#[derive(Debug, Clone)]
pub struct ShopView {
    pub id: i64,
    pub name: String,
    pub created_at: String,
    pub in_vacations: bool,
    pub status: &'static str,
    pub status_class: &'static str,
    pub nb_products: i64,
    pub nb_categories: String,
}

impl From<&Shop> for ShopView {
    fn from(shop: &Shop) -> Self {
        let (status, status_class) = if shop.in_vacations {
            ("On vacation", "bg-amber-100 text-amber-700")
        } else {
            ("Open", "bg-green-100 text-green-700")
        };

        Self {
            id: shop.id.as_i64(),
            name: shop.name.clone(),
            created_at: shop.created_at.format("%d %b %Y").to_string(),
            in_vacations: shop.in_vacations,
            status,
            status_class,
            nb_products: shop.nb_products,
            nb_categories: shop
                .nb_categories
                .map_or_else(|| "-".to_string(), |n| n.to_string()),
        }
    }
}

/// One opening slot on the detail page.
#[derive(Debug, Clone)]
pub struct HoursView {
    pub day: u8,
    pub open_at: String,
    pub close_at: String,
}

impl From<&OpeningHours> for HoursView {
    fn from(hours: &OpeningHours) -> Self {
        Self {
            day: hours.day,
            open_at: hours.open_at.format("%H:%M").to_string(),
            close_at: hours.close_at.format("%H:%M").to_string(),
        }
    }
}

/// One editable opening-hours row of the form.
#[derive(Debug, Clone)]
pub struct HoursRowView {
    pub index: usize,
    pub id: String,
    pub day_options: Vec<SelectOption>,
    pub open_at: String,
    pub close_at: String,
    pub error: String,
}

// =============================================================================
// Templates
// =============================================================================

/// Shop list fragment, re-rendered on every view change.
#[derive(Template)]
#[template(path = "shops/list.html")]
pub struct ShopListTemplate {
    pub view_id: String,
    pub shops: Vec<ShopView>,
    pub pagination: Pagination,
    pub loaded: bool,
}

/// Shops list page template.
#[derive(Template)]
#[template(path = "shops/index.html")]
pub struct ShopsIndexTemplate {
    pub current_path: String,
    pub view_id: String,
    pub list_html: String,
    pub search: String,
    pub sort_options: Vec<SelectOption>,
    pub vacation_options: Vec<SelectOption>,
}

/// Shop detail page template.
#[derive(Template)]
#[template(path = "shops/show.html")]
pub struct ShopShowTemplate {
    pub current_path: String,
    pub shop: ShopView,
    pub hours: Vec<HoursView>,
    pub products_view_id: String,
    pub products_html: String,
    pub category_options: Vec<SelectOption>,
}

/// Shop create/edit form template.
#[derive(Template)]
#[template(path = "shops/form.html")]
pub struct ShopFormTemplate {
    pub current_path: String,
    pub title: String,
    pub action: String,
    pub cancel_url: String,
    pub name: String,
    pub in_vacations: bool,
    pub rows: Vec<HoursRowView>,
    pub name_error: String,
    pub form_error: Option<String>,
}

/// Render the list fragment for a shop list view.
#[must_use]
pub fn render_list(view_id: Uuid, view: &ListView<Shop>) -> String {
    let template = ShopListTemplate {
        view_id: view_id.to_string(),
        shops: view.items.iter().map(ShopView::from).collect(),
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

/// What the submit button asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormAction {
    Save,
    AddSlot,
    RemoveSlot(usize),
}

impl FormAction {
    fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("add_slot") => Self::AddSlot,
            Some(other) => other
                .strip_prefix("remove_slot:")
                .and_then(|i| i.parse().ok())
                .map_or(Self::Save, Self::RemoveSlot),
            None => Self::Save,
        }
    }
}

/// Raw opening-hours row as submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HoursRow {
    pub id: String,
    pub day: String,
    pub open_at: String,
    pub close_at: String,
}

/// Submitted shop form.
#[derive(Debug, Clone, Default)]
pub struct ShopFormInput {
    pub name: String,
    pub in_vacations: bool,
    pub rows: Vec<HoursRow>,
    pub action: Option<FormAction>,
}

impl ShopFormInput {
    /// Decode the form fields. Rows are zipped from repeated `hours_*` keys.
    #[must_use]
    pub fn from_fields(fields: &FormFields) -> Self {
        let ids = fields.all("hours_id");
        let days = fields.all("hours_day");
        let opens = fields.all("hours_open");
        let closes = fields.all("hours_close");
        let count = days.len().max(opens.len()).max(closes.len());
        let cell = |values: &[&str], i: usize| values.get(i).map_or_else(String::new, |v| v.trim().to_string());

        Self {
            name: fields.text("name"),
            in_vacations: fields.checked("in_vacations"),
            rows: (0..count)
                .map(|i| HoursRow {
                    id: cell(&ids, i),
                    day: cell(&days, i),
                    open_at: cell(&opens, i),
                    close_at: cell(&closes, i),
                })
                .collect(),
            action: Some(FormAction::parse(fields.first("action"))),
        }
    }

    /// Prefill from an existing shop.
    #[must_use]
    pub fn from_shop(shop: &Shop) -> Self {
        Self {
            name: shop.name.clone(),
            in_vacations: shop.in_vacations,
            rows: shop.opening_hours.iter().map(HoursRow::from).collect(),
            action: None,
        }
    }

    /// Build and validate the draft.
    ///
    /// # Errors
    ///
    /// Returns field errors keyed like [`MinimalShop::validate`].
    pub fn to_draft(&self, id: Option<ShopId>) -> Result<MinimalShop, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let mut opening_hours = Vec::with_capacity(self.rows.len());

        for (index, row) in self.rows.iter().enumerate() {
            let day = row.day.parse::<u8>().ok();
            let open_at = parse_time(&row.open_at);
            let close_at = parse_time(&row.close_at);
            let row_id = row.id.parse::<i64>().ok().map(OpeningHoursId::new);
            match (day, open_at, close_at) {
                (Some(day), Some(open_at), Some(close_at)) => opening_hours.push(OpeningHours {
                    id: row_id,
                    day,
                    open_at,
                    close_at,
                }),
                _ => errors.add(
                    format!("opening_hours.{index}"),
                    "Choose a day and valid opening times",
                ),
            }
        }

        if !errors.is_empty() {
            require_text(&mut errors, "name", &self.name);
            return Err(errors);
        }

        let draft = MinimalShop {
            id,
            name: self.name.clone(),
            in_vacations: self.in_vacations,
            opening_hours,
        };
        draft.validate()?;
        Ok(draft)
    }

    /// Apply an add/remove row action.
    pub fn apply_row_action(&mut self, action: FormAction) {
        match action {
            FormAction::AddSlot => self.rows.push(HoursRow::from(&OpeningHours::default_slot())),
            FormAction::RemoveSlot(index) if index < self.rows.len() => {
                self.rows.remove(index);
            }
            FormAction::RemoveSlot(_) | FormAction::Save => {}
        }
    }
}

impl From<&OpeningHours> for HoursRow {
    fn from(hours: &OpeningHours) -> Self {
        Self {
            id: hours.id.map(|id| id.to_string()).unwrap_or_default(),
            day: hours.day.to_string(),
            open_at: hours.open_at.format("%H:%M").to_string(),
            close_at: hours.close_at.format("%H:%M").to_string(),
        }
    }
}

fn day_options(current: &str) -> Vec<SelectOption> {
    (1..=7_u8)
        .map(|day| SelectOption::new(day.to_string(), day_name(day), current))
        .collect()
}

fn form_template(
    title: &str,
    action: String,
    cancel_url: String,
    input: &ShopFormInput,
    errors: Option<&ValidationErrors>,
    form_error: Option<String>,
) -> ShopFormTemplate {
    let field_error = |field: &str| {
        errors
            .and_then(|e| e.get(field))
            .unwrap_or_default()
            .to_string()
    };

    ShopFormTemplate {
        current_path: "/shops".to_string(),
        title: title.to_string(),
        action,
        cancel_url,
        name: input.name.clone(),
        in_vacations: input.in_vacations,
        rows: input
            .rows
            .iter()
            .enumerate()
            .map(|(index, row)| HoursRowView {
                index,
                id: row.id.clone(),
                day_options: day_options(&row.day),
                open_at: row.open_at.clone(),
                close_at: row.close_at.clone(),
                error: field_error(&format!("opening_hours.{index}")),
            })
            .collect(),
        name_error: field_error("name"),
        form_error,
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Shops list page handler.
#[instrument(skip(state))]
async fn index(State(state): State<AppState>, Query(params): Query<ListParams>) -> Html<String> {
    let query = params.into_query(None);
    let search = query.search_text().to_string();
    let sort = query.sort_text().to_string();

    let (view_id, view) = mount_list(&state, state.shops(), query, LiveList::Shops).await;

    let template = ShopsIndexTemplate {
        current_path: "/shops".to_string(),
        view_id: view_id.to_string(),
        list_html: render_list(view_id, &view),
        search,
        sort_options: sort_options(ListKind::Shops, &sort),
        vacation_options: vec![
            SelectOption::new("", "All shops", ""),
            SelectOption::new("false", "Open", ""),
            SelectOption::new("true", "On vacation", ""),
        ],
    };
    render(&template)
}

/// Shop detail handler.
#[instrument(skip(state))]
async fn show(State(state): State<AppState>, Path(id): Path<ShopId>) -> Result<Html<String>, AppError> {
    let shop = state.shops().get(id).await?;

    let categories = state
        .categories()
        .list(0, CHOICES_PAGE_SIZE)
        .await
        .map(|page| page.items)
        .unwrap_or_default();
    let mut category_options = vec![SelectOption::new("", "All categories", "")];
    category_options.extend(
        categories
            .iter()
            .map(|c| SelectOption::new(c.id.to_string(), c.name.clone(), "")),
    );

    let query = ListQuery::filtered(ProductFilter::shop(id).expression());
    let settings = ListSettings {
        page_size: SHOP_PRODUCTS_PAGE_SIZE,
        ..state.list_settings()
    };
    let (products_view_id, view) =
        mount_list_with(&state, settings, state.products(), query, LiveList::Products).await;

    let template = ShopShowTemplate {
        current_path: "/shops".to_string(),
        shop: ShopView::from(&shop),
        hours: shop.opening_hours.iter().map(HoursView::from).collect(),
        products_view_id: products_view_id.to_string(),
        products_html: products::render_list(products_view_id, &view),
        category_options,
    };
    Ok(render(&template))
}

/// New shop form handler.
#[instrument]
async fn new_shop() -> Html<String> {
    render(&form_template(
        "New shop",
        "/shops".to_string(),
        "/shops".to_string(),
        &ShopFormInput::default(),
        None,
        None,
    ))
}

/// Edit shop form handler.
#[instrument(skip(state))]
async fn edit(State(state): State<AppState>, Path(id): Path<ShopId>) -> Result<Html<String>, AppError> {
    let shop = state.shops().get(id).await?;
    Ok(render(&form_template(
        &format!("Edit {}", shop.name),
        format!("/shops/{id}"),
        format!("/shops/{id}"),
        &ShopFormInput::from_shop(&shop),
        None,
        None,
    )))
}

/// Create shop handler.
#[instrument(skip(state, form))]
async fn create(State(state): State<AppState>, RawForm(form): RawForm) -> Response {
    let input = ShopFormInput::from_fields(&FormFields::parse(&form));
    submit(&state, input, None).await
}

/// Update shop handler.
#[instrument(skip(state, form))]
async fn update(
    State(state): State<AppState>,
    Path(id): Path<ShopId>,
    RawForm(form): RawForm,
) -> Response {
    let input = ShopFormInput::from_fields(&FormFields::parse(&form));
    submit(&state, input, Some(id)).await
}

/// Shared create/update flow: row actions re-render, saves validate then call
/// the API, failures re-render with the submitted input.
async fn submit(state: &AppState, mut input: ShopFormInput, id: Option<ShopId>) -> Response {
    let (title, action, cancel_url) = id.map_or_else(
        || ("New shop".to_string(), "/shops".to_string(), "/shops".to_string()),
        |id| (format!("Edit {}", input.name), format!("/shops/{id}"), format!("/shops/{id}")),
    );

    let requested = input.action.unwrap_or(FormAction::Save);
    if requested != FormAction::Save {
        input.apply_row_action(requested);
        return render(&form_template(&title, action, cancel_url, &input, None, None)).into_response();
    }

    let draft = match input.to_draft(id) {
        Ok(draft) => draft,
        Err(errors) => {
            tracing::debug!(%errors, "Shop form rejected");
            return render(&form_template(&title, action, cancel_url, &input, Some(&errors), None))
                .into_response();
        }
    };

    let result = match id {
        Some(_) => state.shops().update(&draft).await,
        None => state.shops().create(&draft).await,
    };

    match result {
        Ok(shop) => {
            let verb = if id.is_some() { "updated" } else { "created" };
            tracing::info!(shop_id = %shop.id, name = %shop.name, "Shop {verb}");
            state.notifier().success(format!("Shop \"{}\" {verb}", shop.name));
            Redirect::to(&format!("/shops/{}", shop.id)).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to save shop");
            render(&form_template(
                &title,
                action,
                cancel_url,
                &input,
                None,
                Some(e.form_message()),
            ))
            .into_response()
        }
    }
}

/// Delete shop handler.
#[instrument(skip(state))]
async fn delete(State(state): State<AppState>, Path(id): Path<ShopId>) -> Redirect {
    match state.shops().remove(id).await {
        Ok(()) => {
            state.notifier().success("Shop deleted");
            Redirect::to("/shops")
        }
        Err(e) => {
            tracing::error!(shop_id = %id, error = %e, "Failed to delete shop");
            Redirect::to(&format!("/shops/{id}"))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn fields(body: &str) -> FormFields {
        FormFields::parse(body.as_bytes())
    }

    #[test]
    fn test_form_rows_are_zipped_in_order() {
        let input = ShopFormInput::from_fields(&fields(
            "name=Chez+Paul&in_vacations=on\
             &hours_id=&hours_day=1&hours_open=09%3A00&hours_close=12%3A00\
             &hours_id=4&hours_day=1&hours_open=14%3A00&hours_close=18%3A00",
        ));
        assert_eq!(input.name, "Chez Paul");
        assert!(input.in_vacations);
        assert_eq!(input.rows.len(), 2);
        assert_eq!(input.rows[1].id, "4");

        let draft = input.to_draft(None).unwrap();
        assert_eq!(draft.opening_hours.len(), 2);
        assert_eq!(draft.opening_hours[1].id, Some(OpeningHoursId::new(4)));
    }

    #[test]
    fn test_overlapping_rows_are_rejected_locally() {
        let input = ShopFormInput::from_fields(&fields(
            "name=Chez+Paul\
             &hours_day=2&hours_open=09%3A00&hours_close=12%3A00\
             &hours_day=2&hours_open=11%3A00&hours_close=15%3A00",
        ));
        let errors = input.to_draft(None).unwrap_err();
        assert_eq!(
            errors.get("opening_hours.1"),
            Some("Opening hours overlap on the same day")
        );
    }

    #[test]
    fn test_unparsable_row_and_blank_name_are_reported_together() {
        let input = ShopFormInput::from_fields(&fields("name=&hours_day=1&hours_open=nine&hours_close=18%3A00"));
        let errors = input.to_draft(None).unwrap_err();
        assert!(errors.get("opening_hours.0").is_some());
        assert!(errors.get("name").is_some());
    }

    #[test]
    fn test_row_actions() {
        let mut input = ShopFormInput::from_fields(&fields("name=A&action=add_slot"));
        assert_eq!(input.action, Some(FormAction::AddSlot));
        input.apply_row_action(FormAction::AddSlot);
        assert_eq!(input.rows[0].open_at, "09:00");

        input.apply_row_action(FormAction::RemoveSlot(5));
        assert_eq!(input.rows.len(), 1);
        input.apply_row_action(FormAction::RemoveSlot(0));
        assert!(input.rows.is_empty());

        assert_eq!(FormAction::parse(Some("remove_slot:3")), FormAction::RemoveSlot(3));
        assert_eq!(FormAction::parse(Some("save")), FormAction::Save);
    }

    #[test]
    fn test_shop_view_formats_fields() {
        let shop = Shop {
            id: ShopId::new(3),
            name: "Chez Paul".to_string(),
            created_at: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            in_vacations: true,
            nb_products: 12,
            nb_categories: None,
            opening_hours: vec![],
        };
        let view = ShopView::from(&shop);
        assert_eq!(view.created_at, "01 Mar 2024");
        assert_eq!(view.status, "On vacation");
        assert_eq!(view.nb_categories, "-");
    }
}
