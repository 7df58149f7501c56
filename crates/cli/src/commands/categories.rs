//! Category commands.

use shop_console_admin::list::ListSource;
use shop_console_core::{CategoryId, MinimalCategory};

use super::{CliError, Context, list_request, print_json};
use crate::ListArgs;

/// List categories.
///
/// # Errors
///
/// Returns an error if the API call fails.
pub async fn list(ctx: &Context, args: &ListArgs) -> Result<(), CliError> {
    let page = ctx.categories.fetch(list_request(args, None)).await?;
    print_json(&page)
}

/// Create a category.
///
/// # Errors
///
/// Returns `CliError::Validation` for a blank name, or an API error.
pub async fn create(ctx: &Context, name: &str) -> Result<(), CliError> {
    let draft = MinimalCategory {
        id: None,
        name: name.trim().to_string(),
    };
    draft.validate()?;

    let category = ctx.categories.create(&draft).await?;
    tracing::info!(category_id = %category.id, "Category created");
    print_json(&category)
}

/// Delete a category.
///
/// # Errors
///
/// Returns an error if the API call fails.
pub async fn delete(ctx: &Context, id: CategoryId) -> Result<(), CliError> {
    ctx.categories.remove(id).await?;
    tracing::info!(category_id = %id, "Category deleted");
    print_json(&serde_json::json!({ "deleted": id }))
}
