//! Product commands.

use shop_console_admin::list::ListSource;
use shop_console_admin::services::ProductFilter;
use shop_console_core::ProductId;

use super::{CliError, Context, list_request, print_json};
use crate::ListArgs;

/// List products, optionally of one shop and/or category.
///
/// # Errors
///
/// Returns an error if the API call fails.
pub async fn list(ctx: &Context, args: &ListArgs, filter: ProductFilter) -> Result<(), CliError> {
    let request = list_request(args, filter.expression());
    tracing::info!(?request, "Listing products");
    let page = ctx.products.fetch(request).await?;
    print_json(&page)
}

/// Show one product.
///
/// # Errors
///
/// Returns an error if the product does not exist or the API call fails.
pub async fn show(ctx: &Context, id: ProductId) -> Result<(), CliError> {
    let product = ctx.products.get(id).await?;
    print_json(&product)
}
