//! Shop commands.

use shop_console_admin::list::ListSource;
use shop_console_admin::services::ShopFilter;
use shop_console_core::ShopId;

use super::{CliError, Context, list_request, print_json};
use crate::ListArgs;

/// List shops.
///
/// # Errors
///
/// Returns an error if the API call fails.
pub async fn list(ctx: &Context, args: &ListArgs, filter: ShopFilter) -> Result<(), CliError> {
    let request = list_request(args, filter.expression());
    tracing::info!(?request, "Listing shops");
    let page = ctx.shops.fetch(request).await?;
    print_json(&page)
}

/// Show one shop.
///
/// # Errors
///
/// Returns an error if the shop does not exist or the API call fails.
pub async fn show(ctx: &Context, id: ShopId) -> Result<(), CliError> {
    let shop = ctx.shops.get(id).await?;
    print_json(&shop)
}

/// Delete a shop.
///
/// # Errors
///
/// Returns an error if the API call fails.
pub async fn delete(ctx: &Context, id: ShopId) -> Result<(), CliError> {
    ctx.shops.remove(id).await?;
    tracing::info!(shop_id = %id, "Shop deleted");
    print_json(&serde_json::json!({ "deleted": id }))
}
