//! Cart commands.

use std::future::Future;

use anyhow::{bail, Result};
use cart_core::format_plain;
use cart_store::{use_cart, Cart, CartError, CartOutcome, Notice, ProductId};
use dialoguer::Confirm;
use serde::Serialize;

use super::{ClearArgs, ProductArgs, UpdateArgs};
use crate::context::{Context, Session};

/// Cart as printed in JSON mode.
#[derive(Serialize)]
struct CartView<'a> {
    items: &'a Cart,
    item_count: u64,
    total: String,
}

impl<'a> CartView<'a> {
    fn new(cart: &'a Cart) -> Self {
        Self {
            items: cart,
            item_count: cart.item_count(),
            total: format_plain(cart.subtotal()),
        }
    }
}

/// Result of a mutation as printed in JSON mode.
#[derive(Serialize)]
struct Report<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    outcome: Option<CartOutcome>,
    notices: &'a [Notice],
    cart: CartView<'a>,
}

/// Show the cart.
pub async fn show(ctx: &Context) -> Result<()> {
    let session = ctx.open_session()?;
    let cart = use_cart(&session.provider.context())?.cart();

    if ctx.output.is_json() {
        ctx.output.json(&CartView::new(&cart));
        return Ok(());
    }

    ctx.output.header("Cart");
    ctx.output.cart(&cart);
    Ok(())
}

/// Add one unit of a product.
pub async fn add(args: ProductArgs, ctx: &Context) -> Result<()> {
    let id = ProductId::new(args.id);
    mutate(ctx, "Checking stock...", |session| async move {
        use_cart(&session.provider.context())?.add_product(id).await
    })
    .await
}

/// Remove a product.
pub async fn remove(args: ProductArgs, ctx: &Context) -> Result<()> {
    let id = ProductId::new(args.id);
    mutate(ctx, "Updating cart...", |session| async move {
        use_cart(&session.provider.context())?.remove_product(id).await
    })
    .await
}

/// Set a product's quantity.
pub async fn update(args: UpdateArgs, ctx: &Context) -> Result<()> {
    let id = ProductId::new(args.id);
    mutate(ctx, "Checking stock...", |session| async move {
        use_cart(&session.provider.context())?
            .update_product_amount(id, args.amount)
            .await
    })
    .await
}

/// Empty the cart.
pub async fn clear(args: ClearArgs, ctx: &Context) -> Result<()> {
    if !args.yes {
        if ctx.output.is_json() {
            bail!("Refusing to empty the cart without --yes");
        }
        let confirmed = Confirm::new()
            .with_prompt("Remove every product from the cart?")
            .default(false)
            .interact()?;

        if !confirmed {
            ctx.output.warn("Cancelled");
            return Ok(());
        }
    }

    mutate(ctx, "Emptying cart...", |session| async move {
        use_cart(&session.provider.context())?.clear().await
    })
    .await
}

/// Open the cart, run one operation under a spinner, then report notices,
/// the outcome and the resulting cart.
async fn mutate<F, Fut>(ctx: &Context, progress: &str, op: F) -> Result<()>
where
    F: FnOnce(Session) -> Fut,
    Fut: Future<Output = Result<CartOutcome, CartError>>,
{
    let session = ctx.open_session()?;
    let notices = session.notices.clone();
    let store = session.provider.store().clone();

    let spinner = ctx.output.spinner(progress);
    let result = op(session).await;
    spinner.finish_and_clear();

    let notices = notices.take();
    for notice in &notices {
        ctx.output.notice(notice);
    }

    let cart = store.cart();
    if ctx.output.is_json() {
        ctx.output.json(&Report {
            outcome: result.as_ref().ok().copied(),
            notices: &notices,
            cart: CartView::new(&cart),
        });
    }

    let outcome = result?;
    tracing::debug!(?outcome, "operation finished");
    ctx.output.success(&describe(&outcome));
    if !matches!(outcome, CartOutcome::Unchanged) {
        ctx.output.cart(&cart);
    }
    Ok(())
}

fn describe(outcome: &CartOutcome) -> String {
    match outcome {
        CartOutcome::Added { product_id } => format!("Added product {} to the cart", product_id),
        CartOutcome::Incremented { product_id, amount } => {
            format!("Product {} quantity is now {}", product_id, amount)
        }
        CartOutcome::Updated { product_id, amount } => {
            format!("Set product {} quantity to {}", product_id, amount)
        }
        CartOutcome::Removed { product_id } => {
            format!("Removed product {} from the cart", product_id)
        }
        CartOutcome::Cleared => "Cart emptied".to_string(),
        CartOutcome::Reloaded { items } => format!("Loaded {} saved products", items),
        CartOutcome::Unchanged => "Nothing to change".to_string(),
    }
}
