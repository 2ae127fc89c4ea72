//! Cart and checkout commands.

use bazaar_core::ItemId;
use bazaar_storefront::cart::AddOutcome;
use bazaar_storefront::checkout::CheckoutError;
use bazaar_storefront::session::Session;

/// Add an item to the cart.
///
/// # Errors
///
/// Returns an error on add or resync failure; a 409 duplicate is a warning,
/// not an error.
pub async fn add(session: &Session, item_id: ItemId) -> Result<(), Box<dyn std::error::Error>> {
    match session.add_to_cart(item_id).await? {
        AddOutcome::Added => {
            println!("Item added to cart! ({} items in cart)", session.cart().count());
        }
        AddOutcome::AlreadyInCart => println!("Item already in cart"),
        AddOutcome::AlreadyPending => println!("Add already in progress for this item"),
    }
    Ok(())
}

/// Show the current cart.
///
/// # Errors
///
/// Returns an error when the cart cannot be fetched.
pub async fn cart(session: &Session) -> Result<(), Box<dyn std::error::Error>> {
    let snapshot = session.cart().load(session.api()).await?;

    if snapshot.is_empty() {
        println!("Your cart is empty");
        return Ok(());
    }

    for entry in &snapshot.entries {
        println!(
            "Cart ID: {}, Item: {} (ID: {})",
            entry.cart_id, entry.item.name, entry.item_id
        );
    }
    println!("{} item(s) in cart", snapshot.count());
    Ok(())
}

/// Convert the cart into an order.
///
/// # Errors
///
/// Empty-cart and generic failures are surfaced distinctly.
pub async fn checkout(session: &Session) -> Result<(), Box<dyn std::error::Error>> {
    match session.checkout().await {
        Ok(order) => {
            println!("Order successful! Order ID: {}", order.id);
            Ok(())
        }
        Err(CheckoutError::EmptyCart) => {
            println!("Cart is empty");
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}
