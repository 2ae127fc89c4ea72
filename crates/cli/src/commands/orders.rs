//! Order history command.

use bazaar_storefront::session::Session;

/// Print the user's order history in the backend's ordering.
///
/// # Errors
///
/// Returns a generic "history unavailable" error on failure.
pub async fn orders(session: &Session) -> Result<(), Box<dyn std::error::Error>> {
    let orders = session.order_history().await?;

    if orders.is_empty() {
        println!("No orders found");
        return Ok(());
    }

    for order in &orders {
        println!(
            "Order ID: {}, Status: {:?}, Created: {}",
            order.id,
            order.status,
            order.created_at.format("%Y-%m-%d %H:%M")
        );
    }
    Ok(())
}
