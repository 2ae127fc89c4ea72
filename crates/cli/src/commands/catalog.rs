//! Catalog browsing command.

use bazaar_storefront::session::Session;

/// Fetch the catalog and print it, filtered by search term and category.
///
/// # Errors
///
/// Returns an error when the catalog fetch fails; nothing was cached yet in
/// a fresh process, so there is no stale list to fall back on.
pub async fn items(
    session: &Session,
    search: &str,
    category: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    session.refresh_catalog().await?;

    let filtered = session.filtered_items(search, category);
    if filtered.is_empty() {
        println!("No items match your search or filters");
        return Ok(());
    }

    for item in &filtered {
        let image = session.item_image(item);
        println!(
            "{:>6}  {:<30} {:<10} {}",
            item.id,
            item.name,
            format!("{:?}", item.status).to_lowercase(),
            image.url()
        );
    }
    Ok(())
}
