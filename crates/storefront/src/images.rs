//! Item image resolution and placeholder fallback.
//!
//! `Item.image` is a relative path under the backend's static-asset origin.
//! A broken image falls back to a generated placeholder labeled with the
//! item name; the fallback fires at most once per image so a broken
//! placeholder cannot loop.

use url::Url;

use bazaar_core::Item;

const PLACEHOLDER_BASE: &str = "https://via.placeholder.com/300x300/e9ecef/6c757d";

/// Resolve a relative image path against the static-asset origin.
///
/// # Errors
///
/// Returns the parse error when the path cannot be joined onto the origin.
pub fn resolve_image_url(asset_base: &Url, image_path: &str) -> Result<Url, url::ParseError> {
    asset_base.join(image_path)
}

/// Generated placeholder image URL labeled with `label`.
#[must_use]
pub fn placeholder_url(label: &str) -> Url {
    let text = urlencoding::encode(label);
    Url::parse(&format!("{PLACEHOLDER_BASE}?text={text}"))
        .expect("placeholder URL with percent-encoded label is always valid")
}

/// An item image with a one-shot fallback latch.
///
/// Mirrors an `onerror` handler that disarms itself after swapping in the
/// placeholder: the first load error replaces the URL, subsequent errors
/// are ignored so the broken URL is never retried in a loop.
#[derive(Debug, Clone)]
pub struct ItemImage {
    url: Url,
    label: String,
    fallback_armed: bool,
}

impl ItemImage {
    /// Build the image for an item. Items with no image path, or a path
    /// that fails to resolve, go straight to the placeholder (already
    /// disarmed).
    #[must_use]
    pub fn new(asset_base: &Url, item: &Item) -> Self {
        if item.image.is_empty() {
            return Self::placeholder(&item.name);
        }
        match resolve_image_url(asset_base, &item.image) {
            Ok(url) => Self {
                url,
                label: item.name.clone(),
                fallback_armed: true,
            },
            Err(_) => Self::placeholder(&item.name),
        }
    }

    fn placeholder(label: &str) -> Self {
        Self {
            url: placeholder_url(label),
            label: label.to_string(),
            fallback_armed: false,
        }
    }

    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    /// Report a load error. Swaps in the placeholder and disarms the latch;
    /// returns whether the URL changed (i.e. the view should re-render).
    pub fn on_load_error(&mut self) -> bool {
        if !self.fallback_armed {
            return false;
        }
        self.fallback_armed = false;
        self.url = placeholder_url(&self.label);
        true
    }
}
