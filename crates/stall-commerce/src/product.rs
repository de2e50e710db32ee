//! Catalog product type.

use serde::{Deserialize, Serialize};

use crate::ids::ProductId;

/// A product as served by the catalog API.
///
/// Products are immutable once loaded. A `price` of `None` means the product
/// is shown in the catalog but is not for sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Unique product identifier.
    pub id: ProductId,
    /// Display title.
    pub title: String,
    /// Long description shown in the preview.
    #[serde(default)]
    pub description: String,
    /// Category label (e.g. "soft skill").
    #[serde(default)]
    pub category: String,
    /// Image reference, relative to the CDN root.
    #[serde(default)]
    pub image: String,
    /// Price in whole currency units.
    #[serde(default)]
    pub price: Option<u64>,
}

impl Product {
    /// Create a product with a title and no price.
    pub fn new(id: impl Into<ProductId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            category: String::new(),
            image: String::new(),
            price: None,
        }
    }

    /// Set the price.
    pub fn with_price(mut self, price: Option<u64>) -> Self {
        self.price = price;
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the category.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Set the image reference.
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = image.into();
        self
    }

    /// Check if the product can be put in the basket.
    pub fn is_for_sale(&self) -> bool {
        self.price.is_some()
    }

    /// Price used in totals: `None` counts as zero.
    pub fn price_or_zero(&self) -> u64 {
        self.price.unwrap_or(0)
    }
}

/// Sum of prices, treating `None` as zero.
pub fn total_price<'a>(products: impl IntoIterator<Item = &'a Product>) -> u64 {
    products
        .into_iter()
        .fold(0u64, |acc, p| acc.saturating_add(p.price_or_zero()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_api_product() {
        let json = r#"{
            "id": "854cef69-976d-4c2a-a18c-2aa45046c390",
            "description": "Если планируете решать задачи в тренажёре, берите два.",
            "image": "/5_Dots.svg",
            "title": "+1 час в сутках",
            "category": "софт-скил",
            "price": 750
        }"#;

        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.id.as_str(), "854cef69-976d-4c2a-a18c-2aa45046c390");
        assert_eq!(product.price, Some(750));
        assert!(product.is_for_sale());
    }

    #[test]
    fn test_null_price_is_not_for_sale() {
        let json = r#"{"id": "b", "title": "Мамка-таймер", "price": null}"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.price, None);
        assert!(!product.is_for_sale());
        assert_eq!(product.price_or_zero(), 0);
    }

    #[test]
    fn test_total_price_skips_null() {
        let items = vec![
            Product::new("a", "A").with_price(Some(100)),
            Product::new("b", "B"),
            Product::new("c", "C").with_price(Some(2500)),
        ];
        assert_eq!(total_price(&items), 2600);
    }
}
