//! Session display configuration.

use serde::{Deserialize, Serialize};
use stall_commerce::Product;

/// Settings that shape the data pushed to views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Prefix joined onto product image references.
    pub cdn_url: String,
    /// Unit shown after prices.
    pub currency_label: String,
    /// Shown instead of a price for products not for sale.
    pub priceless_label: String,
    /// Products to show when the catalog cannot be loaded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_catalog: Option<Vec<Product>>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cdn_url: String::new(),
            currency_label: "synapses".to_string(),
            priceless_label: "Priceless".to_string(),
            fallback_catalog: None,
        }
    }
}

impl SessionConfig {
    /// Set the CDN prefix.
    pub fn with_cdn_url(mut self, cdn_url: impl Into<String>) -> Self {
        self.cdn_url = cdn_url.into();
        self
    }

    /// Set the fallback catalog.
    pub fn with_fallback_catalog(mut self, items: Vec<Product>) -> Self {
        self.fallback_catalog = Some(items);
        self
    }

    /// Full URL of a product image.
    pub fn image_url(&self, image: &str) -> String {
        if self.cdn_url.is_empty() {
            return image.to_string();
        }
        format!(
            "{}/{}",
            self.cdn_url.trim_end_matches('/'),
            image.trim_start_matches('/')
        )
    }

    /// Amount with the currency label.
    pub fn amount_label(&self, amount: u64) -> String {
        format!("{} {}", amount, self.currency_label)
    }

    /// Display price, or the priceless label for products not for sale.
    pub fn price_label(&self, price: Option<u64>) -> String {
        match price {
            Some(amount) => self.amount_label(amount),
            None => self.priceless_label.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_labels() {
        let config = SessionConfig::default();
        assert_eq!(config.price_label(Some(750)), "750 synapses");
        assert_eq!(config.price_label(None), "Priceless");
    }

    #[test]
    fn test_image_url() {
        let config = SessionConfig::default().with_cdn_url("https://cdn.example.com/content/");
        assert_eq!(
            config.image_url("/5_Dots.svg"),
            "https://cdn.example.com/content/5_Dots.svg"
        );
        assert_eq!(SessionConfig::default().image_url("/a.svg"), "/a.svg");
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: SessionConfig =
            serde_json::from_str(r#"{"currency_label": "coins"}"#).unwrap();
        assert_eq!(config.currency_label, "coins");
        assert_eq!(config.priceless_label, "Priceless");
        assert_eq!(config.fallback_catalog, None);
    }
}
