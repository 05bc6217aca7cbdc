//! Catalog documents returned by index gateways.
//!
//! A [`Document`] is one searchable catalog entry: a product, a brand, or a
//! merchant. Documents are what gateways hand back inside raw hits and what
//! the facet aggregator counts over.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The kind of catalog entity a document describes.
///
/// Variant order is the documented tie-break order for merged result lists.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityKind {
    /// A product listing.
    #[default]
    Product,
    /// A brand page.
    Brand,
    /// A merchant storefront.
    Merchant,
}

impl EntityKind {
    /// Lowercase name used in index field values and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Product => "product",
            EntityKind::Brand => "brand",
            EntityKind::Merchant => "merchant",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn generated_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn now() -> DateTime<Utc> {
    Utc::now()
}

/// A single searchable catalog entry.
///
/// All list fields may be empty and all optional fields absent; catalog JSON
/// only needs `entity_type` and `name`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Document {
    /// Unique entity id; generated when the catalog omits it.
    #[serde(default = "generated_id")]
    pub id: String,
    /// The kind of entity this document describes.
    #[serde(default)]
    pub entity_type: EntityKind,
    /// Display name.
    pub name: String,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
    /// Category labels.
    #[serde(default)]
    pub categories: Vec<String>,
    /// Brand name, for products.
    #[serde(default)]
    pub brand: Option<String>,
    /// Merchant name, for products.
    #[serde(default)]
    pub merchant: Option<String>,
    /// Marketplace values (sustainable, handmade, ...).
    #[serde(default)]
    pub values: Vec<String>,
    /// Colors offered.
    #[serde(default)]
    pub colors: Vec<String>,
    /// Materials used.
    #[serde(default)]
    pub materials: Vec<String>,
    /// Sizes offered.
    #[serde(default)]
    pub sizes: Vec<String>,
    /// Style label.
    #[serde(default)]
    pub style: Option<String>,
    /// Price in the marketplace currency.
    #[serde(default)]
    pub price: Option<f64>,
    /// Average review rating, 0 to 5.
    #[serde(default)]
    pub rating: Option<f32>,
    /// Number of reviews.
    #[serde(default)]
    pub review_count: Option<u64>,
    /// Creation timestamp; defaults to now when the catalog omits it.
    #[serde(default = "now")]
    pub created_at: DateTime<Utc>,
}

impl Document {
    /// Create a builder for the given entity kind.
    pub fn builder(entity_type: EntityKind) -> DocumentBuilder {
        DocumentBuilder::new(entity_type)
    }

    /// The searchable text of a named field, with list fields joined by
    /// spaces. Returns `None` for unknown fields and absent optionals.
    pub fn field_text(&self, field: &str) -> Option<String> {
        match field {
            "name" => Some(self.name.clone()),
            "description" => Some(self.description.clone()),
            "categories" => Some(self.categories.join(" ")),
            "brand" => self.brand.clone(),
            "merchant" => self.merchant.clone(),
            "values" => Some(self.values.join(" ")),
            "colors" => Some(self.colors.join(" ")),
            "materials" => Some(self.materials.join(" ")),
            "sizes" => Some(self.sizes.join(" ")),
            "style" => self.style.clone(),
            _ => None,
        }
    }
}

/// A builder for constructing documents in a fluent manner.
#[derive(Debug)]
pub struct DocumentBuilder {
    document: Document,
}

impl DocumentBuilder {
    /// Create a new builder for the given entity kind.
    pub fn new(entity_type: EntityKind) -> Self {
        DocumentBuilder {
            document: Document {
                id: generated_id(),
                entity_type,
                name: String::new(),
                description: String::new(),
                categories: Vec::new(),
                brand: None,
                merchant: None,
                values: Vec::new(),
                colors: Vec::new(),
                materials: Vec::new(),
                sizes: Vec::new(),
                style: None,
                price: None,
                rating: None,
                review_count: None,
                created_at: Utc::now(),
            },
        }
    }

    /// Set the entity id.
    pub fn id<S: Into<String>>(mut self, id: S) -> Self {
        self.document.id = id.into();
        self
    }

    /// Set the display name.
    pub fn name<S: Into<String>>(mut self, name: S) -> Self {
        self.document.name = name.into();
        self
    }

    /// Set the description.
    pub fn description<S: Into<String>>(mut self, description: S) -> Self {
        self.document.description = description.into();
        self
    }

    /// Add a category label.
    pub fn category<S: Into<String>>(mut self, category: S) -> Self {
        self.document.categories.push(category.into());
        self
    }

    /// Set the brand name.
    pub fn brand<S: Into<String>>(mut self, brand: S) -> Self {
        self.document.brand = Some(brand.into());
        self
    }

    /// Set the merchant name.
    pub fn merchant<S: Into<String>>(mut self, merchant: S) -> Self {
        self.document.merchant = Some(merchant.into());
        self
    }

    /// Add a marketplace value.
    pub fn value<S: Into<String>>(mut self, value: S) -> Self {
        self.document.values.push(value.into());
        self
    }

    /// Add a color.
    pub fn color<S: Into<String>>(mut self, color: S) -> Self {
        self.document.colors.push(color.into());
        self
    }

    /// Add a material.
    pub fn material<S: Into<String>>(mut self, material: S) -> Self {
        self.document.materials.push(material.into());
        self
    }

    /// Add a size.
    pub fn size<S: Into<String>>(mut self, size: S) -> Self {
        self.document.sizes.push(size.into());
        self
    }

    /// Set the style label.
    pub fn style<S: Into<String>>(mut self, style: S) -> Self {
        self.document.style = Some(style.into());
        self
    }

    /// Set the price.
    pub fn price(mut self, price: f64) -> Self {
        self.document.price = Some(price);
        self
    }

    /// Set the review rating.
    pub fn rating(mut self, rating: f32) -> Self {
        self.document.rating = Some(rating);
        self
    }

    /// Set the review count.
    pub fn review_count(mut self, review_count: u64) -> Self {
        self.document.review_count = Some(review_count);
        self
    }

    /// Set the creation timestamp.
    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.document.created_at = created_at;
        self
    }

    /// Finish building the document.
    pub fn build(self) -> Document {
        self.document
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let doc = Document::builder(EntityKind::Product)
            .id("p1")
            .name("Organic Cotton Dress")
            .description("A sustainable summer dress")
            .category("dresses")
            .brand("Eco Collective")
            .value("sustainable")
            .value("organic")
            .color("black")
            .material("organic cotton")
            .size("M")
            .price(89.0)
            .rating(4.6)
            .review_count(120)
            .build();

        assert_eq!(doc.id, "p1");
        assert_eq!(doc.entity_type, EntityKind::Product);
        assert_eq!(doc.values, vec!["sustainable", "organic"]);
        assert_eq!(doc.price, Some(89.0));
    }

    #[test]
    fn test_generated_id_unique() {
        let a = Document::builder(EntityKind::Brand).name("A").build();
        let b = Document::builder(EntityKind::Brand).name("B").build();
        assert!(!a.id.is_empty());
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_minimal_catalog_json() {
        let doc: Document =
            serde_json::from_str(r#"{"entity_type": "PRODUCT", "name": "Tee"}"#).unwrap();
        assert_eq!(doc.entity_type, EntityKind::Product);
        assert_eq!(doc.name, "Tee");
        assert!(doc.categories.is_empty());
        assert!(doc.price.is_none());
        assert!(!doc.id.is_empty());
    }

    #[test]
    fn test_field_text() {
        let doc = Document::builder(EntityKind::Product)
            .name("Denim Jacket")
            .category("outerwear")
            .category("jackets")
            .build();

        assert_eq!(doc.field_text("name").as_deref(), Some("Denim Jacket"));
        assert_eq!(
            doc.field_text("categories").as_deref(),
            Some("outerwear jackets")
        );
        assert_eq!(doc.field_text("brand"), None);
        assert_eq!(doc.field_text("unknown"), None);
    }

    #[test]
    fn test_entity_kind_ordering() {
        assert!(EntityKind::Product < EntityKind::Brand);
        assert!(EntityKind::Brand < EntityKind::Merchant);
        assert_eq!(EntityKind::Merchant.as_str(), "merchant");
    }
}
