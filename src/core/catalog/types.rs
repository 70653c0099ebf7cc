//! Catalog document types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The catalog document: `{ "items": [...] }`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub items: Vec<CatalogItem>,
    /// Other top-level keys, kept as they were
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Catalog {
    /// Create a catalog holding the given items
    pub fn with_items(items: Vec<CatalogItem>) -> Self {
        Self {
            items,
            extra: Map::new(),
        }
    }

    /// Look up an item by id
    pub fn item(&self, id: u32) -> Option<&CatalogItem> {
        self.items.iter().find(|item| item.id == id)
    }
}

/// One listable item with its photos and per-language text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: u32,
    pub categories: Vec<u32>,
    pub active: bool,
    pub price: u32,
    pub images: Vec<String>,
    pub en: LocalizedText,
    pub sv: LocalizedText,
    /// Fields added later by hand or by other tools (condition, notes, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CatalogItem {
    /// A new item with placeholder text for `images.len()` photos
    pub fn placeholder(id: u32, images: Vec<String>, defaults: &ItemDefaults) -> Self {
        let photos = images.len();
        Self {
            id,
            categories: defaults.categories.clone(),
            active: true,
            price: defaults.price,
            en: LocalizedText::placeholder_en(id, photos),
            sv: LocalizedText::placeholder_sv(id, photos),
            images,
            extra: Map::new(),
        }
    }
}

/// Title and description in one language
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalizedText {
    pub title: String,
    pub description: String,
}

impl LocalizedText {
    pub fn placeholder_en(id: u32, photos: usize) -> Self {
        let plural = if photos > 1 { "s" } else { "" };
        Self {
            title: format!("Item {}", id),
            description: format!(
                "This is item {} with {} photo{}. In good condition.",
                id, photos, plural
            ),
        }
    }

    pub fn placeholder_sv(id: u32, photos: usize) -> Self {
        let plural = if photos > 1 { "n" } else { "" };
        Self {
            title: format!("Artikel {}", id),
            description: format!(
                "Detta är artikel {} med {} foto{}. I gott skick.",
                id, photos, plural
            ),
        }
    }
}

/// Values used for newly created items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDefaults {
    /// Category ids for new items
    pub categories: Vec<u32>,
    /// Placeholder price
    pub price: u32,
    /// Prefix joined with the file name to form each image path
    pub image_url_prefix: String,
}

impl ItemDefaults {
    /// Public path of an image file
    pub fn image_url(&self, file_name: &str) -> String {
        format!("{}{}", self.image_url_prefix, file_name)
    }
}

impl Default for ItemDefaults {
    fn default() -> Self {
        Self {
            categories: vec![1],
            price: 100,
            image_url_prefix: "/for-sale/images/".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_text_pluralises() {
        let one = LocalizedText::placeholder_en(4, 1);
        assert_eq!(one.description, "This is item 4 with 1 photo. In good condition.");

        let many = LocalizedText::placeholder_sv(4, 3);
        assert_eq!(many.title, "Artikel 4");
        assert_eq!(many.description, "Detta är artikel 4 med 3 foton. I gott skick.");
    }

    #[test]
    fn item_serialises_in_catalog_field_order() {
        let defaults = ItemDefaults::default();
        let item = CatalogItem::placeholder(1, vec![defaults.image_url("item-1-1.jpg")], &defaults);
        let json = serde_json::to_string(&item).unwrap();

        let id = json.find("\"id\"").unwrap();
        let categories = json.find("\"categories\"").unwrap();
        let images = json.find("\"images\"").unwrap();
        let sv = json.find("\"sv\"").unwrap();
        assert!(id < categories && categories < images && images < sv);
        assert!(json.contains("/for-sale/images/item-1-1.jpg"));
    }

    #[test]
    fn unknown_item_fields_survive_round_trip() {
        let json = r#"{
            "id": 7, "categories": [2], "active": false, "price": 250,
            "images": ["/for-sale/images/item-7-1.jpg"],
            "en": {"title": "Zelda", "description": "Boxed"},
            "sv": {"title": "Zelda", "description": "I kartong"},
            "condition": 4, "qualityNotes": "Small scratch"
        }"#;
        let item: CatalogItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.extra.get("condition"), Some(&Value::from(4)));

        let out = serde_json::to_string(&item).unwrap();
        assert!(out.contains("\"qualityNotes\":\"Small scratch\""));
    }
}
