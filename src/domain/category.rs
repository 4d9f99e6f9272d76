//! Category registry: key -> display label, with enable/disable governance

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use crate::config::TrackingConfig;

/// Categories every deployment starts with.
pub const DEFAULT_CATEGORIES: &[(&str, &str)] = &[
    ("database", "Database"),
    ("api", "API"),
    ("frontend", "Frontend/Browser"),
    ("server", "Server"),
    ("worker", "Background Worker"),
    ("test", "Tests"),
    ("content_processing", "Content Processing"),
];

/// Maps category keys to display labels and decides whether a category is
/// accepting new reports. Unknown categories are auto-registered on first use
/// with a title-cased label, so every stored group stays resolvable to a label.
pub struct CategoryRegistry {
    enabled: bool,
    flags: HashMap<String, bool>,
    labels: RwLock<BTreeMap<String, String>>,
}

impl CategoryRegistry {
    pub fn new(enabled: bool) -> Self {
        let labels = DEFAULT_CATEGORIES
            .iter()
            .map(|(key, label)| (key.to_string(), label.to_string()))
            .collect();

        Self {
            enabled,
            flags: HashMap::new(),
            labels: RwLock::new(labels),
        }
    }

    /// Build a registry from configuration: custom categories are merged over
    /// the defaults, per-category flags control intake.
    pub fn from_config(tracking: &TrackingConfig) -> Self {
        let mut registry = Self::new(tracking.enabled);
        registry.flags = tracking.categories.clone();

        let mut labels = registry.labels.write().expect("registry lock poisoned");
        for (key, label) in &tracking.custom_categories {
            labels.insert(key.clone(), label.clone());
        }
        drop(labels);

        registry
    }

    /// Whether new reports in this category should be stored. False when
    /// tracking is globally disabled; unknown categories default to enabled.
    pub fn is_enabled(&self, category: &str) -> bool {
        if !self.enabled {
            return false;
        }
        self.flags.get(category).copied().unwrap_or(true)
    }

    /// Idempotent upsert of a category label.
    pub fn register(&self, category: &str, label: &str) {
        self.labels
            .write()
            .expect("registry lock poisoned")
            .insert(category.to_string(), label.to_string());
    }

    /// Auto-register an unknown category with its fallback label.
    pub fn ensure_registered(&self, category: &str) {
        let mut labels = self.labels.write().expect("registry lock poisoned");
        if !labels.contains_key(category) {
            labels.insert(category.to_string(), fallback_label(category));
        }
    }

    /// Display label for a category, falling back to the title-cased key.
    pub fn label_of(&self, category: &str) -> String {
        self.labels
            .read()
            .expect("registry lock poisoned")
            .get(category)
            .cloned()
            .unwrap_or_else(|| fallback_label(category))
    }

    /// Current key -> label map.
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.labels.read().expect("registry lock poisoned").clone()
    }
}

impl Default for CategoryRegistry {
    fn default() -> Self {
        Self::new(true)
    }
}

/// Title-cased label for an unregistered key: words split on underscores and
/// whitespace, each capitalized.
pub fn fallback_label(category: &str) -> String {
    category
        .split(|c: char| c == '_' || c.is_whitespace())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_seeded() {
        let registry = CategoryRegistry::default();
        let snapshot = registry.snapshot();

        for (key, label) in DEFAULT_CATEGORIES {
            assert_eq!(snapshot.get(*key).map(String::as_str), Some(*label));
        }
    }

    #[test]
    fn test_fallback_label_title_cases() {
        assert_eq!(fallback_label("content_processing"), "Content Processing");
        assert_eq!(fallback_label("payments"), "Payments");
        assert_eq!(fallback_label("my custom_bucket"), "My Custom Bucket");
    }

    #[test]
    fn test_ensure_registered_persists_fallback() {
        let registry = CategoryRegistry::default();
        registry.ensure_registered("billing_jobs");

        assert_eq!(registry.label_of("billing_jobs"), "Billing Jobs");
        assert!(registry.snapshot().contains_key("billing_jobs"));
    }

    #[test]
    fn test_register_is_idempotent_upsert() {
        let registry = CategoryRegistry::default();
        registry.register("api", "Public API");
        registry.register("api", "Public API");

        assert_eq!(registry.label_of("api"), "Public API");
    }

    #[test]
    fn test_disabled_category_flag() {
        let tracking = TrackingConfig {
            categories: [("test".to_string(), false)].into_iter().collect(),
            ..TrackingConfig::default()
        };
        let registry = CategoryRegistry::from_config(&tracking);

        assert!(!registry.is_enabled("test"));
        assert!(registry.is_enabled("api"));
        assert!(registry.is_enabled("never_seen_before"));
    }

    #[test]
    fn test_global_disable_wins() {
        let tracking = TrackingConfig {
            enabled: false,
            ..TrackingConfig::default()
        };
        let registry = CategoryRegistry::from_config(&tracking);

        assert!(!registry.is_enabled("api"));
    }
}
