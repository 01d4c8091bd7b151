//! Keyed model catalog supplied by host configuration.

use {
    serde::{Deserialize, Serialize},
    std::collections::BTreeMap,
};

use crate::{
    error::{Context, Result},
    model::ModelDescriptor,
};

/// The models a host offers, keyed by selection key.
///
/// The key is what hosts store per conversation (a select-menu value, a
/// config entry); it may differ from the provider model id, so two keys
/// can map to the same underlying model with different labels or tools.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelCatalog {
    models: BTreeMap<String, ModelDescriptor>,
}

impl ModelCatalog {
    /// Parse a catalog from its JSON configuration form.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("parsing model catalog")
    }

    /// Descriptor for `key`, or an error naming the unknown key.
    pub fn get(&self, key: &str) -> Result<&ModelDescriptor> {
        self.models
            .get(key)
            .with_context(|| format!("unknown model {key}"))
    }

    /// All entries in key order, for selection menus.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ModelDescriptor)> {
        self.models.iter().map(|(key, model)| (key.as_str(), model))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}
