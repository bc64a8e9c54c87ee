//! Model registry.
//!
//! Holds the model definitions routes may depend on. Only the schema is
//! tracked; persistence belongs to the database plugins.

use indexmap::IndexMap;

use crate::config::ModelConfig;
use crate::routing::RegistrationError;

#[derive(Debug, Default, Clone)]
pub struct ModelRegistry {
    models: IndexMap<String, ModelConfig>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a model definition. Names are unique.
    pub fn register(&mut self, model: &ModelConfig) -> Result<(), RegistrationError> {
        if self.models.contains_key(&model.name) {
            return Err(RegistrationError::DuplicateModel(model.name.clone()));
        }
        tracing::debug!(model = %model.name, fields = model.fields.len(), "Model registered");
        self.models.insert(model.name.clone(), model.clone());
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&ModelConfig> {
        self.models.get(name)
    }

    /// Models in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &ModelConfig> {
        self.models.values()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}
