//! Golden model factory registry.
//!
//! Models are registered by name so the harness configuration can select
//! one without the caller knowing the concrete type.
//!
//! # Example
//!
//! ```
//! use goldcheck::registry::{ModelKind, ModelRegistry};
//! use goldcheck::model::ModelContext;
//! use goldcheck::models::MuxModel;
//! use std::collections::BTreeMap;
//!
//! let mut registry = ModelRegistry::new();
//! registry.register("mux", |ctx| Ok(Box::new(MuxModel::new(ctx)?)));
//!
//! let params: BTreeMap<String, i64> =
//!     [("INPUT_COUNT".to_string(), 2), ("DATA_WIDTH".to_string(), 8)].into();
//! let model = registry
//!     .create(&ModelKind::Mux, &ModelContext::new(&params, "rst_n"))
//!     .unwrap();
//! assert_eq!(model.latency(), 1);
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::config::ConfigError;
use crate::model::{GoldenModel, ModelContext};

/// Selects which golden model a run uses.
///
/// Serialized as its plain name (`adder_tree`, `mux` or any custom name).
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ModelKind {
    #[default]
    AdderTree,
    Mux,
    /// A model registered under a custom name
    Custom(String),
}

impl ModelKind {
    /// Registry name of this kind.
    pub fn as_str(&self) -> &str {
        match self {
            ModelKind::AdderTree => "adder_tree",
            ModelKind::Mux => "mux",
            ModelKind::Custom(name) => name,
        }
    }
}

impl From<String> for ModelKind {
    fn from(name: String) -> Self {
        match name.as_str() {
            "adder_tree" => ModelKind::AdderTree,
            "mux" => ModelKind::Mux,
            _ => ModelKind::Custom(name),
        }
    }
}

impl From<ModelKind> for String {
    fn from(kind: ModelKind) -> Self {
        kind.as_str().to_string()
    }
}

impl FromStr for ModelKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(ModelKind::from(s.to_string()))
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Type alias for model factory functions.
pub type ModelFactory =
    Arc<dyn Fn(&ModelContext<'_>) -> Result<Box<dyn GoldenModel>, ConfigError> + Send + Sync>;

/// A registry of golden model factories.
#[derive(Default, Clone)]
pub struct ModelRegistry {
    factories: HashMap<String, ModelFactory>,
}

impl ModelRegistry {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a model factory under `name`, replacing any previous one.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(&ModelContext<'_>) -> Result<Box<dyn GoldenModel>, ConfigError>
            + Send
            + Sync
            + 'static,
    {
        self.factories.insert(name.into(), Arc::new(factory));
    }

    /// Instantiates the model selected by `kind` for one case.
    pub fn create(
        &self,
        kind: &ModelKind,
        ctx: &ModelContext<'_>,
    ) -> Result<Box<dyn GoldenModel>, ConfigError> {
        self.create_named(kind.as_str(), ctx)
    }

    /// Instantiates a model by registered name.
    pub fn create_named(
        &self,
        name: &str,
        ctx: &ModelContext<'_>,
    ) -> Result<Box<dyn GoldenModel>, ConfigError> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| ConfigError::UnknownModel(name.to_string()))?;
        factory(ctx)
    }

    /// Returns true if a model is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Returns the number of registered models.
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Returns true if no models are registered.
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Returns an iterator over registered model names.
    pub fn type_names(&self) -> impl Iterator<Item = &String> {
        self.factories.keys()
    }

    /// Unregisters a model.
    pub fn unregister(&mut self, name: &str) -> bool {
        self.factories.remove(name).is_some()
    }

    /// Clears all registered models.
    pub fn clear(&mut self) {
        self.factories.clear();
    }
}

impl fmt::Debug for ModelRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.factories.keys().collect();
        names.sort();
        f.debug_struct("ModelRegistry")
            .field("registered_models", &names)
            .finish()
    }
}

/// Creates a registry holding the built-in models.
///
/// Includes:
/// - `adder_tree` - AdderTreeModel
/// - `mux` - MuxModel
pub fn create_default_registry() -> ModelRegistry {
    use crate::models::{AdderTreeModel, MuxModel};

    let mut registry = ModelRegistry::new();
    registry.register(ModelKind::AdderTree.as_str(), |ctx| {
        Ok(Box::new(AdderTreeModel::new(ctx)?))
    });
    registry.register(ModelKind::Mux.as_str(), |ctx| Ok(Box::new(MuxModel::new(ctx)?)));
    registry
}
