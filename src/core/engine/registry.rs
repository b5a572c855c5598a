use super::traits::Generator;
use crate::core::tensor::Device;
use crate::core::Result;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, RwLock};
use tracing::info;

pub type EngineLoader = Arc<dyn Fn(&Path, &Device) -> Result<Box<dyn Generator>> + Send + Sync>;

/// Raised when an engine library was asked for but nothing registered it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "the `{library}` engine library is not available; install it and register its \
     bindings (e.g. `ct2_logits::core::engine::register(\"{library}\", ...)`) before \
     building `{library}` models"
)]
pub struct EngineUnavailable {
    pub library: String,
}

/// Engine libraries known to this process, keyed by name.
pub struct EngineRegistry {
    loaders: RwLock<HashMap<String, EngineLoader>>,
    aliases: RwLock<HashMap<String, String>>,
}

impl EngineRegistry {
    pub fn new() -> Self {
        Self {
            loaders: RwLock::new(HashMap::new()),
            aliases: RwLock::new(HashMap::new()),
        }
    }

    pub fn register<N, F>(&self, library: N, loader: F)
    where
        N: Into<String>,
        F: Fn(&Path, &Device) -> Result<Box<dyn Generator>> + Send + Sync + 'static,
    {
        let library = library.into();
        info!("Registered engine library {}", library);
        let mut loaders = self.loaders.write().unwrap_or_else(|e| e.into_inner());
        loaders.insert(library, Arc::new(loader) as EngineLoader);
    }

    pub fn register_alias<A, T>(&self, alias: A, target: T)
    where
        A: Into<String>,
        T: Into<String>,
    {
        let mut aliases = self.aliases.write().unwrap_or_else(|e| e.into_inner());
        aliases.insert(alias.into(), target.into());
    }

    pub fn get(&self, library: &str) -> Option<EngineLoader> {
        let loaders = self.loaders.read().unwrap_or_else(|e| e.into_inner());
        if let Some(loader) = loaders.get(library) {
            return Some(Arc::clone(loader));
        }

        let aliases = self.aliases.read().unwrap_or_else(|e| e.into_inner());
        aliases
            .get(library)
            .and_then(|target| loaders.get(target))
            .map(Arc::clone)
    }

    pub fn is_available(&self, library: &str) -> bool {
        self.get(library).is_some()
    }

    /// The loader for `library`, or [`EngineUnavailable`].
    pub fn require(&self, library: &str) -> Result<EngineLoader> {
        self.get(library).ok_or_else(|| {
            EngineUnavailable {
                library: library.to_string(),
            }
            .into()
        })
    }

    pub fn load(&self, library: &str, model_path: &Path, device: &Device) -> Result<Box<dyn Generator>> {
        let loader = self.require(library)?;
        info!("Loading {} engine from {} on {}", library, model_path.display(), device);
        loader(model_path, device)
    }

    pub fn libraries(&self) -> Vec<String> {
        let loaders = self.loaders.read().unwrap_or_else(|e| e.into_inner());
        loaders.keys().cloned().collect()
    }

    pub fn clear(&self) {
        let mut loaders = self.loaders.write().unwrap_or_else(|e| e.into_inner());
        let mut aliases = self.aliases.write().unwrap_or_else(|e| e.into_inner());
        loaders.clear();
        aliases.clear();
    }
}

impl Default for EngineRegistry {
    fn default() -> Self {
        Self::new()
    }
}

pub static REGISTRY: once_cell::sync::Lazy<EngineRegistry> =
    once_cell::sync::Lazy::new(EngineRegistry::new);

pub fn register<N, F>(library: N, loader: F)
where
    N: Into<String>,
    F: Fn(&Path, &Device) -> Result<Box<dyn Generator>> + Send + Sync + 'static,
{
    REGISTRY.register(library, loader);
}

pub fn is_available(library: &str) -> bool {
    REGISTRY.is_available(library)
}

pub fn load(library: &str, model_path: &Path, device: &Device) -> Result<Box<dyn Generator>> {
    REGISTRY.load(library, model_path, device)
}
