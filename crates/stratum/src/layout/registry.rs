use std::fmt;

use indexmap::IndexMap;
use log::debug;

use super::{
    LayoutEngine,
    engines::{
        ForceEngine, LayeredEngine, OrthogonalEngine, StressEngine, SugiyamaEngine, TreeEngine,
    },
};

/// Engine used when none is configured, and the fallback for failures.
pub const DEFAULT_ALGORITHM: &str = "layered";

/// Named layout engines.
///
/// Built once and reused; engines hold no per-run state.
#[derive(Default)]
pub struct LayoutEngineRegistry {
    engines: IndexMap<String, Box<dyn LayoutEngine>>,
}

impl LayoutEngineRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the built-in engines.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(DEFAULT_ALGORITHM, LayeredEngine::new());
        registry.register("stress", StressEngine::new());
        registry.register("orthogonal", OrthogonalEngine::new());
        registry.register("tree", TreeEngine::new());
        registry.register("force", ForceEngine::new());
        registry.register("sugiyama", SugiyamaEngine::new());
        registry
    }

    /// Registers `engine` under `name`, replacing any engine of that name.
    pub fn register(&mut self, name: impl Into<String>, engine: impl LayoutEngine + 'static) {
        let name = name.into();
        debug!(name = name.as_str(); "Registering layout engine");
        self.engines.insert(name, Box::new(engine));
    }

    pub fn get(&self, name: &str) -> Option<&dyn LayoutEngine> {
        self.engines.get(name).map(Box::as_ref)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.engines.contains_key(name)
    }

    /// Registered names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.engines.keys().map(String::as_str)
    }
}

impl fmt::Debug for LayoutEngineRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayoutEngineRegistry")
            .field("engines", &self.engines.keys().collect::<Vec<_>>())
            .finish()
    }
}
