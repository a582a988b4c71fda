//! Assembly: classify declared references into the store engine's
//! configuration shape, construct the live store, and bind every reference
//! to it.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

use crate::error::ConfigError;
use crate::store::config::{ActionHandler, DynValue, GetterHandler, ModuleConfig, MutationHandler};
use crate::store::Store;

/// The five reference kinds. Fixed at construction; never changes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Category {
    State,
    Getter,
    Mutation,
    Action,
    Module,
}

pub(crate) trait ErasedState: Send + Sync {
    fn initial(&self) -> DynValue;
    fn set_store(&self, store: &Store, name: &str, ancestors: &[String]);
}

pub(crate) trait ErasedGetter: Send + Sync {
    fn handler(&self) -> GetterHandler;
    fn set_store(&self, store: &Store, name: &str, ancestors: &[String]);
}

pub(crate) trait ErasedMutation: Send + Sync {
    fn handler(&self) -> MutationHandler;
    fn set_store(&self, store: &Store, name: &str, ancestors: &[String]);
}

pub(crate) trait ErasedAction: Send + Sync {
    fn handler(&self) -> ActionHandler;
    fn set_store(&self, store: &Store, name: &str, ancestors: &[String]);
}

pub(crate) trait ErasedModule: Send + Sync {
    fn config(&self) -> Result<ModuleConfig, ConfigError>;
    fn set_store(&self, store: &Store, name: &str, ancestors: &[String]);
}

#[derive(Clone)]
pub(crate) enum RefKind {
    State(Arc<dyn ErasedState>),
    Getter(Arc<dyn ErasedGetter>),
    Mutation(Arc<dyn ErasedMutation>),
    Action(Arc<dyn ErasedAction>),
    Module(Arc<dyn ErasedModule>),
}

/// A declared reference of any kind, as placed into a setup [`Mapping`].
///
/// Obtained from a typed handle through [`AsReference`]; shares the handle's
/// inner state, so binding through either side is visible to both.
#[derive(Clone)]
pub struct Reference {
    kind: RefKind,
}

impl Reference {
    pub(crate) fn new(kind: RefKind) -> Self {
        Self { kind }
    }

    /// The kind this reference was constructed as.
    pub fn category(&self) -> Category {
        match &self.kind {
            RefKind::State(_) => Category::State,
            RefKind::Getter(_) => Category::Getter,
            RefKind::Mutation(_) => Category::Mutation,
            RefKind::Action(_) => Category::Action,
            RefKind::Module(_) => Category::Module,
        }
    }

    pub(crate) fn set_store(&self, store: &Store, name: &str, ancestors: &[String]) {
        debug!(name, ?ancestors, "binding reference");
        match &self.kind {
            RefKind::State(inner) => inner.set_store(store, name, ancestors),
            RefKind::Getter(inner) => inner.set_store(store, name, ancestors),
            RefKind::Mutation(inner) => inner.set_store(store, name, ancestors),
            RefKind::Action(inner) => inner.set_store(store, name, ancestors),
            RefKind::Module(inner) => inner.set_store(store, name, ancestors),
        }
    }
}

/// Conversion from a typed reference handle into its erased [`Reference`].
pub trait AsReference {
    fn as_reference(&self) -> Reference;
}

/// Ordered name-to-reference mapping produced by a setup declaration.
#[derive(Clone, Default)]
pub struct Mapping {
    entries: Vec<(String, Reference)>,
}

impl Mapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a named reference, builder-style.
    pub fn entry(mut self, name: impl Into<String>, reference: &impl AsReference) -> Self {
        self.entries.push((name.into(), reference.as_reference()));
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&str, &Reference)> {
        self.entries
            .iter()
            .map(|(name, reference)| (name.as_str(), reference))
    }
}

/// A typed bundle of references that can enumerate itself for assembly.
///
/// Implementations list every reference the bundle declares under the name it
/// should carry in the store. The same bundle is handed back, bound, from
/// [`create_store`].
pub trait Bindings {
    fn mapping(&self) -> Mapping;
}

impl Bindings for Mapping {
    fn mapping(&self) -> Mapping {
        self.clone()
    }
}

/// Root setup declaration: a function that creates the reference bundle.
pub struct StoreOptions<F> {
    pub setup: F,
}

/// A live store together with the typed reference bundle bound to it.
pub struct BoundStore<C> {
    store: Store,
    refs: C,
}

impl<C> BoundStore<C> {
    /// Handle to the live store.
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// The typed bundle returned by the setup function, now bound.
    pub fn refs(&self) -> &C {
        &self.refs
    }
}

/// Classify a mapping into the engine configuration shape.
///
/// Shared by root assembly and module construction; the match over kinds is
/// exhaustive, so an unclassifiable reference cannot exist.
pub(crate) fn assemble(mapping: &Mapping, namespaced: bool) -> Result<ModuleConfig, ConfigError> {
    let mut config = ModuleConfig::new(namespaced);
    let mut seen = HashSet::new();

    for (name, reference) in mapping.iter() {
        if name.is_empty() {
            return Err(ConfigError::EmptyName);
        }
        if !seen.insert(name.to_string()) {
            return Err(ConfigError::DuplicateEntry(name.to_string()));
        }

        match &reference.kind {
            RefKind::State(inner) => config.state.push((name.to_string(), inner.initial())),
            RefKind::Getter(inner) => config.getters.push((name.to_string(), inner.handler())),
            RefKind::Mutation(inner) => config.mutations.push((name.to_string(), inner.handler())),
            RefKind::Action(inner) => config.actions.push((name.to_string(), inner.handler())),
            RefKind::Module(inner) => config.modules.push((name.to_string(), inner.config()?)),
        }
    }
    Ok(config)
}

/// Evaluate a setup declaration, build the live store from the classified
/// configuration, and bind every declared reference to it.
///
/// Binding recurses through nested modules, so after this returns every
/// reference reachable from the bundle reads and writes through the store.
pub fn create_store<C, F>(options: StoreOptions<F>) -> Result<BoundStore<C>, ConfigError>
where
    C: Bindings,
    F: FnOnce() -> C,
{
    let refs = (options.setup)();
    let mapping = refs.mapping();
    let config = assemble(&mapping, false)?;
    let store = Store::new(config)?;

    for (name, reference) in mapping.iter() {
        reference.set_store(&store, name, &[]);
    }

    Ok(BoundStore { store, refs })
}
