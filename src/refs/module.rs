use std::sync::{Arc, RwLock};

use tracing::debug;

use crate::error::ConfigError;
use crate::setup::{assemble, AsReference, Bindings, ErasedModule, Mapping, RefKind, Reference};
use crate::store::config::ModuleConfig;
use crate::store::Store;

/// Construction input for [`module`]: the namespacing flag and the setup
/// function that declares the children.
pub struct ModuleOptions<F> {
    /// Whether this module's name contributes a path segment. Un-namespaced
    /// modules are transparent: their children resolve as if declared at the
    /// enclosing level.
    pub namespaced: bool,
    pub setup: F,
}

struct ModuleBinding {
    name: String,
    /// Namespaced segments from the root to this module, own name included
    /// when namespaced.
    segments: Vec<String>,
}

struct ModuleInner<C> {
    children: C,
    mapping: Mapping,
    namespaced: bool,
    binding: RwLock<Option<ModuleBinding>>,
}

/// Indirect reference to a nested bundle of references.
///
/// The setup function runs eagerly at construction, before any store exists.
/// When the module is bound it fans out to every child with its own segment
/// list as the ancestors, which is how arbitrarily deep nesting resolves
/// correct paths.
pub struct ModuleRef<C> {
    inner: Arc<ModuleInner<C>>,
}

impl<C> Clone for ModuleRef<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C: Bindings + Send + Sync + 'static> ModuleRef<C> {
    fn new(namespaced: bool, children: C) -> Self {
        let mapping = children.mapping();
        Self {
            inner: Arc::new(ModuleInner {
                children,
                mapping,
                namespaced,
                binding: RwLock::new(None),
            }),
        }
    }

    /// Borrow the typed child bundle.
    pub fn children(&self) -> &C {
        &self.inner.children
    }

    /// Apply a projection to the child bundle.
    ///
    /// This is how one module reads another's references without reaching
    /// into its fields, e.g. an un-namespaced module's getter reading a
    /// namespaced sibling's getter.
    pub fn with<R>(&self, f: impl FnOnce(&C) -> R) -> R {
        f(&self.inner.children)
    }

    pub fn namespaced(&self) -> bool {
        self.inner.namespaced
    }

    /// Name this module was declared under; `None` until bound.
    pub fn name(&self) -> Option<String> {
        self.inner
            .binding
            .read()
            .unwrap()
            .as_ref()
            .map(|binding| binding.name.clone())
    }

    /// Ordered namespaced segments from the root to this module, own name
    /// included when namespaced. Empty until bound.
    pub fn path(&self) -> Vec<String> {
        self.inner
            .binding
            .read()
            .unwrap()
            .as_ref()
            .map(|binding| binding.segments.clone())
            .unwrap_or_default()
    }
}

impl<C: Bindings + Send + Sync + 'static> ErasedModule for ModuleRef<C> {
    fn config(&self) -> Result<ModuleConfig, ConfigError> {
        assemble(&self.inner.mapping, self.inner.namespaced)
    }

    fn set_store(&self, store: &Store, name: &str, ancestors: &[String]) {
        let mut segments = ancestors.to_vec();
        if self.inner.namespaced {
            segments.push(name.to_string());
        }
        debug!(name, ?segments, "binding module");
        *self.inner.binding.write().unwrap() = Some(ModuleBinding {
            name: name.to_string(),
            segments: segments.clone(),
        });

        for (child_name, child) in self.inner.mapping.iter() {
            child.set_store(store, child_name, &segments);
        }
    }
}

impl<C: Bindings + Send + Sync + 'static> AsReference for ModuleRef<C> {
    fn as_reference(&self) -> Reference {
        Reference::new(RefKind::Module(Arc::new(self.clone())))
    }
}

/// Create a module reference. The setup function runs immediately.
pub fn module<C, F>(options: ModuleOptions<F>) -> ModuleRef<C>
where
    C: Bindings + Send + Sync + 'static,
    F: FnOnce() -> C,
{
    ModuleRef::new(options.namespaced, (options.setup)())
}
