use std::sync::{Arc, RwLock};

use tracing::warn;

use super::binding::Binding;
use crate::setup::{AsReference, ErasedState, RefKind, Reference};
use crate::store::config::DynValue;
use crate::store::Store;

struct StateInner<T> {
    /// Local slot: authoritative while standalone, kept as a mirror once
    /// bound. Bound reads always come from the store.
    slot: RwLock<T>,
    binding: RwLock<Option<Binding>>,
}

/// Indirect reference to a state entry.
///
/// Created with an initial value and no store; reads and writes hit a local
/// slot until the reference is bound, then redirect through the store's state
/// tree at the resolved path. Handles are cheap clones sharing one slot, so
/// closures that captured a clone observe later binding.
pub struct StateRef<T> {
    inner: Arc<StateInner<T>>,
}

impl<T> Clone for StateRef<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> StateRef<T> {
    fn new(initial: T) -> Self {
        Self {
            inner: Arc::new(StateInner {
                slot: RwLock::new(initial),
                binding: RwLock::new(None),
            }),
        }
    }

    /// Current value: from the store's state tree when bound, from the local
    /// slot otherwise.
    pub fn get(&self) -> T {
        let binding = self.inner.binding.read().unwrap();
        if let Some(binding) = binding.as_ref() {
            let stored = binding
                .store
                .state_value(&binding.ancestors, &binding.name)
                .and_then(|value| value.downcast_ref::<T>().cloned());
            match stored {
                Some(value) => return value,
                None => {
                    warn!(path = %binding.path, "bound state read did not resolve; using local slot");
                }
            }
        }
        self.inner.slot.read().unwrap().clone()
    }

    /// Overwrite the value. Writes through to the store when bound; the local
    /// slot is updated either way.
    pub fn set(&self, value: T) {
        {
            let binding = self.inner.binding.read().unwrap();
            if let Some(binding) = binding.as_ref() {
                let stored = binding.store.set_state_value(
                    &binding.ancestors,
                    &binding.name,
                    Arc::new(value.clone()),
                );
                if !stored {
                    warn!(path = %binding.path, "bound state write did not resolve; local slot only");
                }
            }
        }
        *self.inner.slot.write().unwrap() = value;
    }

    /// Modify the value in place. Read-modify-write; when bound, another
    /// mutation may interleave between the read and the write.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        let mut value = self.get();
        f(&mut value);
        self.set(value);
    }
}

impl<T: Clone + Send + Sync + 'static> ErasedState for StateRef<T> {
    fn initial(&self) -> DynValue {
        Arc::new(self.inner.slot.read().unwrap().clone())
    }

    fn set_store(&self, store: &Store, name: &str, ancestors: &[String]) {
        *self.inner.binding.write().unwrap() = Some(Binding::new(store, name, ancestors));
    }
}

impl<T: Clone + Send + Sync + 'static> AsReference for StateRef<T> {
    fn as_reference(&self) -> Reference {
        Reference::new(RefKind::State(Arc::new(self.clone())))
    }
}

/// Create an indirect reference for a state entry.
pub fn state<T: Clone + Send + Sync + 'static>(initial: T) -> StateRef<T> {
    StateRef::new(initial)
}
