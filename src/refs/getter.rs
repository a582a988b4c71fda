use std::sync::{Arc, RwLock};

use tracing::warn;

use super::binding::Binding;
use crate::setup::{AsReference, ErasedGetter, RefKind, Reference};
use crate::store::config::{DynValue, GetterHandler};
use crate::store::Store;

struct GetterInner<T> {
    compute: Arc<dyn Fn() -> T + Send + Sync>,
    binding: RwLock<Option<Binding>>,
}

/// Indirect reference to a derived, read-only value.
///
/// Standalone reads invoke the compute function directly; bound reads look up
/// the store's getter table at the resolved path. Getters may read other
/// references, bound or not, so derived values compose before a store exists.
pub struct GetterRef<T> {
    inner: Arc<GetterInner<T>>,
}

impl<T> Clone for GetterRef<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> GetterRef<T> {
    fn new(compute: Arc<dyn Fn() -> T + Send + Sync>) -> Self {
        Self {
            inner: Arc::new(GetterInner {
                compute,
                binding: RwLock::new(None),
            }),
        }
    }

    /// Evaluate the getter.
    pub fn get(&self) -> T {
        {
            let binding = self.inner.binding.read().unwrap();
            if let Some(binding) = binding.as_ref() {
                let stored = binding
                    .store
                    .getter_value(&binding.path)
                    .and_then(|value| value.downcast_ref::<T>().cloned());
                match stored {
                    Some(value) => return value,
                    None => {
                        warn!(path = %binding.path, "bound getter did not resolve; computing directly");
                    }
                }
            }
        }
        (self.inner.compute)()
    }
}

impl<T: Clone + Send + Sync + 'static> ErasedGetter for GetterRef<T> {
    fn handler(&self) -> GetterHandler {
        let compute = Arc::clone(&self.inner.compute);
        Arc::new(move || Arc::new(compute()) as DynValue)
    }

    fn set_store(&self, store: &Store, name: &str, ancestors: &[String]) {
        *self.inner.binding.write().unwrap() = Some(Binding::new(store, name, ancestors));
    }
}

impl<T: Clone + Send + Sync + 'static> AsReference for GetterRef<T> {
    fn as_reference(&self) -> Reference {
        Reference::new(RefKind::Getter(Arc::new(self.clone())))
    }
}

/// Create an indirect reference for a derived value.
pub fn getter<T, F>(compute: F) -> GetterRef<T>
where
    T: Clone + Send + Sync + 'static,
    F: Fn() -> T + Send + Sync + 'static,
{
    GetterRef::new(Arc::new(compute))
}
