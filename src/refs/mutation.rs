use std::sync::{Arc, RwLock};

use tracing::warn;

use super::binding::Binding;
use crate::setup::{AsReference, ErasedMutation, RefKind, Reference};
use crate::store::config::{DynPayload, MutationHandler};
use crate::store::Store;

struct MutationInner<P> {
    handler: Arc<dyn Fn(P) + Send + Sync>,
    binding: RwLock<Option<Binding>>,
}

/// Indirect reference to a synchronous state-mutating operation.
///
/// Standalone calls invoke the handler directly with no events. Bound calls
/// route the payload through the store's commit channel at the resolved path,
/// so subscribers observe the mutation under that name. Mutations may call
/// other mutation references; each bound call commits independently, and a
/// nested commit's event fires before the outer one's.
pub struct MutationRef<P> {
    inner: Arc<MutationInner<P>>,
}

impl<P> Clone for MutationRef<P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<P: Send + 'static> MutationRef<P> {
    fn new(handler: Arc<dyn Fn(P) + Send + Sync>) -> Self {
        Self {
            inner: Arc::new(MutationInner {
                handler,
                binding: RwLock::new(None),
            }),
        }
    }

    /// Invoke the mutation with a payload.
    pub fn call(&self, payload: P) {
        // The binding lock is released before the commit runs so the handler
        // may freely call back into this reference.
        let routed = {
            let binding = self.inner.binding.read().unwrap();
            binding.as_ref().and_then(|binding| {
                if binding.store.has_mutation(&binding.path) {
                    Some((binding.store.clone(), binding.path.clone()))
                } else {
                    warn!(path = %binding.path, "bound mutation not registered; invoking directly");
                    None
                }
            })
        };

        match routed {
            Some((store, path)) => store.commit(&path, Box::new(payload)),
            None => (self.inner.handler)(payload),
        }
    }
}

impl<P: Send + 'static> ErasedMutation for MutationRef<P> {
    fn handler(&self) -> MutationHandler {
        let handler = Arc::clone(&self.inner.handler);
        Arc::new(move |payload: DynPayload| match payload.downcast::<P>() {
            Ok(payload) => handler(*payload),
            Err(_) => panic!("committed payload has an unexpected type"),
        })
    }

    fn set_store(&self, store: &Store, name: &str, ancestors: &[String]) {
        *self.inner.binding.write().unwrap() = Some(Binding::new(store, name, ancestors));
    }
}

impl<P: Send + 'static> AsReference for MutationRef<P> {
    fn as_reference(&self) -> Reference {
        Reference::new(RefKind::Mutation(Arc::new(self.clone())))
    }
}

/// Create an indirect reference for a mutation.
pub fn mutation<P, F>(handler: F) -> MutationRef<P>
where
    P: Send + 'static,
    F: Fn(P) + Send + Sync + 'static,
{
    MutationRef::new(Arc::new(handler))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::refs::state;

    #[test]
    fn standalone_mutation_invokes_directly() {
        let count = state(0);
        let set_count = mutation({
            let count = count.clone();
            move |value: i32| count.set(value)
        });

        set_count.call(1);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn mutations_compose_while_standalone() {
        let first = state("".to_string());
        let second = state("".to_string());

        let set_first = mutation({
            let first = first.clone();
            move |value: String| first.set(value)
        });
        let set_second = mutation({
            let second = second.clone();
            move |value: String| second.set(value)
        });
        let set_both = mutation({
            let set_first = set_first.clone();
            let set_second = set_second.clone();
            move |(a, b): (String, String)| {
                set_first.call(a);
                set_second.call(b);
            }
        });

        set_both.call(("one".to_string(), "two".to_string()));
        assert_eq!(first.get(), "one");
        assert_eq!(second.get(), "two");
    }
}
