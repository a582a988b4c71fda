use std::future::Future;
use std::sync::{Arc, RwLock};

use futures::future::BoxFuture;
use tracing::warn;

use super::binding::Binding;
use crate::setup::{AsReference, ErasedAction, RefKind, Reference};
use crate::store::config::{ActionHandler, DynPayload};
use crate::store::Store;

struct ActionInner<P, R> {
    handler: Arc<dyn Fn(P) -> BoxFuture<'static, R> + Send + Sync>,
    binding: RwLock<Option<Binding>>,
}

/// Indirect reference to an asynchronous operation.
///
/// Standalone calls invoke the handler directly. Bound calls route through
/// the store's dispatch channel at the resolved path; dispatch subscribers
/// observe initiation synchronously, so an outer action's event fires before
/// the inner actions it awaits. Failures travel as whatever `R` encodes
/// (typically a `Result`); nothing here catches or wraps them.
pub struct ActionRef<P, R> {
    inner: Arc<ActionInner<P, R>>,
}

impl<P, R> Clone for ActionRef<P, R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<P, R> ActionRef<P, R>
where
    P: Send + 'static,
    R: Send + 'static,
{
    fn new(handler: Arc<dyn Fn(P) -> BoxFuture<'static, R> + Send + Sync>) -> Self {
        Self {
            inner: Arc::new(ActionInner {
                handler,
                binding: RwLock::new(None),
            }),
        }
    }

    /// Invoke the action with a payload, producing its future.
    pub fn call(&self, payload: P) -> BoxFuture<'static, R> {
        let routed = {
            let binding = self.inner.binding.read().unwrap();
            binding.as_ref().and_then(|binding| {
                if binding.store.has_action(&binding.path) {
                    Some((binding.store.clone(), binding.path.clone()))
                } else {
                    warn!(path = %binding.path, "bound action not registered; invoking directly");
                    None
                }
            })
        };

        match routed {
            Some((store, path)) => {
                let fut = store.dispatch(&path, Box::new(payload));
                Box::pin(async move {
                    match fut.await.downcast::<R>() {
                        Ok(value) => *value,
                        Err(_) => panic!("dispatched action produced an unexpected payload type"),
                    }
                })
            }
            None => (self.inner.handler)(payload),
        }
    }
}

impl<P, R> ErasedAction for ActionRef<P, R>
where
    P: Send + 'static,
    R: Send + 'static,
{
    fn handler(&self) -> ActionHandler {
        let handler = Arc::clone(&self.inner.handler);
        Arc::new(
            move |payload: DynPayload| -> BoxFuture<'static, DynPayload> {
                match payload.downcast::<P>() {
                    Ok(payload) => {
                        let fut = handler(*payload);
                        Box::pin(async move { Box::new(fut.await) as DynPayload })
                    }
                    Err(_) => panic!("dispatched payload has an unexpected type"),
                }
            },
        )
    }

    fn set_store(&self, store: &Store, name: &str, ancestors: &[String]) {
        *self.inner.binding.write().unwrap() = Some(Binding::new(store, name, ancestors));
    }
}

impl<P, R> AsReference for ActionRef<P, R>
where
    P: Send + 'static,
    R: Send + 'static,
{
    fn as_reference(&self) -> Reference {
        Reference::new(RefKind::Action(Arc::new(self.clone())))
    }
}

/// Create an indirect reference for an asynchronous action.
pub fn action<P, R, F, Fut>(handler: F) -> ActionRef<P, R>
where
    P: Send + 'static,
    R: Send + 'static,
    F: Fn(P) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
{
    ActionRef::new(Arc::new(move |payload| {
        Box::pin(handler(payload)) as BoxFuture<'static, R>
    }))
}
