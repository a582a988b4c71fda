use std::any::Any;
use std::sync::Arc;

use futures::future::BoxFuture;

/// A value held in the state tree or produced by a getter.
pub(crate) type DynValue = Arc<dyn Any + Send + Sync>;

/// A payload moved into a mutation or action handler, or returned by an
/// action.
pub(crate) type DynPayload = Box<dyn Any + Send>;

pub(crate) type GetterHandler = Arc<dyn Fn() -> DynValue + Send + Sync>;
pub(crate) type MutationHandler = Arc<dyn Fn(DynPayload) + Send + Sync>;
pub(crate) type ActionHandler =
    Arc<dyn Fn(DynPayload) -> BoxFuture<'static, DynPayload> + Send + Sync>;

/// The classified configuration shape the store engine consumes: declared
/// references bucketed by kind, with nested modules recursing.
///
/// Entry order follows declaration order; the engine flattens this into its
/// path-keyed tables at construction.
pub(crate) struct ModuleConfig {
    pub namespaced: bool,
    pub state: Vec<(String, DynValue)>,
    pub getters: Vec<(String, GetterHandler)>,
    pub mutations: Vec<(String, MutationHandler)>,
    pub actions: Vec<(String, ActionHandler)>,
    pub modules: Vec<(String, ModuleConfig)>,
}

impl ModuleConfig {
    pub fn new(namespaced: bool) -> Self {
        Self {
            namespaced,
            state: Vec::new(),
            getters: Vec::new(),
            mutations: Vec::new(),
            actions: Vec::new(),
            modules: Vec::new(),
        }
    }
}
