use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use futures::future::BoxFuture;
use tracing::{trace, warn};

use super::config::{
    ActionHandler, DynPayload, DynValue, GetterHandler, ModuleConfig, MutationHandler,
};
use crate::error::ConfigError;
use crate::refs::binding::join_path;

/// Event delivered to mutation subscribers once a committed handler has
/// returned. Nested commits therefore emit their events before the outer
/// commit's own event.
#[derive(Clone, Debug)]
pub struct MutationEvent {
    /// Resolved path of the committed mutation.
    pub path: String,
}

/// Event delivered to action subscribers when a dispatch is initiated,
/// before the action body has run.
#[derive(Clone, Debug)]
pub struct ActionEvent {
    /// Resolved path of the dispatched action.
    pub path: String,
}

type MutationSubscriber = Box<dyn Fn(&MutationEvent) + Send + Sync>;
type ActionSubscriber = Box<dyn Fn(&ActionEvent) + Send + Sync>;

/// One level of the state tree. Namespaced modules own a child node under
/// their name; un-namespaced modules are merged into their parent's node.
#[derive(Default)]
struct StateNode {
    values: HashMap<String, DynValue>,
    children: HashMap<String, StateNode>,
}

impl StateNode {
    fn descend(&self, segments: &[String]) -> Option<&StateNode> {
        segments
            .iter()
            .try_fold(self, |node, segment| node.children.get(segment))
    }

    fn descend_mut(&mut self, segments: &[String]) -> Option<&mut StateNode> {
        segments
            .iter()
            .try_fold(self, |node, segment| node.children.get_mut(segment))
    }
}

struct StoreInner {
    state: RwLock<StateNode>,
    // Handler tables are immutable after construction, so commit and dispatch
    // never hold a lock while user code runs.
    getters: HashMap<String, GetterHandler>,
    mutations: HashMap<String, MutationHandler>,
    actions: HashMap<String, ActionHandler>,
    subscribers: RwLock<Vec<MutationSubscriber>>,
    action_subscribers: RwLock<Vec<ActionSubscriber>>,
}

/// A live store assembled from a classified reference configuration.
///
/// State lives in a tree indexed by namespaced module segments; getters,
/// mutations and actions live in flat tables keyed by resolved path.
/// Handles are cheap to clone and share the same underlying store.
pub struct Store {
    inner: Arc<StoreInner>,
}

impl Clone for Store {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl Store {
    pub(crate) fn new(config: ModuleConfig) -> Result<Self, ConfigError> {
        let mut root = StateNode::default();
        let mut getters = HashMap::new();
        let mut mutations = HashMap::new();
        let mut actions = HashMap::new();
        flatten(
            config,
            &mut Vec::new(),
            &mut root,
            &mut getters,
            &mut mutations,
            &mut actions,
        )?;

        Ok(Self {
            inner: Arc::new(StoreInner {
                state: RwLock::new(root),
                getters,
                mutations,
                actions,
                subscribers: RwLock::new(Vec::new()),
                action_subscribers: RwLock::new(Vec::new()),
            }),
        })
    }

    /// Read a state entry by slash-separated path, e.g. `"ns/bar"`.
    pub fn state<T>(&self, path: &str) -> Option<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        let (segments, name) = split_path(path);
        self.state_value(&segments, name)
            .and_then(|value| value.downcast_ref::<T>().cloned())
    }

    /// Overwrite a state entry by slash-separated path, bypassing mutations.
    ///
    /// Returns `false` when the module path does not exist.
    pub fn set_state<T>(&self, path: &str, value: T) -> bool
    where
        T: Send + Sync + 'static,
    {
        let (segments, name) = split_path(path);
        self.set_state_value(&segments, name, Arc::new(value))
    }

    /// Evaluate a getter by resolved path.
    pub fn getter<T>(&self, path: &str) -> Option<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        self.getter_value(path)
            .and_then(|value| value.downcast_ref::<T>().cloned())
    }

    /// Subscribe to the mutation stream. Listeners observe every commit, in
    /// the order handlers complete.
    pub fn subscribe<F>(&self, listener: F)
    where
        F: Fn(&MutationEvent) + Send + Sync + 'static,
    {
        self.inner
            .subscribers
            .write()
            .unwrap()
            .push(Box::new(listener));
    }

    /// Subscribe to the dispatch stream. Listeners observe every dispatch at
    /// initiation, before the action body runs.
    pub fn subscribe_action<F>(&self, listener: F)
    where
        F: Fn(&ActionEvent) + Send + Sync + 'static,
    {
        self.inner
            .action_subscribers
            .write()
            .unwrap()
            .push(Box::new(listener));
    }

    pub(crate) fn state_value(&self, segments: &[String], name: &str) -> Option<DynValue> {
        let state = self.inner.state.read().unwrap();
        state
            .descend(segments)
            .and_then(|node| node.values.get(name))
            .cloned()
    }

    pub(crate) fn set_state_value(
        &self,
        segments: &[String],
        name: &str,
        value: DynValue,
    ) -> bool {
        let mut state = self.inner.state.write().unwrap();
        match state.descend_mut(segments) {
            Some(node) => {
                node.values.insert(name.to_string(), value);
                true
            }
            None => false,
        }
    }

    pub(crate) fn getter_value(&self, path: &str) -> Option<DynValue> {
        self.inner.getters.get(path).map(|handler| handler())
    }

    pub(crate) fn has_mutation(&self, path: &str) -> bool {
        self.inner.mutations.contains_key(path)
    }

    pub(crate) fn has_action(&self, path: &str) -> bool {
        self.inner.actions.contains_key(path)
    }

    /// Commit a mutation by resolved path. The handler runs synchronously;
    /// subscribers are notified after it returns.
    pub(crate) fn commit(&self, path: &str, payload: DynPayload) {
        let Some(handler) = self.inner.mutations.get(path) else {
            warn!(path, "commit to unknown mutation path");
            return;
        };
        trace!(path, "commit");
        handler(payload);

        let event = MutationEvent {
            path: path.to_string(),
        };
        let subscribers = self.inner.subscribers.read().unwrap();
        for subscriber in subscribers.iter() {
            subscriber(&event);
        }
    }

    /// Dispatch an action by resolved path. Subscribers are notified
    /// synchronously at initiation; the returned future drives the body.
    pub(crate) fn dispatch(
        &self,
        path: &str,
        payload: DynPayload,
    ) -> BoxFuture<'static, DynPayload> {
        let Some(handler) = self.inner.actions.get(path) else {
            warn!(path, "dispatch to unknown action path");
            return Box::pin(futures::future::ready(Box::new(()) as DynPayload));
        };
        trace!(path, "dispatch");

        let event = ActionEvent {
            path: path.to_string(),
        };
        {
            let subscribers = self.inner.action_subscribers.read().unwrap();
            for subscriber in subscribers.iter() {
                subscriber(&event);
            }
        }
        handler(payload)
    }
}

/// Walks a configuration tree into the engine's flat tables. Namespaced
/// modules extend the path prefix and own a child state node; un-namespaced
/// modules merge into the level they were declared at.
fn flatten(
    config: ModuleConfig,
    prefix: &mut Vec<String>,
    node: &mut StateNode,
    getters: &mut HashMap<String, GetterHandler>,
    mutations: &mut HashMap<String, MutationHandler>,
    actions: &mut HashMap<String, ActionHandler>,
) -> Result<(), ConfigError> {
    for (name, value) in config.state {
        if node.values.insert(name.clone(), value).is_some() {
            return Err(ConfigError::DuplicateEntry(join_path(prefix.as_slice(), &name)));
        }
    }
    for (name, handler) in config.getters {
        insert_keyed(getters, prefix, name, handler)?;
    }
    for (name, handler) in config.mutations {
        insert_keyed(mutations, prefix, name, handler)?;
    }
    for (name, handler) in config.actions {
        insert_keyed(actions, prefix, name, handler)?;
    }
    for (name, child) in config.modules {
        if child.namespaced {
            if node.children.contains_key(&name) {
                return Err(ConfigError::DuplicateEntry(join_path(prefix.as_slice(), &name)));
            }
            let child_node = node.children.entry(name.clone()).or_default();
            prefix.push(name);
            flatten(child, prefix, child_node, getters, mutations, actions)?;
            prefix.pop();
        } else {
            flatten(child, prefix, node, getters, mutations, actions)?;
        }
    }
    Ok(())
}

fn insert_keyed<V>(
    table: &mut HashMap<String, V>,
    prefix: &[String],
    name: String,
    value: V,
) -> Result<(), ConfigError> {
    let path = join_path(prefix, &name);
    if table.insert(path.clone(), value).is_some() {
        return Err(ConfigError::DuplicateEntry(path));
    }
    Ok(())
}

fn split_path(path: &str) -> (Vec<String>, &str) {
    match path.rsplit_once('/') {
        Some((segments, name)) => (segments.split('/').map(str::to_string).collect(), name),
        None => (Vec::new(), path),
    }
}
