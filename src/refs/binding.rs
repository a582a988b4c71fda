use crate::store::Store;

/// Live-store attachment for a reference.
///
/// A reference's binding slot holds `None` while the reference is standalone
/// and `Some(Binding)` once it has been wired to a store. Binding a reference
/// a second time silently replaces the previous attachment.
#[derive(Clone)]
pub(crate) struct Binding {
    pub store: Store,
    /// Name this reference was declared under in its setup mapping.
    pub name: String,
    /// Names of the namespaced ancestor modules, root to leaf. Un-namespaced
    /// modules contribute no segment.
    pub ancestors: Vec<String>,
    /// Resolved path: ancestor segments plus `name`, slash-separated.
    pub path: String,
}

impl Binding {
    pub fn new(store: &Store, name: &str, ancestors: &[String]) -> Self {
        Self {
            store: store.clone(),
            name: name.to_string(),
            ancestors: ancestors.to_vec(),
            path: join_path(ancestors, name),
        }
    }
}

/// Joins namespaced ancestor segments and a variable name into a store path.
pub(crate) fn join_path<S: AsRef<str>>(ancestors: &[S], name: &str) -> String {
    let mut path = String::new();
    for ancestor in ancestors {
        path.push_str(ancestor.as_ref());
        path.push('/');
    }
    path.push_str(name);
    path
}
