use thiserror::Error;

/// Errors raised while classifying a setup mapping.
///
/// These surface from [`create_store`](crate::create_store) before any store
/// is constructed; a malformed mapping never produces a partially-wired store.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Two entries resolved to the same name or namespaced path.
    #[error("duplicate entry `{0}` in setup mapping")]
    DuplicateEntry(String),

    /// An entry was declared under an empty name, which cannot contribute a
    /// path segment.
    #[error("setup mapping contains an entry with an empty name")]
    EmptyName,
}
