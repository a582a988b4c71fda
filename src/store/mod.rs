//! The store engine: state tree, getter table, commit and dispatch channels,
//! and the mutation/action subscription streams the binding layer routes
//! through once references are bound.

pub(crate) mod config;
mod store;

pub use store::{ActionEvent, MutationEvent, Store};
