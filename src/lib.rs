//! # Canister
//!
//! Typed, functional-style references over a Vuex-shaped application store.
//!
//! Canister lets application code declare state, derived values and operations
//! as plain reference handles *before* a store exists, then wire them into a
//! live store afterwards. The same handles work both ways:
//!
//! - **Standalone** - reads and writes hit a local slot, mutations and
//!   actions invoke their functions directly. Useful for testing setup code
//!   without a store.
//! - **Bound** - after [`create_store`], reads and writes redirect through
//!   the store's state tree, getter table, commit and dispatch channels at a
//!   resolved namespaced path.
//!
//! ## The pieces
//!
//! - [`state`], [`getter`], [`mutation`], [`action`] - leaf references
//! - [`module`] - a nested bundle of references with namespace semantics
//! - [`Bindings`] - how a typed bundle enumerates itself for assembly
//! - [`create_store`] - classify, build the store, bind everything
//!
//! ## Example
//!
//! ```
//! use canister::{create_store, getter, mutation, state, Bindings, Mapping, StoreOptions};
//!
//! struct Counter {
//!     count: canister::StateRef<i32>,
//!     doubled: canister::GetterRef<i32>,
//!     bump: canister::MutationRef<i32>,
//! }
//!
//! impl Bindings for Counter {
//!     fn mapping(&self) -> Mapping {
//!         Mapping::new()
//!             .entry("count", &self.count)
//!             .entry("doubled", &self.doubled)
//!             .entry("bump", &self.bump)
//!     }
//! }
//!
//! let app = create_store(StoreOptions {
//!     setup: || {
//!         let count = state(0);
//!         let doubled = getter({
//!             let count = count.clone();
//!             move || count.get() * 2
//!         });
//!         let bump = mutation({
//!             let count = count.clone();
//!             move |by: i32| count.set(count.get() + by)
//!         });
//!         Counter { count, doubled, bump }
//!     },
//! })
//! .unwrap();
//!
//! app.refs().bump.call(20);
//! assert_eq!(app.store().state::<i32>("count"), Some(20));
//! assert_eq!(app.store().getter::<i32>("doubled"), Some(40));
//! ```

pub mod error;
pub mod refs;
pub mod setup;
pub mod store;

pub use error::ConfigError;
pub use refs::{
    action, getter, module, mutation, state, ActionRef, GetterRef, ModuleOptions, ModuleRef,
    MutationRef, StateRef,
};
pub use setup::{
    create_store, AsReference, Bindings, BoundStore, Category, Mapping, Reference, StoreOptions,
};
pub use store::{ActionEvent, MutationEvent, Store};
