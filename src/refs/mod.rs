//! Indirect references: store-free declarations of state, derived values,
//! mutations, actions and modules that can be retroactively bound to a live
//! store.
//!
//! Every reference works in two modes. Standalone, it reads and writes
//! locally, which keeps setup code directly testable. Bound, it redirects
//! through the store at a resolved namespaced path. Binding happens once,
//! from [`create_store`](crate::create_store), and recurses through modules.

pub(crate) mod binding;

mod action;
mod getter;
mod module;
mod mutation;
mod state;

pub use action::{action, ActionRef};
pub use getter::{getter, GetterRef};
pub use module::{module, ModuleOptions, ModuleRef};
pub use mutation::{mutation, MutationRef};
pub use state::{state, StateRef};
