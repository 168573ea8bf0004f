//! Product catalog storage with per-owner scoping.

mod scope;
mod store;

pub use scope::OwnerScope;
pub use store::{NewProduct, ProductStore};
