//! Caller identity, admin roles and the YAML-backed admin store.
//! Keep the public surface thin and split implementation across sub-modules.

mod principal;
mod authorizer;
mod admins;

pub use principal::Caller;
pub use authorizer::{Privilege, Role, required_privilege};
pub use admins::{AdminRecord, AdminStore, StoreError};
