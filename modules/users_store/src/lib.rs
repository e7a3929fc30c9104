// === PUBLIC CONTRACT ===
// Models, the remote collection port and its errors.
pub mod contract;

pub use contract::{client, error, model};

// === MODULE CONFIG ===
pub mod config;
pub use config::UsersStoreConfig;

// === DOMAIN ===
// Normalizer, entity cache, query state and view deriver.
pub mod domain;

pub use domain::cache::UsersCache;
pub use domain::query::{QueryChannel, QueryPatch, QueryState, UsersQuery};
pub use domain::view::{derive_view, UsersView, ViewDeriver};

// === ADAPTERS ===
pub mod infra;
