// Postgres storage layer with sqlx
//
// Owns the task store pool lifecycle: the pool is built once at process
// start (lazily, so a down database does not prevent startup) and closed
// at shutdown. Handlers receive the Database by injection, never through
// ambient state.

pub mod config;
pub mod models;
pub mod repositories;

pub use config::StoreConfig;
pub use models::*;
pub use repositories::Database;
