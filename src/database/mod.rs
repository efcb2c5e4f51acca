pub mod manager;
pub mod models;

pub use manager::{found, Database, DatabaseError, HealthCheck};
