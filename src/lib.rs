pub mod api;
pub mod auth;
pub mod cache;
pub mod client;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod repository;
pub mod routes;
pub mod services;
pub mod state;
pub mod types;

pub use routes::app;

#[cfg(test)]
pub mod testing;
