pub mod config;
pub mod handlers;
pub mod memory_session_store;
pub mod models;
pub mod routes;
