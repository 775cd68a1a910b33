pub mod app_state;
pub mod auth_routes;
pub mod blueprint;
