pub mod oauth_handler;
pub mod session_handler;
