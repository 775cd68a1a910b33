pub mod user_session;
