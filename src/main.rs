use actix_files::Files;
use actix_session::SessionMiddleware;
use actix_web::{middleware::Logger, web, App, HttpServer};
use log::info;

use jweb_auth::config::{self, OAuthConfig, ServerConfig, SESSION_COOKIE_NAME};
use jweb_auth::memory_session_store::MemorySessionStore;
use jweb_auth::routes::app_state::AppState;
use jweb_auth::routes::auth_routes;
use jweb_auth::routes::blueprint::Router;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    config::load_env();
    config::init_logging();

    let server = ServerConfig::from_env()?;
    let state = web::Data::new(AppState::new(OAuthConfig::load()?)?);
    let session_key = server.session_key()?;
    let store = MemorySessionStore::new();

    let mut router = Router::new();
    router.mount(auth_routes::default_auth_blueprint()?, server.auth_prefix.as_deref())?;

    let static_dir = server.static_dir.clone();
    let secure_cookies = server.secure_cookies;

    info!("Starting server on http://{}:{}", server.host, server.port);
    HttpServer::new(move || {
        App::new()
            .wrap(
                SessionMiddleware::builder(store.clone(), session_key.clone())
                    .cookie_name(SESSION_COOKIE_NAME.to_string())
                    .cookie_secure(secure_cookies)
                    .build(),
            )
            .wrap(Logger::default())
            .app_data(state.clone())
            .configure(|cfg| router.configure(cfg))
            // Static files last so they never shadow a mounted route.
            .service(Files::new("/", static_dir.as_str()).index_file("index.html"))
    })
    .bind((server.host.as_str(), server.port))?
    .run()
    .await?;

    Ok(())
}
