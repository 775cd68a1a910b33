use actix_web::{FromRequest, Handler, Responder};

use crate::handlers::oauth_handler;
use crate::routes::blueprint::{Blueprint, RegistrationError};

pub const AUTH_BLUEPRINT: &str = "auth";

pub const LOGIN_PATH: &str = "/login";
pub const LOGOUT_PATH: &str = "/logout";
pub const CALLBACK_PATH: &str = "/callback";

pub const LOGIN_ROUTE: &str = "login_route";
pub const LOGOUT_ROUTE: &str = "logout_route";
pub const CALLBACK_ROUTE: &str = "callback_route";

/// Builds the `auth` blueprint from the three given handlers.
pub fn auth_blueprint<L, La, O, Oa, C, Ca>(
    login: L,
    logout: O,
    callback: C,
) -> Result<Blueprint, RegistrationError>
where
    L: Handler<La> + Send + Sync,
    La: FromRequest + 'static,
    L::Output: Responder + 'static,
    O: Handler<Oa> + Send + Sync,
    Oa: FromRequest + 'static,
    O::Output: Responder + 'static,
    C: Handler<Ca> + Send + Sync,
    Ca: FromRequest + 'static,
    C::Output: Responder + 'static,
{
    let mut blueprint = Blueprint::new(AUTH_BLUEPRINT);
    blueprint
        .add_route(LOGIN_PATH, LOGIN_ROUTE, login)?
        .add_route(LOGOUT_PATH, LOGOUT_ROUTE, logout)?
        .add_route(CALLBACK_PATH, CALLBACK_ROUTE, callback)?;
    Ok(blueprint)
}

/// The `auth` blueprint wired to the OAuth handlers.
pub fn default_auth_blueprint() -> Result<Blueprint, RegistrationError> {
    auth_blueprint(
        oauth_handler::login_route,
        oauth_handler::logout_route,
        oauth_handler::callback_route,
    )
}
