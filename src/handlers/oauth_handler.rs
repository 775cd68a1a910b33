use actix_session::Session;
use actix_web::{web, HttpResponse};
use log::{error, info, warn};
use oauth2::reqwest::async_http_client;
use oauth2::{AuthorizationCode, CsrfToken, Scope, TokenResponse};
use serde::Deserialize;
use serde_json::Value;

use crate::handlers::session_handler;
use crate::models::user_session::{PendingLogin, UserSession};
use crate::routes::app_state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub next: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .append_header(("Location", location))
        .finish()
}

/// Only same-site relative targets are honoured for `next`.
fn safe_next(next: Option<String>) -> Option<String> {
    next.filter(|n| n.starts_with('/') && !n.starts_with("//"))
}

/// Starts the OAuth flow by redirecting to the provider's authorization page.
pub async fn login_route(
    data: web::Data<AppState>,
    session: Session,
    query: web::Query<LoginQuery>,
) -> HttpResponse {
    let next = safe_next(query.into_inner().next);

    if let Ok(Some(_)) = session_handler::current_user(&session) {
        info!("Already logged in; skipping provider round trip");
        return redirect(next.as_deref().unwrap_or(&data.oauth_config.post_login_redirect));
    }

    let (auth_url, csrf_token) = data
        .oauth_client
        .authorize_url(CsrfToken::new_random)
        .add_scopes(data.oauth_config.scopes.iter().cloned().map(Scope::new))
        .url();

    let pending = PendingLogin {
        state: csrf_token.secret().to_string(),
        next,
    };
    if let Err(e) = session_handler::store_pending_login(&session, &pending) {
        error!("Failed to store login state in session: {:?}", e);
        return HttpResponse::InternalServerError().body("Unable to start login");
    }

    info!("Redirecting to OAuth provider");
    redirect(auth_url.as_str())
}

/// Handles the provider's redirect back to us.
///
/// Checks the returned state against the one stored by `/login`, exchanges the
/// code for a token, keeps the token (and profile, if configured) in the
/// session and sends the browser on to its original target.
pub async fn callback_route(
    data: web::Data<AppState>,
    session: Session,
    query: web::Query<CallbackQuery>,
) -> HttpResponse {
    let query = query.into_inner();

    if let Some(err) = query.error {
        warn!("OAuth provider returned an error: {} ({:?})", err, query.error_description);
        return HttpResponse::BadRequest().body(format!("Authorization failed: {}", err));
    }
    let code = match query.code {
        Some(code) => code,
        None => return HttpResponse::BadRequest().body("Missing code"),
    };

    let pending = match session_handler::take_pending_login(&session) {
        Ok(Some(pending)) => pending,
        Ok(None) => return HttpResponse::BadRequest().body("No login in progress"),
        Err(e) => {
            error!("Unreadable login state in session: {:?}", e);
            return HttpResponse::BadRequest().body("No login in progress");
        }
    };
    if query.state.as_deref() != Some(pending.state.as_str()) {
        warn!("OAuth state mismatch on callback");
        return HttpResponse::BadRequest().body("State mismatch");
    }

    let token = match data
        .oauth_client
        .exchange_code(AuthorizationCode::new(code))
        .request_async(async_http_client)
        .await
    {
        Ok(token) => token,
        Err(err) => {
            error!("Token exchange error: {:?}", err);
            return HttpResponse::BadGateway().body("Token exchange failed");
        }
    };

    let mut user = UserSession::new(token.access_token().secret().to_string(), token.expires_in());
    user.refresh_token = token.refresh_token().map(|t| t.secret().to_string());
    user.scopes = token
        .scopes()
        .map(|scopes| scopes.iter().map(|s| s.to_string()).collect())
        .unwrap_or_else(|| data.oauth_config.scopes.clone());

    if let Some(userinfo_url) = &data.oauth_config.userinfo_url {
        user.user = fetch_profile(&data.http, userinfo_url, &user.access_token).await;
    }

    if let Err(e) = session_handler::store_user_session(&session, &user) {
        error!("Failed to store user session: {:?}", e);
        return HttpResponse::InternalServerError().body("Unable to complete login");
    }
    info!("Login completed");

    let target = pending
        .next
        .unwrap_or_else(|| data.oauth_config.post_login_redirect.clone());
    redirect(&target)
}

/// Drops everything the session holds and redirects.
pub async fn logout_route(data: web::Data<AppState>, session: Session) -> HttpResponse {
    session_handler::clear(&session);
    info!("User logged out");
    redirect(&data.oauth_config.post_logout_redirect)
}

async fn fetch_profile(client: &reqwest::Client, url: &str, access_token: &str) -> Option<Value> {
    match client.get(url).bearer_auth(access_token).send().await {
        Ok(res) if res.status().is_success() => match res.json::<Value>().await {
            Ok(profile) => Some(profile),
            Err(e) => {
                warn!("Unreadable user profile: {}", e);
                None
            }
        },
        Ok(res) => {
            warn!("User profile request failed: {}", res.status());
            None
        }
        Err(e) => {
            warn!("User profile request failed: {}", e);
            None
        }
    }
}
