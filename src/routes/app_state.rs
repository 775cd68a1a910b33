use oauth2::basic::BasicClient;
use oauth2::{AuthUrl, ClientId, ClientSecret, RedirectUrl, TokenUrl};

use crate::config::{ConfigError, OAuthConfig};

#[derive(Clone)]
pub struct AppState {
    pub oauth_client: BasicClient,
    pub oauth_config: OAuthConfig,
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(oauth_config: OAuthConfig) -> Result<Self, ConfigError> {
        let invalid = |name: &'static str| {
            move |e: url::ParseError| ConfigError::Invalid {
                name,
                reason: e.to_string(),
            }
        };
        let oauth_client = BasicClient::new(
            ClientId::new(oauth_config.client_id.clone()),
            Some(ClientSecret::new(oauth_config.client_secret.clone())),
            AuthUrl::new(oauth_config.authorize_url.clone()).map_err(invalid("OAUTH_AUTHORIZE_URL"))?,
            Some(TokenUrl::new(oauth_config.token_url.clone()).map_err(invalid("OAUTH_TOKEN_URL"))?),
        )
        .set_redirect_uri(
            RedirectUrl::new(oauth_config.redirect_url.clone()).map_err(invalid("OAUTH_REDIRECT_URL"))?,
        );

        Ok(AppState {
            oauth_client,
            oauth_config,
            http: reqwest::Client::new(),
        })
    }
}
