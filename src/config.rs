use std::{env, fs};

use actix_web::cookie::Key;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use log::warn;
use serde::Deserialize;
use url::Url;

pub fn init_logging() {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));
}

/// Loads a `.env` file from the working directory, if there is one.
pub fn load_env() {
    if let Ok(path) = dotenv::dotenv() {
        log::debug!("Loaded environment from {}", path.display());
    }
}

const WEB_HOST: &str = "127.0.0.1";
const WEB_PORT: u16 = 8080;
const WEB_STATIC_DIR: &str = "./static";
pub const SESSION_COOKIE_NAME: &str = "jweb_session";

const DISCORD_AUTHORIZE_URL: &str = "https://discord.com/api/oauth2/authorize";
const DISCORD_TOKEN_URL: &str = "https://discord.com/api/oauth2/token";
const DISCORD_USERINFO_URL: &str = "https://discord.com/api/users/@me";
const DEFAULT_SCOPES: &str = "identify guilds";
const DEFAULT_REDIRECT_URL: &str = "http://localhost:8080/callback";
const CLIENT_SECRET_FILE: &str = "./cfg/client_secret.json";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing configuration value: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },

    #[error("Unable to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in client secret file: {0}")]
    Json(#[from] serde_json::Error),
}

fn var(name: &str) -> Option<String> {
    env::var(name).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn flag(name: &str) -> bool {
    var(name).map(|v| v == "true" || v == "1").unwrap_or(false)
}

fn checked_url(name: &'static str, value: String) -> Result<String, ConfigError> {
    Url::parse(&value).map_err(|e| ConfigError::Invalid {
        name,
        reason: e.to_string(),
    })?;
    Ok(value)
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub static_dir: String,
    pub auth_prefix: Option<String>,
    pub session_secret: Option<String>,
    pub secure_cookies: bool,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = match var("WEB_PORT") {
            Some(p) => p.parse().map_err(|_| ConfigError::Invalid {
                name: "WEB_PORT",
                reason: format!("'{}' is not a port number", p),
            })?,
            None => WEB_PORT,
        };
        Ok(ServerConfig {
            host: var("WEB_HOST").unwrap_or_else(|| WEB_HOST.to_string()),
            port,
            static_dir: var("WEB_STATIC_DIR").unwrap_or_else(|| WEB_STATIC_DIR.to_string()),
            auth_prefix: var("AUTH_PREFIX"),
            session_secret: var("SESSION_SECRET"),
            secure_cookies: flag("SESSION_COOKIE_SECURE"),
        })
    }

    /// Cookie signing key. `SESSION_SECRET` is base64 and at least 64 bytes once decoded.
    pub fn session_key(&self) -> Result<Key, ConfigError> {
        match &self.session_secret {
            Some(secret) => {
                let bytes = STANDARD.decode(secret).map_err(|e| ConfigError::Invalid {
                    name: "SESSION_SECRET",
                    reason: e.to_string(),
                })?;
                Key::try_from(bytes.as_slice()).map_err(|e| ConfigError::Invalid {
                    name: "SESSION_SECRET",
                    reason: e.to_string(),
                })
            }
            None => {
                warn!("SESSION_SECRET not set; sessions will not survive a restart");
                Ok(Key::generate())
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub authorize_url: String,
    pub token_url: String,
    pub redirect_url: String,
    pub scopes: Vec<String>,
    pub userinfo_url: Option<String>,
    pub post_login_redirect: String,
    pub post_logout_redirect: String,
}

#[derive(Deserialize)]
struct ClientSecretFile {
    #[serde(alias = "web")]
    installed: ClientSecretBlock,
}

#[derive(Deserialize)]
struct ClientSecretBlock {
    client_id: String,
    client_secret: String,
    auth_uri: Option<String>,
    token_uri: Option<String>,
    #[serde(default)]
    redirect_uris: Vec<String>,
}

impl OAuthConfig {
    /// Environment first; falls back to the client secret file when no client id is set.
    pub fn load() -> Result<Self, ConfigError> {
        if var("OAUTH_CLIENT_ID").is_some() {
            return Self::from_env();
        }
        let path = var("OAUTH_CLIENT_SECRET_FILE").unwrap_or_else(|| CLIENT_SECRET_FILE.to_string());
        Self::from_client_secret_file(&path)
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        let client_id = var("OAUTH_CLIENT_ID").ok_or(ConfigError::Missing("OAUTH_CLIENT_ID"))?;
        let client_secret =
            var("OAUTH_CLIENT_SECRET").ok_or(ConfigError::Missing("OAUTH_CLIENT_SECRET"))?;
        Self::build(
            client_id,
            client_secret,
            var("OAUTH_AUTHORIZE_URL"),
            var("OAUTH_TOKEN_URL"),
            var("OAUTH_REDIRECT_URL"),
        )
    }

    /// Reads a provider-issued client secret JSON (`installed` or `web` block).
    pub fn from_client_secret_file(path: &str) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_string(),
            source,
        })?;
        Self::from_client_secret_json(&contents)
    }

    pub fn from_client_secret_json(contents: &str) -> Result<Self, ConfigError> {
        let file: ClientSecretFile = serde_json::from_str(contents)?;
        let block = file.installed;
        let redirect = var("OAUTH_REDIRECT_URL").or_else(|| block.redirect_uris.into_iter().next());
        Self::build(
            block.client_id,
            block.client_secret,
            var("OAUTH_AUTHORIZE_URL").or(block.auth_uri),
            var("OAUTH_TOKEN_URL").or(block.token_uri),
            redirect,
        )
    }

    fn build(
        client_id: String,
        client_secret: String,
        authorize_url: Option<String>,
        token_url: Option<String>,
        redirect_url: Option<String>,
    ) -> Result<Self, ConfigError> {
        let scopes = var("OAUTH_SCOPES")
            .unwrap_or_else(|| DEFAULT_SCOPES.to_string())
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();
        let userinfo_url = match var("OAUTH_USERINFO_URL") {
            Some(u) if u == "none" => None,
            Some(u) => Some(checked_url("OAUTH_USERINFO_URL", u)?),
            None => Some(DISCORD_USERINFO_URL.to_string()),
        };

        Ok(OAuthConfig {
            client_id,
            client_secret,
            authorize_url: checked_url(
                "OAUTH_AUTHORIZE_URL",
                authorize_url.unwrap_or_else(|| DISCORD_AUTHORIZE_URL.to_string()),
            )?,
            token_url: checked_url(
                "OAUTH_TOKEN_URL",
                token_url.unwrap_or_else(|| DISCORD_TOKEN_URL.to_string()),
            )?,
            redirect_url: checked_url(
                "OAUTH_REDIRECT_URL",
                redirect_url.unwrap_or_else(|| DEFAULT_REDIRECT_URL.to_string()),
            )?,
            scopes,
            userinfo_url,
            post_login_redirect: var("POST_LOGIN_REDIRECT").unwrap_or_else(|| "/".to_string()),
            post_logout_redirect: var("POST_LOGOUT_REDIRECT").unwrap_or_else(|| "/".to_string()),
        })
    }
}
