use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use actix_web::http::Method;
use actix_web::{web, FromRequest, Handler, Responder, Route};
use log::{debug, info};

type RouteFactory = Arc<dyn Fn(Method) -> Route + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum RegistrationError {
    #[error("Route name '{name}' is already registered in blueprint '{blueprint}'")]
    DuplicateName { blueprint: String, name: String },

    #[error("Path '{path}' is already registered")]
    DuplicatePath { path: String },

    #[error("Blueprint '{name}' is already mounted")]
    DuplicateBlueprint { name: String },

    #[error("Endpoint '{endpoint}' is already mounted")]
    DuplicateEndpoint { endpoint: String },

    #[error("Invalid path '{path}': must start with '/'")]
    InvalidPath { path: String },
}

/// One `(path, name, handler)` binding inside a blueprint.
#[derive(Clone)]
pub struct RouteEntry {
    path: String,
    name: String,
    methods: Vec<Method>,
    factory: RouteFactory,
}

impl RouteEntry {
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn methods(&self) -> &[Method] {
        &self.methods
    }
}

impl fmt::Debug for RouteEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteEntry")
            .field("path", &self.path)
            .field("name", &self.name)
            .field("methods", &self.methods)
            .finish()
    }
}

/// A named, mountable group of routes.
///
/// Routes are only collected here; nothing is visible to clients until the
/// blueprint is mounted on a [`Router`].
#[derive(Debug, Clone)]
pub struct Blueprint {
    name: String,
    routes: Vec<RouteEntry>,
}

impl Blueprint {
    pub fn new(name: impl Into<String>) -> Self {
        Blueprint {
            name: name.into(),
            routes: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn routes(&self) -> &[RouteEntry] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Registers `handler` for `GET` and `HEAD` on `path` under `name`.
    pub fn add_route<F, Args>(
        &mut self,
        path: &str,
        name: &str,
        handler: F,
    ) -> Result<&mut Self, RegistrationError>
    where
        F: Handler<Args> + Send + Sync,
        Args: FromRequest + 'static,
        F::Output: Responder + 'static,
    {
        self.add_route_with_methods(path, name, &[Method::GET, Method::HEAD], handler)
    }

    pub fn add_route_with_methods<F, Args>(
        &mut self,
        path: &str,
        name: &str,
        methods: &[Method],
        handler: F,
    ) -> Result<&mut Self, RegistrationError>
    where
        F: Handler<Args> + Send + Sync,
        Args: FromRequest + 'static,
        F::Output: Responder + 'static,
    {
        if !path.starts_with('/') {
            return Err(RegistrationError::InvalidPath { path: path.to_string() });
        }
        if self.routes.iter().any(|r| r.name == name) {
            return Err(RegistrationError::DuplicateName {
                blueprint: self.name.clone(),
                name: name.to_string(),
            });
        }
        if self.routes.iter().any(|r| r.path == path) {
            return Err(RegistrationError::DuplicatePath { path: path.to_string() });
        }

        let factory: RouteFactory = Arc::new(move |method| web::method(method).to(handler.clone()));
        self.routes.push(RouteEntry {
            path: path.to_string(),
            name: name.to_string(),
            methods: methods.to_vec(),
            factory,
        });
        Ok(self)
    }
}

/// A route after mounting: full path plus its `blueprint.name` endpoint.
#[derive(Debug, Clone)]
pub struct MountedRoute {
    pub endpoint: String,
    pub path: String,
    entry: RouteEntry,
}

impl MountedRoute {
    pub fn methods(&self) -> &[Method] {
        self.entry.methods()
    }
}

/// The application dispatch table blueprints are mounted into.
///
/// Cloning is cheap; `main` hands a clone to every worker's `App`.
#[derive(Debug, Clone, Default)]
pub struct Router {
    blueprints: Vec<String>,
    routes: Vec<MountedRoute>,
}

impl Router {
    pub fn new() -> Self {
        Router::default()
    }

    pub fn blueprints(&self) -> &[String] {
        &self.blueprints
    }

    pub fn routes(&self) -> &[MountedRoute] {
        &self.routes
    }

    /// Mounts every route of `blueprint` under `prefix`.
    ///
    /// Either the whole blueprint is mounted or nothing is.
    pub fn mount(
        &mut self,
        blueprint: Blueprint,
        prefix: Option<&str>,
    ) -> Result<&mut Self, RegistrationError> {
        if self.blueprints.iter().any(|b| *b == blueprint.name) {
            return Err(RegistrationError::DuplicateBlueprint { name: blueprint.name });
        }
        let prefix = normalize_prefix(prefix)?;

        let mut pending: Vec<MountedRoute> = Vec::with_capacity(blueprint.routes.len());
        let mut taken: HashSet<(Method, String)> = self
            .routes
            .iter()
            .flat_map(|r| r.methods().iter().map(|m| (m.clone(), r.path.clone())))
            .collect();

        for entry in blueprint.routes {
            let endpoint = format!("{}.{}", blueprint.name, entry.name);
            if self.routes.iter().any(|r| r.endpoint == endpoint) {
                return Err(RegistrationError::DuplicateEndpoint { endpoint });
            }
            let path = format!("{}{}", prefix, entry.path);
            for method in entry.methods() {
                if !taken.insert((method.clone(), path.clone())) {
                    return Err(RegistrationError::DuplicatePath { path });
                }
            }
            pending.push(MountedRoute { endpoint, path, entry });
        }

        for route in &pending {
            debug!("Registered {:?} {} as {}", route.methods(), route.path, route.endpoint);
        }
        info!(
            "Mounted blueprint '{}' at '{}' with {} routes",
            blueprint.name,
            if prefix.is_empty() { "/" } else { prefix.as_str() },
            pending.len()
        );
        self.blueprints.push(blueprint.name);
        self.routes.extend(pending);
        Ok(self)
    }

    /// Full path registered for `endpoint` (e.g. `auth.login_route`).
    pub fn url_for(&self, endpoint: &str) -> Option<&str> {
        self.routes
            .iter()
            .find(|r| r.endpoint == endpoint)
            .map(|r| r.path.as_str())
    }

    /// Endpoint that would serve `method path`, if any.
    pub fn lookup(&self, method: &Method, path: &str) -> Option<&str> {
        self.routes
            .iter()
            .find(|r| r.path == path && r.methods().contains(method))
            .map(|r| r.endpoint.as_str())
    }

    /// Adds one actix resource per distinct path, with a route per method.
    ///
    /// The resource is named after the first endpoint mounted on its path.
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        let mut paths: Vec<&str> = Vec::new();
        for route in &self.routes {
            if !paths.contains(&route.path.as_str()) {
                paths.push(&route.path);
            }
        }

        for path in paths {
            let mut resource = web::resource(path);
            let mut named = false;
            for route in self.routes.iter().filter(|r| r.path == path) {
                if !named {
                    resource = resource.name(&route.endpoint);
                    named = true;
                }
                for method in route.methods() {
                    resource = resource.route((route.entry.factory)(method.clone()));
                }
            }
            cfg.service(resource);
        }
    }
}

fn normalize_prefix(prefix: Option<&str>) -> Result<String, RegistrationError> {
    let trimmed = prefix.unwrap_or_default().trim_end_matches('/');
    if trimmed.is_empty() {
        return Ok(String::new());
    }
    if !trimmed.starts_with('/') {
        return Err(RegistrationError::InvalidPath { path: trimmed.to_string() });
    }
    Ok(trimmed.to_string())
}
