// Routing suites
pub mod auth_routes_tests;

use std::future::{ready, Ready};
use std::sync::{Arc, Mutex};

use actix_web::HttpResponse;

/// Records which stub handlers were invoked, in order.
#[derive(Clone, Default)]
pub struct Calls(Arc<Mutex<Vec<&'static str>>>);

impl Calls {
    pub fn handler(&self, name: &'static str) -> impl Fn() -> Ready<HttpResponse> + Clone + Send + Sync + 'static {
        let calls = self.clone();
        move || {
            calls.0.lock().unwrap().push(name);
            ready(HttpResponse::Ok().body(name))
        }
    }

    pub fn taken(&self) -> Vec<&'static str> {
        self.0.lock().unwrap().clone()
    }
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
