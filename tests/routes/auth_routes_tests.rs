use actix_web::http::{Method, StatusCode};
use actix_web::test as actix_test;
use actix_web::App;

use jweb_auth::routes::auth_routes::{
    auth_blueprint, default_auth_blueprint, AUTH_BLUEPRINT, CALLBACK_ROUTE, LOGIN_ROUTE, LOGOUT_ROUTE,
};
use jweb_auth::routes::blueprint::{RegistrationError, Router};

use super::{init_logging, Calls};

fn stub_router(calls: &Calls, prefix: Option<&str>) -> Router {
    let blueprint = auth_blueprint(
        calls.handler("login"),
        calls.handler("logout"),
        calls.handler("callback"),
    )
    .expect("auth blueprint should build");
    let mut router = Router::new();
    router.mount(blueprint, prefix).expect("mount should succeed");
    router
}

#[test]
fn test_blueprint_has_one_path_per_route_name() {
    let calls = Calls::default();
    let blueprint = auth_blueprint(
        calls.handler("login"),
        calls.handler("logout"),
        calls.handler("callback"),
    )
    .unwrap();

    assert_eq!(blueprint.name(), AUTH_BLUEPRINT);
    assert_eq!(blueprint.len(), 3);
    for (name, path) in [
        (LOGIN_ROUTE, "/login"),
        (LOGOUT_ROUTE, "/logout"),
        (CALLBACK_ROUTE, "/callback"),
    ] {
        let matching: Vec<_> = blueprint.routes().iter().filter(|r| r.name() == name).collect();
        assert_eq!(matching.len(), 1, "expected exactly one route named {}", name);
        assert_eq!(matching[0].path(), path);
        assert_eq!(matching[0].methods(), &[Method::GET, Method::HEAD]);
    }
}

#[test]
fn test_default_blueprint_registers_the_same_routes() {
    let blueprint = default_auth_blueprint().unwrap();
    let names: Vec<_> = blueprint.routes().iter().map(|r| r.name()).collect();
    assert_eq!(names, vec![LOGIN_ROUTE, LOGOUT_ROUTE, CALLBACK_ROUTE]);
}

#[test]
fn test_mounting_auth_twice_fails() {
    init_logging();
    let calls = Calls::default();
    let mut router = stub_router(&calls, None);

    let again = auth_blueprint(
        calls.handler("login"),
        calls.handler("logout"),
        calls.handler("callback"),
    )
    .unwrap();
    let result = router.mount(again, None);
    assert!(matches!(result, Err(RegistrationError::DuplicateBlueprint { ref name }) if name == "auth"));

    // The failed mount leaves the table untouched.
    assert_eq!(router.routes().len(), 3);
    assert_eq!(router.blueprints(), &["auth".to_string()]);
}

#[test]
fn test_endpoints_resolve_under_prefix() {
    let calls = Calls::default();
    let router = stub_router(&calls, Some("/auth/"));

    assert_eq!(router.url_for("auth.login_route"), Some("/auth/login"));
    assert_eq!(router.url_for("auth.logout_route"), Some("/auth/logout"));
    assert_eq!(router.url_for("auth.callback_route"), Some("/auth/callback"));
    assert_eq!(router.url_for("login_route"), None);
    assert_eq!(router.lookup(&Method::GET, "/auth/login"), Some("auth.login_route"));
    assert_eq!(router.lookup(&Method::GET, "/login"), None);
}

#[actix_web::test]
async fn test_login_dispatches_only_to_login_handler() {
    init_logging();
    let calls = Calls::default();
    let router = stub_router(&calls, None);
    let app = actix_test::init_service(App::new().configure(|cfg| router.configure(cfg))).await;

    let req = actix_test::TestRequest::get().uri("/login").to_request();
    let body = actix_test::call_and_read_body(&app, req).await;

    assert_eq!(body, "login");
    assert_eq!(calls.taken(), vec!["login"]);
}

#[actix_web::test]
async fn test_logout_dispatches_only_to_logout_handler() {
    let calls = Calls::default();
    let router = stub_router(&calls, None);
    let app = actix_test::init_service(App::new().configure(|cfg| router.configure(cfg))).await;

    let req = actix_test::TestRequest::get().uri("/logout").to_request();
    let resp = actix_test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(calls.taken(), vec!["logout"]);
}

#[actix_web::test]
async fn test_callback_dispatches_only_to_callback_handler() {
    let calls = Calls::default();
    let router = stub_router(&calls, None);
    let app = actix_test::init_service(App::new().configure(|cfg| router.configure(cfg))).await;

    let req = actix_test::TestRequest::get()
        .uri("/callback?code=abc&state=xyz")
        .to_request();
    let resp = actix_test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(calls.taken(), vec!["callback"]);
}

#[actix_web::test]
async fn test_unknown_paths_reach_no_auth_handler() {
    let calls = Calls::default();
    let router = stub_router(&calls, None);
    let app = actix_test::init_service(App::new().configure(|cfg| router.configure(cfg))).await;

    for uri in ["/", "/auth", "/login/extra", "/logins", "/callback/x"] {
        let req = actix_test::TestRequest::get().uri(uri).to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "unexpected status for {}", uri);
    }
    assert!(calls.taken().is_empty());
}

#[actix_web::test]
async fn test_post_is_not_routed() {
    let calls = Calls::default();
    let router = stub_router(&calls, None);
    let app = actix_test::init_service(App::new().configure(|cfg| router.configure(cfg))).await;

    let req = actix_test::TestRequest::post().uri("/login").to_request();
    let resp = actix_test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert!(calls.taken().is_empty());
}

#[actix_web::test]
async fn test_prefixed_mount_only_answers_under_prefix() {
    let calls = Calls::default();
    let router = stub_router(&calls, Some("/auth"));
    let app = actix_test::init_service(App::new().configure(|cfg| router.configure(cfg))).await;

    let req = actix_test::TestRequest::get().uri("/login").to_request();
    assert_eq!(actix_test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = actix_test::TestRequest::get().uri("/auth/login").to_request();
    assert_eq!(actix_test::call_service(&app, req).await.status(), StatusCode::OK);
    assert_eq!(calls.taken(), vec!["login"]);
}

#[actix_web::test]
async fn test_head_is_served_by_the_get_handler() {
    let calls = Calls::default();
    let router = stub_router(&calls, None);
    let app = actix_test::init_service(App::new().configure(|cfg| router.configure(cfg))).await;

    let req = actix_test::TestRequest::default()
        .method(Method::HEAD)
        .uri("/login")
        .to_request();
    let resp = actix_test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(calls.taken(), vec!["login"]);
}
