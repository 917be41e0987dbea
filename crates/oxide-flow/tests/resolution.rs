//! Tests for static and dynamic route resolution.

mod common;
use common::*;

use oxide_flow::{Flow, Method, Request, RouterError};

#[test]
fn static_paths_resolve_with_no_params() {
    let flow = Flow::new();
    for path in ["/", "/users", "/api/v1/health"] {
        flow.stream("GET", path, [], ok).unwrap();
    }
    let router = flow.into_router();

    for path in ["/", "/users", "/api/v1/health"] {
        let resolved = router.resolve(path).unwrap();
        assert_eq!(resolved.route, path);
        assert!(resolved.params.is_empty());
        assert!(resolved.group.entry(Method::Get).is_some());
    }
}

#[test]
fn named_segments_capture_one_segment() {
    let flow = Flow::new();
    flow.stream("GET", "/org/:org/repo/:repo_name", [], ok)
        .unwrap();
    let router = flow.into_router();

    let resolved = router.resolve("/org/leakix/repo/oxide_sql").unwrap();
    assert_eq!(resolved.params.get("org"), Some("leakix"));
    assert_eq!(resolved.params.get("repo_name"), Some("oxide_sql"));
    assert!(resolved.params.iter().all(|(_, v)| !v.contains('/')));

    assert!(router.resolve("/org/leakix/repo/a/b").is_none());
    assert!(router.resolve("/org/leakix/repo/").is_none());
}

#[test]
fn trailing_wildcard_matches_the_rest() {
    let flow = Flow::new();
    flow.stream("GET", "/files/*", [], ok).unwrap();
    let router = flow.into_router();

    for path in ["/files/a", "/files/a/b/c.png", "/files/"] {
        let resolved = router.resolve(path).unwrap();
        assert!(resolved.params.is_empty(), "{path} captured params");
    }
    assert!(router.resolve("/files").is_none());
    assert!(router.resolve("/other/a").is_none());
}

#[test]
fn first_registered_pattern_wins() {
    let flow = Flow::new();
    flow.stream("GET", "/user/:id", [], ok).unwrap();
    flow.stream("POST", "/user/*", [], ok).unwrap();
    let router = flow.into_router();

    let resolved = router.resolve("/user/42").unwrap();
    assert_eq!(resolved.route, "/user/:id");
    assert_eq!(resolved.params.get("id"), Some("42"));

    // Only the wildcard covers deeper paths
    let resolved = router.resolve("/user/42/avatar").unwrap();
    assert_eq!(resolved.route, "/user/*");
}

#[test]
fn static_paths_win_over_patterns() {
    let flow = Flow::new();
    flow.stream("GET", "/user/:id", [], ok).unwrap();
    flow.stream("GET", "/user/me", [], ok).unwrap();
    let router = flow.into_router();

    let resolved = router.resolve("/user/me").unwrap();
    assert_eq!(resolved.route, "/user/me");
    assert!(resolved.params.is_empty());
}

#[test]
fn prefix_with_colon_stays_static() {
    let flow = Flow::new();
    {
        let tenant = flow.fork("/:tenant", []);
        tenant.stream("GET", "/dashboard", [], ok).unwrap();
    }
    let router = flow.into_router();

    assert!(router.resolve("/acme/dashboard").is_none());
    assert_eq!(
        router.resolve("/:tenant/dashboard").unwrap().route,
        "/:tenant/dashboard"
    );
}

#[test]
fn static_entry_shadows_dynamic_entry_with_same_string() {
    let flow = Flow::new();
    {
        let users = flow.fork("/users", []);
        users.stream("GET", "/:id", [], ok).unwrap();
        let by_id = flow.fork("/users/:id", []);
        by_id.stream("POST", "", [], ok).unwrap();
    }
    let router = flow.into_router();

    assert_eq!(router.table().static_len(), 1);
    assert_eq!(router.table().dynamic_len(), 1);

    let literal = router.resolve("/users/:id").unwrap();
    assert_eq!(literal.group.allowed_methods(), [Method::Post]);

    let concrete = router.resolve("/users/7").unwrap();
    assert_eq!(concrete.group.allowed_methods(), [Method::Get]);
}

#[test]
fn static_entry_survives_later_dynamic_entry() {
    let flow = Flow::new();
    {
        let by_id = flow.fork("/users/:id", []);
        by_id.stream("GET", "", [], ok).unwrap();
        let users = flow.fork("/users", []);
        users.stream("POST", "/:id", [], ok).unwrap();
    }
    let router = flow.into_router();

    assert_eq!(router.table().static_len(), 1);
    assert_eq!(router.table().dynamic_len(), 1);

    let literal = router.resolve("/users/:id").unwrap();
    assert_eq!(literal.route, "/users/:id");
    assert_eq!(literal.group.allowed_methods(), [Method::Get]);

    let concrete = router.resolve("/users/7").unwrap();
    assert_eq!(concrete.group.allowed_methods(), [Method::Post]);
    assert_eq!(concrete.params.get("id"), Some("7"));
}

#[test]
fn digit_leading_param_names_register() {
    let flow = Flow::new();
    flow.stream("GET", "/v/:1st", [], ok).unwrap();
    let router = flow.into_router();

    let resolved = router.resolve("/v/one").unwrap();
    assert_eq!(resolved.params.get("1st"), Some("one"));
}

#[test]
fn every_wildcard_matches_independently() {
    let flow = Flow::new();
    flow.stream("GET", "/mirror/*/raw/*", [], ok).unwrap();
    let router = flow.into_router();

    let resolved = router.resolve("/mirror/github/leakix/raw/src/lib.rs").unwrap();
    assert!(resolved.params.is_empty());
    assert!(router.resolve("/mirror/github/blob/src/lib.rs").is_none());
}

#[tokio::test]
async fn not_found_and_method_not_allowed_are_distinct() {
    let flow = Flow::new();
    flow.stream("GET", "/ping", [], ok).unwrap();
    let router = flow.into_router();

    let missing = router.dispatch(Request::get("/pong")).await.unwrap_err();
    assert!(matches!(missing, RouterError::NotFound { .. }));
    assert!(missing.is_resolution_failure());

    let delete = Request::new(Method::Delete, "/ping");
    let wrong_method = router.dispatch(delete).await.unwrap_err();
    assert!(matches!(wrong_method, RouterError::MethodNotAllowed { .. }));
    assert!(wrong_method.is_resolution_failure());

    let res = router.handle(Request::new(Method::Delete, "/ping")).await;
    assert_eq!(res.status, 405);
    let res = router.handle(Request::get("/pong")).await;
    assert_eq!(res.status, 404);
}

#[test]
fn unsupported_method_fails_registration() {
    let flow = Flow::new();
    let err = flow.stream("PUT", "/items", [], ok).unwrap_err();
    assert!(matches!(err, RouterError::UnsupportedMethod(ref m) if m == "PUT"));
    assert!(!err.is_resolution_failure());
    assert!(flow.into_router().resolve("/items").is_none());
}
