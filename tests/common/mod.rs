use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode},
    middleware::{self, Next},
    response::Response,
    routing::get,
};
use policy_gate::engine::ModelSource;
use policy_gate::gate::GateBuilder;
use policy_gate::middleware::authorize::authorize;
use policy_gate::roles::Roles;
use policy_gate::state::AppState;
use tower::ServiceExt;

pub const MODEL_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/model.conf");
pub const POLICY_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/policy.csv");

/// Header read by the test authentication layer, not by the gate.
#[allow(dead_code)]
pub const TEST_AUTH_HEADER: &str = "x-test-auth-roles";

/// Builder over the fixture model and policy.
pub fn fixture_builder() -> GateBuilder {
    GateBuilder::new(ModelSource::file(MODEL_PATH)).policy_file(POLICY_PATH)
}

#[allow(dead_code)]
pub fn roles(names: &[&str]) -> Vec<String> {
    names.iter().map(|r| r.to_string()).collect()
}

/// Request parts for `method uri`, optionally carrying context roles.
#[allow(dead_code)]
pub fn request_parts(
    method: &str,
    uri: &str,
    context: Option<&[&str]>,
) -> axum::http::request::Parts {
    let mut req = Request::builder()
        .method(method)
        .uri(uri)
        .body(())
        .unwrap();
    if let Some(names) = context {
        req.extensions_mut().insert(Roles::new(names.iter().copied()));
    }
    req.into_parts().0
}

/// Stands in for an authentication layer: copies roles from
/// [`TEST_AUTH_HEADER`] into the request context.
async fn test_auth(mut req: axum::extract::Request, next: Next) -> Response {
    let roles = req
        .headers()
        .get(TEST_AUTH_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|v| Roles::new(v.split(',').map(str::trim)));
    if let Some(roles) = roles {
        req.extensions_mut().insert(roles);
    }
    next.run(req).await
}

/// Router with the fixture routes, guarded by the gate.
#[allow(dead_code)]
pub fn test_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { "index" }))
        .route("/users", axum::routing::post(|| async { "created" }))
        .route(
            "/users/1",
            get(|| async { "user" })
                .put(|| async { "updated" })
                .delete(|| async { "deleted" }),
        )
        .route("/unknown", get(|| async { "unknown" }).put(|| async { "unknown" }))
        .route_layer(middleware::from_fn_with_state(state.clone(), authorize))
        .with_state(state)
        .layer(middleware::from_fn(test_auth))
}

/// Sends one request through `app` and returns the status code.
#[allow(dead_code)]
pub async fn send(
    app: Router,
    method: Method,
    uri: &str,
    headers: &[(&str, &str)],
) -> StatusCode {
    let mut builder = Request::builder().method(method).uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    let request = builder.body(Body::empty()).unwrap();

    app.oneshot(request).await.unwrap().status()
}
