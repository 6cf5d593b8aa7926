//! Casbin authorization for Axum.
//!
//! Two ways to put the gate in front of handlers:
//! 1. Layer-based middleware using [`authorize`]
//! 2. Extractor-based approach using [`RequireAuthorization`]

use axum::{
    extract::{FromRequestParts, MatchedPath, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use policy_gate_core::{AppError, AuthorizationTarget, Decision, GateError};
use tracing::error;

use crate::state::AppState;

/// Middleware that runs the gate before the protected handler.
///
/// Must be installed with `route_layer` so the matched route template is
/// available as the policy object.
///
/// # Usage with axum::middleware::from_fn_with_state
///
/// ```rust,ignore
/// use axum::{Router, middleware, routing::get};
/// use policy_gate::middleware::authorize::authorize;
///
/// let app = Router::new()
///     .route("/users/{id}", get(show_user))
///     .route_layer(middleware::from_fn_with_state(state.clone(), authorize))
///     .with_state(state);
/// ```
pub async fn authorize(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (parts, body) = req.into_parts();
    let decision = evaluate(&state, &parts).await?;

    match decision {
        Decision::Permit { .. } => Ok(next.run(Request::from_parts(parts, body)).await),
        Decision::Deny {
            roles,
            object,
            action,
        } => Err(forbidden(&roles, &object, &action)),
    }
}

/// Extractor that lets the handler run only when the gate permits the request.
///
/// # Example
///
/// ```rust,ignore
/// use policy_gate::middleware::authorize::RequireAuthorization;
///
/// pub async fn delete_user(
///     RequireAuthorization { role }: RequireAuthorization,
/// ) -> Result<Json<Value>, AppError> {
///     // Only reached when `role` may DELETE this route
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RequireAuthorization {
    /// The role that was granted access.
    pub role: String,
}

impl FromRequestParts<AppState> for RequireAuthorization {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let decision = evaluate(state, parts).await?;

        match decision {
            Decision::Permit { role } => Ok(RequireAuthorization { role }),
            Decision::Deny {
                roles,
                object,
                action,
            } => Err(forbidden(&roles, &object, &action)),
        }
    }
}

/// Policy target for a request: the matched route template and the method.
///
/// Falls back to the raw URI path when no route template is available.
pub fn request_target(parts: &Parts) -> AuthorizationTarget {
    let object = parts
        .extensions
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| parts.uri.path().to_string());

    AuthorizationTarget::new(object, parts.method.as_str())
}

async fn evaluate(state: &AppState, parts: &Parts) -> Result<Decision, AppError> {
    state.gate.authorize(parts).await.map_err(|err: GateError| {
        error!(error = %err, path = %parts.uri.path(), "Policy engine failure");
        AppError::from(err)
    })
}

fn forbidden(roles: &[String], object: &str, action: &str) -> AppError {
    AppError::forbidden(format!(
        "Access denied. None of the roles {:?} may {} {}",
        roles, action, object
    ))
}
