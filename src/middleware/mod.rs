//! Middleware modules for request processing.
//!
//! - [`authorize`]: casbin authorization middleware and extractor
//!
//! # Authorization Flow
//!
//! 1. An upstream layer authenticates the caller and may insert
//!    [`Roles`](crate::roles::Roles) into the request extensions
//! 2. Routing resolves the route template (`MatchedPath`)
//! 3. The gate resolves roles (header, context, default) and asks casbin
//!    whether any of them may perform the method on the route template
//! 4. The handler runs on permit; the caller gets 403 on deny
//!
//! # Example
//!
//! ```ignore
//! use axum::{Router, middleware};
//! use policy_gate::middleware::authorize::authorize;
//!
//! let app = Router::new()
//!     .route("/", get(index))
//!     .route_layer(middleware::from_fn_with_state(state.clone(), authorize))
//!     .with_state(state);
//! ```

pub mod authorize;
