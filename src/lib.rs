//! # Policy Gate
//!
//! Casbin-backed authorization middleware for Axum.
//!
//! ## Overview
//!
//! Policy decisions (model, rule matching, role hierarchy) belong to casbin.
//! This crate is the glue between casbin and the request pipeline:
//!
//! - **Role resolution**: roles come from a request header (when enabled),
//!   the [`roles::Roles`] request extension, or a configured default role
//! - **Engine invocation**: each role is checked against
//!   (route template, HTTP method) until one is permitted
//! - **Outcome translation**: optional success/failure callbacks, then the
//!   request proceeds or is rejected with `403 Forbidden`
//!
//! ## Architecture
//!
//! ```text
//! src/
//! ├── engine.rs       # PolicyEngine seam and the casbin implementation
//! ├── roles.rs        # Role sources (header, context, default)
//! ├── gate.rs         # Gate, GateBuilder, callbacks
//! ├── middleware/     # Axum middleware and extractor
//! ├── router.rs       # Demo router
//! ├── state.rs        # Shared application state
//! ├── logging.rs      # Tracing setup and request logging
//! └── metrics.rs      # Prometheus metrics
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! CASBIN_MODEL_PATH=config/model.conf
//! CASBIN_POLICY_PATH=config/policy.csv
//! ROLES_HEADER_ENABLED=true
//! DEFAULT_ROLE=any
//! ```
//!
//! ```rust,ignore
//! use policy_gate::engine::ModelSource;
//! use policy_gate::gate::Gate;
//! use policy_gate::state::AppState;
//!
//! let gate = Gate::builder(ModelSource::file("config/model.conf"))
//!     .policy_file("config/policy.csv")
//!     .build()
//!     .await?;
//! let app = policy_gate::router::init_router(AppState::new(gate));
//! ```

pub mod engine;
pub mod gate;
pub mod logging;
pub mod metrics;
pub mod middleware;
pub mod roles;
pub mod router;
pub mod state;

// Re-export workspace crates for convenience
pub use policy_gate_config;
pub use policy_gate_core;
