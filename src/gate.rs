//! The authorization gate.
//!
//! A [`Gate`] resolves the roles of a request, asks the policy engine
//! whether any of them may perform the request's action on its route
//! template, and reports the outcome as a [`Decision`].
//!
//! # Example
//!
//! ```rust,ignore
//! use policy_gate::engine::ModelSource;
//! use policy_gate::gate::Gate;
//!
//! let gate = Gate::builder(ModelSource::file("config/model.conf"))
//!     .policy_file("config/policy.csv")
//!     .on_failure(|roles, object, action| {
//!         tracing::warn!(?roles, object, action, "denied");
//!     })
//!     .build()
//!     .await?;
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use axum::http::request::Parts;
use casbin::Adapter;
use policy_gate_config::{DEFAULT_ROLE, DEFAULT_ROLES_DELIMITER, DEFAULT_ROLES_HEADER, GateConfig};
use policy_gate_core::{AuthorizationTarget, Decision, GateError};
use tracing::{debug, info};

use crate::engine::{AdapterFactory, CasbinEngine, ModelSource, PolicyEngine, PolicySource};
use crate::metrics::track_authorization;
use crate::middleware::authorize::request_target;
use crate::roles::{HeaderRoleSource, RoleResolver};

/// Called with `(role, object, action)` for the role that was permitted.
pub type SuccessCallback = Arc<dyn Fn(&str, &str, &str) + Send + Sync>;

/// Called with `(roles, object, action)` when every role was denied.
pub type FailureCallback = Arc<dyn Fn(&[String], &str, &str) + Send + Sync>;

/// Per-gate behaviour that does not depend on the policy engine.
#[derive(Clone)]
pub struct GateOptions {
    pub on_success: Option<SuccessCallback>,
    pub on_failure: Option<FailureCallback>,
    pub roles_header_enabled: bool,
    pub roles_header: String,
    pub roles_delimiter: String,
    pub default_role: String,
}

impl Default for GateOptions {
    fn default() -> Self {
        Self {
            on_success: None,
            on_failure: None,
            roles_header_enabled: false,
            roles_header: DEFAULT_ROLES_HEADER.to_string(),
            roles_delimiter: DEFAULT_ROLES_DELIMITER.to_string(),
            default_role: DEFAULT_ROLE.to_string(),
        }
    }
}

impl std::fmt::Debug for GateOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GateOptions")
            .field("on_success", &self.on_success.is_some())
            .field("on_failure", &self.on_failure.is_some())
            .field("roles_header_enabled", &self.roles_header_enabled)
            .field("roles_header", &self.roles_header)
            .field("roles_delimiter", &self.roles_delimiter)
            .field("default_role", &self.default_role)
            .finish()
    }
}

impl GateOptions {
    fn role_resolver(&self) -> Result<RoleResolver, GateError> {
        let header = if self.roles_header_enabled {
            Some(HeaderRoleSource::new(
                &self.roles_header,
                &self.roles_delimiter,
            )?)
        } else {
            None
        };

        Ok(RoleResolver::new(header, self.default_role.clone()))
    }
}

/// Builds a casbin-backed [`Gate`].
///
/// A model is always required. At least one policy source (adapter, policy
/// file or in-memory rules) must be supplied; when several are, the adapter
/// wins over the policy file, which wins over in-memory rules.
#[derive(Debug)]
pub struct GateBuilder {
    model: ModelSource,
    policy_file: Option<PathBuf>,
    adapter: Option<AdapterFactory>,
    rules: Option<Vec<Vec<String>>>,
    options: GateOptions,
}

impl GateBuilder {
    pub fn new(model: ModelSource) -> Self {
        Self {
            model,
            policy_file: None,
            adapter: None,
            rules: None,
            options: GateOptions::default(),
        }
    }

    /// Starts a builder from environment-derived configuration.
    pub fn from_config(config: &GateConfig) -> Self {
        let mut builder = Self::new(ModelSource::file(&config.model_path))
            .roles_from_header(config.roles_header_enabled)
            .roles_header(&config.roles_header_name, &config.roles_header_delimiter)
            .default_role(&config.default_role);
        if let Some(policy_path) = &config.policy_path {
            builder = builder.policy_file(policy_path);
        }
        builder
    }

    pub fn policy_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.policy_file = Some(path.into());
        self
    }

    pub fn adapter<A>(mut self, adapter: A) -> Self
    where
        A: Adapter + 'static,
    {
        self.adapter = Some(AdapterFactory::new(adapter));
        self
    }

    pub fn rules(mut self, rules: Vec<Vec<String>>) -> Self {
        self.rules = Some(rules);
        self
    }

    pub fn on_success<F>(mut self, callback: F) -> Self
    where
        F: Fn(&str, &str, &str) + Send + Sync + 'static,
    {
        self.options.on_success = Some(Arc::new(callback));
        self
    }

    pub fn on_failure<F>(mut self, callback: F) -> Self
    where
        F: Fn(&[String], &str, &str) + Send + Sync + 'static,
    {
        self.options.on_failure = Some(Arc::new(callback));
        self
    }

    pub fn roles_from_header(mut self, enabled: bool) -> Self {
        self.options.roles_header_enabled = enabled;
        self
    }

    pub fn roles_header(mut self, header: &str, delimiter: &str) -> Self {
        self.options.roles_header = header.to_string();
        self.options.roles_delimiter = delimiter.to_string();
        self
    }

    pub fn default_role(mut self, role: &str) -> Self {
        self.options.default_role = role.to_string();
        self
    }

    /// Loads the engine and assembles the gate.
    ///
    /// # Errors
    ///
    /// Returns `GateError::Config` when no policy source was supplied or the
    /// role options are invalid, and `GateError::Engine` when casbin cannot
    /// load the model or policy.
    pub async fn build(self) -> Result<Gate<CasbinEngine>, GateError> {
        let policy = self
            .adapter
            .map(PolicySource::Adapter)
            .or_else(|| self.policy_file.map(PolicySource::File))
            .or_else(|| self.rules.map(PolicySource::Rules))
            .ok_or_else(|| {
                GateError::config("either a policy file or an adapter must be supplied")
            })?;

        let resolver = self.options.role_resolver()?;
        let engine = CasbinEngine::new(self.model, policy).await?;

        Ok(Gate::assemble(engine, resolver, self.options))
    }
}

/// Authorization gate over a policy engine.
pub struct Gate<E = CasbinEngine> {
    engine: E,
    resolver: RoleResolver,
    on_success: Option<SuccessCallback>,
    on_failure: Option<FailureCallback>,
}

impl<E: std::fmt::Debug> std::fmt::Debug for Gate<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gate")
            .field("engine", &self.engine)
            .field("resolver", &self.resolver)
            .finish_non_exhaustive()
    }
}

impl Gate<CasbinEngine> {
    pub fn builder(model: ModelSource) -> GateBuilder {
        GateBuilder::new(model)
    }
}

impl<E: PolicyEngine> Gate<E> {
    /// Wraps an engine that was built elsewhere.
    pub fn from_engine(engine: E, options: GateOptions) -> Result<Self, GateError> {
        let resolver = options.role_resolver()?;
        Ok(Self::assemble(engine, resolver, options))
    }

    fn assemble(engine: E, resolver: RoleResolver, options: GateOptions) -> Self {
        Self {
            engine,
            resolver,
            on_success: options.on_success,
            on_failure: options.on_failure,
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn resolve_roles(&self, parts: &Parts) -> Vec<String> {
        self.resolver.resolve(parts)
    }

    /// Resolves roles and target from the request and checks them.
    pub async fn authorize(&self, parts: &Parts) -> Result<Decision, GateError> {
        let target = request_target(parts);
        let roles = self.resolve_roles(parts);
        self.check(&target, roles).await
    }

    /// Checks each role in order and stops at the first one the engine permits.
    ///
    /// Exactly one callback runs per decision. Engine errors abort the check
    /// before any callback runs.
    pub async fn check(
        &self,
        target: &AuthorizationTarget,
        roles: Vec<String>,
    ) -> Result<Decision, GateError> {
        let object = target.object.as_str();
        let action = target.action.as_str();

        for role in &roles {
            if self.engine.enforce(role, object, action).await? {
                debug!(role = %role, object = %object, action = %action, "Authorization granted");
                if let Some(callback) = &self.on_success {
                    callback(role, object, action);
                }
                track_authorization("permit");
                return Ok(Decision::Permit { role: role.clone() });
            }
        }

        info!(roles = ?roles, object = %object, action = %action, "Authorization denied");
        if let Some(callback) = &self.on_failure {
            callback(&roles, object, action);
        }
        track_authorization("deny");

        Ok(Decision::Deny {
            roles,
            object: target.object.clone(),
            action: target.action.clone(),
        })
    }
}
