//! Subject role resolution.
//!
//! Roles are looked up through an ordered chain of [`RoleSource`]s. The
//! first source that has an answer wins:
//!
//! 1. [`HeaderRoleSource`] (only when header roles are enabled)
//! 2. [`ContextRoleSource`] (the [`Roles`] request extension)
//! 3. [`DefaultRoleSource`] (the configured fallback role)

use axum::http::{HeaderName, request::Parts};
use policy_gate_core::GateError;

/// Roles attached to a request by an upstream authentication layer.
///
/// ```rust,ignore
/// req.extensions_mut().insert(Roles::new(["admin", "user"]));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roles(pub Vec<String>);

impl Roles {
    pub fn new<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(roles.into_iter().map(Into::into).collect())
    }
}

/// A single strategy for finding a request's roles.
pub trait RoleSource: Send + Sync {
    /// Returns `None` when this source has nothing to say about the request.
    fn resolve(&self, parts: &Parts) -> Option<Vec<String>>;
}

/// Reads roles from a delimited request header.
#[derive(Debug, Clone)]
pub struct HeaderRoleSource {
    header: HeaderName,
    delimiter: String,
}

impl HeaderRoleSource {
    pub fn new(header: &str, delimiter: &str) -> Result<Self, GateError> {
        let header = HeaderName::from_bytes(header.as_bytes())
            .map_err(|e| GateError::config(format!("invalid roles header {:?}: {}", header, e)))?;
        if delimiter.is_empty() {
            return Err(GateError::config("roles header delimiter must not be empty"));
        }

        Ok(Self {
            header,
            delimiter: delimiter.to_string(),
        })
    }
}

impl RoleSource for HeaderRoleSource {
    fn resolve(&self, parts: &Parts) -> Option<Vec<String>> {
        let value = parts.headers.get(&self.header)?.to_str().ok()?;
        let roles: Vec<String> = value
            .split(self.delimiter.as_str())
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string)
            .collect();

        (!roles.is_empty()).then_some(roles)
    }
}

/// Reads the [`Roles`] extension placed on the request by an earlier layer.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContextRoleSource;

impl RoleSource for ContextRoleSource {
    fn resolve(&self, parts: &Parts) -> Option<Vec<String>> {
        parts
            .extensions
            .get::<Roles>()
            .filter(|roles| !roles.0.is_empty())
            .map(|roles| roles.0.clone())
    }
}

/// Always answers with one configured role.
#[derive(Debug, Clone)]
pub struct DefaultRoleSource {
    role: String,
}

impl DefaultRoleSource {
    pub fn new(role: impl Into<String>) -> Self {
        Self { role: role.into() }
    }
}

impl RoleSource for DefaultRoleSource {
    fn resolve(&self, _parts: &Parts) -> Option<Vec<String>> {
        Some(vec![self.role.clone()])
    }
}

/// Ordered chain of role sources, built once per gate.
pub struct RoleResolver {
    sources: Vec<Box<dyn RoleSource>>,
}

impl std::fmt::Debug for RoleResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoleResolver")
            .field("sources", &self.sources.len())
            .finish()
    }
}

impl RoleResolver {
    /// Builds the standard header > context > default chain.
    pub fn new(header: Option<HeaderRoleSource>, default_role: impl Into<String>) -> Self {
        let mut sources: Vec<Box<dyn RoleSource>> = Vec::with_capacity(3);
        if let Some(header) = header {
            sources.push(Box::new(header));
        }
        sources.push(Box::new(ContextRoleSource));
        sources.push(Box::new(DefaultRoleSource::new(default_role)));

        Self { sources }
    }

    /// Builds a resolver from an explicit list of sources.
    pub fn with_sources(sources: Vec<Box<dyn RoleSource>>) -> Self {
        Self { sources }
    }

    pub fn resolve(&self, parts: &Parts) -> Vec<String> {
        self.sources
            .iter()
            .find_map(|source| source.resolve(parts))
            .unwrap_or_default()
    }
}
