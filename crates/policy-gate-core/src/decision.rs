//! Authorization targets and decisions.

/// The (object, action) half of an authorization request.
///
/// The object is the route template the framework matched (for example
/// `/users/{id}`), the action is the HTTP method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationTarget {
    pub object: String,
    pub action: String,
}

impl AuthorizationTarget {
    pub fn new(object: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            object: object.into(),
            action: action.into(),
        }
    }
}

/// Outcome of checking a request against the policy engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// `role` is the first resolved role the engine authorized.
    Permit { role: String },
    /// No resolved role was authorized.
    Deny {
        roles: Vec<String>,
        object: String,
        action: String,
    },
}

impl Decision {
    pub fn is_permit(&self) -> bool {
        matches!(self, Decision::Permit { .. })
    }

    /// Label used for logs and metrics.
    pub fn outcome(&self) -> &'static str {
        match self {
            Decision::Permit { .. } => "permit",
            Decision::Deny { .. } => "deny",
        }
    }
}
