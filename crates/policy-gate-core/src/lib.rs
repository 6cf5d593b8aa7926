//! # Policy Gate Core
//!
//! Core types and errors shared by the policy-gate crates.
//!
//! - [`errors`]: gate errors and the HTTP-facing [`AppError`]
//! - [`decision`]: authorization targets and decisions
//!
//! # Example
//!
//! ```ignore
//! use policy_gate_core::{AppError, AuthorizationTarget, Decision};
//!
//! let target = AuthorizationTarget::new("/users/{id}", "DELETE");
//! let error = AppError::forbidden("Access denied");
//! ```

pub mod decision;
pub mod errors;

// Re-export commonly used types at crate root
pub use decision::{AuthorizationTarget, Decision};
pub use errors::{AppError, GateError};
