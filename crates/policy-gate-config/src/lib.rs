//! # Policy Gate Config
//!
//! Configuration structures loaded from environment variables:
//!
//! - [`gate`]: casbin model/policy locations and role resolution settings
//! - [`server`]: listen address for the demo server
//!
//! # Example
//!
//! ```ignore
//! use policy_gate_config::{GateConfig, ServerConfig};
//!
//! let gate_config = GateConfig::from_env();
//! let server_config = ServerConfig::from_env();
//! ```

pub mod gate;
pub mod server;

// Re-export commonly used types at crate root
pub use gate::{DEFAULT_ROLE, DEFAULT_ROLES_DELIMITER, DEFAULT_ROLES_HEADER, GateConfig};
pub use server::ServerConfig;
