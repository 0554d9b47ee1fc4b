//! Core types for the toolgate adapter.
//!
//! This module provides foundational types used throughout the system:
//! - **IDs**: Strongly-typed identifiers (UserId, AuthorizationId, InvocationId)
//! - **Errors**: Application error types with thiserror derives
//! - **Config**: Configuration structures for the gateway client and observability

mod config;
mod errors;
mod ids;

pub use config::{Config, GatewayConfig, ObservabilityConfig};
pub use errors::{Error, Result};
pub use ids::{AuthorizationId, InvocationId, UserId};
