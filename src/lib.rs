//! # Toolgate - Gateway Tool Adapter
//!
//! Adapts a remote tool-execution gateway's catalog into callable objects
//! for agent orchestration:
//! - Schema adaptation: declared parameter lists become validated argument contracts
//! - Authorization gate: consent-requiring tools never execute without a completed grant
//! - Configurable short-circuiting: blocked calls return an error payload or raise
//!   a flow interruption for graph engines
//! - Toolkit registry with partial-failure-tolerant bulk wrapping
//!
//! ## Control flow
//!
//! ```text
//!   catalog lookup → schema adaptation → invoker construction
//!                                             │ (call time)
//!              argument validation ← authorization gate
//!                        │
//!              remote execution → result/error normalization
//! ```
//!
//! Each invocation is a sequential chain of at most two gateway round
//! trips; wrapped tools hold only immutable shared references, so
//! concurrent calls need no coordination.

// Enforce strict safety at compile time
#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]
#![warn(rust_2018_idioms)]

// Re-export public API
pub mod gateway;
pub mod schema;
pub mod tools;
pub mod types;

// Internal utilities
pub mod observability;

pub use gateway::{GatewayApi, GatewayClient};
pub use tools::{BlockBehavior, ExecutionContext, ToolScope, Toolkit, WrappedTool};
pub use types::{Config, Error, Result};
