//! Tool infrastructure — wrapped callables and the toolkit registry.
//!
//! Wrapping turns a gateway definition into a locally validated,
//! authorization-gated callable; the registry fetches and caches the
//! definitions a caller is scoped to.

pub mod toolkit;
pub mod wrapper;

pub use toolkit::{ToolScope, Toolkit};
pub use wrapper::{BlockBehavior, BlockReason, ExecutionContext, WrappedTool};
