//! Transform rules and execution for the lode build pipeline.
//!
//! The [`TransformRegistry`] maps filename patterns to ordered chains of
//! [`TransformStep`]s (first match wins). The executor applies a module's
//! matched chain with pipeline semantics — each step consumes the previous
//! step's output and may emit named side artifacts — consulting the
//! incremental cache first. Steps are a closed enum dispatched by registry
//! lookup; there is no runtime plugin registration.

#![warn(missing_docs)]

pub mod error;
pub mod executor;
pub mod registry;
pub mod step;

pub use error::TransformError;
pub use executor::{execute, ExecuteContext, TransformOutput};
pub use registry::{MatchedRule, TransformRegistry};
pub use step::{SideOutput, TransformStep};
