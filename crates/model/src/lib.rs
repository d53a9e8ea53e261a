//! An abstraction layer for the model gateway.
//!
//! This crate establishes an unified protocol between the agent and the
//! inference service that backs it. The agent only depends on the types
//! here, so it can switch between hosted endpoints (or a local fake for
//! testing) without touching the loop itself.
//!
//! Types in this crate don't define any behavior, instead they are the
//! constraints that gateway implementors should adhere to.

#![deny(missing_docs)]

mod completion;
mod error;
mod native;
mod provider;
mod request;

pub use completion::*;
pub use error::*;
pub use native::*;
pub use provider::*;
pub use request::*;
