//! An out-of-the-box research agent that reads and writes papers.
//!
//! The crate assembles the agent loop with three research tools: it
//! searches arXiv for recent papers, reads PDF content from a URL, and
//! renders a LaTeX document to PDF. A CLI binary is included for using
//! it in the terminal; the library surface lets you embed the session
//! in your own host app.

#![deny(missing_docs)]

#[allow(unused_imports)]
#[macro_use]
extern crate tracing;

mod session;
pub mod tools;

pub use session::{Session, SessionBuilder};

/// Re-exports of [`arxiv_agent_core`] crate.
pub mod core {
    pub use arxiv_agent_core::*;
}
