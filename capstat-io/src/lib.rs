//! # Input/Output for capstat.
//!
//! Streaming readers for bedGraph tracks, capture target files and inputs lists, plus writers
//! for the tab-separated reports. Reports are never allowed to overwrite an existing file:
//! every output is opened with `create_new` and fails with
//! [`CapstatIoError::OutputExists`](error::CapstatIoError::OutputExists).
//!
pub mod bedgraph;
pub mod error;
pub mod report;
pub mod rewrite;
pub mod targets;

// re-expose core functions
pub use bedgraph::*;
pub use error::*;
pub use report::*;
pub use rewrite::*;
pub use targets::*;
