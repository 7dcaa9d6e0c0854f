//! # Core models for capstat
//!
//! Capture-C style pileup tracks are plain bedGraph files (`chrom start end value`) that are
//! summarised around named capture targets. This crate holds the shared vocabulary:
//!
//! - [`SignalInterval`](models::SignalInterval): one bedGraph bin with its value
//! - [`Target`](models::Target): a named, stranded viewpoint from a BED file
//! - [`GenomicInterval`](models::GenomicInterval): chromosome, span and cached midpoint
//! - [`ParseError`](errors::ParseError): typed failures of the line tokenizer
//!
pub mod errors;
pub mod models;
pub mod utils;
