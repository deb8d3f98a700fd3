//! Pure domain logic for the kuvertki generator.
//!
//! This crate has no async runtime, no I/O, and no HTTP dependencies. It
//! provides:
//!
//! - Name-list parsing ([`names`]).
//! - Slide XML synthesis and deck manifest rewriting ([`slides`]).
//! - The job progress record and store abstraction ([`progress`]).
//! - The domain error type ([`error`]).

pub mod error;
pub mod names;
pub mod progress;
pub mod slides;

pub use error::CoreError;
