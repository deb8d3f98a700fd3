//! The deck-to-PDF generation pipeline.
//!
//! Orchestrates four strictly sequential stages over one job's private
//! working directory:
//!
//! 1. Unpack the template archive ([`template::unpack_template`]).
//! 2. Materialize one slide per name and realign the deck manifests
//!    ([`template::materialize_slides`]).
//! 3. Repack the working directory into a deck archive
//!    ([`assemble::assemble_deck`]).
//! 4. Convert the deck to PDF via the external converter
//!    ([`convert::convert_to_pdf`]).
//!
//! Milestones are reported through a [`ProgressReporter`]; the working
//! directory is removed on every exit path.

pub mod assemble;
pub mod convert;
pub mod error;
pub mod generate;
pub mod reporter;
pub mod template;

pub use error::PipelineError;
pub use generate::{generate_pdf, GenerationConfig};
pub use reporter::ProgressReporter;
