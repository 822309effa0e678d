//! rarity-gen library interface
//!
//! Exposes the run pipeline and its I/O collaborators for integration testing

pub mod images;
pub mod logging;
pub mod pipeline;
pub mod spinner;
pub mod startup;

pub use pipeline::{run, RarityReport, ReportItem, RunOptions};
pub use spinner::Spinner;
