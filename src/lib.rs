//! Finds university programs whose admission range resembles a reference
//! program and ranks them for comparison charts.
//!
//! The pipeline runs left to right over data already in memory:
//! [`parser`] → [`window`] → [`similarity`] → [`enrichment`] →
//! [`criteria`] → [`ranking`] → [`chart`]. [`analyzer`] wires the stages
//! together and [`loader`] reads the CSV inputs.

pub mod analyzer;
pub mod chart;
pub mod criteria;
pub mod enrichment;
pub mod errors;
pub mod loader;
pub mod models;
pub mod parser;
pub mod preferences;
pub mod ranking;
pub mod similarity;
pub mod window;

pub use analyzer::{AnalysisOutcome, ComparisonAnalyzer, ComparisonRequest};
pub use errors::DataError;
