//! Shared models and file readers for the strandshift workspace.
//!
//! The engine works on deduplicated read anchors: one genomic position per
//! read, split by strand and grouped by chromosome. This crate holds those
//! models ([`models::ReadAnchor`], [`models::ChromosomeReads`]) together with
//! the small tab-delimited readers the command line uses to build them.

pub mod errors;
pub mod models;
pub mod utils;
