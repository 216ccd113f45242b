//! FDC: Folio Document Control
//!
//! A CLI and library for keeping controlled documents under an ISO 9001
//! style lifecycle: immutable version history, an approval state machine,
//! and periodic review scheduling.

pub mod cli;
pub mod core;
